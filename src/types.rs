// src/types.rs
use crate::utils::error::MinerError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Length in bytes of the Argon2id digest used for target comparison
pub const DIGEST_LEN: usize = 32;

/// Version number carried by inert / unparseable work
///
/// Work tagged with this version must never be hashed.
pub const INVALID_VERSION: i32 = -1;

/// Offset of the version character inside the marker string
///
/// The coordinator encodes the hash version as a single character of the
/// hex marker returned in `result[1]` of a get-work response: the first
/// hex digit after the `0x` prefix. This is fragile wire coupling, so the
/// whole assumption lives in [`version_from_marker`] and nowhere else.
const VERSION_MARKER_OFFSET: usize = 2;

/// Supported hash versions and their Argon2id cost parameters
///
/// Versions are monotonically increasing integers published by the
/// coordinator; each selects a fixed memory cost. Time cost and lane
/// count are constant across versions.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum HashVersion {
    /// Version 2: 8 KiB memory cost
    V2,
    /// Version 3: 16 KiB memory cost
    V3,
    /// Version 4: 32 KiB memory cost
    V4,
}

impl HashVersion {
    /// Smallest version number this miner understands
    pub const MIN_SUPPORTED: i32 = 2;

    /// Largest memory cost of any supported version, in KiB
    ///
    /// Per-worker scratch arenas are sized to this so one allocation
    /// serves every version.
    pub const MAX_MEM_COST_KIB: u32 = 32;

    /// Maps a published version number to its cost table entry
    ///
    /// Returns `None` for anything outside the table; callers must treat
    /// that as fatal rather than guessing a default.
    pub fn from_number(version: i32) -> Option<Self> {
        match version {
            2 => Some(HashVersion::V2),
            3 => Some(HashVersion::V3),
            4 => Some(HashVersion::V4),
            _ => None,
        }
    }

    /// The version number as published on the wire
    pub fn number(&self) -> i32 {
        match self {
            HashVersion::V2 => 2,
            HashVersion::V3 => 3,
            HashVersion::V4 => 4,
        }
    }

    /// Argon2id memory cost in KiB for this version
    pub fn mem_cost_kib(&self) -> u32 {
        match self {
            HashVersion::V2 => 8,
            HashVersion::V3 => 16,
            HashVersion::V4 => 32,
        }
    }

    /// Argon2id time cost (passes over memory)
    pub fn time_cost(&self) -> u32 {
        1
    }

    /// Argon2id lane / thread count
    pub fn lanes(&self) -> u32 {
        1
    }
}

impl fmt::Display for HashVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.number())
    }
}

impl TryFrom<i32> for HashVersion {
    type Error = MinerError;

    fn try_from(version: i32) -> Result<Self, Self::Error> {
        HashVersion::from_number(version).ok_or(MinerError::UnsupportedVersion(version))
    }
}

/// Decodes the hash version from a get-work version marker
///
/// Returns [`INVALID_VERSION`] when the marker is too short or the
/// version character is not in the mapping table; such work is invalid
/// and must not be published to workers.
pub fn version_from_marker(marker: &str) -> i32 {
    match marker.as_bytes().get(VERSION_MARKER_OFFSET) {
        Some(b'2') => 2,
        Some(b'3') => 3,
        Some(b'4') => 4,
        _ => INVALID_VERSION,
    }
}

/// Policy applied by a worker after one of its shares is rejected
///
/// Both strategies discard the now-known-bad nonce; they differ in
/// whether the worker also waits for the poll loop to confirm a fresh
/// fetch before hashing again.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RejectPolicy {
    /// Draw a new random nonce and resume hashing immediately
    #[default]
    Reseed,
    /// Draw a new random nonce, then stall until the poll loop reports
    /// at least one successful fetch after the rejection
    WaitFresh,
}
