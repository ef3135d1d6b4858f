// src/miner/argon.rs
//! Argon2id invocation for seed hashing
//!
//! Thin wrapper over the `argon2` crate: cost parameters come from the
//! version table in [`crate::types`], working memory comes from the
//! caller's [`ScratchArena`], and the digest lands in a caller-owned
//! buffer so the hot loop performs no allocation at all.

use crate::miner::scratch::ScratchArena;
use crate::miner::seed::SEED_LEN;
use crate::types::{DIGEST_LEN, HashVersion};
use crate::utils::error::MinerError;
use argon2::{Algorithm, Argon2, Params, Version};

/// Fixed salt for seed hashing
///
/// All per-attempt entropy lives in the seed itself (work hash + nonce);
/// the salt only has to satisfy the library's minimum length.
const SEED_SALT: [u8; 8] = [0u8; 8];

/// Hashes a 40-byte seed into `digest` using the given version's costs
///
/// A non-success return from the hash capability under validated
/// parameters is fatal for the whole process; callers must propagate it
/// to the global shutdown flag rather than retry.
pub fn hash_seed(
    seed: &[u8; SEED_LEN],
    version: HashVersion,
    scratch: &mut ScratchArena,
    digest: &mut [u8; DIGEST_LEN],
) -> Result<(), MinerError> {
    let params = Params::new(
        version.mem_cost_kib(),
        version.time_cost(),
        version.lanes(),
        Some(DIGEST_LEN),
    )?;
    let argon = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);
    argon.hash_password_into_with_memory(seed, &SEED_SALT, digest, scratch.blocks_mut())?;
    Ok(())
}
