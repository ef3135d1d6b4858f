// src/miner/seed.rs
//! Seed and nonce construction for the Argon2id password buffer
//!
//! The 40-byte seed fed to the hash capability is the 32-byte work hash
//! followed by the 8 little-endian bytes of the nonce. The work-hash
//! prefix is written once per work change; per attempt only the trailing
//! nonce bytes are rewritten in place.

use crate::utils::error::MinerError;
use rand::RngCore;
use rand::rngs::OsRng;

/// Total length of the password buffer handed to Argon2id
pub const SEED_LEN: usize = 40;

/// Byte offset where the little-endian nonce starts inside the seed
pub const NONCE_OFFSET: usize = 32;

/// Builds a fresh seed from a hex-encoded work hash and a nonce
///
/// The hash may carry an optional `0x` prefix and must decode to exactly
/// 32 bytes; anything else is rejected before hashing.
pub fn make_seed(work_hash_hex: &str, nonce: u64) -> Result<[u8; SEED_LEN], MinerError> {
    let stripped = work_hash_hex
        .strip_prefix("0x")
        .unwrap_or(work_hash_hex);
    let bytes = hex::decode(stripped)?;
    if bytes.len() != NONCE_OFFSET {
        return Err(MinerError::SeedError(format!(
            "work hash decodes to {} bytes, expected {}",
            bytes.len(),
            NONCE_OFFSET
        )));
    }

    let mut seed = [0u8; SEED_LEN];
    seed[..NONCE_OFFSET].copy_from_slice(&bytes);
    update_seed(&mut seed, nonce);
    Ok(seed)
}

/// Rewrites only the trailing nonce bytes of an existing seed
///
/// The leading 32 bytes (work identity) are never touched here.
pub fn update_seed(seed: &mut [u8; SEED_LEN], nonce: u64) {
    seed[NONCE_OFFSET..].copy_from_slice(&nonce.to_le_bytes());
}

/// Source of starting nonces for a worker thread
///
/// A fresh nonce is drawn whenever the work hash changes or the previous
/// submission was rejected; between those trust-boundary resets the
/// worker increments by exactly 1 per attempt. The trait exists so tests
/// can substitute a deterministic source without spinning real threads.
pub trait NonceSource: Send {
    /// Draws a fresh 64-bit starting nonce
    fn next_nonce(&mut self) -> u64;
}

/// Production nonce source backed by the operating system CSPRNG
///
/// `OsRng` is safe to use concurrently from every worker, so no global
/// serialization is needed around draws.
#[derive(Debug, Default)]
pub struct OsNonceSource;

impl NonceSource for OsNonceSource {
    fn next_nonce(&mut self) -> u64 {
        OsRng.next_u64()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    // Reference pair shared with the coordinator network's test vectors.
    const WORK_HASH_HEX: &str =
        "0xd3b5f1b47f52fdc72b1dab0b02ab352442487a1d3a43211bc4f0eb5f092403fc";
    const NONCE: u64 = 5577006791947779410;

    // work hash followed by the little-endian nonce bytes
    const REF_SEED: [u8; SEED_LEN] = hex!(
        "d3b5f1b47f52fdc72b1dab0b02ab352442487a1d3a43211bc4f0eb5f092403fc"
        "52fdfc072182654d"
    );

    #[test]
    fn seed_known_answer() {
        let seed = make_seed(WORK_HASH_HEX, NONCE).unwrap();
        assert_eq!(seed, REF_SEED);
    }

    #[test]
    fn seed_layout() {
        let hash_bytes = hex::decode(&WORK_HASH_HEX[2..]).unwrap();
        for nonce in [0u64, 1, u64::MAX, NONCE] {
            let seed = make_seed(WORK_HASH_HEX, nonce).unwrap();
            assert_eq!(&seed[..NONCE_OFFSET], hash_bytes.as_slice());
            assert_eq!(&seed[NONCE_OFFSET..], nonce.to_le_bytes());
        }
    }

    #[test]
    fn seed_accepts_unprefixed_hex() {
        let prefixed = make_seed(WORK_HASH_HEX, NONCE).unwrap();
        let bare = make_seed(&WORK_HASH_HEX[2..], NONCE).unwrap();
        assert_eq!(prefixed, bare);
    }

    #[test]
    fn update_never_touches_work_identity() {
        let mut seed = make_seed(WORK_HASH_HEX, NONCE).unwrap();
        let prefix: [u8; NONCE_OFFSET] = seed[..NONCE_OFFSET].try_into().unwrap();

        for nonce in [0u64, 42, u64::MAX] {
            update_seed(&mut seed, nonce);
            assert_eq!(&seed[..NONCE_OFFSET], prefix);
            assert_eq!(&seed[NONCE_OFFSET..], nonce.to_le_bytes());
        }
    }

    #[test]
    fn wrong_length_hash_is_rejected() {
        assert!(matches!(
            make_seed("0xd3b5f1b4", NONCE),
            Err(MinerError::SeedError(_))
        ));
        assert!(make_seed("", NONCE).is_err());
        // not hex at all
        assert!(make_seed("0xzz", NONCE).is_err());
    }
}
