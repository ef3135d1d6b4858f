// src/miner/scratch.rs
//! Per-worker scratch memory for Argon2id
//!
//! Argon2id fills `m_cost` KiB of working memory on every invocation.
//! Allocating that per hash would dominate the cost of hashing, so each
//! worker owns one arena for its whole lifetime and hands the same block
//! slice to every hash call. Arenas are never shared between threads, so
//! no registry or locking is involved; the memory is released when the
//! worker is dropped.

use crate::types::HashVersion;
use argon2::Block;

/// One worker's reusable Argon2id memory arena
///
/// Sized to the largest memory cost in the version table so a single
/// allocation serves every supported version; hashing a cheaper version
/// simply uses a prefix of the blocks.
pub struct ScratchArena {
    blocks: Vec<Block>,
}

impl ScratchArena {
    /// Allocates the arena, done once at worker start
    pub fn new() -> Self {
        ScratchArena {
            blocks: vec![Block::default(); HashVersion::MAX_MEM_COST_KIB as usize],
        }
    }

    /// The block slice handed to the hash capability
    pub fn blocks_mut(&mut self) -> &mut [Block] {
        &mut self.blocks
    }

    /// Arena capacity in 1 KiB blocks
    pub fn capacity(&self) -> usize {
        self.blocks.len()
    }
}

impl Default for ScratchArena {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arena_covers_every_version() {
        let arena = ScratchArena::new();
        for v in [HashVersion::V2, HashVersion::V3, HashVersion::V4] {
            assert!(arena.capacity() >= v.mem_cost_kib() as usize);
        }
    }
}
