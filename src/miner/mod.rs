// src/miner/mod.rs
//! Core mining functionality
//!
//! This module contains all components related to the mining process:
//! - Seed/nonce construction for the Argon2id password buffer
//! - Per-worker scratch memory
//! - The shared work snapshot and target arithmetic
//! - The per-thread mining state machine and its supervisor

/// Argon2id invocation keyed by hash version
pub mod argon;

/// Per-worker reusable hash memory
pub mod scratch;

/// Mining worker supervisor
///
/// Spawns the worker threads and handles fleet shutdown.
pub mod scheduler;

/// Seed and nonce construction
pub mod seed;

/// Worker state machine
///
/// Contains the per-thread loop that decides whether to hash, submit,
/// or wait.
pub mod worker;

/// Shared work snapshot and target/difficulty arithmetic
pub mod work;

// Re-export main components for cleaner imports
pub use self::scheduler::Scheduler;
pub use self::scratch::ScratchArena;
pub use self::seed::{NonceSource, OsNonceSource};
pub use self::work::{WorkParams, WorkStore};
pub use self::worker::{Step, Worker};
