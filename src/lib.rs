//! Aqua Miner - Argon2id proof-of-work mining client in Rust
//!
//! This crate provides a complete implementation of a CPU miner for an
//! Argon2id-based chain with support for:
//! - Both pool and solo mining modes
//! - Per-thread scratch-memory reuse for fast repeated hashing
//! - Reject recovery with a configurable reseed policy

#![warn(missing_docs)]
#![forbid(unsafe_code)]

/// Miner core implementation including hashing, work state and scheduling
pub mod miner;

/// Network communication components for the work coordinator
pub mod network;

/// Statistics collection and reporting functionality
pub mod stats;

/// Utility functions and error handling
pub mod utils;

/// Command-line interface definitions
pub mod cli;

/// Configuration management
pub mod config;

/// Shared type definitions
pub mod types;

// Core exports
pub use cli::Commands;
pub use config::Config;
pub use miner::{Scheduler, ScratchArena, Worker, WorkParams, WorkStore};
pub use network::{CoordinatorClient, PollLoop, RpcSubmitter, Share, SubmitSink};
pub use stats::{Metrics, MetricsSnapshot, StatsReporter};
pub use types::{HashVersion, RejectPolicy};
pub use utils::{MinerError, init_logging};
