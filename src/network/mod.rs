// src/network/mod.rs
//! Network communication components
//!
//! This module handles all interactions with the work coordinator (a pool
//! or a node, interchangeable through one JSON-RPC/HTTP protocol):
//! - `CoordinatorClient`: the wire-level request/response shapes
//! - `PollLoop`: periodic work fetching feeding the shared work store
//! - `RpcSubmitter`: serialized share submission with outcome feedback

/// JSON-RPC coordinator client (get work, submit work, block metadata)
pub mod client;

/// Periodic work fetcher
pub mod poll;

/// Submission protocol and the worker-facing [`submit::SubmitSink`] seam
pub mod submit;

// Re-export main components for cleaner imports
pub use client::{BlockInfo, CoordinatorClient};
pub use poll::PollLoop;
pub use submit::{RpcSubmitter, Share, SubmitOutcome, SubmitSink};
