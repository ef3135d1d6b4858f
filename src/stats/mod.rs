//! Statistics collection and reporting module
//!
//! Tracks mining counters (hashes, shares, blocks) in a single shared
//! [`Metrics`] struct and periodically reports them to the log via
//! [`StatsReporter`].

/// Submodule containing the counters and the periodic reporter
pub mod reporter;

// Re-export main components
pub use reporter::{Metrics, MetricsSnapshot, StatsReporter};
