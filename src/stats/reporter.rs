// src/stats/reporter.rs
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Read-only snapshot of the mining counters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    /// Total number of hashes computed
    pub hashes_total: u64,
    /// Shares handed to the submission protocol
    pub shares_submitted: u64,
    /// Shares the coordinator accepted
    pub shares_accepted: u64,
    /// Accepted solo-mode submissions (whole blocks)
    pub blocks_accepted: u64,
}

impl MetricsSnapshot {
    /// Shares submitted but not accepted
    ///
    /// The counters are loaded one at a time, so an accept landing
    /// mid-snapshot can make `shares_accepted` momentarily exceed
    /// `shares_submitted`; that reads as zero rejections, never as an
    /// underflow.
    pub fn shares_rejected(&self) -> u64 {
        self.shares_submitted.saturating_sub(self.shares_accepted)
    }
}

/// Process-wide mining counters
///
/// One instance is created by the supervisor and shared with workers and
/// the submission protocol through `Arc` handles; all mutation is atomic
/// increment, no locks involved.
#[derive(Debug, Default)]
pub struct Metrics {
    hashes: AtomicU64,
    shares_submitted: AtomicU64,
    shares_accepted: AtomicU64,
    blocks_accepted: AtomicU64,
}

impl Metrics {
    /// Creates zeroed counters
    pub fn new() -> Self {
        Metrics::default()
    }

    /// Records completed hash attempts
    pub fn add_hashes(&self, n: u64) {
        self.hashes.fetch_add(n, Ordering::Relaxed);
    }

    /// Records a share handed to the submission protocol
    pub fn note_submitted(&self) {
        self.shares_submitted.fetch_add(1, Ordering::Relaxed);
    }

    /// Records an accepted share; `solo` also counts it as a block
    pub fn note_accepted(&self, solo: bool) {
        self.shares_accepted.fetch_add(1, Ordering::Relaxed);
        if solo {
            self.blocks_accepted.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Total hashes so far
    pub fn hashes(&self) -> u64 {
        self.hashes.load(Ordering::Relaxed)
    }

    /// A consistent-enough copy of all counters for display
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            hashes_total: self.hashes.load(Ordering::Relaxed),
            shares_submitted: self.shares_submitted.load(Ordering::Relaxed),
            shares_accepted: self.shares_accepted.load(Ordering::Relaxed),
            blocks_accepted: self.blocks_accepted.load(Ordering::Relaxed),
        }
    }
}

/// Periodically logs hashrate and share counters
///
/// Runs on its own thread; reports the rate since the previous report and
/// the average since mining started.
pub struct StatsReporter {
    metrics: Arc<Metrics>,
    run: Arc<AtomicBool>,
    report_interval: Duration,
    threads: usize,
}

impl StatsReporter {
    /// Creates a reporter over the shared counters
    ///
    /// # Arguments
    /// * `metrics` - Counters updated by workers and the submitter
    /// * `run` - Global keep-running flag; the reporter exits when cleared
    /// * `report_interval` - How often to log statistics
    /// * `threads` - Worker count, echoed in every report line
    pub fn new(
        metrics: Arc<Metrics>,
        run: Arc<AtomicBool>,
        report_interval: Duration,
        threads: usize,
    ) -> Self {
        StatsReporter {
            metrics,
            run,
            report_interval,
            threads,
        }
    }

    /// Spawns the reporting thread
    pub fn start(self) -> std::thread::JoinHandle<()> {
        std::thread::spawn(move || {
            let t_start = Instant::now();
            let mut t_last = t_start;
            let mut hashes_last = 0u64;

            while self.run.load(Ordering::Relaxed) {
                std::thread::sleep(self.report_interval);

                let snap = self.metrics.snapshot();
                if snap.hashes_total == 0 {
                    continue;
                }

                let now = Instant::now();
                let since_last = now.duration_since(t_last).as_secs_f64();
                let since_start = now.duration_since(t_start).as_secs_f64();
                let rate_last =
                    (snap.hashes_total - hashes_last) as f64 / since_last.max(f64::EPSILON);
                let rate_total = snap.hashes_total as f64 / since_start.max(f64::EPSILON);
                t_last = now;
                hashes_last = snap.hashes_total;

                log::info!(
                    "{:.1} H/s ({:.0}s) | {:.1} H/s (avg) | {} shares ({} rej, {} blocks) | {} threads",
                    rate_last,
                    since_last,
                    rate_total,
                    snap.shares_accepted,
                    snap.shares_rejected(),
                    snap.blocks_accepted,
                    self.threads
                );
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_accumulate() {
        let metrics = Metrics::new();
        metrics.add_hashes(10);
        metrics.add_hashes(5);
        metrics.note_submitted();
        metrics.note_accepted(false);
        metrics.note_submitted();
        metrics.note_accepted(true);

        let snap = metrics.snapshot();
        assert_eq!(snap.hashes_total, 15);
        assert_eq!(snap.shares_submitted, 2);
        assert_eq!(snap.shares_accepted, 2);
        assert_eq!(snap.blocks_accepted, 1);
        assert_eq!(snap.shares_rejected(), 0);
    }

    // An accept racing the snapshot loads can surface as more accepts
    // than submissions; the rejected count must clamp to zero.
    #[test]
    fn torn_snapshot_never_underflows_rejections() {
        let snap = MetricsSnapshot {
            hashes_total: 1,
            shares_submitted: 1,
            shares_accepted: 2,
            blocks_accepted: 0,
        };
        assert_eq!(snap.shares_rejected(), 0);
    }
}
