// src/miner/scheduler.rs
//! Worker fleet management
//!
//! Spawns one OS thread per mining worker, shares the work store,
//! counters and the global run flag with each of them, and joins the
//! fleet on shutdown. Hashing is CPU-bound, so real threads rather than
//! cooperative tasks.

use crate::miner::worker::Worker;
use crate::miner::work::WorkStore;
use crate::network::submit::SubmitSink;
use crate::stats::Metrics;
use crate::types::RejectPolicy;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;

/// Supervises the mining worker threads
pub struct Scheduler {
    store: Arc<WorkStore>,
    metrics: Arc<Metrics>,
    run: Arc<AtomicBool>,
    policy: RejectPolicy,
    handles: Vec<JoinHandle<()>>,
}

impl Scheduler {
    /// Creates a scheduler over the shared store, counters and run flag
    pub fn new(
        store: Arc<WorkStore>,
        metrics: Arc<Metrics>,
        run: Arc<AtomicBool>,
        policy: RejectPolicy,
    ) -> Self {
        Scheduler {
            store,
            metrics,
            run,
            policy,
            handles: Vec::new(),
        }
    }

    /// Spawns `threads` mining workers submitting through `sink`
    pub fn start(&mut self, threads: usize, sink: Arc<dyn SubmitSink>) {
        log::info!("Starting {} miner thread(s)", threads);
        for id in 0..threads {
            let mut worker = Worker::new(
                id,
                self.store.clone(),
                self.metrics.clone(),
                self.run.clone(),
                sink.clone(),
                self.policy,
            );
            self.handles
                .push(std::thread::spawn(move || worker.run()));
        }
    }

    /// Clears the run flag and joins every worker
    ///
    /// No worker is preempted mid-hash; each observes the flag at its
    /// next iteration boundary. Scratch arenas are dropped with their
    /// workers.
    pub fn stop(&mut self) {
        self.run.store(false, Ordering::SeqCst);
        for handle in self.handles.drain(..) {
            let _ = handle.join();
        }
        log::info!("All miner threads stopped");
    }

    /// Whether the fleet is still supposed to run
    pub fn running(&self) -> bool {
        self.run.load(Ordering::Relaxed)
    }
}
