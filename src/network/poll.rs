// src/network/poll.rs
//! Poll loop
//!
//! Periodically fetches work from the coordinator and publishes it into
//! the shared [`WorkStore`]. A failed poll keeps the stale snapshot in
//! effect (workers mine old work rather than stalling) unless the store
//! was never populated, in which case workers sit idle awaiting work.

use crate::miner::work::WorkStore;
use crate::network::client::CoordinatorClient;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::runtime::Handle;

/// Fetch block metadata for status logging once every this many polls
const BLOCK_INFO_EVERY_N_POLLS: u32 = 6;

/// Periodic work fetcher feeding the shared work store
pub struct PollLoop {
    client: Arc<CoordinatorClient>,
    store: Arc<WorkStore>,
    run: Arc<AtomicBool>,
    runtime: Handle,
    interval: Duration,
}

impl PollLoop {
    /// Creates a poll loop over the given coordinator and store
    pub fn new(
        client: Arc<CoordinatorClient>,
        store: Arc<WorkStore>,
        run: Arc<AtomicBool>,
        runtime: Handle,
        interval: Duration,
    ) -> Self {
        PollLoop {
            client,
            store,
            run,
            runtime,
            interval,
        }
    }

    /// Spawns the poll thread
    pub fn start(self) -> std::thread::JoinHandle<()> {
        std::thread::spawn(move || self.run_loop())
    }

    fn run_loop(&self) {
        log::info!("Poll thread launched, interval {:?}", self.interval);
        let mut polls: u32 = 0;

        while self.run.load(Ordering::Relaxed) {
            self.poll_once();

            polls = polls.wrapping_add(1);
            if polls % BLOCK_INFO_EVERY_N_POLLS == 1 {
                self.log_block_info();
            }

            std::thread::sleep(self.interval);
        }
    }

    /// One get-work round trip; failures are absorbed here as log lines
    fn poll_once(&self) {
        match self.runtime.block_on(self.client.get_work()) {
            Ok(work) => {
                self.store.note_fetch();
                let difficulty = work.difficulty.to_str_radix(10);
                let version = work.version;
                if self.store.publish(work) {
                    log::info!("New work published: difficulty {} ({})", difficulty, version);
                }
            }
            Err(e) if e.is_transport() => {
                log::warn!(
                    "{} is not responding ({}), retrying in {:.1}s",
                    self.client.url(),
                    e,
                    self.interval.as_secs_f32()
                );
            }
            Err(e) => {
                // the coordinator answered, but with something unusable
                log::warn!(
                    "{} sent an unusable work response ({}), retrying in {:.1}s",
                    self.client.url(),
                    e,
                    self.interval.as_secs_f32()
                );
            }
        }
    }

    /// Pure side observer: latest block metadata for the status log
    fn log_block_info(&self) {
        match self.runtime.block_on(self.client.block_info("latest")) {
            Ok(info) => {
                log::info!(
                    "Latest block: height {} | difficulty {} | miner {} | nonce {} | version {}",
                    info.number,
                    info.difficulty,
                    info.miner,
                    info.nonce,
                    info.version
                );
            }
            Err(e) => {
                log::debug!("Block info fetch failed: {}", e);
            }
        }
    }
}
