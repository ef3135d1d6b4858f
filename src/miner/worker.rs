// src/miner/worker.rs
//! Per-thread mining state machine
//!
//! Each worker loops over: re-read the shared work snapshot, decide how
//! to obtain the next nonce (fresh draw on work change or after a
//! rejection, plain increment otherwise), hash the seed through Argon2id
//! with its own scratch arena, compare the digest against the target as a
//! big integer, and hand any match to the submission protocol. Submission
//! outcomes come back over a per-worker channel, so the rejection signal
//! is explicit data flow rather than a flag mutated from a detached task.

use crate::miner::argon;
use crate::miner::scratch::ScratchArena;
use crate::miner::seed::{self, NonceSource, OsNonceSource, SEED_LEN};
use crate::miner::work::WorkStore;
use crate::network::submit::{Share, SubmitOutcome, SubmitSink};
use crate::stats::Metrics;
use crate::types::{DIGEST_LEN, HashVersion, RejectPolicy};
use crate::utils::error::MinerError;
use crossbeam_channel::{Receiver, Sender, bounded};
use num_bigint::BigUint;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// Sleep while the store holds no mineable work
const AWAIT_WORK_DELAY: Duration = Duration::from_millis(100);

/// Sleep while stalled waiting for a fresh fetch after a rejection
const STALL_DELAY: Duration = Duration::from_millis(50);

/// Head start given to a detached submission before hashing resumes
const SUBMIT_HEAD_START: Duration = Duration::from_millis(1);

/// In-flight submission outcomes pending delivery to one worker
const OUTCOME_QUEUE_DEPTH: usize = 8;

/// What a single state-machine step did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// No valid work, or the current work could not be seeded
    Idle,
    /// Stalled waiting for the poll loop to confirm a fresh fetch
    Stalled,
    /// Hashed one candidate; digest did not meet the target
    Hashed,
    /// Hashed one candidate and handed a share to the submitter
    Found,
}

/// One mining worker, owning all of its mutable hashing state
///
/// Nothing here is shared with other workers: seed buffer, scratch
/// arena, nonce and digest all live in the struct and are passed by
/// exclusive reference into the hash call, which keeps the hot loop
/// allocation-free and the state machine testable without threads.
pub struct Worker {
    id: usize,
    store: Arc<WorkStore>,
    metrics: Arc<Metrics>,
    run: Arc<AtomicBool>,
    sink: Arc<dyn SubmitSink>,
    policy: RejectPolicy,
    nonce_source: Box<dyn NonceSource>,
    scratch: ScratchArena,
    seed: [u8; SEED_LEN],
    digest: [u8; DIGEST_LEN],
    nonce: u64,
    last_work_hash: String,
    pending_reseed: bool,
    wait_until_fetch: Option<u64>,
    outcome_tx: Sender<SubmitOutcome>,
    outcome_rx: Receiver<SubmitOutcome>,
}

impl Worker {
    /// Creates a worker over the shared work store and submitter
    pub fn new(
        id: usize,
        store: Arc<WorkStore>,
        metrics: Arc<Metrics>,
        run: Arc<AtomicBool>,
        sink: Arc<dyn SubmitSink>,
        policy: RejectPolicy,
    ) -> Self {
        Self::with_nonce_source(id, store, metrics, run, sink, policy, Box::new(OsNonceSource))
    }

    /// Like [`Worker::new`] but with an injected nonce source
    pub fn with_nonce_source(
        id: usize,
        store: Arc<WorkStore>,
        metrics: Arc<Metrics>,
        run: Arc<AtomicBool>,
        sink: Arc<dyn SubmitSink>,
        policy: RejectPolicy,
        nonce_source: Box<dyn NonceSource>,
    ) -> Self {
        let (outcome_tx, outcome_rx) = bounded(OUTCOME_QUEUE_DEPTH);
        Worker {
            id,
            store,
            metrics,
            run,
            sink,
            policy,
            nonce_source,
            scratch: ScratchArena::new(),
            seed: [0u8; SEED_LEN],
            digest: [0u8; DIGEST_LEN],
            nonce: 0,
            last_work_hash: String::new(),
            pending_reseed: false,
            wait_until_fetch: None,
            outcome_tx,
            outcome_rx,
        }
    }

    /// The nonce that will be (or was) hashed this iteration
    pub fn current_nonce(&self) -> u64 {
        self.nonce
    }

    /// The seed buffer as last prepared for hashing
    pub fn seed(&self) -> &[u8; SEED_LEN] {
        &self.seed
    }

    /// Runs the state machine until the global run flag is cleared
    ///
    /// Fatal errors (hash capability failure, unsupported version) clear
    /// the flag themselves so the whole fleet shuts down.
    pub fn run(&mut self) {
        log::info!("MN{:02} worker started", self.id);
        while self.run.load(Ordering::Relaxed) {
            match self.step() {
                Ok(Step::Idle) => std::thread::sleep(AWAIT_WORK_DELAY),
                Ok(Step::Stalled) => std::thread::sleep(STALL_DELAY),
                Ok(Step::Hashed) => {}
                Ok(Step::Found) => {
                    if self.sink.detached() {
                        std::thread::sleep(SUBMIT_HEAD_START);
                    }
                }
                Err(e) if e.is_fatal() => {
                    log::error!("MN{:02} fatal error: {}, stopping all mining", self.id, e);
                    self.run.store(false, Ordering::SeqCst);
                }
                Err(e) => {
                    log::warn!("MN{:02} error: {}", self.id, e);
                }
            }
        }
        log::info!("MN{:02} worker stopped", self.id);
    }

    /// One iteration of the state machine
    ///
    /// Exposed so tests can drive the worker synchronously.
    pub fn step(&mut self) -> Result<Step, MinerError> {
        let work = self.store.current();
        if !work.is_valid() {
            return Ok(Step::Idle);
        }

        self.drain_outcomes();

        if work.work_hash != self.last_work_hash {
            // new work: fresh random nonce and a full seed rebuild
            let nonce = self.nonce_source.next_nonce();
            match seed::make_seed(&work.work_hash, nonce) {
                Ok(new_seed) => {
                    self.nonce = nonce;
                    self.seed = new_seed;
                    self.last_work_hash = work.work_hash.clone();
                    self.pending_reseed = false;
                    self.wait_until_fetch = None;
                }
                Err(e) => {
                    // recoverable: skip this attempt, keep mining
                    log::warn!("MN{:02} bad work hash {}: {}", self.id, work.work_hash, e);
                    return Ok(Step::Idle);
                }
            }
        } else {
            if let Some(baseline) = self.wait_until_fetch {
                if self.store.fetch_count() <= baseline {
                    return Ok(Step::Stalled);
                }
                self.wait_until_fetch = None;
            }
            if self.pending_reseed {
                // last submission was rejected: discard the in-flight
                // nonce, work hash stays the same
                self.nonce = self.nonce_source.next_nonce();
                self.pending_reseed = false;
            } else {
                self.nonce = self.nonce.wrapping_add(1);
            }
            seed::update_seed(&mut self.seed, self.nonce);
        }

        let version = HashVersion::try_from(work.version)?;
        argon::hash_seed(&self.seed, version, &mut self.scratch, &mut self.digest)?;
        self.metrics.add_hashes(1);

        let digest_int = BigUint::from_bytes_be(&self.digest);
        if digest_int < work.target {
            self.sink.submit(
                Share {
                    nonce: self.nonce,
                    work_hash: work.work_hash.clone(),
                },
                self.outcome_tx.clone(),
            );
            return Ok(Step::Found);
        }
        Ok(Step::Hashed)
    }

    /// Applies any submission verdicts delivered since the last step
    ///
    /// A rejection marks the current nonce for regeneration; under the
    /// wait-fresh policy it additionally records the fetch count so the
    /// worker stalls until the poll loop has fetched at least once more.
    fn drain_outcomes(&mut self) {
        while let Ok(outcome) = self.outcome_rx.try_recv() {
            if !outcome.accepted {
                self.pending_reseed = true;
                if self.policy == RejectPolicy::WaitFresh {
                    self.wait_until_fetch = Some(self.store.fetch_count());
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::miner::seed::NONCE_OFFSET;
    use crate::miner::work::{WorkParams, difficulty_from_target, max_target};
    use crate::network::submit::testing::ScriptedSink;
    use num_traits::One;

    const WORK_HASH_A: &str =
        "0xd3b5f1b47f52fdc72b1dab0b02ab352442487a1d3a43211bc4f0eb5f092403fc";
    const WORK_HASH_B: &str =
        "0x00112233445566778899aabbccddeeff00112233445566778899aabbccddeeff";

    /// Deterministic nonce source: pops scripted values, then counts up
    /// from a recognizable base so draws are distinguishable from
    /// increments.
    struct SeqNonceSource {
        scripted: Vec<u64>,
        fallback: u64,
    }

    impl SeqNonceSource {
        fn new(scripted: Vec<u64>) -> Self {
            SeqNonceSource {
                scripted,
                fallback: 0xdead_0000_0000_0000,
            }
        }
    }

    impl NonceSource for SeqNonceSource {
        fn next_nonce(&mut self) -> u64 {
            if self.scripted.is_empty() {
                self.fallback += 0x100;
                self.fallback
            } else {
                self.scripted.remove(0)
            }
        }
    }

    fn work_with_target(hash: &str, target: BigUint) -> WorkParams {
        WorkParams {
            version: 2,
            work_hash: hash.to_string(),
            difficulty: difficulty_from_target(&target),
            target,
        }
    }

    struct Fixture {
        store: Arc<WorkStore>,
        metrics: Arc<Metrics>,
        sink: Arc<ScriptedSink>,
        worker: Worker,
    }

    fn fixture(policy: RejectPolicy, verdicts: Vec<bool>, nonces: Vec<u64>) -> Fixture {
        let store = Arc::new(WorkStore::new());
        let metrics = Arc::new(Metrics::new());
        let sink = Arc::new(ScriptedSink::new(metrics.clone(), false, verdicts));
        let run = Arc::new(AtomicBool::new(true));
        let worker = Worker::with_nonce_source(
            0,
            store.clone(),
            metrics.clone(),
            run,
            sink.clone(),
            policy,
            Box::new(SeqNonceSource::new(nonces)),
        );
        Fixture {
            store,
            metrics,
            sink,
            worker,
        }
    }

    #[test]
    fn idles_without_work() {
        let mut f = fixture(RejectPolicy::Reseed, vec![], vec![]);
        assert_eq!(f.worker.step().unwrap(), Step::Idle);
        assert_eq!(f.metrics.snapshot().hashes_total, 0);
    }

    #[test]
    fn accepted_share_submits_once_and_counts() {
        let mut f = fixture(RejectPolicy::Reseed, vec![true], vec![42]);
        // everything is below 2^256, so the first hash wins
        f.store.publish(work_with_target(WORK_HASH_A, max_target()));

        assert_eq!(f.worker.step().unwrap(), Step::Found);
        let submitted = f.sink.submitted.lock().unwrap();
        assert_eq!(submitted.len(), 1);
        assert_eq!(submitted[0].nonce, 42);
        assert_eq!(submitted[0].work_hash, WORK_HASH_A);

        let snap = f.metrics.snapshot();
        assert_eq!(snap.shares_submitted, 1);
        assert_eq!(snap.shares_accepted, 1);
        assert_eq!(snap.hashes_total, 1);
        drop(submitted);

        // acceptance does not reseed: the next attempt is a plain increment
        assert_eq!(f.worker.step().unwrap(), Step::Found);
        assert_eq!(f.worker.current_nonce(), 43);
    }

    #[test]
    fn rejected_share_triggers_fresh_nonce() {
        let mut f = fixture(RejectPolicy::Reseed, vec![false], vec![42, 777]);
        f.store.publish(work_with_target(WORK_HASH_A, max_target()));

        assert_eq!(f.worker.step().unwrap(), Step::Found);
        let snap = f.metrics.snapshot();
        assert_eq!(snap.shares_submitted, 1);
        assert_eq!(snap.shares_accepted, 0);

        // next iteration must draw from the source, not increment 42
        assert_eq!(f.worker.step().unwrap(), Step::Found);
        assert_eq!(f.worker.current_nonce(), 777);
    }

    #[test]
    fn wait_fresh_policy_stalls_until_fetch_advances() {
        let mut f = fixture(RejectPolicy::WaitFresh, vec![false], vec![42, 777]);
        f.store.publish(work_with_target(WORK_HASH_A, max_target()));
        f.store.note_fetch();

        assert_eq!(f.worker.step().unwrap(), Step::Found);
        // rejection delivered; no fresh fetch yet
        assert_eq!(f.worker.step().unwrap(), Step::Stalled);
        assert_eq!(f.worker.step().unwrap(), Step::Stalled);

        f.store.note_fetch();
        assert_eq!(f.worker.step().unwrap(), Step::Found);
        assert_eq!(f.worker.current_nonce(), 777);
    }

    #[test]
    fn work_change_rebuilds_seed() {
        let mut f = fixture(RejectPolicy::Reseed, vec![], vec![1, 2]);
        f.store
            .publish(work_with_target(WORK_HASH_A, BigUint::one()));
        assert_eq!(f.worker.step().unwrap(), Step::Hashed);
        let prefix_a = hex::decode(&WORK_HASH_A[2..]).unwrap();
        assert_eq!(&f.worker.seed()[..NONCE_OFFSET], prefix_a.as_slice());
        assert_eq!(f.worker.current_nonce(), 1);

        f.store
            .publish(work_with_target(WORK_HASH_B, BigUint::one()));
        assert_eq!(f.worker.step().unwrap(), Step::Hashed);
        let prefix_b = hex::decode(&WORK_HASH_B[2..]).unwrap();
        assert_eq!(&f.worker.seed()[..NONCE_OFFSET], prefix_b.as_slice());
        // fresh draw on work change, not an increment of 1
        assert_eq!(f.worker.current_nonce(), 2);
    }

    #[test]
    fn digest_equal_to_target_is_not_a_match() {
        // hash once against an impossible target to learn the digest for
        // a fixed (work, nonce) pair
        let mut probe = fixture(RejectPolicy::Reseed, vec![], vec![42]);
        probe
            .store
            .publish(work_with_target(WORK_HASH_A, BigUint::one()));
        assert_eq!(probe.worker.step().unwrap(), Step::Hashed);
        let digest_int = BigUint::from_bytes_be(&probe.worker.digest);

        // target exactly equal to the digest: strict inequality, no match
        let mut equal = fixture(RejectPolicy::Reseed, vec![], vec![42]);
        equal
            .store
            .publish(work_with_target(WORK_HASH_A, digest_int.clone()));
        assert_eq!(equal.worker.step().unwrap(), Step::Hashed);
        assert!(equal.sink.submitted.lock().unwrap().is_empty());

        // one above the digest: match
        let mut above = fixture(RejectPolicy::Reseed, vec![true], vec![42]);
        above
            .store
            .publish(work_with_target(WORK_HASH_A, digest_int + 1u8));
        assert_eq!(above.worker.step().unwrap(), Step::Found);
    }

    #[test]
    fn unsupported_version_is_fatal() {
        let mut f = fixture(RejectPolicy::Reseed, vec![], vec![1]);
        let mut work = work_with_target(WORK_HASH_A, max_target());
        work.version = 1;
        f.store.publish(work);

        match f.worker.step() {
            Err(e) => assert!(e.is_fatal()),
            Ok(step) => panic!("expected fatal error, got {:?}", step),
        }
    }

    #[test]
    fn malformed_work_hash_skips_attempt() {
        let mut f = fixture(RejectPolicy::Reseed, vec![], vec![1]);
        f.store
            .publish(work_with_target("0xdeadbeef", max_target()));
        assert_eq!(f.worker.step().unwrap(), Step::Idle);
        assert_eq!(f.metrics.snapshot().hashes_total, 0);
    }
}
