// src/network/submit.rs
//! Submission protocol
//!
//! Serializes outbound submissions to one destination through a single
//! client + mutex pair, interprets the accept/reject verdict, updates the
//! shared counters, and reports the outcome back to the worker that found
//! the share so its state machine can reseed after a rejection.

use crate::network::client::CoordinatorClient;
use crate::stats::Metrics;
use crossbeam_channel::Sender;
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::Mutex;

/// A digest found below the current target, ready for submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Share {
    /// Nonce that produced the winning digest
    pub nonce: u64,
    /// Hex work hash the nonce was mined against
    pub work_hash: String,
}

/// Verdict of one submission, delivered to the owning worker
#[derive(Debug, Clone)]
pub struct SubmitOutcome {
    /// Whether the coordinator accepted the share
    pub accepted: bool,
    /// Raw response body, for the rejection log line
    pub raw_response: String,
}

/// Seam between the worker state machine and the wire
///
/// Production uses [`RpcSubmitter`]; tests substitute a mock that records
/// shares and feeds back scripted outcomes.
pub trait SubmitSink: Send + Sync {
    /// Hands a share to the submission protocol
    ///
    /// The outcome is delivered through `outcome_tx`, possibly after this
    /// call returns when the submission runs detached. Delivery is
    /// best-effort: implementations must never block on a full queue.
    fn submit(&self, share: Share, outcome_tx: Sender<SubmitOutcome>);

    /// Whether submissions run on a detached task
    ///
    /// Detached (pool-mode) submissions warrant a short post-submit sleep
    /// in the worker so the request reaches the wire before hashing
    /// saturates the CPU again.
    fn detached(&self) -> bool;
}

/// JSON-RPC submitter for one coordinator destination
///
/// Solo mode submits synchronously, blocking the worker for the round
/// trip: solo submissions are rare and not missing a found block
/// outweighs throughput. Pool mode spawns a detached task so hashing
/// resumes immediately. Either way, all submissions to this destination
/// are serialized through one mutex so they are never issued in parallel
/// over the shared connection.
pub struct RpcSubmitter {
    client: Arc<CoordinatorClient>,
    runtime: Handle,
    metrics: Arc<Metrics>,
    solo: bool,
    wire: Arc<Mutex<()>>,
}

impl RpcSubmitter {
    /// Creates a submitter for the given destination
    pub fn new(
        client: Arc<CoordinatorClient>,
        runtime: Handle,
        metrics: Arc<Metrics>,
        solo: bool,
    ) -> Self {
        RpcSubmitter {
            client,
            runtime,
            metrics,
            solo,
            wire: Arc::new(Mutex::new(())),
        }
    }

    async fn submit_inner(
        client: Arc<CoordinatorClient>,
        metrics: Arc<Metrics>,
        wire: Arc<Mutex<()>>,
        solo: bool,
        share: Share,
        outcome_tx: Sender<SubmitOutcome>,
    ) {
        let verdict = {
            let _guard = wire.lock().await;
            client.submit_work(share.nonce, &share.work_hash).await
        };
        metrics.note_submitted();

        let outcome = match verdict {
            Ok((true, raw_response)) => {
                metrics.note_accepted(solo);
                log::info!(
                    "{} (nonce = 0x{:016x})",
                    if solo { "Found block !" } else { "Found share !" },
                    share.nonce
                );
                SubmitOutcome {
                    accepted: true,
                    raw_response,
                }
            }
            Ok((false, raw_response)) => {
                log::warn!(
                    "Rejected {} (nonce = 0x{:016x}), server response: {}",
                    if solo { "block" } else { "share" },
                    share.nonce,
                    raw_response
                );
                SubmitOutcome {
                    accepted: false,
                    raw_response,
                }
            }
            Err(e) => {
                // no response at all: treated as a rejection, and the
                // nonce is abandoned rather than double-submitted
                log::warn!(
                    "Submit transport failure (nonce = 0x{:016x}): {}",
                    share.nonce,
                    e
                );
                SubmitOutcome {
                    accepted: false,
                    raw_response: e.to_string(),
                }
            }
        };

        // the worker may already have moved on (receiver dropped) or be
        // stalled with a full queue; either way the verdict is dropped
        // rather than blocking a runtime thread on a bounded channel
        let _ = outcome_tx.try_send(outcome);
    }
}

impl SubmitSink for RpcSubmitter {
    fn submit(&self, share: Share, outcome_tx: Sender<SubmitOutcome>) {
        let fut = Self::submit_inner(
            self.client.clone(),
            self.metrics.clone(),
            self.wire.clone(),
            self.solo,
            share,
            outcome_tx,
        );
        if self.solo {
            self.runtime.block_on(fut);
        } else {
            self.runtime.spawn(fut);
        }
    }

    fn detached(&self) -> bool {
        !self.solo
    }
}
