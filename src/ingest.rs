//! Parallel ingestion of ordered event streams.
//!
//! Events are routed to worker threads by feature id, so every id has a
//! single writer and its events keep their stream order, while unrelated
//! ids are applied in parallel.
//!
//! # Example
//!
//! ```ignore
//! let store = FeatureStore::default();
//! let report = ingest(&store, events, &IngestConfig::default());
//! for rejected in &report.rejected {
//!     eprintln!("{} v{}: {}", rejected.id, rejected.version, rejected.error);
//! }
//! ```

use crate::error::StoreError;
use crate::events::Event;
use crate::store::FeatureStore;
use crate::types::{FeatureId, Version};
use crossbeam_channel::bounded;
use std::thread;
use tracing::{info, warn};

/// Ingestion configuration.
#[derive(Clone, Debug)]
pub struct IngestConfig {
    /// Number of worker threads (at least 1).
    pub workers: usize,

    /// Per-worker queue depth.
    pub queue_depth: usize,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            workers: thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4),
            queue_depth: 1024,
        }
    }
}

/// An event the store refused.
#[derive(Clone, Debug)]
pub struct RejectedEvent {
    pub id: FeatureId,
    pub version: Version,
    pub error: StoreError,
}

/// Outcome of an ingestion run.
#[derive(Clone, Debug, Default)]
pub struct IngestReport {
    pub applied: u64,
    /// Sorted by feature id, then stream order.
    pub rejected: Vec<RejectedEvent>,
}

impl IngestReport {
    pub fn is_clean(&self) -> bool {
        self.rejected.is_empty()
    }
}

/// Apply `events` to `store` using `config.workers` threads.
///
/// A rejected event is recorded in the report and ingestion moves on to the
/// next event; whether to retry, skip or abort is left to the caller.
pub fn ingest<I>(store: &FeatureStore, events: I, config: &IngestConfig) -> IngestReport
where
    I: IntoIterator<Item = Event>,
{
    let workers = config.workers.max(1);
    let depth = config.queue_depth.max(1);

    let mut report = thread::scope(|scope| {
        let mut senders = Vec::with_capacity(workers);
        let mut handles = Vec::with_capacity(workers);

        for _ in 0..workers {
            let (tx, rx) = bounded::<Event>(depth);
            senders.push(tx);
            handles.push(scope.spawn(move || {
                let mut local = IngestReport::default();
                for event in rx {
                    let (id, version) = (event.id(), event.version());
                    match store.apply(event) {
                        Ok(_) => local.applied += 1,
                        Err(error) => {
                            warn!(feature = %id, version = %version, error = %error, "event rejected");
                            local.rejected.push(RejectedEvent { id, version, error });
                        }
                    }
                }
                local
            }));
        }

        for event in events {
            let slot = event.id().0.rem_euclid(workers as i64) as usize;
            if senders[slot].send(event).is_err() {
                // The worker is gone; nothing more will be applied on this slot.
                break;
            }
        }
        drop(senders);

        let mut merged = IngestReport::default();
        for handle in handles {
            match handle.join() {
                Ok(local) => {
                    merged.applied += local.applied;
                    merged.rejected.extend(local.rejected);
                }
                Err(panic) => std::panic::resume_unwind(panic),
            }
        }
        merged
    });

    // stable sort keeps per-id stream order
    report.rejected.sort_by_key(|r| r.id);

    info!(
        applied = report.applied,
        rejected = report.rejected.len(),
        workers,
        "ingestion finished"
    );
    report
}

impl FeatureStore {
    /// Apply a stream of events in parallel. See [`ingest`].
    pub fn ingest<I>(&self, events: I, config: &IngestConfig) -> IngestReport
    where
        I: IntoIterator<Item = Event>,
    {
        ingest(self, events, config)
    }
}
