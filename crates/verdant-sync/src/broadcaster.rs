//! Background re-sync of repainted chunk columns to observers.
//!
//! Painting happens on the simulation thread; building packets and fanning
//! them out must not. [`ObserverSyncBroadcaster`] owns one worker thread fed
//! by a bounded channel. Requests are fire-and-forget: the caller gets no
//! completion signal and no ordering relative to later paints.
//!
//! A column that is already waiting in the queue is not queued twice. The
//! worker rebuilds the snapshot from live storage when it dequeues the job,
//! so the pending entry already carries every write made before that point.
//! When the queue is full, new columns are dropped and counted.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use crossbeam_channel::{Sender, TrySendError, bounded};
use dashmap::DashSet;
use verdant_adapter::VersionAdapter;
use verdant_world::{ChunkPos, Host, WorldId};

/// Name given to the worker thread.
pub const WORKER_NAME: &str = "biome-sync-worker";

/// Queue sizing for [`ObserverSyncBroadcaster`].
#[derive(Clone, Debug)]
pub struct SyncConfig {
    /// Maximum distinct columns waiting for the worker. Default: 1024.
    pub queue_capacity: usize,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            queue_capacity: 1024,
        }
    }
}

/// One column to re-sync.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct SyncJob {
    world: WorldId,
    chunk: ChunkPos,
}

/// Counters shared with the worker.
#[derive(Debug, Default)]
struct SyncStats {
    /// Snapshots delivered, summed over observers.
    sent: AtomicU64,
    /// Jobs whose column was gone by the time the worker reached it.
    skipped: AtomicU64,
    /// Requests rejected because the queue was full.
    dropped: AtomicU64,
    /// Requests folded into an already-pending job.
    merged: AtomicU64,
    /// Jobs accepted and not yet finished.
    in_flight: AtomicUsize,
}

/// Fire-and-forget chunk re-sync with a bounded, deduplicated queue.
pub struct ObserverSyncBroadcaster {
    sender: Option<Sender<SyncJob>>,
    pending: Arc<DashSet<SyncJob>>,
    stats: Arc<SyncStats>,
    worker: Option<JoinHandle<()>>,
}

impl ObserverSyncBroadcaster {
    /// Starts the worker thread.
    pub fn spawn(
        host: Arc<dyn Host>,
        adapter: Arc<dyn VersionAdapter>,
        config: SyncConfig,
    ) -> Self {
        let (sender, receiver) = bounded::<SyncJob>(config.queue_capacity.max(1));
        let pending = Arc::new(DashSet::new());
        let stats = Arc::new(SyncStats::default());

        let worker = {
            let pending = Arc::clone(&pending);
            let stats = Arc::clone(&stats);
            std::thread::Builder::new()
                .name(WORKER_NAME.into())
                .spawn(move || {
                    while let Ok(job) = receiver.recv() {
                        // Unmark before reading so later paints queue a fresh job.
                        pending.remove(&job);

                        match adapter.sync_chunk(&*host, &job.world, job.chunk) {
                            Some(delivered) => {
                                tracing::trace!(
                                    "Synced {} {} to {} observers",
                                    job.world,
                                    job.chunk,
                                    delivered
                                );
                                stats.sent.fetch_add(delivered as u64, Ordering::Relaxed);
                            }
                            None => {
                                tracing::debug!(
                                    "Skipped sync of {} {}: column no longer resident",
                                    job.world,
                                    job.chunk
                                );
                                stats.skipped.fetch_add(1, Ordering::Relaxed);
                            }
                        }

                        stats.in_flight.fetch_sub(1, Ordering::AcqRel);
                    }
                })
                .expect("Failed to spawn biome sync worker thread")
        };

        Self {
            sender: Some(sender),
            pending,
            stats,
            worker: Some(worker),
        }
    }

    /// Queues every column in `chunks` of `world` for re-sync. Never blocks.
    pub fn broadcast(&self, world: &WorldId, chunks: impl IntoIterator<Item = ChunkPos>) {
        let Some(sender) = &self.sender else {
            return;
        };
        for chunk in chunks {
            let job = SyncJob {
                world: world.clone(),
                chunk,
            };
            if !self.pending.insert(job.clone()) {
                self.stats.merged.fetch_add(1, Ordering::Relaxed);
                continue;
            }
            self.stats.in_flight.fetch_add(1, Ordering::AcqRel);
            if let Err(e) = sender.try_send(job) {
                let (job, reason) = match e {
                    TrySendError::Full(job) => (job, "queue full"),
                    TrySendError::Disconnected(job) => (job, "worker stopped"),
                };
                self.pending.remove(&job);
                self.stats.in_flight.fetch_sub(1, Ordering::AcqRel);
                self.stats.dropped.fetch_add(1, Ordering::Relaxed);
                tracing::warn!("Dropped sync of {} {}: {}", job.world, job.chunk, reason);
            }
        }
    }

    /// Blocks until every accepted job has been processed or `timeout`
    /// elapses. Returns `true` if the queue drained.
    pub fn flush(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        while self.stats.in_flight.load(Ordering::Acquire) > 0 {
            if Instant::now() >= deadline {
                return false;
            }
            std::thread::sleep(Duration::from_millis(1));
        }
        true
    }

    /// Columns currently waiting for the worker.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Snapshots delivered so far, summed over observers.
    pub fn sent(&self) -> u64 {
        self.stats.sent.load(Ordering::Relaxed)
    }

    /// Jobs skipped because their column was no longer resident.
    pub fn skipped(&self) -> u64 {
        self.stats.skipped.load(Ordering::Relaxed)
    }

    /// Requests rejected because the queue was full.
    pub fn dropped(&self) -> u64 {
        self.stats.dropped.load(Ordering::Relaxed)
    }

    /// Requests folded into an already-pending job.
    pub fn merged(&self) -> u64 {
        self.stats.merged.load(Ordering::Relaxed)
    }
}

impl Drop for ObserverSyncBroadcaster {
    fn drop(&mut self) {
        // Closing the channel lets the worker finish the backlog and exit.
        self.sender.take();
        if let Some(worker) = self.worker.take()
            && worker.join().is_err()
        {
            tracing::error!("Biome sync worker panicked");
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
