//! Observer synchronization: pushes rebuilt chunk snapshots to observers
//! after a repaint, off the simulation thread.

pub mod broadcaster;

pub use broadcaster::{ObserverSyncBroadcaster, SyncConfig, WORKER_NAME};
