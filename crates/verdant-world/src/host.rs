//! Capabilities consumed from the host simulation.
//!
//! The host owns world storage, the biome catalog, and observer connections.
//! These traits are the whole surface the repaint pipeline relies on. They
//! take `&self` and require `Send + Sync` because observer sync reads host
//! state from a background worker; implementations serialize internally.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use thiserror::Error;

use crate::biome::{BiomeDescriptor, BiomeEntry, BiomeId};
use crate::coords::{ChunkPos, GridCoord, HeightRange, WorldId};

/// Connected client identifier, assigned by the host.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObserverId(pub u64);

/// Errors reported by host capabilities.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum HostError {
    /// A catalog mutation was attempted outside an unlock window.
    #[error("biome catalog is frozen")]
    CatalogFrozen,
    /// The host does not expose the requested capability.
    #[error("host does not support {0}")]
    Unsupported(&'static str),
    /// The observer disconnected before the send.
    #[error("observer {0:?} is not connected")]
    ObserverGone(ObserverId),
}

/// Client-visible state of one chunk column: biome cells plus lighting.
///
/// Built fresh from live storage for every broadcast so that observers
/// which already rendered the column can replace it in place.
#[derive(Clone, Debug, PartialEq)]
pub struct ChunkSnapshot {
    pub world: WorldId,
    pub chunk: ChunkPos,
    /// Bottom of the column in voxels.
    pub min_y: i32,
    /// Raw biome ids, one per cell, in the host's cell order.
    pub biomes: Vec<u32>,
    /// Sky light level per 16-voxel section.
    pub sky_light: Vec<u8>,
    /// Column mutation counter at snapshot time.
    pub version: u64,
    /// Present only on packet layouts that carry the edge-trust flag.
    pub trust_edges: Option<bool>,
}

/// One raw boolean slot of the catalog's internal state.
///
/// Hosts that cannot toggle catalog write protection directly expose their
/// internal flags instead; the compatibility shim sets every slot at once.
#[derive(Clone, Debug)]
pub struct InternalFlag {
    name: &'static str,
    slot: Arc<AtomicBool>,
}

impl InternalFlag {
    /// Wraps a shared boolean slot.
    pub fn new(name: &'static str, slot: Arc<AtomicBool>) -> Self {
        Self { name, slot }
    }

    /// Field name, for diagnostics.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Overwrites the slot.
    pub fn set(&self, value: bool) {
        self.slot.store(value, Ordering::SeqCst);
    }

    /// Reads the slot.
    pub fn get(&self) -> bool {
        self.slot.load(Ordering::SeqCst)
    }
}

/// World storage: residency, biome grid access, and column snapshots.
pub trait HostWorld: Send + Sync {
    /// Free-form version banner, e.g. `"git-Paper-196 (MC: 1.20.4)"`.
    fn version_banner(&self) -> String;

    /// Returns `true` if the column is resident in memory.
    fn is_column_loaded(&self, world: &WorldId, chunk: ChunkPos) -> bool;

    /// Vertical build limits of `world`, or `None` if no such world exists.
    fn build_height(&self, world: &WorldId) -> Option<HeightRange>;

    /// Writes one biome grid cell. Returns `false` if the owning column is
    /// not resident or the cell lies outside the build height.
    fn write_biome_cell(&self, world: &WorldId, cell: GridCoord, biome: &BiomeEntry) -> bool;

    /// Raw biome id stored in a cell, if its column is resident.
    fn biome_cell(&self, world: &WorldId, cell: GridCoord) -> Option<u32>;

    /// Builds a snapshot of a resident column, `None` if it is not resident.
    fn chunk_snapshot(&self, world: &WorldId, chunk: ChunkPos) -> Option<ChunkSnapshot>;
}

/// The global biome catalog.
pub trait HostCatalog: Send + Sync {
    /// Looks up a biome. Valid whether or not the catalog is frozen.
    fn resolve_biome(&self, id: &BiomeId) -> Option<BiomeEntry>;

    /// Registers `id`, or replaces the descriptor of an existing entry while
    /// keeping its raw id.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::CatalogFrozen`] outside an unlock window.
    fn register_biome(
        &self,
        id: BiomeId,
        descriptor: BiomeDescriptor,
    ) -> Result<BiomeEntry, HostError>;

    /// Returns `true` while the catalog rejects mutation.
    fn is_catalog_frozen(&self) -> bool;

    /// Re-freezes the catalog.
    fn freeze_catalog(&self);

    /// Toggles write protection directly.
    ///
    /// # Errors
    ///
    /// The default returns [`HostError::Unsupported`]; hosts that only offer
    /// [`catalog_internal_flags`](Self::catalog_internal_flags) keep it.
    fn set_catalog_frozen(&self, _frozen: bool) -> Result<(), HostError> {
        Err(HostError::Unsupported("direct catalog lock toggle"))
    }

    /// Raw boolean slots of the catalog's internal state. Empty by default.
    fn catalog_internal_flags(&self) -> Vec<InternalFlag> {
        Vec::new()
    }
}

/// Observer queries and packet delivery.
pub trait HostNetwork: Send + Sync {
    /// Observers whose view distance covers `chunk`.
    fn observers_near(&self, world: &WorldId, chunk: ChunkPos) -> Vec<ObserverId>;

    /// Delivers a prebuilt snapshot to one observer.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::ObserverGone`] if the observer disconnected.
    fn send_snapshot(&self, observer: ObserverId, snapshot: &ChunkSnapshot)
    -> Result<(), HostError>;
}

/// Everything the repaint pipeline needs from one host.
pub trait Host: HostWorld + HostCatalog + HostNetwork {}

impl<T: HostWorld + HostCatalog + HostNetwork> Host for T {}
