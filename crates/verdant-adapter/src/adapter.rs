//! The capability set every revision adapter implements, plus the pieces
//! shared between families.

use std::fmt;

use verdant_world::{
    BiomeEntry, BiomeId, ChunkPos, ChunkSnapshot, Host, HostCatalog, HostError, HostNetwork,
    HostWorld, VoxelCoord, WorldId,
};

use crate::revision::Revision;

/// Revision-specific implementation of the biome mutation primitives.
///
/// Business logic talks to this trait only and never branches on versions.
/// Painting calls must come from the simulation thread; `sync_chunk` is
/// designed to run on a background worker.
pub trait VersionAdapter: Send + Sync + fmt::Debug {
    /// The revision this adapter was built for.
    fn revision(&self) -> Revision;

    /// Writes `biome` into the grid cell containing `voxel`.
    ///
    /// Returns `false` without touching anything when the owning column is
    /// not resident or the cell lies outside the build height.
    fn set_voxel_biome(
        &self,
        host: &dyn Host,
        world: &WorldId,
        voxel: VoxelCoord,
        biome: &BiomeEntry,
    ) -> bool;

    /// Sets catalog write protection (`false` opens a mutation window).
    ///
    /// # Errors
    ///
    /// Propagates the host's refusal, e.g. [`HostError::Unsupported`].
    fn lock_catalog(&self, host: &dyn Host, locked: bool) -> Result<(), HostError>;

    /// Ends a mutation window.
    fn freeze_catalog(&self, host: &dyn Host) {
        host.freeze_catalog();
    }

    /// Resolves an identifier against the live catalog.
    fn resolve_catalog(&self, host: &dyn Host, id: &BiomeId) -> Option<BiomeEntry>;

    /// Rebuilds the column's client snapshot and sends it to every observer
    /// in range. Returns how many observers received it, or `None` if the
    /// column is no longer resident.
    fn sync_chunk(&self, host: &dyn Host, world: &WorldId, chunk: ChunkPos) -> Option<usize>;
}

/// Residency-checked cell write shared by all revisions.
pub(crate) fn write_resident_cell(
    host: &dyn Host,
    world: &WorldId,
    voxel: VoxelCoord,
    biome: &BiomeEntry,
) -> bool {
    if !host.is_column_loaded(world, voxel.chunk()) {
        return false;
    }
    host.write_biome_cell(world, voxel.to_grid(), biome)
}

/// Compatibility shim for hosts without a direct lock toggle: overwrite
/// every internal boolean slot of the catalog.
pub(crate) fn lock_via_internal_flags(host: &dyn Host, locked: bool) -> Result<(), HostError> {
    let flags = host.catalog_internal_flags();
    if flags.is_empty() {
        return Err(HostError::Unsupported("catalog internal flags"));
    }
    for flag in &flags {
        tracing::trace!("Setting catalog flag {} = {}", flag.name(), locked);
        flag.set(locked);
    }
    Ok(())
}

/// Sends `snapshot` to every observer in range of its column. Send failures
/// are logged and skipped.
pub(crate) fn deliver(host: &dyn Host, snapshot: &ChunkSnapshot) -> usize {
    let mut delivered = 0;
    for observer in host.observers_near(&snapshot.world, snapshot.chunk) {
        match host.send_snapshot(observer, snapshot) {
            Ok(()) => delivered += 1,
            Err(e) => tracing::debug!("Dropped snapshot {} for {:?}: {}", snapshot.chunk, observer, e),
        }
    }
    delivered
}


#[cfg(test)]
mod tests {
    use verdant_world::MemoryHost;

    use super::test_support::populated_host;
    use super::*;

    #[test]
    fn test_write_resident_cell_skips_unloaded() {
        let (host, world, entry) = populated_host();
        assert!(write_resident_cell(&host, &world, VoxelCoord::new(1, 60, 1), &entry));
        assert!(!write_resident_cell(&host, &world, VoxelCoord::new(16, 60, 1), &entry));
        assert!(!write_resident_cell(&host, &world, VoxelCoord::new(1, 400, 1), &entry));
        assert_eq!(host.cell_writes(), 1);
    }

    #[test]
    fn test_lock_via_flags_round_trip() {
        let host = MemoryHost::new("x").with_direct_catalog_lock(false);
        lock_via_internal_flags(&host, false).unwrap();
        assert!(!host.is_catalog_frozen());
        lock_via_internal_flags(&host, true).unwrap();
        assert!(host.is_catalog_frozen());
    }

    #[test]
    fn test_deliver_counts_observers_in_range() {
        let (host, world, _) = populated_host();
        host.add_observer(world.clone(), VoxelCoord::new(0, 64, 0), 4);
        host.add_observer(world.clone(), VoxelCoord::new(40, 64, 0), 4);
        host.add_observer(world.clone(), VoxelCoord::new(4000, 64, 0), 4);
        let snapshot = host.chunk_snapshot(&world, ChunkPos::new(0, 0)).unwrap();
        assert_eq!(deliver(&host, &snapshot), 2);
        assert_eq!(host.take_sent().len(), 2);
    }
}
