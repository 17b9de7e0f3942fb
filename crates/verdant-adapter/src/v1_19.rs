//! Adapter for the 1.19 revisions (`v1_19_R1` through `v1_19_R3`).
//!
//! These hosts have no lock toggle on the catalog, so write protection is
//! flipped through its internal flags. Their chunk packets still carry the
//! edge-trust flag, always sent as `true`.

use verdant_world::{
    BiomeEntry, BiomeId, ChunkPos, Host, HostCatalog, HostError, HostWorld, VoxelCoord, WorldId,
};

use crate::adapter::{VersionAdapter, deliver, lock_via_internal_flags, write_resident_cell};
use crate::revision::Revision;

#[derive(Debug)]
pub struct V1_19Adapter {
    revision: Revision,
}

impl V1_19Adapter {
    pub fn new(revision: Revision) -> Self {
        Self { revision }
    }
}

impl VersionAdapter for V1_19Adapter {
    fn revision(&self) -> Revision {
        self.revision
    }

    fn set_voxel_biome(
        &self,
        host: &dyn Host,
        world: &WorldId,
        voxel: VoxelCoord,
        biome: &BiomeEntry,
    ) -> bool {
        write_resident_cell(host, world, voxel, biome)
    }

    fn lock_catalog(&self, host: &dyn Host, locked: bool) -> Result<(), HostError> {
        lock_via_internal_flags(host, locked)
    }

    fn resolve_catalog(&self, host: &dyn Host, id: &BiomeId) -> Option<BiomeEntry> {
        host.resolve_biome(id)
    }

    fn sync_chunk(&self, host: &dyn Host, world: &WorldId, chunk: ChunkPos) -> Option<usize> {
        let mut snapshot = host.chunk_snapshot(world, chunk)?;
        snapshot.trust_edges = Some(true);
        Some(deliver(host, &snapshot))
    }
}
