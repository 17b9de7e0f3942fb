//! Adapter for `v1_20_R1` through `v1_20_R3`.
//!
//! Catalog write protection is still only reachable through internal flags;
//! the chunk packet dropped its edge-trust flag in this line.

use verdant_world::{
    BiomeEntry, BiomeId, ChunkPos, Host, HostCatalog, HostError, HostWorld, VoxelCoord, WorldId,
};

use crate::adapter::{VersionAdapter, deliver, lock_via_internal_flags, write_resident_cell};
use crate::revision::Revision;

#[derive(Debug)]
pub struct V1_20Adapter {
    revision: Revision,
}

impl V1_20Adapter {
    pub fn new(revision: Revision) -> Self {
        Self { revision }
    }
}

impl VersionAdapter for V1_20Adapter {
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
        snapshot.trust_edges = None;
        Some(deliver(host, &snapshot))
    }
}
