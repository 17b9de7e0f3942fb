//! Adapter for `v1_20_R4` and `v1_21_R1`.
//!
//! Hosts from 1.20.5 onward expose catalog write protection directly, and
//! identifiers are checked against the strict resource-key alphabet before
//! lookup: an identifier the host could never have registered resolves to
//! nothing.

use verdant_world::{
    BiomeEntry, BiomeId, ChunkPos, Host, HostCatalog, HostError, HostWorld, VoxelCoord, WorldId,
};

use crate::adapter::{VersionAdapter, deliver, write_resident_cell};
use crate::revision::Revision;

#[derive(Debug)]
pub struct V1_21Adapter {
    revision: Revision,
}

impl V1_21Adapter {
    pub fn new(revision: Revision) -> Self {
        Self { revision }
    }
}

fn valid_namespace_char(c: char) -> bool {
    matches!(c, 'a'..='z' | '0'..='9' | '_' | '.' | '-')
}

fn valid_path_char(c: char) -> bool {
    valid_namespace_char(c) || c == '/'
}

/// `true` if `id` is a well-formed resource key for this revision.
pub fn is_valid_key(id: &BiomeId) -> bool {
    !id.namespace().is_empty()
        && !id.key().is_empty()
        && id.namespace().chars().all(valid_namespace_char)
        && id.key().chars().all(valid_path_char)
}

impl VersionAdapter for V1_21Adapter {
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
        host.set_catalog_frozen(locked)
    }

    fn resolve_catalog(&self, host: &dyn Host, id: &BiomeId) -> Option<BiomeEntry> {
        if !is_valid_key(id) {
            tracing::debug!("Rejected malformed biome key {}", id);
            return None;
        }
        host.resolve_biome(id)
    }

    fn sync_chunk(&self, host: &dyn Host, world: &WorldId, chunk: ChunkPos) -> Option<usize> {
        let mut snapshot = host.chunk_snapshot(world, chunk)?;
        snapshot.trust_edges = None;
        Some(deliver(host, &snapshot))
    }
}
