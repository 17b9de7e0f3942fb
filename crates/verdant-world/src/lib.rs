//! World-side data model for biome repainting: voxel/grid/chunk coordinates,
//! biome identifiers, the host capability traits, and an in-memory host.

pub mod biome;
pub mod coords;
pub mod host;
pub mod memory;

pub use biome::{BiomeDescriptor, BiomeEntry, BiomeId, BiomeIdError, DEFAULT_NAMESPACE};
pub use coords::{
    BIOME_CELL_SHIFT, BoundingBox, CHUNK_SHIFT, CHUNK_WIDTH, ChunkPos, GridCoord, HeightRange,
    Location, PointRange3D, VoxelCoord, WorldId,
};
pub use host::{
    ChunkSnapshot, Host, HostCatalog, HostError, HostNetwork, HostWorld, InternalFlag, ObserverId,
};
pub use memory::{BiomeColumn, MemoryHost};
