//! Region painting: every shape reduces to one adapter write per voxel.
//!
//! Shapes are resolved to an inclusive [`PointRange3D`], clamped to the
//! world's build height and walked X, then Y, then Z. Each voxel is handed
//! to [`VersionAdapter::set_voxel_biome`], which skips non-resident columns,
//! so painting never loads terrain.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::thread::{self, ThreadId};

use verdant_adapter::VersionAdapter;
use verdant_world::{
    BiomeEntry, BiomeId, BoundingBox, CHUNK_WIDTH, ChunkPos, HeightRange, Host, HostWorld,
    Location, PointRange3D, VoxelCoord, WorldId,
};

use crate::error::PaintError;

/// Outcome of one painting call.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PaintReport {
    /// Voxels whose grid cell was written.
    pub written: u64,
    /// Voxels inside the build height that were skipped, e.g. because their
    /// column was not resident.
    pub skipped: u64,
    /// Columns the shape touches, resident or not. Used for observer sync.
    pub chunks: BTreeSet<ChunkPos>,
}

impl PaintReport {
    fn for_chunks(chunks: impl IntoIterator<Item = ChunkPos>) -> Self {
        Self {
            chunks: chunks.into_iter().collect(),
            ..Self::default()
        }
    }

    fn record(&mut self, written: bool) {
        if written {
            self.written += 1;
        } else {
            self.skipped += 1;
        }
    }
}

/// Paints biomes onto resident terrain through the active adapter.
///
/// Must be used from the thread that created it, which is expected to be
/// the host's simulation thread.
pub struct RegionBiomePainter {
    host: Arc<dyn Host>,
    adapter: Arc<dyn VersionAdapter>,
    owner: ThreadId,
}

impl RegionBiomePainter {
    pub fn new(host: Arc<dyn Host>, adapter: Arc<dyn VersionAdapter>) -> Self {
        Self {
            host,
            adapter,
            owner: thread::current().id(),
        }
    }

    fn assert_owner(&self) {
        debug_assert_eq!(
            thread::current().id(),
            self.owner,
            "biome painting called off the simulation thread"
        );
    }

    /// Resolves `id` through the adapter.
    ///
    /// # Errors
    ///
    /// [`PaintError::BiomeNotFound`] if the catalog has no such biome.
    pub fn resolve(&self, id: &BiomeId) -> Result<BiomeEntry, PaintError> {
        self.adapter
            .resolve_catalog(&*self.host, id)
            .ok_or_else(|| {
                tracing::warn!("Biome {} not found, nothing painted", id);
                PaintError::BiomeNotFound(id.clone())
            })
    }

    fn world_heights(&self, world: &WorldId) -> Result<HeightRange, PaintError> {
        self.host.build_height(world).ok_or_else(|| {
            tracing::warn!("World {} does not exist, nothing painted", world);
            PaintError::UnknownWorld(world.clone())
        })
    }

    /// Single-voxel primitive. Returns `true` if the cell was written.
    pub fn paint_voxel(&self, world: &WorldId, voxel: VoxelCoord, biome: &BiomeEntry) -> bool {
        self.assert_owner();
        let written = self.adapter.set_voxel_biome(&*self.host, world, voxel, biome);
        tracing::trace!("Paint {} {} -> {}: {}", world, voxel, biome.id(), written);
        written
    }

    fn paint_range(
        &self,
        report: &mut PaintReport,
        world: &WorldId,
        range: PointRange3D,
        biome: &BiomeEntry,
    ) {
        for voxel in range.voxels() {
            report.record(self.paint_voxel(world, voxel, biome));
        }
    }

    /// Paints the grid cell containing `voxel`.
    ///
    /// # Errors
    ///
    /// [`PaintError::BiomeNotFound`] or [`PaintError::UnknownWorld`].
    pub fn set_voxel_biome(
        &self,
        world: &WorldId,
        voxel: VoxelCoord,
        id: &BiomeId,
    ) -> Result<PaintReport, PaintError> {
        let biome = self.resolve(id)?;
        self.world_heights(world)?;

        let mut report = PaintReport::for_chunks([voxel.chunk()]);
        report.record(self.paint_voxel(world, voxel, &biome));
        log_report("voxel", world, &biome, &report);
        Ok(report)
    }

    /// Paints a whole chunk column over the world's build height.
    ///
    /// # Errors
    ///
    /// [`PaintError::BiomeNotFound`] or [`PaintError::UnknownWorld`].
    pub fn set_column_biome(
        &self,
        world: &WorldId,
        chunk: ChunkPos,
        id: &BiomeId,
    ) -> Result<PaintReport, PaintError> {
        self.set_column_biome_within(world, chunk, None, id)
    }

    /// Paints a chunk column over `heights` (half-open), clamped to the
    /// world's build height. `None` paints the full height.
    ///
    /// # Errors
    ///
    /// [`PaintError::BiomeNotFound`] or [`PaintError::UnknownWorld`].
    pub fn set_column_biome_within(
        &self,
        world: &WorldId,
        chunk: ChunkPos,
        heights: Option<HeightRange>,
        id: &BiomeId,
    ) -> Result<PaintReport, PaintError> {
        let biome = self.resolve(id)?;
        let world_heights = self.world_heights(world)?;

        let mut report = PaintReport::for_chunks([chunk]);
        let span = match heights {
            Some(requested) => requested.intersect(world_heights),
            None => Some(world_heights),
        };
        if let Some(span) = span {
            let (x, z) = (chunk.min_block_x(), chunk.min_block_z());
            let range = PointRange3D::of(
                VoxelCoord::new(x, span.min, z),
                VoxelCoord::new(x + CHUNK_WIDTH - 1, span.max - 1, z + CHUNK_WIDTH - 1),
            );
            self.paint_range(&mut report, world, range, &biome);
        }
        log_report("column", world, &biome, &report);
        Ok(report)
    }

    /// Paints every voxel inside a bounding box. Box corners are floored to
    /// voxel coordinates and both are inclusive.
    ///
    /// # Errors
    ///
    /// [`PaintError::BiomeNotFound`] or [`PaintError::UnknownWorld`].
    pub fn set_box_biome(
        &self,
        world: &WorldId,
        bounds: &BoundingBox,
        id: &BiomeId,
    ) -> Result<PaintReport, PaintError> {
        self.set_region_biome(world, bounds.min_block(), bounds.max_block(), id)
    }

    /// Paints the inclusive region spanned by two corners given in any
    /// order. The vertical span is clamped to the world's build height.
    ///
    /// # Errors
    ///
    /// [`PaintError::BiomeNotFound`] or [`PaintError::UnknownWorld`].
    pub fn set_region_biome(
        &self,
        world: &WorldId,
        from: VoxelCoord,
        to: VoxelCoord,
        id: &BiomeId,
    ) -> Result<PaintReport, PaintError> {
        let biome = self.resolve(id)?;
        let heights = self.world_heights(world)?;

        let range = PointRange3D::of(from, to);
        let mut report = PaintReport::default();
        // A range entirely above or below the world touches no column.
        if let Some(clamped) = range.clamp_height(heights) {
            report.chunks.extend(clamped.chunks());
            self.paint_range(&mut report, world, clamped, &biome);
        }
        log_report("region", world, &biome, &report);
        Ok(report)
    }

    /// Like [`set_region_biome`](Self::set_region_biome) with world-tagged
    /// corners. Fractional coordinates are floored.
    ///
    /// # Errors
    ///
    /// [`PaintError::CrossWorld`] before anything is resolved or written if
    /// the corners are in different worlds, otherwise as `set_region_biome`.
    pub fn set_region_biome_between(
        &self,
        from: &Location,
        to: &Location,
        id: &BiomeId,
    ) -> Result<PaintReport, PaintError> {
        if from.world != to.world {
            tracing::warn!(
                "Region corners in different worlds ({} and {}), nothing painted",
                from.world,
                to.world
            );
            return Err(PaintError::CrossWorld {
                from: from.world.clone(),
                to: to.world.clone(),
            });
        }
        self.set_region_biome(&from.world, from.block(), to.block(), id)
    }
}

fn log_report(shape: &str, world: &WorldId, biome: &BiomeEntry, report: &PaintReport) {
    tracing::debug!(
        "Painted {} in {} with {}: {} written, {} skipped, {} chunks",
        shape,
        world,
        biome.id(),
        report.written,
        report.skipped,
        report.chunks.len()
    );
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use verdant_adapter::Revision;
    use verdant_world::{BiomeDescriptor, GridCoord, HostCatalog, MemoryHost};

    use super::*;

    fn setup() -> (Arc<MemoryHost>, RegionBiomePainter, WorldId, BiomeId) {
        let host = MemoryHost::new("(MC: 1.20.4)");
        let world = WorldId::new("w1");
        host.add_world(world.clone(), HeightRange::new(-64, 320));
        host.load_column(&world, ChunkPos::new(0, 0));
        host.set_catalog_frozen(false).unwrap();
        let id = BiomeId::new("custom", "crystal_caves");
        host.register_biome(id.clone(), BiomeDescriptor::default())
            .unwrap();
        host.freeze_catalog();

        let host = Arc::new(host);
        let painter = RegionBiomePainter::new(host.clone(), Revision::V1_20_R3.build_adapter());
        (host, painter, world, id)
    }

    #[test]
    fn test_voxel_paints_one_cell() {
        let (host, painter, world, id) = setup();
        let report = painter
            .set_voxel_biome(&world, VoxelCoord::new(5, 64, 9), &id)
            .unwrap();
        assert_eq!(report.written, 1);
        assert_eq!(report.skipped, 0);
        assert_eq!(report.chunks, BTreeSet::from([ChunkPos::new(0, 0)]));
        assert_eq!(host.biome_at(&world, VoxelCoord::new(4, 67, 11)), Some(id));
    }

    #[test]
    fn test_unknown_biome_writes_nothing() {
        let (host, painter, world, _) = setup();
        let missing = BiomeId::new("custom", "missing");
        let err = painter
            .set_region_biome(&world, VoxelCoord::new(0, 0, 0), VoxelCoord::new(3, 3, 3), &missing)
            .unwrap_err();
        assert_eq!(err, PaintError::BiomeNotFound(missing));
        assert_eq!(host.cell_writes(), 0);
    }

    #[test]
    fn test_unknown_world_writes_nothing() {
        let (host, painter, _, id) = setup();
        let nether = WorldId::new("nether");
        let err = painter
            .set_column_biome(&nether, ChunkPos::new(0, 0), &id)
            .unwrap_err();
        assert_eq!(err, PaintError::UnknownWorld(nether));
        assert_eq!(host.cell_writes(), 0);
    }

    #[test]
    fn test_column_covers_full_height() {
        let (host, painter, world, id) = setup();
        let report = painter
            .set_column_biome(&world, ChunkPos::new(0, 0), &id)
            .unwrap();
        assert_eq!(report.written, 16 * 16 * 384);
        assert_eq!(report.skipped, 0);
        assert_eq!(host.biome_at(&world, VoxelCoord::new(15, -64, 15)), Some(id.clone()));
        assert_eq!(host.biome_at(&world, VoxelCoord::new(0, 319, 0)), Some(id));
    }

    #[test]
    fn test_column_within_clamps_to_world() {
        let (host, painter, world, id) = setup();
        let report = painter
            .set_column_biome_within(
                &world,
                ChunkPos::new(0, 0),
                Some(HeightRange::new(300, 400)),
                &id,
            )
            .unwrap();
        assert_eq!(report.written, 16 * 16 * 20);
        assert_eq!(
            host.biome_cell(&world, GridCoord::new(0, 74, 0)),
            Some(0),
            "y 296..300 stays plains"
        );

        let empty = painter
            .set_column_biome_within(
                &world,
                ChunkPos::new(0, 0),
                Some(HeightRange::new(500, 600)),
                &id,
            )
            .unwrap();
        assert_eq!((empty.written, empty.skipped), (0, 0));
    }

    #[test]
    fn test_unloaded_column_is_skipped() {
        let (host, painter, world, id) = setup();
        let report = painter
            .set_column_biome_within(
                &world,
                ChunkPos::new(3, -2),
                Some(HeightRange::new(0, 4)),
                &id,
            )
            .unwrap();
        assert_eq!(report.written, 0);
        assert_eq!(report.skipped, 16 * 16 * 4);
        assert_eq!(host.loaded_count(&world), 1, "painting must not load columns");
    }

    #[test]
    fn test_region_clamps_height_and_reports_all_chunks() {
        let (_host, painter, world, id) = setup();
        let report = painter
            .set_region_biome(&world, VoxelCoord::new(-1, 318, 0), VoxelCoord::new(0, 330, 0), &id)
            .unwrap();
        // x = -1 lies in unloaded column (-1, 0); y clamped to 318..=319.
        assert_eq!(report.written, 2);
        assert_eq!(report.skipped, 2);
        assert_eq!(
            report.chunks,
            BTreeSet::from([ChunkPos::new(-1, 0), ChunkPos::new(0, 0)])
        );
    }

    #[test]
    fn test_region_fully_outside_height_touches_nothing() {
        let (host, painter, world, id) = setup();
        let report = painter
            .set_region_biome(&world, VoxelCoord::new(0, 400, 0), VoxelCoord::new(4, 500, 4), &id)
            .unwrap();
        assert_eq!((report.written, report.skipped), (0, 0));
        assert!(report.chunks.is_empty());
        assert_eq!(host.cell_writes(), 0);
    }

    #[test]
    fn test_box_floors_corners() {
        let (host, painter, world, id) = setup();
        let bounds = BoundingBox::of([3.9, 60.2, 3.1], [0.5, 60.7, 0.0]);
        let report = painter.set_box_biome(&world, &bounds, &id).unwrap();
        assert_eq!(report.written, 4 * 4);
        assert_eq!(host.biome_at(&world, VoxelCoord::new(0, 60, 0)), Some(id));
    }

    #[test]
    fn test_between_rejects_cross_world() {
        let (host, painter, world, id) = setup();
        let from = Location::new(world.clone(), 0.0, 60.0, 0.0);
        let to = Location::new(WorldId::new("w2"), 15.0, 60.0, 15.0);
        let err = painter.set_region_biome_between(&from, &to, &id).unwrap_err();
        assert_eq!(
            err,
            PaintError::CrossWorld {
                from: world,
                to: WorldId::new("w2"),
            }
        );
        assert_eq!(host.cell_writes(), 0);
    }

    #[test]
    fn test_between_same_world_paints() {
        let (_host, painter, world, id) = setup();
        let from = Location::new(world.clone(), 15.5, 60.0, 15.5);
        let to = Location::new(world, 0.0, 60.9, 0.0);
        let report = painter.set_region_biome_between(&from, &to, &id).unwrap();
        assert_eq!(report.written, 256);
    }
}
