//! The operation surface offered to the rest of the process.

use std::sync::Arc;

use verdant_adapter::VersionAdapter;
use verdant_sync::ObserverSyncBroadcaster;
use verdant_world::{
    BiomeDescriptor, BiomeEntry, BiomeId, BoundingBox, ChunkPos, HeightRange, Host, Location,
    VoxelCoord, WorldId,
};

use crate::error::{CatalogError, PaintError};
use crate::guard::BiomeCatalogGuard;
use crate::painter::{PaintReport, RegionBiomePainter};

/// Biome repainting with optional observer re-sync.
///
/// Every painting call takes `update_observers`; when set, the columns the
/// shape touches are queued for background re-sync after painting. Without
/// a broadcaster attached the flag is ignored.
pub struct BiomeService {
    painter: RegionBiomePainter,
    guard: BiomeCatalogGuard,
    sync: Option<Arc<ObserverSyncBroadcaster>>,
}

impl BiomeService {
    /// Creates a service bound to the calling thread.
    pub fn new(host: Arc<dyn Host>, adapter: Arc<dyn VersionAdapter>) -> Self {
        Self {
            painter: RegionBiomePainter::new(Arc::clone(&host), Arc::clone(&adapter)),
            guard: BiomeCatalogGuard::new(host, adapter),
            sync: None,
        }
    }

    /// Attaches a broadcaster used when `update_observers` is set.
    pub fn with_broadcaster(mut self, sync: Arc<ObserverSyncBroadcaster>) -> Self {
        self.sync = Some(sync);
        self
    }

    pub fn painter(&self) -> &RegionBiomePainter {
        &self.painter
    }

    pub fn guard(&self) -> &BiomeCatalogGuard {
        &self.guard
    }

    pub fn broadcaster(&self) -> Option<&Arc<ObserverSyncBroadcaster>> {
        self.sync.as_ref()
    }

    /// See [`BiomeCatalogGuard::register_or_replace`].
    pub fn register_or_replace_biome(
        &self,
        id: BiomeId,
        descriptor: BiomeDescriptor,
    ) -> Result<BiomeEntry, CatalogError> {
        self.guard.register_or_replace(id, descriptor)
    }

    pub fn resolve_biome(&self, id: &BiomeId) -> Option<BiomeEntry> {
        self.guard.resolve(id)
    }

    pub fn set_voxel_biome(
        &self,
        world: &WorldId,
        voxel: VoxelCoord,
        id: &BiomeId,
        update_observers: bool,
    ) -> Result<PaintReport, PaintError> {
        let report = self.painter.set_voxel_biome(world, voxel, id)?;
        self.notify(world, &report, update_observers);
        Ok(report)
    }

    pub fn set_column_biome(
        &self,
        world: &WorldId,
        chunk: ChunkPos,
        id: &BiomeId,
        update_observers: bool,
    ) -> Result<PaintReport, PaintError> {
        let report = self.painter.set_column_biome(world, chunk, id)?;
        self.notify(world, &report, update_observers);
        Ok(report)
    }

    pub fn set_column_biome_within(
        &self,
        world: &WorldId,
        chunk: ChunkPos,
        heights: HeightRange,
        id: &BiomeId,
        update_observers: bool,
    ) -> Result<PaintReport, PaintError> {
        let report = self
            .painter
            .set_column_biome_within(world, chunk, Some(heights), id)?;
        self.notify(world, &report, update_observers);
        Ok(report)
    }

    pub fn set_box_biome(
        &self,
        world: &WorldId,
        bounds: &BoundingBox,
        id: &BiomeId,
        update_observers: bool,
    ) -> Result<PaintReport, PaintError> {
        let report = self.painter.set_box_biome(world, bounds, id)?;
        self.notify(world, &report, update_observers);
        Ok(report)
    }

    pub fn set_region_biome(
        &self,
        world: &WorldId,
        from: VoxelCoord,
        to: VoxelCoord,
        id: &BiomeId,
        update_observers: bool,
    ) -> Result<PaintReport, PaintError> {
        let report = self.painter.set_region_biome(world, from, to, id)?;
        self.notify(world, &report, update_observers);
        Ok(report)
    }

    pub fn set_region_biome_between(
        &self,
        from: &Location,
        to: &Location,
        id: &BiomeId,
        update_observers: bool,
    ) -> Result<PaintReport, PaintError> {
        let report = self.painter.set_region_biome_between(from, to, id)?;
        self.notify(&from.world, &report, update_observers);
        Ok(report)
    }

    fn notify(&self, world: &WorldId, report: &PaintReport, update_observers: bool) {
        if !update_observers {
            return;
        }
        match &self.sync {
            Some(sync) => sync.broadcast(world, report.chunks.iter().copied()),
            None => tracing::debug!("No broadcaster attached, observers not updated"),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use verdant_adapter::Revision;
    use verdant_sync::SyncConfig;
    use verdant_world::MemoryHost;

    use super::*;

    fn service(with_sync: bool) -> (Arc<MemoryHost>, BiomeService, WorldId) {
        let host = Arc::new(MemoryHost::new("(MC: 1.19.4)"));
        let world = WorldId::new("w1");
        host.add_world(world.clone(), HeightRange::new(-64, 320));
        host.load_column(&world, ChunkPos::new(0, 0));
        host.add_observer(world.clone(), VoxelCoord::new(8, 64, 8), 2);

        let adapter = Revision::V1_19_R3.build_adapter();
        let mut service = BiomeService::new(host.clone(), Arc::clone(&adapter));
        if with_sync {
            let sync = ObserverSyncBroadcaster::spawn(host.clone(), adapter, SyncConfig::default());
            service = service.with_broadcaster(Arc::new(sync));
        }
        (host, service, world)
    }

    #[test]
    fn test_register_then_paint_and_sync() {
        let (host, service, world) = service(true);
        let id = BiomeId::new("custom", "crystal_caves");
        service
            .register_or_replace_biome(id.clone(), BiomeDescriptor::default())
            .unwrap();
        assert!(service.resolve_biome(&id).is_some());

        let report = service
            .set_voxel_biome(&world, VoxelCoord::new(1, 64, 1), &id, true)
            .unwrap();
        assert_eq!(report.written, 1);

        let sync = service.broadcaster().unwrap();
        assert!(sync.flush(Duration::from_secs(5)));
        let sent = host.take_sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].1.chunk, ChunkPos::new(0, 0));
        assert_eq!(sent[0].1.trust_edges, Some(true));
    }

    #[test]
    fn test_no_sync_without_flag() {
        let (host, service, world) = service(true);
        let plains = BiomeId::new("minecraft", "plains");
        service
            .set_region_biome(
                &world,
                VoxelCoord::new(0, 0, 0),
                VoxelCoord::new(20, 3, 3),
                &plains,
                false,
            )
            .unwrap();
        assert!(service.broadcaster().unwrap().flush(Duration::from_secs(5)));
        assert!(host.take_sent().is_empty());
    }

    #[test]
    fn test_flag_without_broadcaster_is_ignored() {
        let (host, service, world) = service(false);
        let plains = BiomeId::new("minecraft", "plains");
        let report = service
            .set_column_biome(&world, ChunkPos::new(0, 0), &plains, true)
            .unwrap();
        assert_eq!(report.written, 16 * 16 * 384);
        assert!(host.take_sent().is_empty());
    }

    #[test]
    fn test_failed_paint_queues_nothing() {
        let (host, service, world) = service(true);
        let err = service
            .set_voxel_biome(
                &world,
                VoxelCoord::new(0, 0, 0),
                &BiomeId::new("custom", "nope"),
                true,
            )
            .unwrap_err();
        assert!(matches!(err, PaintError::BiomeNotFound(_)));
        assert!(service.broadcaster().unwrap().flush(Duration::from_secs(5)));
        assert!(host.take_sent().is_empty());
    }
}
