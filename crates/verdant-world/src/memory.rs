//! In-process host: resident columns keyed by [`ChunkPos`], a freezable biome
//! catalog, and observers with a view distance.
//!
//! Used by the demo binary and as the reference host in tests. Every column
//! stores a dense biome grid of 4×4 cells per layer, one layer per 4 voxels
//! of build height.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use rustc_hash::FxHashMap;

use crate::biome::{BiomeDescriptor, BiomeEntry, BiomeId};
use crate::coords::{
    BIOME_CELL_SHIFT, CHUNK_SHIFT, ChunkPos, GridCoord, HeightRange, VoxelCoord, WorldId,
};
use crate::host::{
    ChunkSnapshot, HostCatalog, HostError, HostNetwork, HostWorld, InternalFlag, ObserverId,
};

/// Cells per column edge (16 voxels / 4).
const CELLS_PER_EDGE: i32 = 1 << (CHUNK_SHIFT - BIOME_CELL_SHIFT);
/// `log2` of the voxel height of one lighting section.
const SECTION_SHIFT: u32 = 4;
/// Full daylight.
const MAX_SKY_LIGHT: u8 = 15;

// ---------------------------------------------------------------------------
// BiomeColumn
// ---------------------------------------------------------------------------

/// Biome grid and lighting of one resident chunk column.
#[derive(Clone, Debug)]
pub struct BiomeColumn {
    /// Lowest grid layer (`min_y >> 2`).
    min_cell_y: i32,
    min_y: i32,
    /// Raw biome ids, index `(layer * 4 + z) * 4 + x`.
    cells: Vec<u32>,
    sky_light: Vec<u8>,
    /// Incremented on every cell write.
    version: u64,
}

/// Number of aligned `1 << shift` slabs touched by `heights`, counting the
/// partial slabs at either end.
fn spanned_units(heights: HeightRange, shift: u32) -> usize {
    if heights.is_empty() {
        return 0;
    }
    (((heights.max - 1) >> shift) - (heights.min >> shift) + 1) as usize
}

impl BiomeColumn {
    /// Creates a column covering `heights`, every cell set to `fill`.
    pub fn new(heights: HeightRange, fill: u32) -> Self {
        let layers = spanned_units(heights, BIOME_CELL_SHIFT);
        let sections = spanned_units(heights, SECTION_SHIFT);
        let per_layer = (CELLS_PER_EDGE * CELLS_PER_EDGE) as usize;
        Self {
            min_cell_y: heights.min >> BIOME_CELL_SHIFT,
            min_y: heights.min,
            cells: vec![fill; layers * per_layer],
            sky_light: vec![MAX_SKY_LIGHT; sections],
            version: 0,
        }
    }

    fn index(&self, cell: GridCoord) -> Option<usize> {
        let layer = cell.y - self.min_cell_y;
        if layer < 0 {
            return None;
        }
        let lx = cell.x.rem_euclid(CELLS_PER_EDGE);
        let lz = cell.z.rem_euclid(CELLS_PER_EDGE);
        let idx = ((layer * CELLS_PER_EDGE + lz) * CELLS_PER_EDGE + lx) as usize;
        (idx < self.cells.len()).then_some(idx)
    }

    /// Raw biome id of a cell, `None` outside the column's height.
    pub fn get(&self, cell: GridCoord) -> Option<u32> {
        self.index(cell).map(|i| self.cells[i])
    }

    /// Writes a cell. Returns `false` outside the column's height.
    pub fn set(&mut self, cell: GridCoord, raw_id: u32) -> bool {
        let Some(i) = self.index(cell) else {
            return false;
        };
        self.cells[i] = raw_id;
        self.version += 1;
        true
    }

    /// Number of writes applied since the column was loaded.
    pub fn version(&self) -> u64 {
        self.version
    }
}

// ---------------------------------------------------------------------------
// Internal state
// ---------------------------------------------------------------------------

struct MemoryWorld {
    heights: HeightRange,
    columns: FxHashMap<ChunkPos, BiomeColumn>,
}

/// Dense `raw_id → entry` table plus reverse lookup, like a type registry.
struct MemoryCatalog {
    entries: Vec<BiomeEntry>,
    by_id: FxHashMap<BiomeId, u32>,
}

impl MemoryCatalog {
    fn new() -> Self {
        let plains = BiomeId::new("minecraft", "plains");
        let mut by_id = FxHashMap::default();
        by_id.insert(plains.clone(), 0);
        Self {
            entries: vec![BiomeEntry::new(
                plains,
                0,
                Arc::new(BiomeDescriptor::default()),
            )],
            by_id,
        }
    }
}

struct MemoryObserver {
    id: ObserverId,
    world: WorldId,
    position: VoxelCoord,
    view_distance: u32,
}

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

// ---------------------------------------------------------------------------
// MemoryHost
// ---------------------------------------------------------------------------

/// A complete host living in process memory.
///
/// The catalog starts frozen with `minecraft:plains` as raw id 0; freshly
/// loaded columns are filled with it.
pub struct MemoryHost {
    banner: String,
    direct_lock: bool,
    worlds: RwLock<FxHashMap<WorldId, MemoryWorld>>,
    catalog: RwLock<MemoryCatalog>,
    frozen: Arc<AtomicBool>,
    observers: RwLock<Vec<MemoryObserver>>,
    next_observer: AtomicU64,
    outbox: Mutex<Vec<(ObserverId, ChunkSnapshot)>>,
    cell_writes: AtomicU64,
}

impl MemoryHost {
    /// Creates an empty host announcing `banner` as its version.
    pub fn new(banner: impl Into<String>) -> Self {
        Self {
            banner: banner.into(),
            direct_lock: true,
            worlds: RwLock::new(FxHashMap::default()),
            catalog: RwLock::new(MemoryCatalog::new()),
            frozen: Arc::new(AtomicBool::new(true)),
            observers: RwLock::new(Vec::new()),
            next_observer: AtomicU64::new(1),
            outbox: Mutex::new(Vec::new()),
            cell_writes: AtomicU64::new(0),
        }
    }

    /// Controls whether [`HostCatalog::set_catalog_frozen`] is supported.
    /// Internal flags are always exposed.
    pub fn with_direct_catalog_lock(mut self, supported: bool) -> Self {
        self.direct_lock = supported;
        self
    }

    /// Creates (or resets) a world with the given build height.
    pub fn add_world(&self, world: WorldId, heights: HeightRange) {
        write(&self.worlds).insert(
            world,
            MemoryWorld {
                heights,
                columns: FxHashMap::default(),
            },
        );
    }

    /// Makes a column resident. Reloading a resident column keeps its state.
    /// Returns `false` if the world does not exist.
    pub fn load_column(&self, world: &WorldId, chunk: ChunkPos) -> bool {
        let mut worlds = write(&self.worlds);
        let Some(w) = worlds.get_mut(world) else {
            return false;
        };
        let heights = w.heights;
        w.columns
            .entry(chunk)
            .or_insert_with(|| BiomeColumn::new(heights, 0));
        true
    }

    /// Evicts a column, returning its last state.
    pub fn unload_column(&self, world: &WorldId, chunk: ChunkPos) -> Option<BiomeColumn> {
        write(&self.worlds).get_mut(world)?.columns.remove(&chunk)
    }

    /// Number of resident columns in `world`.
    pub fn loaded_count(&self, world: &WorldId) -> usize {
        read(&self.worlds)
            .get(world)
            .map_or(0, |w| w.columns.len())
    }

    /// Connects an observer standing at `position`.
    pub fn add_observer(&self, world: WorldId, position: VoxelCoord, view_distance: u32) -> ObserverId {
        let id = ObserverId(self.next_observer.fetch_add(1, Ordering::Relaxed));
        write(&self.observers).push(MemoryObserver {
            id,
            world,
            position,
            view_distance,
        });
        id
    }

    /// Disconnects an observer.
    pub fn remove_observer(&self, id: ObserverId) {
        write(&self.observers).retain(|o| o.id != id);
    }

    /// Drains every snapshot delivered so far.
    pub fn take_sent(&self) -> Vec<(ObserverId, ChunkSnapshot)> {
        std::mem::take(&mut *self.outbox.lock().unwrap_or_else(PoisonError::into_inner))
    }

    /// Total biome cell writes accepted.
    pub fn cell_writes(&self) -> u64 {
        self.cell_writes.load(Ordering::Relaxed)
    }

    /// Biome stored for the cell containing `voxel`, if resident.
    pub fn biome_at(&self, world: &WorldId, voxel: VoxelCoord) -> Option<BiomeId> {
        let raw = self.biome_cell(world, voxel.to_grid())?;
        read(&self.catalog)
            .entries
            .get(raw as usize)
            .map(|e| e.id().clone())
    }
}

impl HostWorld for MemoryHost {
    fn version_banner(&self) -> String {
        self.banner.clone()
    }

    fn is_column_loaded(&self, world: &WorldId, chunk: ChunkPos) -> bool {
        read(&self.worlds)
            .get(world)
            .is_some_and(|w| w.columns.contains_key(&chunk))
    }

    fn build_height(&self, world: &WorldId) -> Option<HeightRange> {
        read(&self.worlds).get(world).map(|w| w.heights)
    }

    fn write_biome_cell(&self, world: &WorldId, cell: GridCoord, biome: &BiomeEntry) -> bool {
        let mut worlds = write(&self.worlds);
        let Some(column) = worlds
            .get_mut(world)
            .and_then(|w| w.columns.get_mut(&cell.chunk()))
        else {
            return false;
        };
        let written = column.set(cell, biome.raw_id());
        if written {
            self.cell_writes.fetch_add(1, Ordering::Relaxed);
        }
        written
    }

    fn biome_cell(&self, world: &WorldId, cell: GridCoord) -> Option<u32> {
        read(&self.worlds)
            .get(world)?
            .columns
            .get(&cell.chunk())?
            .get(cell)
    }

    fn chunk_snapshot(&self, world: &WorldId, chunk: ChunkPos) -> Option<ChunkSnapshot> {
        let worlds = read(&self.worlds);
        let column = worlds.get(world)?.columns.get(&chunk)?;
        Some(ChunkSnapshot {
            world: world.clone(),
            chunk,
            min_y: column.min_y,
            biomes: column.cells.clone(),
            sky_light: column.sky_light.clone(),
            version: column.version,
            trust_edges: None,
        })
    }
}

impl HostCatalog for MemoryHost {
    fn resolve_biome(&self, id: &BiomeId) -> Option<BiomeEntry> {
        let catalog = read(&self.catalog);
        let raw = *catalog.by_id.get(id)?;
        catalog.entries.get(raw as usize).cloned()
    }

    fn register_biome(
        &self,
        id: BiomeId,
        descriptor: BiomeDescriptor,
    ) -> Result<BiomeEntry, HostError> {
        if self.frozen.load(Ordering::SeqCst) {
            return Err(HostError::CatalogFrozen);
        }
        let mut catalog = write(&self.catalog);
        let descriptor = Arc::new(descriptor);
        if let Some(&raw) = catalog.by_id.get(&id) {
            let entry = BiomeEntry::new(id, raw, descriptor);
            catalog.entries[raw as usize] = entry.clone();
            tracing::debug!("Replaced biome {} (raw id {})", entry.id(), raw);
            return Ok(entry);
        }
        let raw = catalog.entries.len() as u32;
        let entry = BiomeEntry::new(id.clone(), raw, descriptor);
        catalog.by_id.insert(id, raw);
        catalog.entries.push(entry.clone());
        tracing::debug!("Registered biome {} (raw id {})", entry.id(), raw);
        Ok(entry)
    }

    fn is_catalog_frozen(&self) -> bool {
        self.frozen.load(Ordering::SeqCst)
    }

    fn freeze_catalog(&self) {
        self.frozen.store(true, Ordering::SeqCst);
    }

    fn set_catalog_frozen(&self, frozen: bool) -> Result<(), HostError> {
        if !self.direct_lock {
            return Err(HostError::Unsupported("direct catalog lock toggle"));
        }
        self.frozen.store(frozen, Ordering::SeqCst);
        Ok(())
    }

    fn catalog_internal_flags(&self) -> Vec<InternalFlag> {
        vec![InternalFlag::new("frozen", Arc::clone(&self.frozen))]
    }
}

impl HostNetwork for MemoryHost {
    fn observers_near(&self, world: &WorldId, chunk: ChunkPos) -> Vec<ObserverId> {
        read(&self.observers)
            .iter()
            .filter(|o| &o.world == world)
            .filter(|o| o.position.chunk().chebyshev_distance(chunk) <= o.view_distance)
            .map(|o| o.id)
            .collect()
    }

    fn send_snapshot(
        &self,
        observer: ObserverId,
        snapshot: &ChunkSnapshot,
    ) -> Result<(), HostError> {
        if !read(&self.observers).iter().any(|o| o.id == observer) {
            return Err(HostError::ObserverGone(observer));
        }
        self.outbox
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((observer, snapshot.clone()));
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
