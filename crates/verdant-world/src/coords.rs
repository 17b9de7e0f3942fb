//! World-space coordinate types.
//!
//! Block storage is addressed by [`VoxelCoord`]. Biome storage is four times
//! coarser on every axis ([`GridCoord`]), and the host loads and unloads
//! whole vertical [`ChunkPos`] columns of 16×16 voxels. All conversions use
//! arithmetic shifts, so negative coordinates floor rather than truncate.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Horizontal width of a chunk column in voxels.
pub const CHUNK_WIDTH: i32 = 16;
/// `log2(CHUNK_WIDTH)`.
pub const CHUNK_SHIFT: u32 = 4;
/// `log2` of the biome cell edge length (4 voxels).
pub const BIOME_CELL_SHIFT: u32 = 2;

// ---------------------------------------------------------------------------
// WorldId
// ---------------------------------------------------------------------------

/// Name of a world hosted by the simulation. Cheap to clone.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WorldId(Arc<str>);

impl WorldId {
    /// Creates a world id from its name.
    pub fn new(name: &str) -> Self {
        Self(Arc::from(name))
    }

    /// Returns the world name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WorldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for WorldId {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

// ---------------------------------------------------------------------------
// VoxelCoord / GridCoord / ChunkPos
// ---------------------------------------------------------------------------

/// Integer block position in world space.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VoxelCoord {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl VoxelCoord {
    /// Creates a voxel coordinate.
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// The biome cell containing this voxel: `(x >> 2, y >> 2, z >> 2)`.
    pub const fn to_grid(self) -> GridCoord {
        GridCoord {
            x: self.x >> BIOME_CELL_SHIFT,
            y: self.y >> BIOME_CELL_SHIFT,
            z: self.z >> BIOME_CELL_SHIFT,
        }
    }

    /// The chunk column containing this voxel.
    pub const fn chunk(self) -> ChunkPos {
        ChunkPos {
            x: self.x >> CHUNK_SHIFT,
            z: self.z >> CHUNK_SHIFT,
        }
    }
}

impl fmt::Display for VoxelCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

/// Biome-storage cell position: voxel coordinates divided by 4 (floored).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridCoord {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl GridCoord {
    /// Creates a grid coordinate.
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// The chunk column owning this cell (a column is 4×4 cells wide).
    pub const fn chunk(self) -> ChunkPos {
        ChunkPos {
            x: self.x >> (CHUNK_SHIFT - BIOME_CELL_SHIFT),
            z: self.z >> (CHUNK_SHIFT - BIOME_CELL_SHIFT),
        }
    }
}

/// Horizontal address of a chunk column.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChunkPos {
    pub x: i32,
    pub z: i32,
}

impl ChunkPos {
    /// Creates a chunk position.
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Smallest voxel X inside this column.
    pub const fn min_block_x(self) -> i32 {
        self.x << CHUNK_SHIFT
    }

    /// Smallest voxel Z inside this column.
    pub const fn min_block_z(self) -> i32 {
        self.z << CHUNK_SHIFT
    }

    /// Chebyshev distance in chunks, the metric hosts use for view distance.
    pub fn chebyshev_distance(self, other: ChunkPos) -> u32 {
        let dx = (i64::from(self.x) - i64::from(other.x)).unsigned_abs();
        let dz = (i64::from(self.z) - i64::from(other.z)).unsigned_abs();
        dx.max(dz) as u32
    }
}

impl fmt::Display for ChunkPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.x, self.z)
    }
}

// ---------------------------------------------------------------------------
// HeightRange
// ---------------------------------------------------------------------------

/// Half-open vertical range `[min, max)` in voxels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HeightRange {
    pub min: i32,
    pub max: i32,
}

impl HeightRange {
    /// Creates a range. `min > max` yields an empty range.
    pub const fn new(min: i32, max: i32) -> Self {
        Self { min, max }
    }

    /// Returns `true` if `y` lies inside the range.
    pub const fn contains(&self, y: i32) -> bool {
        y >= self.min && y < self.max
    }

    /// Number of voxel layers covered.
    pub fn len(&self) -> u32 {
        (i64::from(self.max) - i64::from(self.min)).max(0) as u32
    }

    /// Returns `true` if the range covers no layers.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Intersection with `other`, or `None` if they do not overlap.
    pub fn intersect(&self, other: HeightRange) -> Option<HeightRange> {
        let clamped = HeightRange::new(self.min.max(other.min), self.max.min(other.max));
        (!clamped.is_empty()).then_some(clamped)
    }
}

// ---------------------------------------------------------------------------
// Location / BoundingBox
// ---------------------------------------------------------------------------

/// A world-tagged position, as handed over by callers holding host handles.
#[derive(Clone, Debug, PartialEq)]
pub struct Location {
    pub world: WorldId,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Location {
    /// Creates a location in `world`.
    pub fn new(world: WorldId, x: f64, y: f64, z: f64) -> Self {
        Self { world, x, y, z }
    }

    /// The block this location falls into (floored on every axis).
    pub fn block(&self) -> VoxelCoord {
        VoxelCoord::new(
            self.x.floor() as i32,
            self.y.floor() as i32,
            self.z.floor() as i32,
        )
    }
}

/// Axis-aligned box in continuous world space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingBox {
    pub min: [f64; 3],
    pub max: [f64; 3],
}

impl BoundingBox {
    /// Builds a box from two arbitrary corners, sorting each axis.
    pub fn of(a: [f64; 3], b: [f64; 3]) -> Self {
        Self {
            min: [a[0].min(b[0]), a[1].min(b[1]), a[2].min(b[2])],
            max: [a[0].max(b[0]), a[1].max(b[1]), a[2].max(b[2])],
        }
    }

    /// Block containing the minimum corner.
    pub fn min_block(&self) -> VoxelCoord {
        floor_block(self.min)
    }

    /// Block containing the maximum corner.
    pub fn max_block(&self) -> VoxelCoord {
        floor_block(self.max)
    }
}

fn floor_block(p: [f64; 3]) -> VoxelCoord {
    VoxelCoord::new(p[0].floor() as i32, p[1].floor() as i32, p[2].floor() as i32)
}

// ---------------------------------------------------------------------------
// PointRange3D
// ---------------------------------------------------------------------------

/// Inclusive axis-aligned voxel range with `min <= max` on every axis,
/// whatever order the corners were given in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PointRange3D {
    min: VoxelCoord,
    max: VoxelCoord,
}

impl PointRange3D {
    /// Normalizes two corners into a range.
    pub fn of(a: VoxelCoord, b: VoxelCoord) -> Self {
        Self {
            min: VoxelCoord::new(a.x.min(b.x), a.y.min(b.y), a.z.min(b.z)),
            max: VoxelCoord::new(a.x.max(b.x), a.y.max(b.y), a.z.max(b.z)),
        }
    }

    /// Minimum corner.
    pub fn min(&self) -> VoxelCoord {
        self.min
    }

    /// Maximum corner (inclusive).
    pub fn max(&self) -> VoxelCoord {
        self.max
    }

    /// Returns `true` if `p` lies inside the range.
    pub fn contains(&self, p: VoxelCoord) -> bool {
        (self.min.x..=self.max.x).contains(&p.x)
            && (self.min.y..=self.max.y).contains(&p.y)
            && (self.min.z..=self.max.z).contains(&p.z)
    }

    /// Number of voxels covered, saturating at `u64::MAX` for ranges that
    /// span most of the `i32` domain on every axis.
    pub fn volume(&self) -> u64 {
        let span = |lo: i32, hi: i32| (i64::from(hi) - i64::from(lo) + 1) as u64;
        span(self.min.x, self.max.x)
            .saturating_mul(span(self.min.y, self.max.y))
            .saturating_mul(span(self.min.z, self.max.z))
    }

    /// Restricts the vertical span to a half-open height range.
    pub fn clamp_height(&self, heights: HeightRange) -> Option<PointRange3D> {
        let lo = self.min.y.max(heights.min);
        let hi = self.max.y.min(heights.max - 1);
        (lo <= hi).then(|| PointRange3D {
            min: VoxelCoord::new(self.min.x, lo, self.min.z),
            max: VoxelCoord::new(self.max.x, hi, self.max.z),
        })
    }

    /// Every voxel in the range, X outermost and Z innermost.
    pub fn voxels(self) -> impl Iterator<Item = VoxelCoord> {
        let (min, max) = (self.min, self.max);
        (min.x..=max.x).flat_map(move |x| {
            (min.y..=max.y).flat_map(move |y| (min.z..=max.z).map(move |z| VoxelCoord::new(x, y, z)))
        })
    }

    /// Every chunk column the range overlaps.
    pub fn chunks(self) -> impl Iterator<Item = ChunkPos> {
        let (lo, hi) = (self.min.chunk(), self.max.chunk());
        (lo.x..=hi.x).flat_map(move |x| (lo.z..=hi.z).map(move |z| ChunkPos::new(x, z)))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;

    #[test]
    fn test_grid_mapping_positive() {
        assert_eq!(VoxelCoord::new(0, 0, 0).to_grid(), GridCoord::new(0, 0, 0));
        assert_eq!(VoxelCoord::new(3, 7, 15).to_grid(), GridCoord::new(0, 1, 3));
        assert_eq!(VoxelCoord::new(15, 60, 4).to_grid(), GridCoord::new(3, 15, 1));
    }

    #[test]
    fn test_grid_mapping_floors_negative() {
        assert_eq!(VoxelCoord::new(-1, -1, -1).to_grid(), GridCoord::new(-1, -1, -1));
        assert_eq!(VoxelCoord::new(-4, -5, -8).to_grid(), GridCoord::new(-1, -2, -2));
        assert_eq!(VoxelCoord::new(-64, 0, 0).to_grid(), GridCoord::new(-16, 0, 0));
    }

    #[test]
    fn test_chunk_of_voxel_and_cell_agree() {
        for &(x, z) in &[(0, 0), (15, 15), (16, -1), (-17, 33), (-1, -16)] {
            let voxel = VoxelCoord::new(x, 64, z);
            assert_eq!(voxel.chunk(), voxel.to_grid().chunk(), "voxel {voxel}");
        }
        assert_eq!(VoxelCoord::new(-1, 0, 16).chunk(), ChunkPos::new(-1, 1));
    }

    #[test]
    fn test_height_range_intersect() {
        let world = HeightRange::new(-64, 320);
        assert_eq!(
            world.intersect(HeightRange::new(0, 400)),
            Some(HeightRange::new(0, 320))
        );
        assert_eq!(world.intersect(HeightRange::new(320, 400)), None);
        assert_eq!(world.len(), 384);
        assert!(HeightRange::new(5, 5).is_empty());
    }

    #[test]
    fn test_point_range_normalizes_corners() {
        let range = PointRange3D::of(VoxelCoord::new(10, -5, 3), VoxelCoord::new(-2, 7, 1));
        assert_eq!(range.min(), VoxelCoord::new(-2, -5, 1));
        assert_eq!(range.max(), VoxelCoord::new(10, 7, 3));
        assert_eq!(range.volume(), 13 * 13 * 3);
    }

    #[test]
    fn test_point_range_volume_saturates_on_extreme_corners() {
        let lo = VoxelCoord::new(i32::MIN, i32::MIN, i32::MIN);
        let hi = VoxelCoord::new(i32::MAX, i32::MAX, i32::MAX);
        assert_eq!(PointRange3D::of(lo, hi).volume(), u64::MAX);

        let slab = PointRange3D::of(VoxelCoord::new(i32::MIN, 0, 0), VoxelCoord::new(i32::MAX, 0, 0));
        assert_eq!(slab.volume(), 1 << 32);
    }

    #[test]
    fn test_point_range_iteration_independent_of_corner_order() {
        let a = VoxelCoord::new(3, 2, -1);
        let b = VoxelCoord::new(-1, 0, 2);
        let forward: BTreeSet<_> = PointRange3D::of(a, b).voxels().collect();
        let backward: BTreeSet<_> = PointRange3D::of(b, a).voxels().collect();
        assert_eq!(forward, backward);
        assert_eq!(forward.len() as u64, PointRange3D::of(a, b).volume());
        assert!(forward.iter().all(|v| PointRange3D::of(a, b).contains(*v)));
    }

    #[test]
    fn test_point_range_single_voxel() {
        let p = VoxelCoord::new(5, 5, 5);
        let voxels: Vec<_> = PointRange3D::of(p, p).voxels().collect();
        assert_eq!(voxels, vec![p]);
    }

    #[test]
    fn test_point_range_chunks_cover_negative_span() {
        let range = PointRange3D::of(VoxelCoord::new(-1, 0, 0), VoxelCoord::new(16, 0, 15));
        let chunks: Vec<_> = range.chunks().collect();
        assert_eq!(
            chunks,
            vec![ChunkPos::new(-1, 0), ChunkPos::new(0, 0), ChunkPos::new(1, 0)]
        );
    }

    #[test]
    fn test_clamp_height() {
        let range = PointRange3D::of(VoxelCoord::new(0, -100, 0), VoxelCoord::new(1, 500, 1));
        let clamped = range.clamp_height(HeightRange::new(-64, 320)).unwrap();
        assert_eq!(clamped.min().y, -64);
        assert_eq!(clamped.max().y, 319);

        let above = PointRange3D::of(VoxelCoord::new(0, 400, 0), VoxelCoord::new(0, 401, 0));
        assert!(above.clamp_height(HeightRange::new(-64, 320)).is_none());
    }

    #[test]
    fn test_bounding_box_floors_corners() {
        let bb = BoundingBox::of([4.5, 70.9, -0.5], [-3.2, 60.0, 8.0]);
        assert_eq!(bb.min_block(), VoxelCoord::new(-4, 60, -1));
        assert_eq!(bb.max_block(), VoxelCoord::new(4, 70, 8));
    }

    #[test]
    fn test_location_block() {
        let loc = Location::new(WorldId::new("w1"), -0.1, 64.99, 15.0);
        assert_eq!(loc.block(), VoxelCoord::new(-1, 64, 15));
    }

    #[test]
    fn test_chebyshev_distance() {
        let a = ChunkPos::new(0, 0);
        assert_eq!(a.chebyshev_distance(ChunkPos::new(3, -5)), 5);
        assert_eq!(a.chebyshev_distance(a), 0);
    }
}
