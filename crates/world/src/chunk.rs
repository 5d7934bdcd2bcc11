use glam::IVec3;
use std::fmt;

/// Chunk edge length in voxels (all three axes).
pub const CHUNK_SIZE: i32 = 16;
/// Total voxel count per chunk.
pub const CHUNK_VOLUME: usize = (CHUNK_SIZE * CHUNK_SIZE * CHUNK_SIZE) as usize;

/// Sea level. Open cells at or below it fill with water.
pub const WATER_LEVEL: i32 = 1;
/// Chunks starting at or above this Y belong to the sky realm.
pub const SKY_LEVEL: i32 = 256;
/// Chunks starting at or above this Y belong to space; also the vacuum ceiling.
pub const SPACE_LEVEL: i32 = 1024;
/// Chunks whose top is at or below this Y belong to the deep abyss.
pub const ABYSS_LEVEL: i32 = -128;

/// Chunk coordinate in chunk space.
/// Implements Ord for deterministic iteration in BTreeMap/BTreeSet (sorts by x, then y, then z).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
pub struct ChunkPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl ChunkPos {
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Chunk containing the given world position.
    pub fn containing(world: IVec3) -> Self {
        Self {
            x: world.x.div_euclid(CHUNK_SIZE),
            y: world.y.div_euclid(CHUNK_SIZE),
            z: world.z.div_euclid(CHUNK_SIZE),
        }
    }

    /// Smallest world position inside this chunk.
    #[inline]
    pub fn node_min(self) -> IVec3 {
        IVec3::new(self.x, self.y, self.z) * CHUNK_SIZE
    }

    /// Largest world position inside this chunk.
    #[inline]
    pub fn node_max(self) -> IVec3 {
        self.node_min() + IVec3::splat(CHUNK_SIZE - 1)
    }

    /// Centre voxel of the chunk.
    #[inline]
    pub fn center(self) -> IVec3 {
        self.node_min() + IVec3::splat(CHUNK_SIZE / 2)
    }

    /// Lateral neighbour at the given offset (same Y).
    #[inline]
    pub fn offset(self, dx: i32, dz: i32) -> Self {
        Self::new(self.x + dx, self.y, self.z + dz)
    }

    /// Minimum corner as a plain array, the form seed derivation takes.
    #[inline]
    pub fn node_min_array(self) -> [i32; 3] {
        self.node_min().to_array()
    }

    /// Whether a world position lies inside this chunk.
    pub fn contains(self, world: IVec3) -> bool {
        let min = self.node_min();
        let max = self.node_max();
        world.cmpge(min).all() && world.cmple(max).all()
    }
}

impl fmt::Display for ChunkPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}
