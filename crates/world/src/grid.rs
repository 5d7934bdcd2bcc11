//! Halo-extended voxel grid and the transient per-call flag field.
//!
//! The grid is an owned arena addressed by world position; every access is
//! bounds-checked. Reads outside the area yield `None` and writes outside
//! the area are skipped, so stamps that cross the halo simply clip.

use crate::chunk::{ChunkPos, CHUNK_SIZE};
use glam::{IVec2, IVec3};
use voxgen_core::{ContentId, Voxel};

/// Inclusive axis-aligned box of world positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VoxelArea {
    min: IVec3,
    max: IVec3,
}

impl VoxelArea {
    /// Box spanning `min..=max` on every axis.
    pub fn new(min: IVec3, max: IVec3) -> Self {
        debug_assert!(min.cmple(max).all(), "inverted area {min}..{max}");
        Self { min, max }
    }

    /// The chunk itself, without halo.
    pub fn of_chunk(pos: ChunkPos) -> Self {
        Self::new(pos.node_min(), pos.node_max())
    }

    /// The chunk plus a one-chunk halo on every side.
    pub fn with_halo(pos: ChunkPos) -> Self {
        Self::new(
            pos.node_min() - IVec3::splat(CHUNK_SIZE),
            pos.node_max() + IVec3::splat(CHUNK_SIZE),
        )
    }

    #[inline]
    pub fn min(&self) -> IVec3 {
        self.min
    }

    #[inline]
    pub fn max(&self) -> IVec3 {
        self.max
    }

    /// Edge lengths in voxels.
    #[inline]
    pub fn extent(&self) -> IVec3 {
        self.max - self.min + IVec3::ONE
    }

    pub fn volume(&self) -> usize {
        let e = self.extent();
        e.x as usize * e.y as usize * e.z as usize
    }

    #[inline]
    pub fn contains(&self, p: IVec3) -> bool {
        p.cmpge(self.min).all() && p.cmple(self.max).all()
    }

    /// Linear index of `p`, z-major then y then x.
    #[inline]
    pub fn index(&self, p: IVec3) -> Option<usize> {
        if !self.contains(p) {
            return None;
        }
        let e = self.extent();
        let d = p - self.min;
        Some((d.z as usize * e.y as usize + d.y as usize) * e.x as usize + d.x as usize)
    }

    /// Overlap of two areas, if any.
    pub fn intersect(&self, other: &VoxelArea) -> Option<VoxelArea> {
        let min = self.min.max(other.min);
        let max = self.max.min(other.max);
        min.cmple(max).all().then(|| VoxelArea::new(min, max))
    }

    /// Every position in index order.
    pub fn positions(&self) -> impl Iterator<Item = IVec3> {
        let (min, max) = (self.min, self.max);
        (min.z..=max.z).flat_map(move |z| {
            (min.y..=max.y).flat_map(move |y| (min.x..=max.x).map(move |x| IVec3::new(x, y, z)))
        })
    }

    /// Every (x, z) column in the area.
    pub fn columns(&self) -> impl Iterator<Item = IVec2> {
        let (min, max) = (self.min, self.max);
        (min.z..=max.z).flat_map(move |z| (min.x..=max.x).map(move |x| IVec2::new(x, z)))
    }
}

/// Top-down walk over one column, from `top` to `bottom` inclusive.
///
/// Holds no borrow of the grid, so callers may mutate while walking; clone it
/// to restart.
#[derive(Debug, Clone)]
pub struct ColumnWalk {
    column: IVec2,
    next_y: i32,
    bottom: i32,
}

impl ColumnWalk {
    pub fn down(column: IVec2, top: i32, bottom: i32) -> Self {
        Self {
            column,
            next_y: top,
            bottom,
        }
    }
}

impl Iterator for ColumnWalk {
    type Item = IVec3;

    fn next(&mut self) -> Option<IVec3> {
        if self.next_y < self.bottom {
            return None;
        }
        let p = IVec3::new(self.column.x, self.next_y, self.column.y);
        self.next_y -= 1;
        Some(p)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = (self.next_y - self.bottom + 1).max(0) as usize;
        (n, Some(n))
    }
}

impl ExactSizeIterator for ColumnWalk {}

/// Mutable, bounds-checked voxel storage over a [`VoxelArea`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoxelGrid {
    area: VoxelArea,
    voxels: Vec<Voxel>,
}

impl VoxelGrid {
    /// Allocate a grid filled with `fill`.
    pub fn new(area: VoxelArea, fill: Voxel) -> Self {
        Self {
            voxels: vec![fill; area.volume()],
            area,
        }
    }

    /// Allocate the halo-extended grid for one chunk.
    pub fn for_chunk(pos: ChunkPos, fill: Voxel) -> Self {
        Self::new(VoxelArea::with_halo(pos), fill)
    }

    #[inline]
    pub fn area(&self) -> &VoxelArea {
        &self.area
    }

    #[inline]
    pub fn get(&self, p: IVec3) -> Option<Voxel> {
        self.area.index(p).map(|i| self.voxels[i])
    }

    #[inline]
    pub fn content(&self, p: IVec3) -> Option<ContentId> {
        self.get(p).map(|v| v.content)
    }

    /// Write a voxel; returns `false` when `p` is outside the area.
    #[inline]
    pub fn set(&mut self, p: IVec3, voxel: Voxel) -> bool {
        match self.area.index(p) {
            Some(i) => {
                self.voxels[i] = voxel;
                true
            }
            None => false,
        }
    }

    /// Replace the content and reset both auxiliary bytes.
    #[inline]
    pub fn set_content(&mut self, p: IVec3, content: ContentId) -> bool {
        self.set(p, Voxel::new(content))
    }

    #[inline]
    pub fn get_mut(&mut self, p: IVec3) -> Option<&mut Voxel> {
        self.area.index(p).map(move |i| &mut self.voxels[i])
    }

    /// Raw storage in index order.
    pub fn voxels(&self) -> &[Voxel] {
        &self.voxels
    }
}

bitflags::bitflags! {
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    /// Generation-only marks; never part of persisted voxel state.
    pub struct GenFlags: u8 {
        /// Carved by the dungeon generator.
        const DUNGEON_INSIDE = 0b0000_0001;
        /// Natural air or water the dungeon generator must leave alone.
        const DUNGEON_PRESERVE = 0b0000_0010;
        /// Already in the liquid-boundary queue.
        const LIQUID_QUEUED = 0b0000_0100;
        /// Anything the dungeon walls must not replace.
        const DUNGEON_UNTOUCHABLE = Self::DUNGEON_INSIDE.bits() | Self::DUNGEON_PRESERVE.bits();
    }
}

/// Flag bitset parallel to a grid, scoped to one generation call.
#[derive(Debug, Clone)]
pub struct FlagField {
    area: VoxelArea,
    flags: Vec<GenFlags>,
}

impl FlagField {
    pub fn new(area: VoxelArea) -> Self {
        Self {
            flags: vec![GenFlags::empty(); area.volume()],
            area,
        }
    }

    /// Flags at `p`; empty outside the area.
    #[inline]
    pub fn get(&self, p: IVec3) -> GenFlags {
        self.area
            .index(p)
            .map(|i| self.flags[i])
            .unwrap_or_default()
    }

    #[inline]
    pub fn insert(&mut self, p: IVec3, flags: GenFlags) {
        if let Some(i) = self.area.index(p) {
            self.flags[i].insert(flags);
        }
    }

    /// Whether any of `flags` is set at `p`.
    #[inline]
    pub fn intersects(&self, p: IVec3, flags: GenFlags) -> bool {
        self.get(p).intersects(flags)
    }
}
