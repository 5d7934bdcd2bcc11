//! Per-call generation state.

use crate::biome::{blend_biome_at_column, Biome, BiomeNeighbourhood};
use crate::chunk::ChunkPos;
use crate::generator::GenerationStats;
use crate::grid::{FlagField, GenFlags, VoxelArea, VoxelGrid};
use crate::heightmap::Heightmap;
use crate::noise::NoiseChannels;
use crate::palette::Palette;
use glam::{IVec2, IVec3};
use std::collections::VecDeque;
use voxgen_core::{ContentId, ContentKey, RealmKind};

/// Everything one `make_block` call reads and writes.
///
/// Built by the generator, threaded through every pass, then consumed into
/// the call's output. The flag field lives and dies here.
pub struct GenerationContext<'a> {
    pub seed: u64,
    pub pos: ChunkPos,
    pub realm: RealmKind,
    pub biome: Biome,
    pub neighbourhood: BiomeNeighbourhood,
    pub grid: &'a mut VoxelGrid,
    pub flags: FlagField,
    pub palette: &'a Palette,
    pub channels: &'a NoiseChannels,
    pub heightmap: Heightmap,
    /// Base rock of this chunk is limestone instead of stone.
    pub limestone: bool,
    pub liquid_queue: VecDeque<IVec3>,
    pub stats: GenerationStats,
}

impl<'a> GenerationContext<'a> {
    #[inline]
    pub fn node_min(&self) -> IVec3 {
        self.pos.node_min()
    }

    #[inline]
    pub fn node_max(&self) -> IVec3 {
        self.pos.node_max()
    }

    /// The target chunk without halo.
    pub fn chunk_area(&self) -> VoxelArea {
        VoxelArea::of_chunk(self.pos)
    }

    #[inline]
    pub fn id(&self, key: ContentKey) -> ContentId {
        self.palette.id(key)
    }

    /// Stone or limestone, depending on the chunk.
    #[inline]
    pub fn base_rock(&self) -> ContentId {
        if self.limestone {
            self.id(ContentKey::Limestone)
        } else {
            self.id(ContentKey::Stone)
        }
    }

    /// Content at `p`, or the unknown marker outside the grid.
    #[inline]
    pub fn content(&self, p: IVec3) -> ContentId {
        self.grid
            .content(p)
            .unwrap_or_else(|| self.id(ContentKey::Ignore))
    }

    #[inline]
    pub fn is(&self, p: IVec3, key: ContentKey) -> bool {
        self.grid.content(p) == Some(self.id(key))
    }

    /// Carved by the dungeon generator during this call.
    #[inline]
    pub fn is_dungeon_inside(&self, p: IVec3) -> bool {
        self.flags.intersects(p, GenFlags::DUNGEON_INSIDE)
    }

    /// Biome that governs surface and decoration rules at a column.
    pub fn column_biome(&self, column: IVec2) -> Biome {
        blend_biome_at_column(self.seed, self.pos, &self.neighbourhood, column)
    }

    /// Ground height of a column of the target chunk.
    pub fn ground_at(&self, column: IVec2) -> i32 {
        self.heightmap
            .at_column(column)
            .map(i32::from)
            .unwrap_or_else(|| self.heightmap.avg_height())
    }

    /// Write a decoration voxel if the target is open and not dungeon interior.
    ///
    /// Open means air or unknown, plus water when `into_water` is set.
    /// Positions outside the grid are clipped.
    pub fn place_decoration(&mut self, p: IVec3, key: ContentKey, into_water: bool) -> bool {
        let Some(content) = self.grid.content(p) else {
            return false;
        };
        let open = content == self.id(ContentKey::Air)
            || content == self.id(ContentKey::Ignore)
            || (into_water && content == self.id(ContentKey::WaterSource));
        if !open || self.is_dungeon_inside(p) {
            return false;
        }
        let id = self.id(key);
        self.grid.set_content(p, id)
    }

    /// Queue a voxel for the external fluid stepper, at most once per call.
    ///
    /// Positions outside the grid are dropped.
    pub fn push_liquid(&mut self, p: IVec3) -> bool {
        if !self.grid.area().contains(p) || self.flags.intersects(p, GenFlags::LIQUID_QUEUED) {
            return false;
        }
        self.flags.insert(p, GenFlags::LIQUID_QUEUED);
        self.liquid_queue.push_back(p);
        true
    }
}
