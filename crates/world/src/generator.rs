//! Chunk orchestrator: runs every pass over one halo-extended grid.

use crate::biome::{Biome, BiomeNeighbourhood};
use crate::chunk::{ChunkPos, WATER_LEVEL};
use crate::config::GeneratorConfig;
use crate::context::GenerationContext;
use crate::decoration::{place_boulders, place_ground_cover, place_trees};
use crate::dungeon::{dungeon_gate, generate_dungeon};
use crate::grid::{ColumnWalk, FlagField, VoxelArea, VoxelGrid};
use crate::heightmap::Heightmap;
use crate::minerals::seed_minerals;
use crate::noise::NoiseChannels;
use crate::palette::{Palette, PaletteError};
use crate::realms::{generate_abyss, generate_flat, generate_sky, generate_space};
use crate::soil::{layer_soil, paint_surface, SURFACE_MARGIN};
use crate::terrain::fill_terrain;
use glam::{IVec2, IVec3};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use tracing::{debug, instrument};
use voxgen_core::{scoped_rng, seed, ContentKey, ContentLookup, RealmKind};

/// Wetness at the chunk centre above which base rock is limestone.
pub const LIMESTONE_WETNESS: f64 = 0.5;

/// Counters collected while generating one chunk.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationStats {
    pub terrain_voxels: usize,
    pub minerals: usize,
    pub liquid_sources: usize,
    /// Voxels queued by the liquid boundary scan.
    pub liquid_boundary: usize,
    pub surface_voxels: usize,
    pub dungeon_rooms: u32,
    pub dungeon_corridors: u32,
    pub chests: u32,
    pub mossy_cobble: u32,
    pub trees: u32,
    pub stumps: u32,
    pub papyrus: u32,
    pub cacti: u32,
    pub bushes: u32,
    pub boulders: u32,
    pub ground_cover: u32,
    pub space_debris: usize,
    pub comets: u32,
}

/// Result of [`ChunkGenerator::make_block`]; the grid itself is filled in place.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationOutput {
    pub biome: Biome,
    /// Coordinates an external fluid stepper should look at first.
    pub liquid_queue: VecDeque<IVec3>,
    pub stats: GenerationStats,
}

/// Immutable per-world generator. Shareable across threads.
pub struct ChunkGenerator {
    config: GeneratorConfig,
    palette: Palette,
    channels: NoiseChannels,
}

impl ChunkGenerator {
    pub fn new(config: GeneratorConfig, palette: Palette) -> Self {
        let channels = NoiseChannels::new(config.seed);
        Self {
            config,
            palette,
            channels,
        }
    }

    /// Resolve content codes from an external registry.
    pub fn from_lookup(
        config: GeneratorConfig,
        lookup: &dyn ContentLookup,
    ) -> Result<Self, PaletteError> {
        Ok(Self::new(config, Palette::resolve(lookup)?))
    }

    /// Standard realm with the sequential default content table.
    pub fn with_default_table(seed: u64) -> Self {
        Self::new(GeneratorConfig::with_seed(seed), Palette::sequential())
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn channels(&self) -> &NoiseChannels {
        &self.channels
    }

    /// Biome a chunk resolves to, without generating it.
    pub fn biome_of(&self, pos: ChunkPos) -> Biome {
        match self.config.realm {
            RealmKind::Flat => Biome::Plains,
            RealmKind::Standard => crate::biome::classify_chunk_biome(&self.channels, pos),
        }
    }

    /// Per-call state for generating `pos` into `grid`.
    pub fn context<'a>(
        &'a self,
        pos: ChunkPos,
        grid: &'a mut VoxelGrid,
    ) -> GenerationContext<'a> {
        let (neighbourhood, heightmap, limestone) = match self.config.realm {
            RealmKind::Flat => (
                BiomeNeighbourhood::uniform(Biome::Plains),
                Heightmap::flat(pos, WATER_LEVEL as i16),
                false,
            ),
            RealmKind::Standard => {
                let neighbourhood = BiomeNeighbourhood::classify(&self.channels, pos);
                let heightmap = Heightmap::generate(&self.channels.ground_height, pos);
                let wet = self.channels.wetness.at(pos.center()) > LIMESTONE_WETNESS;
                let limestone = wet && neighbourhood.own() != Biome::Wastelands;
                (neighbourhood, heightmap, limestone)
            }
        };
        GenerationContext {
            seed: self.config.seed,
            pos,
            realm: self.config.realm,
            biome: neighbourhood.own(),
            neighbourhood,
            flags: FlagField::new(*grid.area()),
            grid,
            palette: &self.palette,
            channels: &self.channels,
            heightmap,
            limestone,
            liquid_queue: VecDeque::new(),
            stats: GenerationStats::default(),
        }
    }

    /// Generate the chunk at `pos` into `grid`, which must cover its halo.
    ///
    /// A chunk without a single unknown voxel is left untouched.
    #[instrument(skip(self, grid), fields(seed = self.config.seed, realm = %self.config.realm))]
    pub fn make_block(&self, pos: ChunkPos, grid: &mut VoxelGrid) -> GenerationOutput {
        let ignore = self.palette.id(ContentKey::Ignore);
        let has_unknown = VoxelArea::of_chunk(pos)
            .positions()
            .any(|p| grid.content(p) == Some(ignore));
        if !has_unknown {
            debug!(%pos, "chunk already generated");
            return GenerationOutput {
                biome: self.biome_of(pos),
                liquid_queue: VecDeque::new(),
                stats: GenerationStats::default(),
            };
        }

        let mut ctx = self.context(pos, grid);
        match (ctx.realm, ctx.biome) {
            (RealmKind::Flat, _) => {
                ctx.stats.terrain_voxels = generate_flat(&mut ctx);
            }
            (_, Biome::Space) => {
                let report = generate_space(&mut ctx);
                ctx.stats.space_debris = report.debris;
                ctx.stats.minerals = report.tagged;
                ctx.stats.comets = u32::from(report.comet.is_some());
            }
            (_, Biome::Sky) => {
                ctx.stats.terrain_voxels = generate_sky(&mut ctx);
            }
            (_, Biome::DeepAbyss) => {
                ctx.stats.terrain_voxels = generate_abyss(&mut ctx, self.config.caves);
            }
            _ => self.run_standard(&mut ctx),
        }

        debug!(biome = %ctx.biome, stats = ?ctx.stats, "chunk generated");
        GenerationOutput {
            biome: ctx.biome,
            liquid_queue: ctx.liquid_queue,
            stats: ctx.stats,
        }
    }

    fn run_standard(&self, ctx: &mut GenerationContext<'_>) {
        ctx.stats.terrain_voxels = fill_terrain(ctx, self.config.caves);
        if self.config.minerals {
            ctx.stats.minerals = seed_minerals(ctx, false);
        }
        ctx.stats.liquid_sources = layer_soil(ctx);

        if self.config.dungeons && dungeon_gate(ctx) {
            let report = generate_dungeon(ctx);
            ctx.stats.dungeon_rooms = report.rooms;
            ctx.stats.dungeon_corridors = report.corridors;
            ctx.stats.chests = report.chests;
            ctx.stats.mossy_cobble = report.mossy;
        }

        ctx.stats.liquid_boundary = scan_liquid_boundaries(ctx);

        let (bottom, top) = (ctx.node_min().y, ctx.node_max().y);
        if !ctx.heightmap.near_ground(bottom, top, SURFACE_MARGIN) {
            return;
        }
        ctx.stats.surface_voxels = paint_surface(ctx);
        if !self.config.decorations {
            return;
        }
        let mut rng = scoped_rng(seed::decoration_seed(ctx.seed, ctx.pos.node_min_array()));
        ctx.stats.boulders = place_boulders(ctx, &mut rng);
        let trees = place_trees(ctx, &mut rng);
        ctx.stats.trees = trees.trees;
        ctx.stats.stumps = trees.stumps;
        ctx.stats.papyrus = trees.papyrus;
        ctx.stats.cacti = trees.cacti;
        ctx.stats.bushes = trees.bushes;
        ctx.stats.ground_cover = place_ground_cover(ctx, &mut rng);
    }
}

/// Queue the top and bottom voxel of every liquid run in each column.
///
/// A run also ends where the column meets an unknown voxel, so liquid next
/// to ungenerated space is queued too. Returns how many were queued.
pub fn scan_liquid_boundaries(ctx: &mut GenerationContext<'_>) -> usize {
    let min = ctx.node_min();
    let max = ctx.node_max();
    let ignore = ctx.id(ContentKey::Ignore);
    let before = ctx.liquid_queue.len();

    let columns: Vec<IVec2> = ctx.chunk_area().columns().collect();
    for column in columns {
        let mut was_unknown = true;
        let mut was_liquid = false;
        let mut was_pushed = false;
        for p in ColumnWalk::down(column, max.y, min.y) {
            let content = ctx.content(p);
            let is_unknown = content == ignore;
            let is_liquid = ctx.palette.is_liquid(content);
            if is_unknown || was_unknown || is_liquid != was_liquid {
                if was_liquid && !was_pushed {
                    ctx.push_liquid(p + IVec3::Y);
                }
                if is_liquid {
                    ctx.push_liquid(p);
                }
                was_pushed = is_liquid;
            } else {
                was_pushed = false;
            }
            was_unknown = is_unknown;
            was_liquid = is_liquid;
        }
        if was_liquid && !was_pushed {
            ctx.push_liquid(IVec3::new(column.x, min.y, column.y));
        }
    }
    ctx.liquid_queue.len() - before
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::VoxelGrid;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn generator_is_shareable() {
        assert_send_sync::<ChunkGenerator>();
    }

    #[test]
    fn generated_chunk_has_no_unknown_voxels() {
        let generator = ChunkGenerator::with_default_table(12_345);
        let pos = ChunkPos::new(1, 0, -2);
        let ignore = generator.palette().voxel(ContentKey::Ignore);
        let mut grid = VoxelGrid::for_chunk(pos, ignore);
        let output = generator.make_block(pos, &mut grid);

        assert!(!output.biome.is_altitude_band());
        assert_eq!(output.stats.terrain_voxels, 16 * 16 * 16);
        for p in VoxelArea::of_chunk(pos).positions() {
            assert_ne!(grid.get(p), Some(ignore), "unknown voxel left at {p}");
        }
    }

    #[test]
    fn second_call_is_a_no_op() {
        let generator = ChunkGenerator::with_default_table(3);
        let pos = ChunkPos::new(0, 0, 0);
        let mut grid = VoxelGrid::for_chunk(pos, generator.palette().voxel(ContentKey::Ignore));
        let first = generator.make_block(pos, &mut grid);
        let snapshot = grid.clone();
        let second = generator.make_block(pos, &mut grid);
        assert_eq!(grid, snapshot);
        assert_eq!(second.biome, first.biome);
        assert!(second.liquid_queue.is_empty());
        assert_eq!(second.stats, GenerationStats::default());
    }

    #[test]
    fn flat_realm_ignores_noise() {
        let config = GeneratorConfig {
            realm: RealmKind::Flat,
            ..GeneratorConfig::with_seed(99)
        };
        let generator = ChunkGenerator::new(config, Palette::sequential());
        let pos = ChunkPos::new(5, 0, 5);
        let mut grid = VoxelGrid::for_chunk(pos, generator.palette().voxel(ContentKey::Ignore));
        let output = generator.make_block(pos, &mut grid);
        assert_eq!(output.biome, Biome::Plains);
        assert_eq!(output.stats.dungeon_rooms, 0);
        let top = IVec3::new(85, WATER_LEVEL, 90);
        assert_eq!(grid.content(top), Some(generator.palette().id(ContentKey::Grass)));
    }

    #[test]
    fn liquid_scan_queues_run_ends() {
        let generator = ChunkGenerator::with_default_table(1);
        let pos = ChunkPos::new(0, 0, 0);
        let palette = generator.palette().clone();
        let mut grid = VoxelGrid::for_chunk(pos, palette.voxel(ContentKey::Stone));
        for y in 4..=9 {
            grid.set(IVec3::new(2, y, 3), palette.voxel(ContentKey::WaterSource));
        }
        let mut ctx = generator.context(pos, &mut grid);
        let queued = scan_liquid_boundaries(&mut ctx);
        let queue: Vec<IVec3> = ctx.liquid_queue.iter().copied().collect();
        assert_eq!(queued, 2);
        assert!(queue.contains(&IVec3::new(2, 9, 3)));
        assert!(queue.contains(&IVec3::new(2, 4, 3)));
    }

    #[test]
    fn disabled_passes_stay_silent() {
        let config = GeneratorConfig {
            minerals: false,
            dungeons: false,
            decorations: false,
            ..GeneratorConfig::with_seed(2024)
        };
        let generator = ChunkGenerator::new(config, Palette::sequential());
        for x in -2..2 {
            let pos = ChunkPos::new(x, 0, 1);
            let mut grid = VoxelGrid::for_chunk(pos, generator.palette().voxel(ContentKey::Ignore));
            let stats = generator.make_block(pos, &mut grid).stats;
            assert_eq!(stats.minerals, 0);
            assert_eq!(stats.dungeon_rooms, 0);
            assert_eq!(stats.trees + stats.boulders + stats.ground_cover, 0);
            assert!(grid.voxels().iter().all(|v| v.param1 == 0));
        }
    }
}
