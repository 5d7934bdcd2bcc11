//! Soil refinement and surface painting.
//!
//! The first pass runs right after the terrain fill and turns base rock into
//! loose soil or liquid pockets from the crumbleness and wetness fields. The
//! surface pass runs last-but-decoration and recolours the topmost ground
//! run of each column by biome.

use crate::context::GenerationContext;
use crate::grid::ColumnWalk;
use crate::noise::NoiseBuffer;
use glam::IVec3;
use tracing::{debug, instrument};
use voxgen_core::{seed, seed::salt, ContentKey, Voxel};

/// Depth of the biome-textured band: top material plus sub-soil.
pub const SURFACE_TEXTURE_DEPTH: i32 = 4;
/// Total depth recoloured below the surface; the rest of the run is mud.
pub const SURFACE_REPLACE_DEPTH: i32 = 8;
/// Chunks farther than this from the ground band skip surface work.
pub const SURFACE_MARGIN: i32 = 5;

/// Crumbleness below which base rock becomes a liquid source.
///
/// Rises from -1.6 at the surface to -1.2 at 128 below it.
pub fn liquid_threshold(y: i32) -> f64 {
    -1.6 + (-y).clamp(0, 128) as f64 / 128.0 * 0.4
}

/// Whether a liquid source in a non-limestone chunk at chunk-Y `block_y`
/// becomes lava rather than water.
///
/// `16 / block_y` truncates toward zero; shallow chunks are mostly water and
/// from chunk-Y -17 down every source is lava.
pub fn is_lava(limestone: bool, block_y: i32, hash: u32) -> bool {
    if limestone || block_y >= -1 {
        return false;
    }
    let water_odds = -(16 / block_y);
    (hash % 16) as i32 >= water_odds
}

/// What the first pass turns a base-rock voxel into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoilKind {
    Keep,
    Mud,
    Sand,
    Gravel,
    Liquid,
}

pub fn soil_for(crumbleness: f64, wetness: f64, y: i32) -> SoilKind {
    if crumbleness > 1.3 {
        if wetness > 0.0 {
            SoilKind::Mud
        } else {
            SoilKind::Sand
        }
    } else if crumbleness > 0.7 && wetness < -0.6 {
        SoilKind::Gravel
    } else if crumbleness < liquid_threshold(y) {
        SoilKind::Liquid
    } else {
        SoilKind::Keep
    }
}

/// First pass over the target chunk. Returns how many liquid sources were made.
#[instrument(skip(ctx), fields(pos = %ctx.pos))]
pub fn layer_soil(ctx: &mut GenerationContext<'_>) -> usize {
    let min = ctx.node_min();
    let max = ctx.node_max();
    let crumbleness = NoiseBuffer::new(
        &ctx.channels.crumbleness,
        min,
        max,
        NoiseBuffer::DEFAULT_SPACING,
    );
    let wetness = NoiseBuffer::new(&ctx.channels.wetness, min, max, NoiseBuffer::DEFAULT_SPACING);
    let liquids = refine_rock(ctx, |p| (crumbleness.get(p), wetness.get(p)));
    debug!(liquids, "soil layered");
    liquids
}

/// Rewrite base rock from `(crumbleness, wetness)` samples and queue the
/// 3x3x3 neighbourhood of every liquid source.
fn refine_rock(
    ctx: &mut GenerationContext<'_>,
    mut sample: impl FnMut(IVec3) -> (f64, f64),
) -> usize {
    let min = ctx.node_min();
    let max = ctx.node_max();
    let lava_seed = seed::lattice_seed(seed::channel_seed(ctx.seed, salt::LAVA));

    let mud = ctx.palette.voxel(ContentKey::Mud);
    let sand = ctx.palette.voxel(ContentKey::Sand);
    let gravel = ctx.palette.voxel(ContentKey::Gravel);
    let water = ctx.palette.voxel(ContentKey::WaterSource);
    let lava = ctx.palette.voxel(ContentKey::LavaSource);

    let mut liquids = 0;
    for column in ctx.chunk_area().columns() {
        for p in ColumnWalk::down(column, max.y, min.y) {
            let is_rock = ctx
                .grid
                .content(p)
                .is_some_and(|c| ctx.palette.is_base_rock(c));
            if !is_rock {
                continue;
            }
            let (crumbleness, wetness) = sample(p);
            let voxel = match soil_for(crumbleness, wetness, p.y) {
                SoilKind::Keep => continue,
                SoilKind::Mud => mud,
                SoilKind::Sand => sand,
                SoilKind::Gravel => gravel,
                SoilKind::Liquid => {
                    let hash = seed::position_hash(p.x, p.y, p.z, lava_seed);
                    liquids += 1;
                    for dz in -1..=1 {
                        for dy in -1..=1 {
                            for dx in -1..=1 {
                                ctx.push_liquid(p + IVec3::new(dx, dy, dz));
                            }
                        }
                    }
                    if is_lava(ctx.limestone, ctx.pos.y, hash) {
                        lava
                    } else {
                        water
                    }
                }
            };
            ctx.grid.set(p, voxel);
        }
    }
    liquids
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Walk {
    Searching { above_open: bool },
    Painting { depth: i32 },
    Below,
}

/// Surface pass over the target chunk. Returns how many voxels were recoloured.
#[instrument(skip(ctx), fields(pos = %ctx.pos))]
pub fn paint_surface(ctx: &mut GenerationContext<'_>) -> usize {
    let min = ctx.node_min();
    let max = ctx.node_max();
    let area = ctx.chunk_area();
    let air = ctx.id(ContentKey::Air);
    let water = ctx.id(ContentKey::WaterSource);
    let mud = ctx.id(ContentKey::Mud);
    let rock = ctx.base_rock();

    let mut painted = 0;
    for column in area.columns() {
        let biome = ctx.column_biome(column);
        let mut state = Walk::Searching { above_open: false };
        let mut underwater = false;

        for p in ColumnWalk::down(column, max.y + 2, min.y) {
            let content = ctx.content(p);
            if ctx.is_dungeon_inside(p) {
                state = match state {
                    Walk::Searching { .. } => Walk::Searching { above_open: false },
                    _ => Walk::Below,
                };
                continue;
            }
            let ground = ctx.palette.is_ground(content);

            state = match state {
                Walk::Searching { above_open } => {
                    if ground && above_open {
                        underwater = ctx.content(p + IVec3::Y) == water;
                        Walk::Painting { depth: 0 }
                    } else {
                        Walk::Searching {
                            above_open: content == air || content == water,
                        }
                    }
                }
                other => other,
            };

            match state {
                Walk::Searching { .. } => {}
                Walk::Painting { depth } => {
                    if !ground || depth >= SURFACE_REPLACE_DEPTH {
                        state = Walk::Below;
                        if content == mud && area.contains(p) {
                            ctx.grid.set_content(p, rock);
                        }
                        continue;
                    }
                    let key = if depth == 0 {
                        let top = biome.surface_top();
                        if underwater && ctx.palette.is_mud_family(ctx.id(top)) {
                            ContentKey::Mud
                        } else {
                            top
                        }
                    } else if depth < SURFACE_TEXTURE_DEPTH {
                        biome.subsoil()
                    } else {
                        ContentKey::Mud
                    };
                    let id = ctx.id(key);
                    if area.contains(p) && ctx.grid.set(p, Voxel::new(id)) {
                        painted += 1;
                    }
                    state = Walk::Painting { depth: depth + 1 };
                }
                Walk::Below => {
                    if content == mud && area.contains(p) {
                        ctx.grid.set_content(p, rock);
                    }
                }
            }
        }
    }
    debug!(painted, "surface painted");
    painted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::biome::{Biome, BiomeNeighbourhood};
    use crate::chunk::ChunkPos;
    use crate::generator::ChunkGenerator;
    use crate::grid::{GenFlags, VoxelArea, VoxelGrid};
    use std::collections::HashSet;

    #[test]
    fn test_soil_rules() {
        assert_eq!(soil_for(1.5, 0.2, 0), SoilKind::Mud);
        assert_eq!(soil_for(1.5, -0.2, 0), SoilKind::Sand);
        assert_eq!(soil_for(1.0, -0.7, 0), SoilKind::Gravel);
        assert_eq!(soil_for(1.0, -0.5, 0), SoilKind::Keep);
        assert_eq!(soil_for(-1.7, 0.0, 0), SoilKind::Liquid);
        assert_eq!(soil_for(-1.5, 0.0, 0), SoilKind::Keep);
        assert_eq!(soil_for(-1.5, 0.0, -128), SoilKind::Liquid);
    }

    #[test]
    fn test_liquid_threshold_deepens() {
        assert_eq!(liquid_threshold(10), -1.6);
        assert_eq!(liquid_threshold(0), -1.6);
        assert!((liquid_threshold(-64) - -1.4).abs() < 1e-12);
        assert!((liquid_threshold(-500) - -1.2).abs() < 1e-12);
    }

    #[test]
    fn test_lava_selector_truncates() {
        // Limestone and shallow chunks never make lava.
        assert!(!is_lava(true, -50, 15));
        assert!(!is_lava(false, -1, 15));
        assert!(!is_lava(false, 3, 15));
        // -(16 / -2) == 8: hashes 0..8 stay water.
        assert!(!is_lava(false, -2, 7));
        assert!(is_lava(false, -2, 8));
        // -(16 / -3) == 5 after truncation.
        assert!(!is_lava(false, -3, 4));
        assert!(is_lava(false, -3, 5));
        // Below chunk-Y -16 the odds truncate to zero.
        assert!(is_lava(false, -17, 0));
        assert!(!is_lava(false, -16, 0));
    }

    fn column_grid(
        generator: &ChunkGenerator,
        pos: ChunkPos,
        surface_y: i32,
        water_top: Option<i32>,
    ) -> VoxelGrid {
        let p = generator.palette();
        let mut grid = VoxelGrid::for_chunk(pos, p.voxel(ContentKey::Air));
        for at in grid.area().positions().collect::<Vec<_>>() {
            if at.y <= surface_y {
                grid.set(at, p.voxel(ContentKey::Stone));
            } else if water_top.is_some_and(|top| at.y <= top) {
                grid.set(at, p.voxel(ContentKey::WaterSource));
            }
        }
        grid
    }

    #[test]
    fn test_surface_layers() {
        let generator = ChunkGenerator::with_default_table(1);
        let pos = ChunkPos::new(0, 0, 0);
        let mut grid = column_grid(&generator, pos, 10, None);
        let mut ctx = generator.context(pos, &mut grid);
        ctx.neighbourhood = BiomeNeighbourhood::uniform(Biome::Forest);
        ctx.limestone = false;
        let painted = paint_surface(&mut ctx);
        drop(ctx);
        assert_eq!(painted, 16 * 16 * SURFACE_REPLACE_DEPTH as usize);

        let p = generator.palette();
        let at = |y| grid.content(IVec3::new(4, y, 9)).unwrap();
        assert_eq!(at(11), p.id(ContentKey::Air));
        assert_eq!(at(10), p.id(ContentKey::Grass));
        for y in 7..10 {
            assert_eq!(at(y), p.id(ContentKey::Mud));
        }
        for y in 3..7 {
            assert_eq!(at(y), p.id(ContentKey::Mud));
        }
        assert_eq!(at(2), p.id(ContentKey::Stone));
    }

    #[test]
    fn test_surface_underwater_uses_mud_top() {
        let generator = ChunkGenerator::with_default_table(1);
        let pos = ChunkPos::new(0, 0, 0);
        let mut grid = column_grid(&generator, pos, 3, Some(8));
        let mut ctx = generator.context(pos, &mut grid);
        ctx.neighbourhood = BiomeNeighbourhood::uniform(Biome::Plains);
        paint_surface(&mut ctx);
        drop(ctx);
        let p = generator.palette();
        assert_eq!(grid.content(IVec3::new(0, 3, 0)), Some(p.id(ContentKey::Mud)));
    }

    #[test]
    fn test_desert_texture_band_and_stray_mud() {
        let generator = ChunkGenerator::with_default_table(1);
        let pos = ChunkPos::new(0, 0, 0);
        let mut grid = column_grid(&generator, pos, 12, None);
        let p = generator.palette().clone();
        let stray = IVec3::new(5, 1, 5);
        grid.set(stray, p.voxel(ContentKey::Mud));
        let mut ctx = generator.context(pos, &mut grid);
        ctx.neighbourhood = BiomeNeighbourhood::uniform(Biome::Desert);
        ctx.limestone = false;
        paint_surface(&mut ctx);
        drop(ctx);
        let at = |y| grid.content(IVec3::new(5, y, 5)).unwrap();
        for y in 9..=12 {
            assert_eq!(at(y), p.id(ContentKey::DesertSand));
        }
        assert_eq!(at(8), p.id(ContentKey::Mud));
        assert_eq!(at(1), p.id(ContentKey::Stone));
    }

    #[test]
    fn test_surface_skips_dungeon_voxels() {
        let generator = ChunkGenerator::with_default_table(1);
        let pos = ChunkPos::new(0, 0, 0);
        let mut grid = column_grid(&generator, pos, 10, None);
        let p = generator.palette().clone();
        let mut ctx = generator.context(pos, &mut grid);
        ctx.neighbourhood = BiomeNeighbourhood::uniform(Biome::Forest);
        let carved = IVec3::new(2, 10, 2);
        ctx.flags.insert(carved, GenFlags::DUNGEON_INSIDE);
        paint_surface(&mut ctx);
        assert_eq!(ctx.grid.content(carved), Some(p.id(ContentKey::Stone)));
        assert_eq!(
            ctx.grid.content(IVec3::new(3, 10, 2)),
            Some(p.id(ContentKey::Grass))
        );
    }

    fn wet_box(p: IVec3, lo: IVec3, hi: IVec3) -> (f64, f64) {
        if p.cmpge(lo).all() && p.cmple(hi).all() {
            (-2.0, 0.0)
        } else {
            (0.0, 0.0)
        }
    }

    #[test]
    fn test_liquid_sources_queue_their_neighbourhood_once() {
        let generator = ChunkGenerator::with_default_table(1);
        let pos = ChunkPos::new(0, -20, 0);
        let palette = generator.palette().clone();
        let mut grid = VoxelGrid::for_chunk(pos, palette.voxel(ContentKey::Stone));
        let mut ctx = generator.context(pos, &mut grid);
        ctx.limestone = false;
        let lo = pos.node_min() + IVec3::new(4, 4, 4);
        let hi = lo + IVec3::new(2, 1, 0);
        assert!(ctx.liquid_queue.is_empty());

        let sources = refine_rock(&mut ctx, |p| wet_box(p, lo, hi));
        assert_eq!(sources, 3 * 2);

        // Chunk-Y -20 is deep enough that every source is lava.
        let lava = palette.id(ContentKey::LavaSource);
        let stone = palette.id(ContentKey::Stone);
        for p in VoxelArea::of_chunk(pos).positions() {
            let inside = p.cmpge(lo).all() && p.cmple(hi).all();
            let expected = if inside { lava } else { stone };
            assert_eq!(ctx.grid.content(p), Some(expected), "at {p}");
        }

        let expected = VoxelArea::new(lo - IVec3::ONE, hi + IVec3::ONE);
        assert_eq!(ctx.liquid_queue.len(), expected.volume());
        assert!(expected.positions().all(|p| ctx.liquid_queue.contains(&p)));
        let unique: HashSet<_> = ctx.liquid_queue.iter().collect();
        assert_eq!(unique.len(), ctx.liquid_queue.len());
    }

    #[test]
    fn test_limestone_sources_are_always_water() {
        let generator = ChunkGenerator::with_default_table(1);
        let pos = ChunkPos::new(0, -20, 0);
        let palette = generator.palette().clone();
        let mut grid = VoxelGrid::for_chunk(pos, palette.voxel(ContentKey::Limestone));
        let mut ctx = generator.context(pos, &mut grid);
        ctx.limestone = true;
        let lo = pos.node_min() + IVec3::new(1, 1, 1);
        let hi = lo + IVec3::new(9, 9, 9);

        let sources = refine_rock(&mut ctx, |p| wet_box(p, lo, hi));
        assert_eq!(sources, 1000);
        let lava = palette.id(ContentKey::LavaSource);
        let water = palette.id(ContentKey::WaterSource);
        let mut watered = 0;
        for p in VoxelArea::of_chunk(pos).positions() {
            assert_ne!(ctx.grid.content(p), Some(lava), "lava at {p}");
            watered += usize::from(ctx.grid.content(p) == Some(water));
        }
        assert_eq!(watered, 1000);
    }

    #[test]
    fn test_each_call_starts_a_fresh_queue() {
        let generator = ChunkGenerator::with_default_table(1);
        let pos = ChunkPos::new(0, -3, 0);
        let palette = generator.palette().clone();
        let lo = pos.node_min() + IVec3::new(8, 8, 8);
        let run = || {
            let mut grid = VoxelGrid::for_chunk(pos, palette.voxel(ContentKey::Stone));
            let mut ctx = generator.context(pos, &mut grid);
            assert!(ctx.liquid_queue.is_empty());
            refine_rock(&mut ctx, |p| wet_box(p, lo, lo));
            ctx.liquid_queue.iter().copied().collect::<Vec<_>>()
        };
        let first = run();
        assert_eq!(first.len(), 27);
        assert_eq!(first, run());
    }

    #[test]
    fn test_dry_rock_is_left_alone() {
        let generator = ChunkGenerator::with_default_table(1);
        let pos = ChunkPos::new(0, -3, 0);
        let palette = generator.palette().clone();
        let mut grid = VoxelGrid::for_chunk(pos, palette.voxel(ContentKey::Stone));
        let mut ctx = generator.context(pos, &mut grid);
        assert_eq!(refine_rock(&mut ctx, |_| (0.0, 0.0)), 0);
        assert!(ctx.liquid_queue.is_empty());
        // Crumbly and wet turns to mud, crumbly and dry to sand.
        refine_rock(&mut ctx, |p| (1.5, if p.x % 2 == 0 { 0.5 } else { -0.5 }));
        let even = pos.node_min();
        assert_eq!(ctx.grid.content(even), Some(palette.id(ContentKey::Mud)));
        assert_eq!(
            ctx.grid.content(even + IVec3::X),
            Some(palette.id(ContentKey::Sand))
        );
    }
}
