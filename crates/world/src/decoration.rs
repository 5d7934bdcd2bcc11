//! Surface decorations: trees and their stand-ins, boulders, ground cover.
//!
//! Each pass derives a per-chunk count from a low-frequency density channel,
//! then draws that many random columns. A column is stamped only when its
//! ground contact lies inside the target chunk's vertical span, so a
//! decoration is placed by exactly one chunk.

use crate::biome::Biome;
use crate::chunk::WATER_LEVEL;
use crate::context::GenerationContext;
use crate::grid::ColumnWalk;
use crate::noise::NoiseField;
use crate::soil::SURFACE_MARGIN;
use crate::trees::{grow_tree, TreeSpecies};
use glam::{IVec2, IVec3};
use rand::rngs::StdRng;
use rand::Rng;
use tracing::{debug, trace};
use voxgen_core::ContentKey;

/// Tree count at full density.
pub const TREE_MAX: f64 = 0.04 * 256.0;
/// Lower bound on tree count in dense biomes.
pub const DENSE_TREE_FLOOR: u32 = 20;
pub const GRASS_MAX: f64 = 48.0;
pub const BOULDER_MAX: f64 = 6.0;
/// Bushes grow on clay only this far above the water line.
pub const BUSH_MIN_Y: i32 = WATER_LEVEL + 1;

fn ramp(noise: f64, zero: f64, max: f64) -> u32 {
    if noise <= zero {
        0
    } else {
        ((noise - zero) / (1.0 - zero) * max) as u32
    }
}

/// Trees (or their per-biome stand-ins) per chunk.
pub fn tree_count(biome: Biome, noise: f64) -> u32 {
    let base = ramp(noise, biome.density_zeros().tree, TREE_MAX);
    match biome {
        Biome::Ocean | Biome::Beach | Biome::Snowcap => 0,
        Biome::Jungle | Biome::Forest => base.max(DENSE_TREE_FLOOR),
        Biome::Plains | Biome::Desert | Biome::Wastelands => base / 2,
        _ => base,
    }
}

/// Ground-cover plants per chunk.
pub fn grass_count(biome: Biome, noise: f64) -> u32 {
    let base = ramp(noise, biome.density_zeros().grass, GRASS_MAX);
    match biome {
        Biome::Desert | Biome::Wastelands | Biome::Snowcap => base / 8,
        Biome::Jungle | Biome::Plains => base * 2,
        _ => base,
    }
}

/// Boulder clusters per chunk.
pub fn boulder_count(biome: Biome, noise: f64) -> u32 {
    match biome {
        Biome::Ocean | Biome::Beach | Biome::Desert | Biome::Snowcap => 0,
        _ => ramp(noise, biome.density_zeros().boulder, BOULDER_MAX),
    }
}

/// Ground-cover content for a bucket sample in `[-1, 1]`.
pub fn ground_cover_for(biome: Biome, sample: f64) -> Option<ContentKey> {
    let bucket = ((sample.clamp(-1.0, 1.0) + 1.0) * 2.0) as u8;
    let key = match (biome, bucket) {
        (Biome::Plains, 0 | 1) => ContentKey::TallGrass,
        (Biome::Plains, 2) => ContentKey::Flower,
        (Biome::Plains, _) => {
            if sample > 0.75 {
                ContentKey::WildCotton
            } else {
                ContentKey::WildWheat
            }
        }
        (Biome::Forest | Biome::Woodlands, 0) => ContentKey::Fern,
        (Biome::Forest | Biome::Woodlands, 3 | 4) => ContentKey::Flower,
        (Biome::Forest | Biome::Woodlands, _) => ContentKey::TallGrass,
        (Biome::Jungle, 0 | 1) => ContentKey::Fern,
        (Biome::Jungle, 4) => ContentKey::WildMelon,
        (Biome::Jungle, _) => ContentKey::TallGrass,
        (Biome::Desert | Biome::Wastelands, _) => ContentKey::DeadBush,
        (Biome::Lake | Biome::Beach, _) => ContentKey::Reeds,
        (Biome::Ocean, _) => ContentKey::Seaweed,
        _ => return None,
    };
    Some(key)
}

/// Ground surface of a column: the highest ground voxel with air or water
/// above, searched within the decoration margin of the column's height.
pub fn ground_contact(ctx: &GenerationContext<'_>, column: IVec2) -> Option<IVec3> {
    let ground = ctx.ground_at(column);
    ColumnWalk::down(column, ground + SURFACE_MARGIN, ground - SURFACE_MARGIN).find(|p| {
        let above = ctx.content(*p + IVec3::Y);
        ctx.palette.is_ground(ctx.content(*p))
            && (ctx.palette.is_open(above) || ctx.is(*p + IVec3::Y, ContentKey::WaterSource))
    })
}

fn random_column(ctx: &GenerationContext<'_>, rng: &mut StdRng) -> IVec2 {
    let min = ctx.node_min();
    let max = ctx.node_max();
    IVec2::new(rng.gen_range(min.x..=max.x), rng.gen_range(min.z..=max.z))
}

/// Contact of a random column, if it belongs to this chunk.
fn owned_contact(ctx: &GenerationContext<'_>, rng: &mut StdRng) -> Option<(IVec2, IVec3)> {
    let column = random_column(ctx, rng);
    let contact = ground_contact(ctx, column)?;
    let (bottom, top) = (ctx.node_min().y, ctx.node_max().y);
    if contact.y < bottom || contact.y > top {
        trace!(%contact, "contact outside chunk span");
        return None;
    }
    Some((column, contact))
}

fn column_density(ctx: &GenerationContext<'_>, field: &NoiseField) -> f64 {
    let centre = ctx.pos.center();
    field.at_column(IVec2::new(centre.x, centre.z))
}

fn stack(
    ctx: &mut GenerationContext<'_>,
    base: IVec3,
    key: ContentKey,
    height: i32,
    into_water: bool,
) -> usize {
    (0..height)
        .filter(|dy| ctx.place_decoration(base + IVec3::new(0, *dy, 0), key, into_water))
        .count()
}

/// What a tree candidate became.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TreeReport {
    pub trees: u32,
    pub stumps: u32,
    pub papyrus: u32,
    pub cacti: u32,
    pub bushes: u32,
}

/// Tree pass: stamps by surface material at each candidate contact.
pub fn place_trees(ctx: &mut GenerationContext<'_>, rng: &mut StdRng) -> TreeReport {
    let count = tree_count(ctx.biome, column_density(ctx, &ctx.channels.tree_density));
    let mut report = TreeReport::default();

    for _ in 0..count {
        let Some((column, contact)) = owned_contact(ctx, rng) else {
            continue;
        };
        let biome = ctx.column_biome(column);
        let ground = ctx.content(contact);
        let base = contact + IVec3::Y;
        let underwater = ctx.is(base, ContentKey::WaterSource);

        if ctx.palette.is_mud_family(ground) {
            if underwater {
                let height = rng.gen_range(2..=3);
                if stack(ctx, base, ContentKey::Papyrus, height, true) > 0 {
                    report.papyrus += 1;
                }
            } else if contact.y < WATER_LEVEL {
                continue;
            } else if biome == Biome::Wastelands {
                if ctx.place_decoration(base, ContentKey::Stump, false) {
                    report.stumps += 1;
                }
            } else if let Some(species) = TreeSpecies::for_biome(biome, rng) {
                if grow_tree(ctx, base, species, rng) > 0 {
                    report.trees += 1;
                }
            }
        } else if ctx.palette.is(ground, ContentKey::DesertSand) {
            let height = rng.gen_range(2..=4);
            if !underwater && stack(ctx, base, ContentKey::Cactus, height, false) > 0 {
                report.cacti += 1;
            }
        } else if ctx.palette.is(ground, ContentKey::Clay)
            && contact.y > BUSH_MIN_Y
            && matches!(
                biome,
                Biome::Lake | Biome::Plains | Biome::Forest | Biome::Jungle | Biome::Woodlands
            )
            && ctx.place_decoration(base, ContentKey::Bush, false)
        {
            report.bushes += 1;
        }
    }
    debug!(?report, candidates = count, "trees placed");
    report
}

/// Boulder pass: clusters of stone-shelled gravel spheres on mud or clay.
pub fn place_boulders(ctx: &mut GenerationContext<'_>, rng: &mut StdRng) -> u32 {
    let count = boulder_count(ctx.biome, column_density(ctx, &ctx.channels.boulder_density));
    let mut placed = 0;

    for _ in 0..count {
        let Some((_, contact)) = owned_contact(ctx, rng) else {
            continue;
        };
        let ground = ctx.content(contact);
        if !(ctx.palette.is_mud_family(ground) || ctx.palette.is(ground, ContentKey::Clay)) {
            continue;
        }
        let spheres = rng.gen_range(1..=3);
        let mut written = 0;
        for _ in 0..spheres {
            let radius = rng.gen_range(1..=2);
            let offset = IVec3::new(rng.gen_range(-1..=1), radius, rng.gen_range(-1..=1));
            let centre = contact + offset;
            written += sphere(ctx, centre, radius);
        }
        if written > 0 {
            placed += 1;
        }
    }
    debug!(placed, candidates = count, "boulders placed");
    placed
}

fn sphere(ctx: &mut GenerationContext<'_>, centre: IVec3, radius: i32) -> usize {
    let outer = radius * radius;
    let inner = (radius - 1) * (radius - 1);
    let mut written = 0;
    for z in -radius..=radius {
        for y in -radius..=radius {
            for x in -radius..=radius {
                let d = x * x + y * y + z * z;
                if d > outer {
                    continue;
                }
                let key = if d < inner || (radius > 1 && d == 0) {
                    ContentKey::Gravel
                } else {
                    ContentKey::Stone
                };
                if ctx.place_decoration(centre + IVec3::new(x, y, z), key, false) {
                    written += 1;
                }
            }
        }
    }
    written
}

/// Ground-cover pass: one plant per candidate, bucketed by a secondary
/// noise sample. Ocean seaweed grows into water, everything else into air.
pub fn place_ground_cover(ctx: &mut GenerationContext<'_>, rng: &mut StdRng) -> u32 {
    let count = grass_count(ctx.biome, column_density(ctx, &ctx.channels.grass_density));
    let mut placed = 0;

    for _ in 0..count {
        let Some((column, contact)) = owned_contact(ctx, rng) else {
            continue;
        };
        let biome = ctx.column_biome(column);
        let base = contact + IVec3::Y;
        let underwater = ctx.is(base, ContentKey::WaterSource);
        let Some(key) = ground_cover_for(biome, ctx.channels.ground_cover.at(contact)) else {
            continue;
        };
        let into_water = key == ContentKey::Seaweed;
        if underwater != into_water {
            continue;
        }
        if ctx.place_decoration(base, key, into_water) {
            placed += 1;
        }
    }
    debug!(placed, candidates = count, "ground cover placed");
    placed
}
