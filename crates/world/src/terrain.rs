//! First pass: fill unknown voxels of the target chunk with air, water,
//! vacuum or base rock from the heightmap and the cave field.

use crate::chunk::{SPACE_LEVEL, WATER_LEVEL};
use crate::context::GenerationContext;
use crate::grid::ColumnWalk;
use crate::noise::{is_cave_value, NoiseBuffer};
use tracing::{debug, instrument};
use voxgen_core::{ContentKey, Voxel};

/// Chunks whose top is this far below the lowest ground column skip caves.
pub const ALL_GROUND_DEPTH: i32 = 40;

/// What one unknown voxel becomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fill {
    Air,
    Water,
    Vacuum,
    Rock,
}

/// Decide a voxel from its height, its column's ground and the cave test.
///
/// The cave branch wins over everything and only ever yields air.
#[inline]
pub fn fill_for(y: i32, ground: i32, cave: bool) -> Fill {
    if cave {
        Fill::Air
    } else if y > ground {
        if y <= WATER_LEVEL {
            Fill::Water
        } else if y >= SPACE_LEVEL {
            Fill::Vacuum
        } else {
            Fill::Air
        }
    } else {
        Fill::Rock
    }
}

/// Whether the whole chunk lies so deep that caves are not evaluated.
pub fn is_all_ground(min_ground: i32, node_max_y: i32) -> bool {
    min_ground - node_max_y > ALL_GROUND_DEPTH
}

/// Fill every unknown voxel of the target chunk. Returns how many were written.
#[instrument(skip(ctx), fields(pos = %ctx.pos))]
pub fn fill_terrain(ctx: &mut GenerationContext<'_>, caves: bool) -> usize {
    let min = ctx.node_min();
    let max = ctx.node_max();
    let ignore = ctx.id(ContentKey::Ignore);
    let all_ground = is_all_ground(ctx.heightmap.min_height() as i32, max.y);

    let cave_fields = (caves && !all_ground).then(|| {
        (
            NoiseBuffer::new(&ctx.channels.cave_a, min, max, NoiseBuffer::DEFAULT_SPACING),
            NoiseBuffer::new(&ctx.channels.cave_b, min, max, NoiseBuffer::DEFAULT_SPACING),
        )
    });

    let air = ctx.palette.voxel(ContentKey::Air);
    let water = ctx.palette.voxel(ContentKey::WaterSource);
    let vacuum = ctx.palette.voxel(ContentKey::Vacuum);
    let rock = Voxel::new(ctx.base_rock());

    let mut written = 0;
    for column in ctx.chunk_area().columns() {
        let ground = ctx.ground_at(column);
        for p in ColumnWalk::down(column, max.y, min.y) {
            if ctx.grid.content(p) != Some(ignore) {
                continue;
            }
            let cave = cave_fields
                .as_ref()
                .is_some_and(|(a, b)| is_cave_value(a.get(p), b.get(p)));
            let voxel = match fill_for(p.y, ground, cave) {
                Fill::Air => air,
                Fill::Water => water,
                Fill::Vacuum => vacuum,
                Fill::Rock => rock,
            };
            if ctx.grid.set(p, voxel) {
                written += 1;
            }
        }
    }
    debug!(written, all_ground, "terrain filled");
    written
}
