//! Whole-chunk overrides that bypass the standard pipeline.
//!
//! Every generator here writes only unknown voxels of the target chunk.

use crate::chunk::WATER_LEVEL;
use crate::context::GenerationContext;
use crate::grid::ColumnWalk;
use crate::minerals::{seed_minerals, MINERAL_TABLE, DEEP_SLICE_START};
use crate::noise::{is_cave_value, value_noise_3d, NoiseBuffer};
use glam::IVec3;
use tracing::{debug, instrument};
use voxgen_core::seed::{self, salt};
use voxgen_core::{ContentKey, Voxel};

/// Debris density above which vacuum becomes space rock.
pub const DEBRIS_THRESHOLD: f64 = 0.75;
/// Comet coin value a chunk must exceed to carry a comet.
pub const COMET_THRESHOLD: f64 = 0.8;
pub const COMET_MIN_RADIUS: i32 = 3;
pub const COMET_MAX_RADIUS: i32 = 6;
/// One debris voxel in this many carries a mineral tag.
pub const DEBRIS_MINERAL_ONE_IN: u32 = 16;

fn fill_unknown(ctx: &mut GenerationContext<'_>, mut pick: impl FnMut(IVec3) -> Voxel) -> usize {
    let min = ctx.node_min();
    let max = ctx.node_max();
    let ignore = ctx.id(ContentKey::Ignore);
    let mut written = 0;
    for column in ctx.chunk_area().columns() {
        for p in ColumnWalk::down(column, max.y, min.y) {
            if ctx.grid.content(p) == Some(ignore) && ctx.grid.set(p, pick(p)) {
                written += 1;
            }
        }
    }
    written
}

/// Flat realm: grass at the water line, mud under it, stone below, air above.
#[instrument(skip(ctx), fields(pos = %ctx.pos))]
pub fn generate_flat(ctx: &mut GenerationContext<'_>) -> usize {
    let air = ctx.palette.voxel(ContentKey::Air);
    let grass = ctx.palette.voxel(ContentKey::Grass);
    let mud = ctx.palette.voxel(ContentKey::Mud);
    let stone = ctx.palette.voxel(ContentKey::Stone);
    let written = fill_unknown(ctx, |p| match p.y {
        y if y > WATER_LEVEL => air,
        WATER_LEVEL => grass,
        y if y == WATER_LEVEL - 1 => mud,
        _ => stone,
    });
    debug!(written, "flat realm filled");
    written
}

/// Sky band: nothing but air.
#[instrument(skip(ctx), fields(pos = %ctx.pos))]
pub fn generate_sky(ctx: &mut GenerationContext<'_>) -> usize {
    let air = ctx.palette.voxel(ContentKey::Air);
    let written = fill_unknown(ctx, |_| air);
    debug!(written, "sky filled");
    written
}

/// Outcome of a space chunk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SpaceReport {
    pub debris: usize,
    pub tagged: usize,
    /// Radius of the comet, if one was placed.
    pub comet: Option<i32>,
}

/// Mineral carried by a debris voxel, drawn from the deep table slice.
fn debris_mineral(p: IVec3, mineral_seed: i32) -> u8 {
    let hash = seed::position_hash(p.x, p.y, p.z, mineral_seed);
    if hash % DEBRIS_MINERAL_ONE_IN != 0 {
        return 0;
    }
    let deep = &MINERAL_TABLE[DEEP_SLICE_START..];
    deep[(hash / DEBRIS_MINERAL_ONE_IN) as usize % deep.len()]
        .mineral
        .id()
}

/// Space band: vacuum with rock debris and at most one ice comet at the centre.
#[instrument(skip(ctx), fields(pos = %ctx.pos))]
pub fn generate_space(ctx: &mut GenerationContext<'_>) -> SpaceReport {
    let min = ctx.node_min();
    let max = ctx.node_max();
    let debris_field =
        NoiseBuffer::new(&ctx.channels.debris, min, max, NoiseBuffer::DEFAULT_SPACING);
    let mineral_seed = seed::lattice_seed(seed::channel_seed(ctx.seed, salt::DEBRIS_MINERAL));
    let vacuum = ctx.palette.voxel(ContentKey::Vacuum);
    let rock = ctx.id(ContentKey::SpaceRock);

    let mut report = SpaceReport::default();
    let written = fill_unknown(ctx, |p| {
        if debris_field.get(p) > DEBRIS_THRESHOLD {
            let tag = debris_mineral(p, mineral_seed);
            report.debris += 1;
            if tag != 0 {
                report.tagged += 1;
            }
            Voxel::with_param1(rock, tag)
        } else {
            vacuum
        }
    });

    let centre = ctx.pos.center();
    let comet_seed = seed::lattice_seed(seed::channel_seed(ctx.seed, salt::COMET));
    if value_noise_3d(centre, comet_seed) > COMET_THRESHOLD {
        let hash = seed::position_hash(centre.x, centre.y, centre.z, comet_seed);
        let span = (COMET_MAX_RADIUS - COMET_MIN_RADIUS + 1) as u32;
        let radius = COMET_MIN_RADIUS + (hash % span) as i32;
        let ice = ctx.palette.voxel(ContentKey::Ice);
        let area = ctx.chunk_area();
        let r2 = radius * radius;
        for p in area.positions() {
            let d = p - centre;
            if d.length_squared() <= r2 {
                ctx.grid.set(p, ice);
            }
        }
        report.comet = Some(radius);
    }
    debug!(written, ?report, "space filled");
    report
}

/// Deep abyss: solid stone hollowed by the cave field, deep minerals only.
#[instrument(skip(ctx), fields(pos = %ctx.pos))]
pub fn generate_abyss(ctx: &mut GenerationContext<'_>, caves: bool) -> usize {
    let min = ctx.node_min();
    let max = ctx.node_max();
    let cave_fields = caves.then(|| {
        (
            NoiseBuffer::new(&ctx.channels.cave_a, min, max, NoiseBuffer::DEFAULT_SPACING),
            NoiseBuffer::new(&ctx.channels.cave_b, min, max, NoiseBuffer::DEFAULT_SPACING),
        )
    });
    let air = ctx.palette.voxel(ContentKey::Air);
    let stone = ctx.palette.voxel(ContentKey::Stone);
    let written = fill_unknown(ctx, |p| {
        let cave = cave_fields
            .as_ref()
            .is_some_and(|(a, b)| is_cave_value(a.get(p), b.get(p)));
        if cave {
            air
        } else {
            stone
        }
    });
    let tagged = seed_minerals(ctx, true);
    debug!(written, tagged, "abyss filled");
    written
}
