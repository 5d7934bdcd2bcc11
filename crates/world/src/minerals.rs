//! Depth-banded ore scatter.
//!
//! Minerals are not separate contents: a tagged voxel keeps its base rock
//! content and carries the mineral id in `param1`.

use crate::context::GenerationContext;
use glam::IVec3;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;
use voxgen_core::{scoped_rng, seed};

/// Random cluster centres per chunk.
pub const POINTS_PER_CHUNK: usize = 20;
/// Chunks below this chunk-Y draw only from the deep slice of the table.
pub const DEEP_CHUNK_Y: i32 = -4;

/// Ore tag written into `param1` of base rock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum Mineral {
    Coal = 1,
    Salt = 2,
    Quartz = 3,
    Iron = 4,
    Tin = 5,
    Copper = 6,
    Silver = 7,
    Gold = 8,
    Mithril = 9,
}

impl Mineral {
    #[inline]
    pub fn id(self) -> u8 {
        self as u8
    }

    pub fn from_id(id: u8) -> Option<Self> {
        MINERAL_TABLE
            .iter()
            .map(|band| band.mineral)
            .find(|m| m.id() == id)
    }
}

/// One row of the ordered mineral table.
#[derive(Debug, Clone, Copy)]
pub struct MineralBand {
    pub mineral: Mineral,
    /// Points must lie strictly below this Y; `None` means anywhere.
    pub below: Option<i32>,
    /// Each neighbour voxel is tagged with probability `1 / one_in`.
    pub one_in: u32,
}

impl MineralBand {
    #[inline]
    pub fn permits(&self, y: i32) -> bool {
        self.below.map_or(true, |limit| y < limit)
    }
}

const fn band(mineral: Mineral, below: Option<i32>, one_in: u32) -> MineralBand {
    MineralBand {
        mineral,
        below,
        one_in,
    }
}

pub const MINERAL_TABLE: [MineralBand; 9] = [
    band(Mineral::Coal, None, 2),
    band(Mineral::Salt, Some(-16), 4),
    band(Mineral::Quartz, Some(-16), 4),
    band(Mineral::Iron, Some(-32), 4),
    band(Mineral::Tin, Some(-48), 4),
    band(Mineral::Copper, Some(-48), 4),
    band(Mineral::Silver, Some(-48), 4),
    band(Mineral::Gold, Some(-64), 4),
    band(Mineral::Mithril, Some(-72), 4),
];

/// Index of the first entry of the deep slice (iron).
pub const DEEP_SLICE_START: usize = 3;

/// Table slice a chunk draws from.
pub fn band_slice(chunk_y: i32) -> &'static [MineralBand] {
    if chunk_y < DEEP_CHUNK_Y {
        &MINERAL_TABLE[DEEP_SLICE_START..]
    } else {
        &MINERAL_TABLE[..]
    }
}

/// Pick uniformly among the bands of `slice` permitted at `y`.
pub fn choose_band<R: Rng>(
    rng: &mut R,
    slice: &'static [MineralBand],
    y: i32,
) -> Option<&'static MineralBand> {
    let permitted = slice.iter().filter(|b| b.permits(y)).count();
    if permitted == 0 {
        return None;
    }
    let pick = rng.gen_range(0..permitted);
    slice.iter().filter(|b| b.permits(y)).nth(pick)
}

/// Scatter ore clusters through the base rock of the target chunk.
///
/// `deep_only` restricts the scatter to the deep slice whatever the chunk Y.
/// Returns how many voxels were tagged.
pub fn seed_minerals(ctx: &mut GenerationContext<'_>, deep_only: bool) -> usize {
    let min = ctx.node_min();
    let max = ctx.node_max();
    let slice = if deep_only {
        &MINERAL_TABLE[DEEP_SLICE_START..]
    } else {
        band_slice(ctx.pos.y)
    };
    let mut rng = scoped_rng(seed::mineral_seed(ctx.seed, ctx.pos.node_min_array()));

    let mut tagged = 0;
    for _ in 0..POINTS_PER_CHUNK {
        let centre = IVec3::new(
            rng.gen_range(min.x + 1..max.x),
            rng.gen_range(min.y + 1..max.y),
            rng.gen_range(min.z + 1..max.z),
        );
        let Some(band) = choose_band(&mut rng, slice, centre.y) else {
            continue;
        };
        for dz in -1..=1 {
            for dy in -1..=1 {
                for dx in -1..=1 {
                    let p = centre + IVec3::new(dx, dy, dz);
                    let is_rock = ctx
                        .grid
                        .content(p)
                        .is_some_and(|c| ctx.palette.is_base_rock(c));
                    if is_rock && rng.gen_range(0..band.one_in) == 0 {
                        if let Some(voxel) = ctx.grid.get_mut(p) {
                            voxel.param1 = band.mineral.id();
                            tagged += 1;
                        }
                    }
                }
            }
        }
    }
    debug!(tagged, "minerals seeded");
    tagged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk::ChunkPos;
    use crate::generator::ChunkGenerator;
    use crate::grid::VoxelGrid;
    use voxgen_core::ContentKey;

    #[test]
    fn test_table_order_and_bands() {
        let names: Vec<_> = MINERAL_TABLE.iter().map(|b| b.mineral).collect();
        assert_eq!(names[0], Mineral::Coal);
        assert_eq!(names[DEEP_SLICE_START], Mineral::Iron);
        assert_eq!(*names.last().unwrap(), Mineral::Mithril);
        assert!(MINERAL_TABLE[0].permits(500));
        assert!(!MINERAL_TABLE[1].permits(-16));
        assert!(MINERAL_TABLE[1].permits(-17));
        assert!(MINERAL_TABLE.iter().skip(1).all(|b| b.one_in == 4));
    }

    #[test]
    fn test_shallow_points_only_draw_coal() {
        let mut rng = scoped_rng(3);
        for _ in 0..50 {
            let band = choose_band(&mut rng, band_slice(0), 10).unwrap();
            assert_eq!(band.mineral, Mineral::Coal);
        }
    }

    #[test]
    fn test_deep_slice_excludes_shallow_minerals() {
        assert_eq!(band_slice(-5).len(), 6);
        assert_eq!(band_slice(-4).len(), 9);
        let mut rng = scoped_rng(9);
        for _ in 0..100 {
            let band = choose_band(&mut rng, band_slice(-10), -150).unwrap();
            assert!(band.mineral.id() >= Mineral::Iron.id());
        }
    }

    #[test]
    fn test_tags_only_base_rock_of_the_chunk() {
        let generator = ChunkGenerator::with_default_table(4);
        let pos = ChunkPos::new(0, -6, 0);
        let palette = generator.palette().clone();
        let mut grid = VoxelGrid::for_chunk(pos, palette.voxel(ContentKey::Stone));
        let mut ctx = generator.context(pos, &mut grid);
        let tagged = seed_minerals(&mut ctx, false);
        drop(ctx);
        assert!(tagged > 0);

        let area = crate::grid::VoxelArea::of_chunk(pos);
        let mut seen = 0;
        for p in grid.area().positions() {
            let v = grid.get(p).unwrap();
            if v.param1 != 0 {
                seen += 1;
                assert!(area.contains(p), "tag outside chunk at {p}");
                let mineral = Mineral::from_id(v.param1).unwrap();
                assert!(mineral.id() >= Mineral::Iron.id());
            }
        }
        assert!(seen > 0 && seen <= tagged);
    }
}
