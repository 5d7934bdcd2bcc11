//! Tree templates.
//!
//! Every species is a randomized-height trunk topped by a leaf cloud: a fixed
//! core around the trunk tip plus a few random blobs inside the species'
//! canopy box. Conifers use a stepped cone instead.

use crate::biome::Biome;
use crate::context::GenerationContext;
use glam::IVec3;
use rand::rngs::StdRng;
use rand::Rng;
use std::ops::RangeInclusive;
use voxgen_core::ContentKey;

/// Tree species.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TreeSpecies {
    Oak,
    Apple,
    Beech,
    Birch,
    Conifer,
    Jungle,
}

/// Trunk and canopy dimensions of a species.
#[derive(Debug, Clone)]
pub struct TreeShape {
    pub trunk_height: RangeInclusive<i32>,
    /// Canopy box relative to the trunk tip.
    pub canopy_min: IVec3,
    pub canopy_max: IVec3,
    /// Random 2x2x2 blobs added to the core.
    pub blobs: u32,
}

impl TreeSpecies {
    pub const ALL: [TreeSpecies; 6] = [
        TreeSpecies::Oak,
        TreeSpecies::Apple,
        TreeSpecies::Beech,
        TreeSpecies::Birch,
        TreeSpecies::Conifer,
        TreeSpecies::Jungle,
    ];

    pub fn trunk(self) -> ContentKey {
        match self {
            TreeSpecies::Oak | TreeSpecies::Apple | TreeSpecies::Beech => ContentKey::Trunk,
            TreeSpecies::Birch => ContentKey::BirchTrunk,
            TreeSpecies::Conifer => ContentKey::ConiferTrunk,
            TreeSpecies::Jungle => ContentKey::JungleTrunk,
        }
    }

    pub fn leaves(self) -> ContentKey {
        match self {
            TreeSpecies::Oak | TreeSpecies::Beech => ContentKey::Leaves,
            TreeSpecies::Apple => ContentKey::AppleLeaves,
            TreeSpecies::Birch => ContentKey::BirchLeaves,
            TreeSpecies::Conifer => ContentKey::ConiferLeaves,
            TreeSpecies::Jungle => ContentKey::JungleLeaves,
        }
    }

    pub fn shape(self) -> TreeShape {
        let (trunk_height, min, max, blobs) = match self {
            TreeSpecies::Oak | TreeSpecies::Apple => (4..=5, (-2, -1, -2), (2, 2, 2), 7),
            TreeSpecies::Beech => (5..=7, (-3, -1, -3), (3, 3, 3), 10),
            TreeSpecies::Birch => (6..=8, (-1, -2, -1), (1, 2, 1), 4),
            TreeSpecies::Conifer => (7..=10, (-2, -5, -2), (2, 1, 2), 0),
            TreeSpecies::Jungle => (8..=12, (-3, -1, -3), (3, 2, 3), 12),
        };
        TreeShape {
            trunk_height,
            canopy_min: IVec3::from(min),
            canopy_max: IVec3::from(max),
            blobs,
        }
    }

    /// Species growing in a biome; `None` where trees do not grow.
    pub fn for_biome(biome: Biome, rng: &mut StdRng) -> Option<Self> {
        let pick = rng.gen_range(0..4);
        Some(match biome {
            Biome::Jungle => TreeSpecies::Jungle,
            Biome::Forest => [
                TreeSpecies::Oak,
                TreeSpecies::Beech,
                TreeSpecies::Birch,
                TreeSpecies::Oak,
            ][pick],
            Biome::Woodlands => [
                TreeSpecies::Conifer,
                TreeSpecies::Oak,
                TreeSpecies::Conifer,
                TreeSpecies::Birch,
            ][pick],
            Biome::Plains | Biome::Lake => [
                TreeSpecies::Oak,
                TreeSpecies::Apple,
                TreeSpecies::Oak,
                TreeSpecies::Apple,
            ][pick],
            _ => return None,
        })
    }
}

/// Grow a tree whose trunk starts at `base`. Returns voxels written.
pub fn grow_tree(
    ctx: &mut GenerationContext<'_>,
    base: IVec3,
    species: TreeSpecies,
    rng: &mut StdRng,
) -> usize {
    let shape = species.shape();
    let height = rng.gen_range(shape.trunk_height.clone());
    let mut written = 0;

    for dy in 0..height {
        if ctx.place_decoration(base + IVec3::new(0, dy, 0), species.trunk(), false) {
            written += 1;
        }
    }
    let tip = base + IVec3::new(0, height - 1, 0);

    let leaves = if species == TreeSpecies::Conifer {
        cone_leaves(&shape, rng)
    } else {
        cloud_leaves(&shape, rng)
    };
    for offset in leaves {
        if ctx.place_decoration(tip + offset, species.leaves(), false) {
            written += 1;
        }
    }
    written
}

/// Core cube around the tip plus random blobs inside the canopy box.
fn cloud_leaves(shape: &TreeShape, rng: &mut StdRng) -> Vec<IVec3> {
    let (min, max) = (shape.canopy_min, shape.canopy_max);
    let extent = max - min + IVec3::ONE;
    let mut cells = vec![false; (extent.x * extent.y * extent.z) as usize];
    let index = |p: IVec3| {
        let d = p - min;
        ((d.z * extent.y + d.y) * extent.x + d.x) as usize
    };

    for z in -1..=1 {
        for y in -1..=1 {
            for x in -1..=1 {
                let p = IVec3::new(x, y, z);
                if p.cmpge(min).all() && p.cmple(max).all() {
                    cells[index(p)] = true;
                }
            }
        }
    }
    for _ in 0..shape.blobs {
        let corner = IVec3::new(
            rng.gen_range(min.x..=max.x - 1),
            rng.gen_range(min.y..=max.y - 1),
            rng.gen_range(min.z..=max.z - 1),
        );
        for z in 0..=1 {
            for y in 0..=1 {
                for x in 0..=1 {
                    cells[index(corner + IVec3::new(x, y, z))] = true;
                }
            }
        }
    }

    let mut out = Vec::new();
    for z in min.z..=max.z {
        for y in min.y..=max.y {
            for x in min.x..=max.x {
                let p = IVec3::new(x, y, z);
                if cells[index(p)] {
                    out.push(p);
                }
            }
        }
    }
    out
}

/// Stepped cone: widest at the bottom of the canopy box, a single spire on top.
fn cone_leaves(shape: &TreeShape, rng: &mut StdRng) -> Vec<IVec3> {
    let (min, max) = (shape.canopy_min, shape.canopy_max);
    let mut out = vec![IVec3::new(0, max.y, 0)];
    for y in min.y..max.y {
        let radius = ((max.y - y) / 2).min(max.x).max(1);
        for z in -radius..=radius {
            for x in -radius..=radius {
                let corner = x.abs() == radius && z.abs() == radius;
                if corner && radius > 1 && rng.gen_bool(0.5) {
                    continue;
                }
                if x == 0 && z == 0 && y <= 0 {
                    continue;
                }
                out.push(IVec3::new(x, y, z));
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk::ChunkPos;
    use crate::generator::ChunkGenerator;
    use crate::grid::{GenFlags, VoxelGrid};
    use voxgen_core::scoped_rng;

    #[test]
    fn test_species_materials_are_distinct_pairs() {
        for species in TreeSpecies::ALL {
            assert_ne!(species.trunk(), species.leaves());
            let shape = species.shape();
            assert!(shape.trunk_height.start() >= &4);
            assert!(shape.canopy_min.cmple(shape.canopy_max).all());
        }
    }

    #[test]
    fn test_biome_species() {
        let mut rng = scoped_rng(1);
        assert_eq!(TreeSpecies::for_biome(Biome::Jungle, &mut rng), Some(TreeSpecies::Jungle));
        assert_eq!(TreeSpecies::for_biome(Biome::Desert, &mut rng), None);
        assert_eq!(TreeSpecies::for_biome(Biome::Ocean, &mut rng), None);
        for _ in 0..20 {
            let s = TreeSpecies::for_biome(Biome::Woodlands, &mut rng).unwrap();
            assert!(matches!(
                s,
                TreeSpecies::Conifer | TreeSpecies::Oak | TreeSpecies::Birch
            ));
        }
    }

    #[test]
    fn test_cloud_contains_core() {
        let mut rng = scoped_rng(3);
        let leaves = cloud_leaves(&TreeSpecies::Oak.shape(), &mut rng);
        assert!(leaves.contains(&IVec3::ZERO));
        assert!(leaves.contains(&IVec3::new(1, 1, 1)));
        assert!(leaves.iter().all(|p| p.abs().max_element() <= 2));
    }

    #[test]
    fn test_tree_grows_only_into_open_voxels() {
        let generator = ChunkGenerator::with_default_table(8);
        let pos = ChunkPos::new(0, 0, 0);
        let palette = generator.palette().clone();
        let mut grid = VoxelGrid::for_chunk(pos, palette.voxel(ContentKey::Air));
        let blocker = IVec3::new(8, 12, 9);
        grid.set(blocker, palette.voxel(ContentKey::Stone));
        let inside = IVec3::new(8, 11, 8);
        let mut ctx = generator.context(pos, &mut grid);
        ctx.flags.insert(inside, GenFlags::DUNGEON_INSIDE);
        let mut rng = scoped_rng(11);
        let written = grow_tree(&mut ctx, IVec3::new(8, 5, 8), TreeSpecies::Oak, &mut rng);
        drop(ctx);

        assert!(written > 10);
        assert_eq!(grid.content(IVec3::new(8, 5, 8)), Some(palette.id(ContentKey::Trunk)));
        assert_eq!(grid.content(blocker), Some(palette.id(ContentKey::Stone)));
        assert_eq!(grid.content(inside), Some(palette.id(ContentKey::Air)));
    }

    #[test]
    fn test_conifer_is_a_cone() {
        let mut rng = scoped_rng(5);
        let shape = TreeSpecies::Conifer.shape();
        let leaves = cone_leaves(&shape, &mut rng);
        assert!(leaves.contains(&IVec3::new(0, shape.canopy_max.y, 0)));
        let width_at = |y: i32| {
            leaves
                .iter()
                .filter(|p| p.y == y)
                .map(|p| p.x.abs())
                .max()
                .unwrap_or(0)
        };
        assert!(width_at(shape.canopy_min.y) >= width_at(shape.canopy_max.y - 1));
    }
}
