//! Seed derivation.
//!
//! Every random decision the generator makes is a function of the world seed
//! plus a coordinate. The formulas here are reproducibility-critical: changing
//! any constant changes every generated world, so they live in one place.

use rand::{rngs::StdRng, SeedableRng};

/// Per-purpose offsets added to the world seed to decorrelate noise channels.
pub mod channel {
    /// First cave contour field.
    pub const CAVE_A: u64 = 52_534;
    /// Second cave contour field (sampled with y/z flipped).
    pub const CAVE_B: u64 = 10_325;
    /// Ground crumbleness (soil/liquid selection).
    pub const CRUMBLENESS: u64 = 34_413;
    /// Ground wetness (mud vs sand, limestone chunks).
    pub const WETNESS: u64 = 32_474;
    /// 2D ground height.
    pub const GROUND_HEIGHT: u64 = 983_240;
    /// 2D humidity.
    pub const HUMIDITY: u64 = 72_384;
    /// Tree density.
    pub const TREE_DENSITY: u64 = 2;
    /// Grass and crop density.
    pub const GRASS_DENSITY: u64 = 4;
    /// Boulder density.
    pub const BOULDER_DENSITY: u64 = 5;
    /// Space debris density.
    pub const DEBRIS: u64 = 7_349;
    /// Secondary ground-cover bucket sample.
    pub const GROUND_COVER: u64 = 8_725;
}

/// Salts for positional hashes that are not noise channels.
pub mod salt {
    /// Dungeon coin flip per chunk.
    pub const DUNGEON_COIN: u64 = 34_329;
    /// Biome blending at chunk edges.
    pub const BIOME_BLEND: u64 = 91_121;
    /// Lava-vs-water selection for liquid sources.
    pub const LAVA: u64 = 61_439;
    /// Mossy cobble selection.
    pub const MOSS: u64 = 87_241;
    /// Comet presence in space chunks.
    pub const COMET: u64 = 12_471;
    /// Mineral tagging of space debris.
    pub const DEBRIS_MINERAL: u64 = 5_521;
}

/// Derive the seed of a noise channel from the world seed.
#[inline]
pub const fn channel_seed(world_seed: u64, offset: u64) -> u64 {
    world_seed.wrapping_add(offset)
}

/// Seed for the mineral scatter of the chunk whose minimum corner is given.
pub fn mineral_seed(world_seed: u64, node_min: [i32; 3]) -> u64 {
    let [x, y, z] = node_min;
    world_seed
        .wrapping_add((z as i64 as u64).wrapping_mul(38_134_234))
        .wrapping_add((y as i64 as u64).wrapping_mul(42_123))
        .wrapping_add((x as i64 as u64).wrapping_mul(23))
}

/// Seed for the dungeon carver of the chunk whose minimum corner is given.
pub fn dungeon_seed(world_seed: u64, node_min: [i32; 3]) -> u64 {
    let [x, y, z] = node_min;
    world_seed
        .wrapping_add(2)
        .wrapping_add((x as i64 as u64).wrapping_mul(8_424_124))
        .wrapping_add((y as i64 as u64).wrapping_mul(76_413))
        .wrapping_add((z as i64 as u64).wrapping_mul(42_482))
}

/// Seed for the decoration placer of the chunk whose minimum corner is given.
pub fn decoration_seed(world_seed: u64, node_min: [i32; 3]) -> u64 {
    let [x, y, z] = node_min;
    world_seed
        .wrapping_add(3)
        .wrapping_add((x as i64 as u64).wrapping_mul(1_034_331))
        .wrapping_add((y as i64 as u64).wrapping_mul(3_431))
        .wrapping_add((z as i64 as u64).wrapping_mul(9_834_313))
}

/// Truncate a 64-bit seed to the 32-bit form used by lattice hashes.
#[inline]
pub const fn lattice_seed(seed: u64) -> i32 {
    seed as i32
}

/// 31-bit integer lattice hash of a 3D position.
///
/// All arithmetic wraps exactly like 32-bit two's complement.
pub fn position_hash(x: i32, y: i32, z: i32, seed: i32) -> u32 {
    let mut n = 1619i32
        .wrapping_mul(x)
        .wrapping_add(31_337i32.wrapping_mul(y))
        .wrapping_add(52_591i32.wrapping_mul(z))
        .wrapping_add(1013i32.wrapping_mul(seed))
        & 0x7fff_ffff;
    n ^= n >> 13;
    let n = n
        .wrapping_mul(n.wrapping_mul(n).wrapping_mul(60_493).wrapping_add(19_990_303))
        .wrapping_add(1_376_312_589)
        & 0x7fff_ffff;
    n as u32
}

/// 31-bit integer lattice hash of a 2D position.
pub fn column_hash(x: i32, z: i32, seed: i32) -> u32 {
    position_hash(x, 0, z, seed)
}

/// Reproducible RNG for one generation domain.
pub fn scoped_rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn channel_seeds_are_offsets() {
        assert_eq!(channel_seed(10, channel::CAVE_A), 52_544);
        assert_eq!(channel_seed(u64::MAX, 1), 0);
    }

    #[test]
    fn chunk_seeds_depend_on_every_axis() {
        let base = mineral_seed(7, [0, 0, 0]);
        assert_ne!(base, mineral_seed(7, [16, 0, 0]));
        assert_ne!(base, mineral_seed(7, [0, 16, 0]));
        assert_ne!(base, mineral_seed(7, [0, 0, 16]));
        assert_ne!(dungeon_seed(7, [0, -16, 0]), dungeon_seed(7, [0, 16, 0]));
        assert_ne!(decoration_seed(7, [16, 0, 0]), decoration_seed(7, [0, 0, 16]));
    }

    #[test]
    fn position_hash_is_31_bit_and_stable() {
        for x in -20..20 {
            for z in -20..20 {
                let h = position_hash(x, x - z, z, 99);
                assert!(h <= 0x7fff_ffff);
                assert_eq!(h, position_hash(x, x - z, z, 99));
            }
        }
        assert_ne!(position_hash(1, 2, 3, 0), position_hash(1, 2, 3, 1));
    }

    #[test]
    fn scoped_rng_is_reproducible() {
        let mut a = scoped_rng(42);
        let mut b = scoped_rng(42);
        for _ in 0..16 {
            assert_eq!(a.gen::<u32>(), b.gen::<u32>());
        }
    }
}
