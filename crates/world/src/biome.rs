//! Biome classification and cross-chunk blending.
//!
//! A chunk's biome comes from its altitude band when it has one, otherwise
//! from the average ground height and centre humidity of its columns. Edge
//! columns may borrow a neighbour's biome so borders are not straight lines.

use crate::chunk::{ChunkPos, ABYSS_LEVEL, CHUNK_SIZE, SKY_LEVEL, SPACE_LEVEL};
use crate::heightmap::{ground_height_at, humidity_at};
use crate::noise::NoiseChannels;
use glam::IVec2;
use serde::{Deserialize, Serialize};
use voxgen_core::seed::{self, salt};
use voxgen_core::ContentKey;

/// Columns closer than this to a lateral edge may take the neighbour's biome.
pub const BLEND_DISTANCE: i32 = 4;

/// Biome identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Biome {
    Ocean,
    Beach,
    Plains,
    Forest,
    Jungle,
    Woodlands,
    Desert,
    Wastelands,
    Snowcap,
    Lake,
    Space,
    Sky,
    DeepAbyss,
}

impl Biome {
    pub const ALL: [Biome; 13] = [
        Biome::Ocean,
        Biome::Beach,
        Biome::Plains,
        Biome::Forest,
        Biome::Jungle,
        Biome::Woodlands,
        Biome::Desert,
        Biome::Wastelands,
        Biome::Snowcap,
        Biome::Lake,
        Biome::Space,
        Biome::Sky,
        Biome::DeepAbyss,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Biome::Ocean => "ocean",
            Biome::Beach => "beach",
            Biome::Plains => "plains",
            Biome::Forest => "forest",
            Biome::Jungle => "jungle",
            Biome::Woodlands => "woodlands",
            Biome::Desert => "desert",
            Biome::Wastelands => "wastelands",
            Biome::Snowcap => "snowcap",
            Biome::Lake => "lake",
            Biome::Space => "space",
            Biome::Sky => "sky",
            Biome::DeepAbyss => "deep_abyss",
        }
    }

    /// Single character for ASCII maps.
    pub fn glyph(self) -> char {
        match self {
            Biome::Ocean => '~',
            Biome::Beach => '.',
            Biome::Plains => '"',
            Biome::Forest => 'f',
            Biome::Jungle => 'J',
            Biome::Woodlands => 'w',
            Biome::Desert => 'd',
            Biome::Wastelands => 'x',
            Biome::Snowcap => '^',
            Biome::Lake => 'o',
            Biome::Space => '*',
            Biome::Sky => ' ',
            Biome::DeepAbyss => '#',
        }
    }

    /// Whether the biome is decided by altitude alone.
    pub fn is_altitude_band(self) -> bool {
        matches!(self, Biome::Space | Biome::Sky | Biome::DeepAbyss)
    }

    /// Material of the topmost ground voxel.
    pub fn surface_top(self) -> ContentKey {
        match self {
            Biome::Ocean | Biome::Beach => ContentKey::Sand,
            Biome::Lake => ContentKey::Clay,
            Biome::Jungle => ContentKey::JungleGrass,
            Biome::Wastelands => ContentKey::DryGrass,
            Biome::Snowcap => ContentKey::SnowGrass,
            Biome::Desert => ContentKey::DesertSand,
            Biome::Plains
            | Biome::Forest
            | Biome::Woodlands
            | Biome::Space
            | Biome::Sky
            | Biome::DeepAbyss => ContentKey::Grass,
        }
    }

    /// Material of the textured layer just below the top.
    pub fn subsoil(self) -> ContentKey {
        match self {
            Biome::Ocean | Biome::Beach => ContentKey::Sand,
            Biome::Desert => ContentKey::DesertSand,
            Biome::Lake => ContentKey::Clay,
            _ => ContentKey::Mud,
        }
    }
}

/// Density values at or below which a decoration kind is absent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DensityZeros {
    pub tree: f64,
    pub grass: f64,
    pub boulder: f64,
}

impl Biome {
    /// Zero-points of the tree, grass and boulder density ramps.
    pub fn density_zeros(self) -> DensityZeros {
        let (tree, grass, boulder) = match self {
            Biome::Jungle => (-0.6, -0.7, 0.6),
            Biome::Forest => (-0.5, -0.4, 0.5),
            Biome::Plains | Biome::Lake => (-0.2, -0.6, 0.5),
            Biome::Desert => (0.2, 0.0, 0.5),
            Biome::Wastelands => (0.0, 0.0, 0.2),
            Biome::Woodlands => (-0.39, -0.4, 0.3),
            _ => (-0.39, -0.4, 0.5),
        };
        DensityZeros {
            tree,
            grass,
            boulder,
        }
    }
}

impl std::fmt::Display for Biome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Altitude-band biome of a chunk, if its Y span puts it in one.
pub fn altitude_band(pos: ChunkPos) -> Option<Biome> {
    let min_y = pos.node_min().y;
    if min_y >= SPACE_LEVEL {
        Some(Biome::Space)
    } else if min_y >= SKY_LEVEL {
        Some(Biome::Sky)
    } else if pos.node_max().y <= ABYSS_LEVEL {
        Some(Biome::DeepAbyss)
    } else {
        None
    }
}

/// Height/humidity table for ground-level chunks.
pub fn biome_for(avg_height: i32, humidity: f32) -> Biome {
    if avg_height <= -10 {
        Biome::Ocean
    } else if avg_height >= 40 {
        Biome::Snowcap
    } else if avg_height <= 2 {
        if humidity < 0.5 {
            Biome::Beach
        } else {
            Biome::Lake
        }
    } else if avg_height > 30 {
        if humidity < 0.25 {
            Biome::Woodlands
        } else if humidity < 0.5 {
            Biome::Forest
        } else {
            Biome::Jungle
        }
    } else if avg_height > 10 {
        if humidity < 0.05 {
            Biome::Wastelands
        } else if humidity < 0.25 {
            Biome::Desert
        } else if humidity < 0.5 {
            Biome::Woodlands
        } else if humidity < 0.75 {
            Biome::Forest
        } else {
            Biome::Jungle
        }
    } else if humidity < 0.25 {
        Biome::Plains
    } else if humidity < 0.75 {
        Biome::Woodlands
    } else {
        Biome::Forest
    }
}

/// Average of the four corner columns and the centre column, truncated.
pub fn five_point_height(channels: &NoiseChannels, pos: ChunkPos) -> i32 {
    let min = pos.node_min();
    let max = pos.node_max();
    let centre = pos.center();
    [
        IVec2::new(min.x, min.z),
        IVec2::new(max.x, min.z),
        IVec2::new(min.x, max.z),
        IVec2::new(max.x, max.z),
        IVec2::new(centre.x, centre.z),
    ]
    .iter()
    .map(|c| ground_height_at(&channels.ground_height, *c) as i32)
    .sum::<i32>()
        / 5
}

/// Biome of one chunk.
pub fn classify_chunk_biome(channels: &NoiseChannels, pos: ChunkPos) -> Biome {
    if let Some(band) = altitude_band(pos) {
        return band;
    }
    let centre = pos.center();
    let humidity = humidity_at(&channels.humidity, IVec2::new(centre.x, centre.z));
    biome_for(five_point_height(channels, pos), humidity)
}

/// A chunk's biome plus those of its eight lateral neighbours.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BiomeNeighbourhood {
    /// Indexed as biomes[dz + 1][dx + 1].
    biomes: [[Biome; 3]; 3],
}

impl BiomeNeighbourhood {
    pub fn classify(channels: &NoiseChannels, pos: ChunkPos) -> Self {
        let mut biomes = [[Biome::Plains; 3]; 3];
        for (row, dz) in biomes.iter_mut().zip(-1..=1) {
            for (cell, dx) in row.iter_mut().zip(-1..=1) {
                *cell = classify_chunk_biome(channels, pos.offset(dx, dz));
            }
        }
        Self { biomes }
    }

    /// Every position reports the same biome.
    pub fn uniform(biome: Biome) -> Self {
        Self {
            biomes: [[biome; 3]; 3],
        }
    }

    pub fn from_grid(biomes: [[Biome; 3]; 3]) -> Self {
        Self { biomes }
    }

    #[inline]
    pub fn own(&self) -> Biome {
        self.biomes[1][1]
    }

    /// Biome of the neighbour at lateral offset `(dx, dz)`, each in `-1..=1`.
    #[inline]
    pub fn get(&self, dx: i32, dz: i32) -> Biome {
        self.biomes[(dz.clamp(-1, 1) + 1) as usize][(dx.clamp(-1, 1) + 1) as usize]
    }

    /// Whether the four edge-sharing neighbours all match the own biome.
    pub fn laterals_match(&self) -> bool {
        let own = self.own();
        [(1, 0), (-1, 0), (0, 1), (0, -1)]
            .iter()
            .all(|(dx, dz)| self.get(*dx, *dz) == own)
    }
}

/// Which side of the chunk a column is close to, and how close.
fn edge_pull(local: i32) -> (i32, i32) {
    if local < BLEND_DISTANCE {
        (-1, local)
    } else if CHUNK_SIZE - 1 - local < BLEND_DISTANCE {
        (1, CHUNK_SIZE - 1 - local)
    } else {
        (0, BLEND_DISTANCE)
    }
}

/// Biome used for surface and decoration rules in one column.
///
/// Within [`BLEND_DISTANCE`] of a lateral edge the neighbour's biome is
/// chosen with probability `(4 - d) / 8`, decided by a positional hash so the
/// result is reproducible.
pub fn blend_biome_at_column(
    world_seed: u64,
    pos: ChunkPos,
    neighbourhood: &BiomeNeighbourhood,
    column: IVec2,
) -> Biome {
    let own = neighbourhood.own();
    if neighbourhood.laterals_match() {
        return own;
    }
    let min = pos.node_min();
    let (dx, dist_x) = edge_pull(column.x - min.x);
    let (dz, dist_z) = edge_pull(column.y - min.z);
    if dx == 0 && dz == 0 {
        return own;
    }

    let hash_seed = seed::lattice_seed(seed::channel_seed(world_seed, salt::BIOME_BLEND));
    let roll = seed::column_hash(column.x, column.y, hash_seed) as f64 / 2_147_483_648.0;
    let chance = |d: i32| (BLEND_DISTANCE - d) as f64 / (2 * BLEND_DISTANCE) as f64;
    let take_x = dx != 0 && roll < chance(dist_x);
    let take_z = dz != 0 && roll < chance(dist_z);

    match (take_x, take_z) {
        (true, true) => neighbourhood.get(dx, dz),
        (true, false) => neighbourhood.get(dx, 0),
        (false, true) => neighbourhood.get(0, dz),
        (false, false) => own,
    }
}
