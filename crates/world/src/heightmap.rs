//! Ground height and humidity sampling.
//!
//! Both are 2D functions of the column only; a chunk's Y coordinate never
//! changes its heightmap.

use crate::chunk::{ChunkPos, CHUNK_SIZE, WATER_LEVEL};
use crate::noise::{NoiseField, NoiseParams};
use glam::IVec2;

const CHUNK: usize = CHUNK_SIZE as usize;

/// Vertical scale applied to the shaped height sample.
pub const HEIGHT_SCALE: f64 = 25.0;
/// Exponent flattening lowlands while keeping peaks.
pub const HEIGHT_EXPONENT: f64 = 1.9;
/// Lowest value [`ground_height`] can return.
pub const MIN_GROUND: i32 = WATER_LEVEL + 1 - HEIGHT_SCALE as i32;
/// Highest value [`ground_height`] can return.
pub const MAX_GROUND: i32 = WATER_LEVEL + 1 + HEIGHT_SCALE as i32;

/// Ground height of a column from an already-built height field.
pub fn ground_height_at(field: &NoiseField, column: IVec2) -> i16 {
    let mut h = field.at_column(column).clamp(-1.0, 1.0);
    if h > 0.0 {
        h = h.powf(HEIGHT_EXPONENT);
    }
    (h * HEIGHT_SCALE) as i16 + (WATER_LEVEL + 1) as i16
}

/// Ground height of a column.
///
/// Always within [`MIN_GROUND`]`..=`[`MAX_GROUND`].
pub fn ground_height(seed: u64, column: IVec2) -> i16 {
    ground_height_at(&NoiseField::new(NoiseParams::ground_height(seed)), column)
}

/// Humidity of a column from an already-built humidity field, in `[0, 1]`.
pub fn humidity_at(field: &NoiseField, column: IVec2) -> f32 {
    (0.5 + field.at_column(column) * 0.5).clamp(0.0, 1.0) as f32
}

pub fn humidity(seed: u64, column: IVec2) -> f32 {
    humidity_at(&NoiseField::new(NoiseParams::humidity(seed)), column)
}

/// Ground heights of the 16x16 columns of one chunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Heightmap {
    origin: IVec2,
    /// Indexed as heights[z][x].
    heights: [[i16; CHUNK]; CHUNK],
}

impl Heightmap {
    /// Sample every column of `pos` from the ground-height field.
    pub fn generate(field: &NoiseField, pos: ChunkPos) -> Self {
        let min = pos.node_min();
        let origin = IVec2::new(min.x, min.z);
        let mut heights = [[0i16; CHUNK]; CHUNK];
        for (local_z, row) in heights.iter_mut().enumerate() {
            for (local_x, cell) in row.iter_mut().enumerate() {
                *cell = ground_height_at(field, origin + IVec2::new(local_x as i32, local_z as i32));
            }
        }
        Self { origin, heights }
    }

    /// Every column of `pos` at the same height.
    pub fn flat(pos: ChunkPos, height: i16) -> Self {
        let min = pos.node_min();
        Self {
            origin: IVec2::new(min.x, min.z),
            heights: [[height; CHUNK]; CHUNK],
        }
    }

    /// Height at a local column; `None` outside `0..16`.
    pub fn get(&self, local_x: usize, local_z: usize) -> Option<i16> {
        self.heights.get(local_z)?.get(local_x).copied()
    }

    /// Height at a world column; `None` when the column is not in this chunk.
    pub fn at_column(&self, column: IVec2) -> Option<i16> {
        let local = column - self.origin;
        if local.x < 0 || local.y < 0 {
            return None;
        }
        self.get(local.x as usize, local.y as usize)
    }

    pub fn heights(&self) -> &[[i16; CHUNK]; CHUNK] {
        &self.heights
    }

    pub fn min_height(&self) -> i16 {
        self.heights.iter().flatten().copied().min().unwrap_or(0)
    }

    pub fn max_height(&self) -> i16 {
        self.heights.iter().flatten().copied().max().unwrap_or(0)
    }

    /// Locally-averaged ground level, rounded toward zero.
    pub fn avg_height(&self) -> i32 {
        let sum: i32 = self.heights.iter().flatten().map(|h| *h as i32).sum();
        sum / (CHUNK * CHUNK) as i32
    }

    /// Whether the Y span `[bottom, top]` comes within `margin` of the ground band.
    ///
    /// The band runs from the lowest to the highest column, not the average
    /// height, so a chunk holding any column's surface always qualifies.
    pub fn near_ground(&self, bottom: i32, top: i32, margin: i32) -> bool {
        top >= self.min_height() as i32 - margin && bottom <= self.max_height() as i32 + margin
    }
}

/// Largest height jump across the shared edge of two laterally adjacent chunks.
///
/// Returns `None` when the chunks do not share an edge.
pub fn max_seam_delta(field: &NoiseField, a: ChunkPos, b: ChunkPos) -> Option<i32> {
    let (first, second, along_x) = match (b.x - a.x, b.z - a.z) {
        (1, 0) => (a, b, true),
        (-1, 0) => (b, a, true),
        (0, 1) => (a, b, false),
        (0, -1) => (b, a, false),
        _ => return None,
    };
    let hm1 = Heightmap::generate(field, first);
    let hm2 = Heightmap::generate(field, second);
    let last = CHUNK - 1;
    (0..CHUNK)
        .filter_map(|i| {
            let (h1, h2) = if along_x {
                (hm1.get(last, i)?, hm2.get(0, i)?)
            } else {
                (hm1.get(i, last)?, hm2.get(i, 0)?)
            };
            Some((h1 as i32 - h2 as i32).abs())
        })
        .max()
}
