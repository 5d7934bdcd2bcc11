//! Coherent noise channels used by every generation pass.
//!
//! Each semantic channel is a [`NoiseParams`] bundle seeded by the world seed
//! plus a fixed channel offset, evaluated by a [`NoiseField`] as a raw sum of
//! Perlin octaves (no normalisation) multiplied by `scale`.

use glam::{DVec2, DVec3, IVec2, IVec3};
use noise::{NoiseFn, Perlin};
use voxgen_core::seed::{self, channel};

/// Product of the two cave contours must exceed this for a voxel to be cave.
pub const CAVE_NOISE_SCALE: f64 = 12.0;
pub const CAVE_THRESHOLD: f64 = 1.5 / CAVE_NOISE_SCALE;

/// Perlin noise is zero on integer lattice points; samples are shifted off them.
const LATTICE_OFFSET: f64 = 0.5;

/// How raw octave sums are post-processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoiseKind {
    /// Signed octave sum.
    Perlin,
    /// Sum of absolute octave values.
    PerlinAbs,
    /// `contour(scale * sum)`: peaks where the field crosses zero.
    PerlinContour,
    /// Contour sampled with Y and Z swapped, decorrelating it from [`NoiseKind::PerlinContour`].
    PerlinContourFlipYz,
    /// Always `1.0`.
    ConstantOne,
}

/// `1 - |v|` inside the unit band, zero elsewhere.
#[inline]
pub fn contour(v: f64) -> f64 {
    let v = v.abs();
    if v >= 1.0 {
        0.0
    } else {
        1.0 - v
    }
}

/// Immutable parameters of one noise channel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoiseParams {
    pub kind: NoiseKind,
    pub seed: u64,
    pub octaves: u32,
    pub persistence: f64,
    pub spread: f64,
    pub scale: f64,
}

impl NoiseParams {
    pub const fn new(
        kind: NoiseKind,
        seed: u64,
        octaves: u32,
        persistence: f64,
        spread: f64,
        scale: f64,
    ) -> Self {
        Self {
            kind,
            seed,
            octaves,
            persistence,
            spread,
            scale,
        }
    }

    pub fn cave_a(world_seed: u64) -> Self {
        Self::new(
            NoiseKind::PerlinContour,
            seed::channel_seed(world_seed, channel::CAVE_A),
            4,
            0.5,
            50.0,
            CAVE_NOISE_SCALE,
        )
    }

    pub fn cave_b(world_seed: u64) -> Self {
        Self::new(
            NoiseKind::PerlinContourFlipYz,
            seed::channel_seed(world_seed, channel::CAVE_B),
            4,
            0.5,
            50.0,
            CAVE_NOISE_SCALE,
        )
    }

    pub fn crumbleness(world_seed: u64) -> Self {
        Self::new(
            NoiseKind::Perlin,
            seed::channel_seed(world_seed, channel::CRUMBLENESS),
            3,
            1.3,
            20.0,
            2.0,
        )
    }

    pub fn wetness(world_seed: u64) -> Self {
        Self::new(
            NoiseKind::Perlin,
            seed::channel_seed(world_seed, channel::WETNESS),
            4,
            1.1,
            40.0,
            1.0,
        )
    }

    pub fn ground_height(world_seed: u64) -> Self {
        Self::new(
            NoiseKind::Perlin,
            seed::channel_seed(world_seed, channel::GROUND_HEIGHT),
            5,
            0.55,
            250.0,
            1.0,
        )
    }

    pub fn humidity(world_seed: u64) -> Self {
        Self::new(
            NoiseKind::Perlin,
            seed::channel_seed(world_seed, channel::HUMIDITY),
            4,
            0.66,
            500.0,
            1.0,
        )
    }

    /// Shared shape of the three object-density channels.
    fn density(world_seed: u64, offset: u64) -> Self {
        Self::new(
            NoiseKind::Perlin,
            seed::channel_seed(world_seed, offset),
            4,
            0.66,
            125.0,
            1.0,
        )
    }

    pub fn tree_density(world_seed: u64) -> Self {
        Self::density(world_seed, channel::TREE_DENSITY)
    }

    pub fn grass_density(world_seed: u64) -> Self {
        Self::density(world_seed, channel::GRASS_DENSITY)
    }

    pub fn boulder_density(world_seed: u64) -> Self {
        Self::density(world_seed, channel::BOULDER_DENSITY)
    }

    pub fn debris(world_seed: u64) -> Self {
        Self::new(
            NoiseKind::Perlin,
            seed::channel_seed(world_seed, channel::DEBRIS),
            3,
            0.6,
            30.0,
            1.0,
        )
    }

    pub fn ground_cover(world_seed: u64) -> Self {
        Self::new(
            NoiseKind::Perlin,
            seed::channel_seed(world_seed, channel::GROUND_COVER),
            2,
            0.5,
            10.0,
            1.0,
        )
    }
}

/// Evaluator for one [`NoiseParams`] channel.
pub struct NoiseField {
    params: NoiseParams,
    octaves: Vec<Perlin>,
}

impl NoiseField {
    pub fn new(params: NoiseParams) -> Self {
        let base = seed::lattice_seed(params.seed);
        let octaves = (0..params.octaves)
            .map(|i| Perlin::new(base.wrapping_add(i as i32) as u32))
            .collect();
        Self { params, octaves }
    }

    #[inline]
    pub fn params(&self) -> &NoiseParams {
        &self.params
    }

    fn octave_sum_2d(&self, p: DVec2) -> f64 {
        let mut value = 0.0;
        let mut amplitude = 1.0;
        let mut frequency = 1.0;
        for perlin in &self.octaves {
            let n = perlin.get([p.x * frequency, p.y * frequency]);
            value += amplitude * if self.params.kind == NoiseKind::PerlinAbs {
                n.abs()
            } else {
                n
            };
            amplitude *= self.params.persistence;
            frequency *= 2.0;
        }
        value
    }

    fn octave_sum_3d(&self, p: DVec3) -> f64 {
        let mut value = 0.0;
        let mut amplitude = 1.0;
        let mut frequency = 1.0;
        for perlin in &self.octaves {
            let n = perlin.get([p.x * frequency, p.y * frequency, p.z * frequency]);
            value += amplitude * if self.params.kind == NoiseKind::PerlinAbs {
                n.abs()
            } else {
                n
            };
            amplitude *= self.params.persistence;
            frequency *= 2.0;
        }
        value
    }

    /// Raw scaled octave sum at a 2D world position, before kind post-processing.
    pub fn raw_2d(&self, x: f64, z: f64) -> f64 {
        let p = (DVec2::new(x, z) + LATTICE_OFFSET) / self.params.spread;
        self.params.scale * self.octave_sum_2d(p)
    }

    pub fn sample_2d(&self, x: f64, z: f64) -> f64 {
        match self.params.kind {
            NoiseKind::ConstantOne => 1.0,
            NoiseKind::Perlin | NoiseKind::PerlinAbs => self.raw_2d(x, z),
            NoiseKind::PerlinContour | NoiseKind::PerlinContourFlipYz => {
                contour(self.raw_2d(x, z))
            }
        }
    }

    pub fn sample_3d(&self, x: f64, y: f64, z: f64) -> f64 {
        let p = (DVec3::new(x, y, z) + LATTICE_OFFSET) / self.params.spread;
        match self.params.kind {
            NoiseKind::ConstantOne => 1.0,
            NoiseKind::Perlin | NoiseKind::PerlinAbs => self.params.scale * self.octave_sum_3d(p),
            NoiseKind::PerlinContour => contour(self.params.scale * self.octave_sum_3d(p)),
            NoiseKind::PerlinContourFlipYz => {
                contour(self.params.scale * self.octave_sum_3d(DVec3::new(p.x, p.z, p.y)))
            }
        }
    }

    #[inline]
    pub fn at_column(&self, column: IVec2) -> f64 {
        self.sample_2d(column.x as f64, column.y as f64)
    }

    #[inline]
    pub fn at(&self, p: IVec3) -> f64 {
        self.sample_3d(p.x as f64, p.y as f64, p.z as f64)
    }
}

/// Samples of a 3D field precomputed on a lattice, interpolated in between.
///
/// Lattice points sit at `min + k * spacing` and cover the requested prism;
/// reads on a lattice point return the point sample exactly.
pub struct NoiseBuffer {
    min: IVec3,
    spacing: i32,
    dims: IVec3,
    samples: Vec<f64>,
}

impl NoiseBuffer {
    pub const DEFAULT_SPACING: i32 = 4;

    pub fn new(field: &NoiseField, min: IVec3, max: IVec3, spacing: i32) -> Self {
        let spacing = spacing.max(1);
        let span = max - min;
        let dims = IVec3::new(
            span.x.div_euclid(spacing) + 2,
            span.y.div_euclid(spacing) + 2,
            span.z.div_euclid(spacing) + 2,
        );
        let mut samples = Vec::with_capacity((dims.x * dims.y * dims.z) as usize);
        for k in 0..dims.z {
            for j in 0..dims.y {
                for i in 0..dims.x {
                    samples.push(field.at(min + IVec3::new(i, j, k) * spacing));
                }
            }
        }
        Self {
            min,
            spacing,
            dims,
            samples,
        }
    }

    #[inline]
    fn lattice(&self, i: i32, j: i32, k: i32) -> f64 {
        let i = i.clamp(0, self.dims.x - 1);
        let j = j.clamp(0, self.dims.y - 1);
        let k = k.clamp(0, self.dims.z - 1);
        self.samples[((k * self.dims.y + j) * self.dims.x + i) as usize]
    }

    /// Trilinear interpolation at a world position inside the prism.
    pub fn get(&self, p: IVec3) -> f64 {
        let d = p - self.min;
        let cell = IVec3::new(
            d.x.div_euclid(self.spacing),
            d.y.div_euclid(self.spacing),
            d.z.div_euclid(self.spacing),
        );
        let rem = d - cell * self.spacing;
        let t = rem.as_dvec3() / self.spacing as f64;
        let (i, j, k) = (cell.x, cell.y, cell.z);

        let lerp = |a: f64, b: f64, t: f64| a + (b - a) * t;
        let x00 = lerp(self.lattice(i, j, k), self.lattice(i + 1, j, k), t.x);
        let x10 = lerp(self.lattice(i, j + 1, k), self.lattice(i + 1, j + 1, k), t.x);
        let x01 = lerp(self.lattice(i, j, k + 1), self.lattice(i + 1, j, k + 1), t.x);
        let x11 = lerp(
            self.lattice(i, j + 1, k + 1),
            self.lattice(i + 1, j + 1, k + 1),
            t.x,
        );
        lerp(lerp(x00, x10, t.y), lerp(x01, x11, t.y), t.z)
    }
}

/// Integer lattice value noise in `(-1, 1]`, used as a positional coin flip.
#[inline]
pub fn value_noise_3d(p: IVec3, seed: i32) -> f64 {
    1.0 - seed::position_hash(p.x, p.y, p.z, seed) as f64 / 1_073_741_824.0
}

#[inline]
pub fn value_noise_2d(column: IVec2, seed: i32) -> f64 {
    1.0 - seed::column_hash(column.x, column.y, seed) as f64 / 1_073_741_824.0
}

/// Every channel the standard pipeline reads, built once per world seed.
pub struct NoiseChannels {
    pub cave_a: NoiseField,
    pub cave_b: NoiseField,
    pub crumbleness: NoiseField,
    pub wetness: NoiseField,
    pub ground_height: NoiseField,
    pub humidity: NoiseField,
    pub tree_density: NoiseField,
    pub grass_density: NoiseField,
    pub boulder_density: NoiseField,
    pub debris: NoiseField,
    pub ground_cover: NoiseField,
}

impl NoiseChannels {
    pub fn new(world_seed: u64) -> Self {
        Self {
            cave_a: NoiseField::new(NoiseParams::cave_a(world_seed)),
            cave_b: NoiseField::new(NoiseParams::cave_b(world_seed)),
            crumbleness: NoiseField::new(NoiseParams::crumbleness(world_seed)),
            wetness: NoiseField::new(NoiseParams::wetness(world_seed)),
            ground_height: NoiseField::new(NoiseParams::ground_height(world_seed)),
            humidity: NoiseField::new(NoiseParams::humidity(world_seed)),
            tree_density: NoiseField::new(NoiseParams::tree_density(world_seed)),
            grass_density: NoiseField::new(NoiseParams::grass_density(world_seed)),
            boulder_density: NoiseField::new(NoiseParams::boulder_density(world_seed)),
            debris: NoiseField::new(NoiseParams::debris(world_seed)),
            ground_cover: NoiseField::new(NoiseParams::ground_cover(world_seed)),
        }
    }

    #[inline]
    pub fn is_cave(&self, p: IVec3) -> bool {
        is_cave_value(self.cave_a.at(p), self.cave_b.at(p))
    }
}

#[inline]
pub fn is_cave_value(contour_a: f64, contour_b: f64) -> bool {
    contour_a * contour_b > CAVE_THRESHOLD
}
