//! Debug views over the generator: ASCII maps, chunk summaries, column dumps.

use anyhow::{bail, ensure, Context, Result};
use glam::{IVec2, IVec3};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::str::FromStr;
use voxgen_core::{ContentKey, RealmKind};
use voxgen_testkit::{grid_digest, ContentHistogram, SeamValidation};
use voxgen_world::heightmap::max_seam_delta;
use voxgen_world::{
    Biome, ChunkGenerator, ChunkPos, ColumnWalk, GenerationStats, Heightmap, VoxelArea,
    VoxelGrid, CHUNK_SIZE, WATER_LEVEL,
};

/// Largest ground-height jump tolerated across a chunk seam.
pub const SEAM_TOLERANCE: i32 = 5;

/// Inclusive rectangle of chunk columns, parsed from `x1,z1,x2,z2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub min: IVec2,
    pub max: IVec2,
}

impl Region {
    pub fn chunks(&self, y: i32) -> impl Iterator<Item = ChunkPos> + '_ {
        (self.min.y..=self.max.y)
            .flat_map(move |z| (self.min.x..=self.max.x).map(move |x| ChunkPos::new(x, y, z)))
    }

    fn width(&self) -> i32 {
        self.max.x - self.min.x + 1
    }
}

impl FromStr for Region {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let [x1, z1, x2, z2] = parse_ints::<4>(s).context("region must be x1,z1,x2,z2")?;
        ensure!(x1 <= x2 && z1 <= z2, "region corners out of order: {s}");
        Ok(Self {
            min: IVec2::new(x1, z1),
            max: IVec2::new(x2, z2),
        })
    }
}

/// Parse `N` comma-separated integers.
pub fn parse_ints<const N: usize>(s: &str) -> Result<[i32; N]> {
    let values = s
        .split(',')
        .map(|part| {
            part.trim()
                .parse::<i32>()
                .with_context(|| format!("invalid integer {part:?}"))
        })
        .collect::<Result<Vec<_>>>()?;
    match <[i32; N]>::try_from(values) {
        Ok(array) => Ok(array),
        Err(values) => bail!("expected {N} values, got {}", values.len()),
    }
}

fn heightmap_of(generator: &ChunkGenerator, pos: ChunkPos) -> Heightmap {
    match generator.config().realm {
        RealmKind::Flat => Heightmap::flat(pos, WATER_LEVEL as i16),
        RealmKind::Standard => Heightmap::generate(&generator.channels().ground_height, pos),
    }
}

fn shade(h: i16, lo: i16, hi: i16) -> char {
    let normalized = if hi > lo {
        (h - lo) as f32 / (hi - lo) as f32
    } else {
        0.5
    };
    match normalized {
        n if n > 0.8 => '█',
        n if n > 0.6 => '▓',
        n if n > 0.4 => '▒',
        n if n > 0.2 => '░',
        _ => '·',
    }
}

/// Ground heights of a region, one glyph per column.
pub fn heightmap_ascii(generator: &ChunkGenerator, region: Region) -> String {
    let maps: BTreeMap<(i32, i32), Heightmap> = region
        .chunks(0)
        .map(|pos| ((pos.x, pos.z), heightmap_of(generator, pos)))
        .collect();
    let lo = maps.values().map(Heightmap::min_height).min().unwrap_or(0);
    let hi = maps.values().map(Heightmap::max_height).max().unwrap_or(0);

    let mut out = String::new();
    let _ = writeln!(out, "Heightmap (seed {})", generator.config().seed);
    let _ = writeln!(
        out,
        "Region: chunks ({}, {}) to ({}, {})",
        region.min.x, region.min.y, region.max.x, region.max.y
    );
    let _ = writeln!(out, "Height range: {lo} to {hi}");
    out.push_str("Legend: █ high, ▓ med-high, ▒ med-low, ░ low, · very low\n\n");

    for cz in region.min.y..=region.max.y {
        for lz in 0..CHUNK_SIZE as usize {
            for cx in region.min.x..=region.max.x {
                let Some(hm) = maps.get(&(cx, cz)) else {
                    continue;
                };
                for lx in 0..CHUNK_SIZE as usize {
                    out.push(hm.get(lx, lz).map_or('?', |h| shade(h, lo, hi)));
                }
            }
            out.push('\n');
        }
    }
    out
}

/// Chunk biomes of a region at sea level, one glyph per chunk.
pub fn biome_ascii(generator: &ChunkGenerator, region: Region) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Biome map (seed {})", generator.config().seed);
    out.push_str("Legend:\n");
    for (i, biome) in Biome::ALL.iter().filter(|b| !b.is_altitude_band()).enumerate() {
        let _ = write!(out, "  {} = {:<12}", biome.glyph(), biome.name());
        if i % 4 == 3 {
            out.push('\n');
        }
    }
    out.push_str("\n\n");

    let width = region.width() as usize;
    for (i, pos) in region.chunks(0).enumerate() {
        out.push(generator.biome_of(pos).glyph());
        if (i + 1) % width == 0 {
            out.push('\n');
        }
    }
    out
}

/// Result of generating one chunk from scratch.
#[derive(Debug, Clone, Serialize)]
pub struct ChunkSummary {
    pub chunk: [i32; 3],
    pub biome: String,
    pub digest: String,
    pub liquid_queue: usize,
    pub stats: GenerationStats,
    /// Voxel count per content name, inside the chunk only.
    pub contents: BTreeMap<String, usize>,
}

/// Generate a fresh halo grid for `pos`.
pub fn generate(generator: &ChunkGenerator, pos: ChunkPos) -> (VoxelGrid, ChunkSummary) {
    let palette = generator.palette();
    let mut grid = VoxelGrid::new(
        VoxelArea::with_halo(pos),
        palette.voxel(ContentKey::Ignore),
    );
    let output = generator.make_block(pos, &mut grid);

    let inside: Vec<_> = VoxelArea::of_chunk(pos)
        .positions()
        .filter_map(|p| grid.get(p))
        .collect();
    let contents = ContentHistogram::from_voxels(&inside)
        .iter()
        .map(|(id, n)| {
            let name = palette
                .key_of(id)
                .map_or_else(|| format!("#{id}"), |k| k.name().to_string());
            (name, n)
        })
        .collect();

    let summary = ChunkSummary {
        chunk: [pos.x, pos.y, pos.z],
        biome: output.biome.name().to_string(),
        digest: grid_digest(grid.voxels()),
        liquid_queue: output.liquid_queue.len(),
        stats: output.stats,
        contents,
    };
    (grid, summary)
}

pub fn chunk_report(generator: &ChunkGenerator, pos: ChunkPos, json: bool) -> Result<String> {
    let (_, summary) = generate(generator, pos);
    if json {
        return serde_json::to_string_pretty(&summary).context("serializing chunk summary");
    }

    let mut out = String::new();
    let _ = writeln!(out, "Chunk {pos} ({})", summary.biome);
    let _ = writeln!(out, "Digest: {}", summary.digest);
    let _ = writeln!(out, "Liquid queue: {}", summary.liquid_queue);
    let stats = serde_json::to_value(&summary.stats).context("serializing stats")?;
    if let Some(fields) = stats.as_object() {
        out.push_str("\nStats:\n");
        for (name, value) in fields {
            if value.as_u64() != Some(0) {
                let _ = writeln!(out, "  {name:<18} {value}");
            }
        }
    }
    out.push_str("\nContents:\n");
    for (name, n) in &summary.contents {
        let _ = writeln!(out, "  {name:<18} {n}");
    }
    Ok(out)
}

/// Voxels of one column of a generated chunk, top to bottom.
pub fn column_dump(generator: &ChunkGenerator, pos: ChunkPos, column: IVec2) -> Result<String> {
    let base = IVec3::new(column.x, pos.node_min().y, column.y);
    ensure!(
        pos.contains(base),
        "column ({}, {}) is outside chunk {pos}",
        column.x,
        column.y
    );
    let (grid, summary) = generate(generator, pos);
    let palette = generator.palette();

    let mut out = String::new();
    let _ = writeln!(
        out,
        "Column ({}, {}) of chunk {pos} ({})",
        column.x, column.y, summary.biome
    );
    for p in ColumnWalk::down(column, pos.node_max().y, pos.node_min().y) {
        let Some(voxel) = grid.get(p) else {
            continue;
        };
        let name = palette
            .key_of(voxel.content)
            .map_or("unknown", ContentKey::name);
        let _ = write!(out, "{:>6}  {name}", p.y);
        if voxel.param1 != 0 {
            let _ = write!(out, " [param1={}]", voxel.param1);
        }
        out.push('\n');
    }
    Ok(out)
}

/// Ground-height continuity across every seam of a region.
pub fn validate_seams(generator: &ChunkGenerator, region: Region) -> SeamValidation {
    let field = &generator.channels().ground_height;
    let mut report = SeamValidation::default();
    for pos in region.chunks(0) {
        let east = (pos.x < region.max.x).then(|| pos.offset(1, 0));
        let south = (pos.z < region.max.y).then(|| pos.offset(0, 1));
        for neighbour in [east, south].into_iter().flatten() {
            let delta = match generator.config().realm {
                RealmKind::Flat => Some(0),
                RealmKind::Standard => max_seam_delta(field, pos, neighbour),
            };
            if let Some(delta) = delta {
                report.total_seams += 1;
                if delta <= SEAM_TOLERANCE {
                    report.seams_valid += 1;
                }
                report.max_seam_diff = report.max_seam_diff.max(delta);
            }
        }
    }
    report
}

pub fn seam_summary(report: &SeamValidation) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Seams checked:      {}", report.total_seams);
    let _ = writeln!(out, "Within tolerance:   {}", report.seams_valid);
    let _ = writeln!(out, "Max height delta:   {}", report.max_seam_diff);
    out
}
