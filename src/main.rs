//! voxgen - debug front end for the chunk generator.
//!
//! Usage:
//!   voxgen heightmap --region -2,-2,2,2
//!   voxgen biomes --seed 12345 --region -5,-5,5,5
//!   voxgen chunk --pos 0,0,0 --json
//!   voxgen column --pos 0,0,0 --column 3,7
//!   voxgen seams --region -3,-3,3,3

mod commands;
mod config;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use commands::Region;
use config::{VoxgenConfig, DEFAULT_CONFIG_PATH};
use glam::IVec2;
use std::fs;
use std::path::PathBuf;
use tracing::info;
use voxgen_core::RealmKind;
use voxgen_world::{ChunkGenerator, ChunkPos};

#[derive(Parser, Debug)]
#[command(author, version, about = "Inspect deterministic voxel terrain generation")]
struct Args {
    /// Generator configuration file
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// World seed (overrides the config file)
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Realm kind: standard or flat (overrides the config file)
    #[arg(long, global = true)]
    realm: Option<RealmKind>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// ASCII ground-height map of a region of chunk columns
    Heightmap {
        /// x1,z1,x2,z2 in chunk coordinates
        #[arg(long)]
        region: Region,
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Chunk biome map of a region
    Biomes {
        #[arg(long)]
        region: Region,
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Generate one chunk and print its stats, contents and digest
    Chunk {
        /// x,y,z in chunk coordinates
        #[arg(long, value_parser = parse_chunk_pos)]
        pos: ChunkPos,
        #[arg(long)]
        json: bool,
    },
    /// Dump one column of a generated chunk, top to bottom
    Column {
        #[arg(long, value_parser = parse_chunk_pos)]
        pos: ChunkPos,
        /// x,z in world coordinates
        #[arg(long, value_parser = parse_column)]
        column: IVec2,
    },
    /// Check ground-height continuity across chunk seams
    Seams {
        #[arg(long)]
        region: Region,
    },
}

fn parse_chunk_pos(s: &str) -> Result<ChunkPos> {
    let [x, y, z] = commands::parse_ints::<3>(s)?;
    Ok(ChunkPos::new(x, y, z))
}

fn parse_column(s: &str) -> Result<IVec2> {
    let [x, z] = commands::parse_ints::<2>(s)?;
    Ok(IVec2::new(x, z))
}

fn emit(text: String, output: Option<PathBuf>) -> Result<()> {
    match output {
        Some(path) => {
            fs::write(&path, text).with_context(|| format!("writing {}", path.display()))?;
            println!("Saved to {}", path.display());
        }
        None => print!("{text}"),
    }
    Ok(())
}

fn main() -> Result<()> {
    // WARN by default, overridable via RUST_LOG
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let args = Args::parse();
    let mut config = VoxgenConfig::load_from_path(&args.config);
    if let Some(seed) = args.seed {
        config.generator.seed = seed;
    }
    if let Some(realm) = args.realm {
        config.generator.realm = realm;
    }
    let table = config.content_table()?;
    let generator = ChunkGenerator::from_lookup(config.generator.clone(), &table)
        .context("resolving content table")?;
    info!(seed = config.generator.seed, realm = %config.generator.realm, "generator ready");

    match args.command {
        Command::Heightmap { region, output } => {
            emit(commands::heightmap_ascii(&generator, region), output)
        }
        Command::Biomes { region, output } => {
            emit(commands::biome_ascii(&generator, region), output)
        }
        Command::Chunk { pos, json } => emit(commands::chunk_report(&generator, pos, json)?, None),
        Command::Column { pos, column } => {
            emit(commands::column_dump(&generator, pos, column)?, None)
        }
        Command::Seams { region } => {
            let report = commands::validate_seams(&generator, region);
            print!("{}", commands::seam_summary(&report));
            if !report.passed() {
                bail!(
                    "{} of {} seams exceed a height jump of {}",
                    report.total_seams - report.seams_valid,
                    report.total_seams,
                    commands::SEAM_TOLERANCE
                );
            }
            Ok(())
        }
    }
}
