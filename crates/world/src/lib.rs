//! Deterministic voxel world generation.
//!
//! [`ChunkGenerator::make_block`] fills one chunk of a halo-extended
//! [`VoxelGrid`] from the world seed: terrain and caves, minerals, soil,
//! dungeons and surface decoration, or one of the altitude-band realms.

pub mod biome;
pub mod chunk;
pub mod config;
pub mod context;
pub mod decoration;
pub mod dungeon;
pub mod generator;
pub mod grid;
pub mod heightmap;
pub mod minerals;
pub mod noise;
pub mod palette;
pub mod realms;
pub mod soil;
pub mod terrain;
pub mod trees;

pub use biome::{Biome, BiomeNeighbourhood};
pub use chunk::{ChunkPos, CHUNK_SIZE, SKY_LEVEL, SPACE_LEVEL, WATER_LEVEL};
pub use config::GeneratorConfig;
pub use context::GenerationContext;
pub use generator::{ChunkGenerator, GenerationOutput, GenerationStats};
pub use grid::{ColumnWalk, FlagField, GenFlags, VoxelArea, VoxelGrid};
pub use heightmap::{ground_height, humidity, Heightmap};
pub use minerals::Mineral;
pub use palette::{Palette, PaletteError};
