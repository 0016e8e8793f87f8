//! Block and biome palettes plus packed-color helpers.
#![forbid(unsafe_code)]

pub mod biome;
pub mod color;
pub mod config;
pub mod registry;
pub mod types;

use std::error::Error;
use std::path::Path;

pub use biome::{BiomeRegistry, BiomeType};
pub use registry::{BlockRegistry, BlockType};
pub use types::{BiomeId, Block, BlockId, Fluid, Tint};

const BUILTIN_BLOCKS: &str = include_str!("../assets/blocks.toml");
const BUILTIN_BIOMES: &str = include_str!("../assets/biomes.toml");

/// Static color tables consulted by the renderer for every column.
#[derive(Clone, Debug)]
pub struct Palette {
    pub blocks: BlockRegistry,
    pub biomes: BiomeRegistry,
}

impl Palette {
    pub fn new(blocks: BlockRegistry, biomes: BiomeRegistry) -> Self {
        Self { blocks, biomes }
    }

    /// Palette compiled from the tables shipped with this crate.
    pub fn builtin() -> Result<Self, Box<dyn Error>> {
        Ok(Self {
            blocks: BlockRegistry::from_toml_str(BUILTIN_BLOCKS)?,
            biomes: BiomeRegistry::from_toml_str(BUILTIN_BIOMES)?,
        })
    }

    pub fn load_from_paths(
        blocks_path: impl AsRef<Path>,
        biomes_path: impl AsRef<Path>,
    ) -> Result<Self, Box<dyn Error>> {
        Ok(Self {
            blocks: BlockRegistry::from_path(blocks_path)?,
            biomes: BiomeRegistry::from_path(biomes_path)?,
        })
    }
}
