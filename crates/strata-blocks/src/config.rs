use serde::Deserialize;

use super::types::{Fluid, Tint};

#[derive(Clone, Debug, Deserialize)]
pub struct BlocksConfig {
    pub blocks: Vec<BlockDef>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct BlockDef {
    pub name: String,
    pub id: Option<u16>,
    /// `0xRRGGBB`; zero means the block never shows on the map.
    #[serde(default)]
    pub color: u32,
    #[serde(default)]
    pub tint: Option<Tint>,
    #[serde(default)]
    pub fluid: Option<Fluid>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct BiomesConfig {
    #[serde(default)]
    pub defaults: BiomeDefaults,
    pub biomes: Vec<BiomeDef>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct BiomeDefaults {
    #[serde(default = "default_grass")]
    pub grass: u32,
    #[serde(default = "default_foliage")]
    pub foliage: u32,
    #[serde(default = "default_water")]
    pub water: u32,
}

fn default_grass() -> u32 {
    0x91BD59
}
fn default_foliage() -> u32 {
    0x77AB2F
}
fn default_water() -> u32 {
    0x3F76E4
}

impl Default for BiomeDefaults {
    fn default() -> Self {
        Self {
            grass: default_grass(),
            foliage: default_foliage(),
            water: default_water(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct BiomeDef {
    pub name: String,
    pub id: Option<u16>,
    #[serde(default)]
    pub color: u32,
    pub grass: Option<u32>,
    pub foliage: Option<u32>,
    pub water: Option<u32>,
}
