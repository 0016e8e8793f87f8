use std::error::Error;
use std::fs;
use std::path::Path;
use std::thread;

use serde::Deserialize;

use crate::layer::Layer;

/// Largest accepted biome blend radius; a radius of r samples (2r+1)² columns.
pub const MAX_BIOME_BLEND: u32 = 16;

#[derive(Clone, Debug, Deserialize)]
pub struct RenderConfig {
    #[serde(default)]
    pub layers: LayerFlags,
    /// Look through water and lava to the ground below, shading by depth.
    #[serde(default = "default_true")]
    pub translucent_fluids: bool,
    /// Neighborhood radius for biome color averaging; 0 samples one column.
    #[serde(default)]
    pub biome_blend: u32,
}

#[derive(Clone, Copy, Debug, Deserialize)]
pub struct LayerFlags {
    #[serde(default = "default_true")]
    pub biomes: bool,
    #[serde(default = "default_true")]
    pub blocks: bool,
    #[serde(default = "default_true")]
    pub fluids: bool,
    #[serde(default = "default_true")]
    pub heights: bool,
}

fn default_true() -> bool {
    true
}

impl Default for LayerFlags {
    fn default() -> Self {
        Self {
            biomes: true,
            blocks: true,
            fluids: true,
            heights: true,
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            layers: LayerFlags::default(),
            translucent_fluids: true,
            biome_blend: 0,
        }
    }
}

impl RenderConfig {
    /// Whether pixels of `layer` are produced. The fluid layer only exists when
    /// fluids are rendered translucent.
    pub fn renders(&self, layer: Layer) -> bool {
        match layer {
            Layer::Biomes => self.layers.biomes,
            Layer::Blocks => self.layers.blocks,
            Layer::Fluids => self.layers.fluids && self.translucent_fluids,
            Layer::Heights => self.layers.heights,
        }
    }

    pub fn enabled_layers(&self) -> impl Iterator<Item = Layer> + '_ {
        Layer::ALL.into_iter().filter(|l| self.renders(*l))
    }

    pub fn validate(&self) -> Result<(), Box<dyn Error>> {
        if self.biome_blend > MAX_BIOME_BLEND {
            return Err(format!(
                "biome_blend {} exceeds the maximum of {}",
                self.biome_blend, MAX_BIOME_BLEND
            )
            .into());
        }
        if self.enabled_layers().next().is_none() {
            return Err("no map layer is enabled".into());
        }
        Ok(())
    }

    pub fn from_toml_str(toml_str: &str) -> Result<Self, Box<dyn Error>> {
        let cfg: RenderConfig = toml::from_str(toml_str)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, Box<dyn Error>> {
        let s = fs::read_to_string(path)?;
        Self::from_toml_str(&s)
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct SchedulerOptions {
    /// Region scan workers; 0 uses the available parallelism.
    #[serde(default)]
    pub scan_threads: usize,
    #[serde(default = "default_save_threads")]
    pub save_threads: usize,
    /// Finished regions waiting for a save worker before scanners block.
    #[serde(default = "default_save_queue")]
    pub save_queue: usize,
    /// Chunks each region task keeps resident.
    #[serde(default = "default_chunk_cache_capacity")]
    pub chunk_cache_capacity: usize,
}

fn default_save_threads() -> usize {
    2
}
fn default_save_queue() -> usize {
    16
}
fn default_chunk_cache_capacity() -> usize {
    48
}

impl Default for SchedulerOptions {
    fn default() -> Self {
        Self {
            scan_threads: 0,
            save_threads: default_save_threads(),
            save_queue: default_save_queue(),
            chunk_cache_capacity: default_chunk_cache_capacity(),
        }
    }
}

impl SchedulerOptions {
    pub fn scan_workers(&self) -> usize {
        if self.scan_threads > 0 {
            return self.scan_threads;
        }
        thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(8)
    }

    pub fn save_workers(&self) -> usize {
        self.save_threads.max(1)
    }
}
