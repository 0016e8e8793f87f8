use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use strata_blocks::Palette;
use strata_render::{RenderConfig, SchedulerOptions};
use strata_world::TerrainParams;

/// Everything `strata.toml` can set. Every table is optional.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub terrain: TerrainParams,
    #[serde(default)]
    pub render: RenderConfig,
    #[serde(default)]
    pub scheduler: SchedulerOptions,
    #[serde(default)]
    pub palette: PaletteFiles,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Block and biome tables to load instead of the built-in palette.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct PaletteFiles {
    pub blocks: Option<PathBuf>,
    pub biomes: Option<PathBuf>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("tiles")
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
        }
    }
}

impl AppConfig {
    pub fn from_toml_str(toml_str: &str) -> Result<Self, Box<dyn Error>> {
        let cfg: AppConfig = toml::from_str(toml_str)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, Box<dyn Error>> {
        let path = path.as_ref();
        let s = fs::read_to_string(path)
            .map_err(|e| format!("cannot read {}: {}", path.display(), e))?;
        Self::from_toml_str(&s)
    }

    pub fn validate(&self) -> Result<(), Box<dyn Error>> {
        self.terrain.validate()?;
        self.render.validate()?;
        Ok(())
    }

    pub fn load_palette(&self) -> Result<Palette, Box<dyn Error>> {
        let mut palette = Palette::builtin()?;
        if let Some(path) = &self.palette.blocks {
            palette.blocks = strata_blocks::BlockRegistry::from_path(path)?;
            log::info!("loaded block palette from {}", path.display());
        }
        if let Some(path) = &self.palette.biomes {
            palette.biomes = strata_blocks::BiomeRegistry::from_path(path)?;
            log::info!("loaded biome palette from {}", path.display());
        }
        Ok(palette)
    }
}
