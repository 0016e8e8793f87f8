use std::error::Error;
use std::fs;
use std::path::Path;

use fastnoise_lite::{FastNoiseLite, NoiseType};
use serde::Deserialize;

#[derive(Clone, Debug, Deserialize)]
pub struct TerrainParams {
    #[serde(default = "default_seed")]
    pub seed: i32,
    #[serde(default = "default_min_y")]
    pub min_y: i32,
    #[serde(default = "default_max_y")]
    pub max_y: i32,
    #[serde(default = "default_sea_level")]
    pub sea_level: i32,
    #[serde(default = "default_base_height")]
    pub base_height: f32,
    #[serde(default = "default_amplitude")]
    pub amplitude: f32,
    #[serde(default = "default_frequency")]
    pub frequency: f32,
    #[serde(default = "default_climate_frequency")]
    pub climate_frequency: f32,
    #[serde(default = "default_lava_frequency")]
    pub lava_frequency: f32,
    /// Noise value above which low ground turns into a lava pool; >= 1 disables lava.
    #[serde(default = "default_lava_threshold")]
    pub lava_threshold: f32,
    /// Chunks farther than this (Chebyshev distance from the origin chunk) are ungenerated.
    #[serde(default)]
    pub generated_radius: Option<i32>,
}

fn default_seed() -> i32 {
    1337
}
fn default_min_y() -> i32 {
    -64
}
fn default_max_y() -> i32 {
    320
}
fn default_sea_level() -> i32 {
    62
}
fn default_base_height() -> f32 {
    66.0
}
fn default_amplitude() -> f32 {
    30.0
}
fn default_frequency() -> f32 {
    0.006
}
fn default_climate_frequency() -> f32 {
    0.0015
}
fn default_lava_frequency() -> f32 {
    0.04
}
fn default_lava_threshold() -> f32 {
    0.82
}

impl Default for TerrainParams {
    fn default() -> Self {
        Self {
            seed: default_seed(),
            min_y: default_min_y(),
            max_y: default_max_y(),
            sea_level: default_sea_level(),
            base_height: default_base_height(),
            amplitude: default_amplitude(),
            frequency: default_frequency(),
            climate_frequency: default_climate_frequency(),
            lava_frequency: default_lava_frequency(),
            lava_threshold: default_lava_threshold(),
            generated_radius: None,
        }
    }
}

impl TerrainParams {
    pub fn from_toml_str(toml_str: &str) -> Result<Self, Box<dyn Error>> {
        let params: TerrainParams = toml::from_str(toml_str)?;
        params.validate()?;
        Ok(params)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, Box<dyn Error>> {
        let s = fs::read_to_string(path)?;
        Self::from_toml_str(&s)
    }

    pub fn validate(&self) -> Result<(), Box<dyn Error>> {
        if self.min_y >= self.max_y {
            return Err(format!("min_y {} must be below max_y {}", self.min_y, self.max_y).into());
        }
        if self.sea_level <= self.min_y || self.sea_level >= self.max_y {
            return Err(format!("sea_level {} outside build range", self.sea_level).into());
        }
        Ok(())
    }
}

/// Biome families the sampler chooses between; names match the built-in biome palette.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum BiomeKind {
    Plains,
    Forest,
    Desert,
    SnowyPlains,
    Swamp,
    Ocean,
    WarmOcean,
}

impl BiomeKind {
    pub const ALL: [BiomeKind; 7] = [
        BiomeKind::Plains,
        BiomeKind::Forest,
        BiomeKind::Desert,
        BiomeKind::SnowyPlains,
        BiomeKind::Swamp,
        BiomeKind::Ocean,
        BiomeKind::WarmOcean,
    ];

    pub fn name(self) -> &'static str {
        match self {
            BiomeKind::Plains => "plains",
            BiomeKind::Forest => "forest",
            BiomeKind::Desert => "desert",
            BiomeKind::SnowyPlains => "snowy_plains",
            BiomeKind::Swamp => "swamp",
            BiomeKind::Ocean => "ocean",
            BiomeKind::WarmOcean => "warm_ocean",
        }
    }
}

/// Deterministic 2D terrain sampler: column height, climate, and lava pools.
pub struct Terrain {
    pub params: TerrainParams,
    height: FastNoiseLite,
    detail: FastNoiseLite,
    temperature: FastNoiseLite,
    moisture: FastNoiseLite,
    lava: FastNoiseLite,
}

impl Terrain {
    pub fn new(params: TerrainParams) -> Self {
        let seed = params.seed;
        let mut height = FastNoiseLite::with_seed(seed);
        height.set_noise_type(Some(NoiseType::OpenSimplex2));
        height.set_frequency(Some(params.frequency));
        let mut detail = FastNoiseLite::with_seed(seed ^ 99_173);
        detail.set_noise_type(Some(NoiseType::OpenSimplex2));
        detail.set_frequency(Some(params.frequency * 4.0));
        let mut temperature = FastNoiseLite::with_seed(seed ^ 0x1203_5F31);
        temperature.set_noise_type(Some(NoiseType::OpenSimplex2));
        temperature.set_frequency(Some(params.climate_frequency));
        let mut moisture = FastNoiseLite::with_seed(((seed as u32) ^ 0x92E3_A1B2u32) as i32);
        moisture.set_noise_type(Some(NoiseType::OpenSimplex2));
        moisture.set_frequency(Some(params.climate_frequency));
        let mut lava = FastNoiseLite::with_seed(seed ^ 41_337);
        lava.set_noise_type(Some(NoiseType::OpenSimplex2));
        lava.set_frequency(Some(params.lava_frequency));
        Self {
            params,
            height,
            detail,
            temperature,
            moisture,
            lava,
        }
    }

    /// Y of the topmost solid block of the column.
    pub fn height(&self, x: i32, z: i32) -> i32 {
        let (fx, fz) = (x as f32, z as f32);
        let h = self.params.base_height
            + self.height.get_noise_2d(fx, fz) * self.params.amplitude
            + self.detail.get_noise_2d(fx, fz) * self.params.amplitude * 0.15;
        (h.round() as i32).clamp(self.params.min_y + 1, self.params.max_y - 1)
    }

    /// Temperature and moisture in `0..=1`.
    pub fn climate(&self, x: i32, z: i32) -> (f32, f32) {
        let (fx, fz) = (x as f32, z as f32);
        let t = (self.temperature.get_noise_2d(fx, fz) * 0.5 + 0.5).clamp(0.0, 1.0);
        let m = (self.moisture.get_noise_2d(fx, fz) * 0.5 + 0.5).clamp(0.0, 1.0);
        (t, m)
    }

    pub fn biome(&self, x: i32, z: i32) -> BiomeKind {
        let height = self.height(x, z);
        let (temp, moist) = self.climate(x, z);
        let sea = self.params.sea_level;
        if height < sea - 4 {
            return if temp > 0.65 {
                BiomeKind::WarmOcean
            } else {
                BiomeKind::Ocean
            };
        }
        if temp < 0.3 {
            BiomeKind::SnowyPlains
        } else if temp > 0.65 && moist < 0.45 {
            BiomeKind::Desert
        } else if moist > 0.65 && height <= sea + 3 {
            BiomeKind::Swamp
        } else if moist > 0.5 {
            BiomeKind::Forest
        } else {
            BiomeKind::Plains
        }
    }

    /// Dry, low ground that floods with lava instead of water.
    pub fn is_lava_pool(&self, x: i32, z: i32) -> bool {
        if self.params.lava_threshold >= 1.0 {
            return false;
        }
        let height = self.height(x, z);
        height >= self.params.sea_level
            && self.lava.get_noise_2d(x as f32, z as f32) > self.params.lava_threshold
    }

    pub fn is_generated(&self, cx: i32, cz: i32) -> bool {
        match self.params.generated_radius {
            Some(r) => cx.abs() <= r && cz.abs() <= r,
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sampling_is_deterministic() {
        let a = Terrain::new(TerrainParams::default());
        let b = Terrain::new(TerrainParams::default());
        for (x, z) in [(0, 0), (-300, 17), (4096, -4096)] {
            assert_eq!(a.height(x, z), b.height(x, z));
            assert_eq!(a.biome(x, z), b.biome(x, z));
        }
    }

    #[test]
    fn heights_stay_in_build_range() {
        let params = TerrainParams {
            amplitude: 10_000.0,
            ..TerrainParams::default()
        };
        let t = Terrain::new(params);
        for x in (-2000..2000).step_by(97) {
            let h = t.height(x, x / 3);
            assert!(h > t.params.min_y && h < t.params.max_y);
        }
    }

    #[test]
    fn params_parse_with_defaults() {
        let p = TerrainParams::from_toml_str("seed = 7\ngenerated_radius = 4\n").unwrap();
        assert_eq!(p.seed, 7);
        assert_eq!(p.generated_radius, Some(4));
        assert_eq!(p.sea_level, 62);
        assert!(TerrainParams::from_toml_str("min_y = 10\nmax_y = 0\n").is_err());
    }

    #[test]
    fn generated_radius_bounds_chunks() {
        let t = Terrain::new(TerrainParams {
            generated_radius: Some(2),
            ..TerrainParams::default()
        });
        assert!(t.is_generated(-2, 2));
        assert!(!t.is_generated(3, 0));
    }
}
