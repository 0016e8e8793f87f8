use std::collections::HashMap;
use std::error::Error;
use std::fs;
use std::path::Path;

use super::color::rgb;
use super::config::{BiomeDefaults, BiomesConfig};
use super::types::BiomeId;

#[derive(Clone, Debug)]
pub struct BiomeType {
    pub id: BiomeId,
    pub name: String,
    /// Color of the biome itself on the biome layer.
    pub color: u32,
    pub grass: u32,
    pub foliage: u32,
    pub water: u32,
}

#[derive(Clone, Debug)]
pub struct BiomeRegistry {
    pub biomes: Vec<Option<BiomeType>>,
    pub by_name: HashMap<String, BiomeId>,
    pub defaults: BiomeDefaults,
}

impl Default for BiomeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl BiomeRegistry {
    pub fn new() -> Self {
        Self {
            biomes: Vec::new(),
            by_name: HashMap::new(),
            defaults: BiomeDefaults::default(),
        }
    }

    #[inline]
    pub fn get(&self, id: BiomeId) -> Option<&BiomeType> {
        self.biomes.get(id.0 as usize).and_then(Option::as_ref)
    }

    pub fn id_by_name(&self, name: &str) -> Option<BiomeId> {
        self.by_name.get(name).copied()
    }

    #[inline]
    pub fn color(&self, id: BiomeId) -> u32 {
        self.get(id).map(|b| b.color).unwrap_or(0)
    }

    #[inline]
    pub fn grass(&self, id: BiomeId) -> u32 {
        self.get(id).map(|b| b.grass).unwrap_or(self.defaults.grass)
    }

    #[inline]
    pub fn foliage(&self, id: BiomeId) -> u32 {
        self.get(id).map(|b| b.foliage).unwrap_or(self.defaults.foliage)
    }

    #[inline]
    pub fn water(&self, id: BiomeId) -> u32 {
        self.get(id).map(|b| b.water).unwrap_or(self.defaults.water)
    }

    pub fn register(&mut self, biome: BiomeType) {
        let idx = biome.id.0 as usize;
        if self.biomes.len() <= idx {
            self.biomes.resize(idx + 1, None);
        }
        if let Some(old) = self.biomes[idx].take() {
            self.by_name.remove(&old.name);
        }
        self.by_name.insert(biome.name.clone(), biome.id);
        self.biomes[idx] = Some(biome);
    }

    pub fn from_config(cfg: BiomesConfig) -> Result<Self, Box<dyn Error>> {
        let mut reg = BiomeRegistry {
            defaults: cfg.defaults,
            ..BiomeRegistry::new()
        };
        let mut next_id: u16 = 0;
        for def in cfg.biomes {
            let id = BiomeId(def.id.unwrap_or(next_id));
            if reg.get(id).is_some() {
                return Err(format!("duplicate biome id {} ({})", id.0, def.name).into());
            }
            if reg.by_name.contains_key(&def.name) {
                return Err(format!("duplicate biome name {}", def.name).into());
            }
            let biome = BiomeType {
                id,
                color: rgb(def.color),
                grass: rgb(def.grass.unwrap_or(reg.defaults.grass)),
                foliage: rgb(def.foliage.unwrap_or(reg.defaults.foliage)),
                water: rgb(def.water.unwrap_or(reg.defaults.water)),
                name: def.name,
            };
            reg.register(biome);
            next_id = id.0.saturating_add(1).max(next_id);
        }
        Ok(reg)
    }

    pub fn from_toml_str(toml_str: &str) -> Result<Self, Box<dyn Error>> {
        let cfg: BiomesConfig = toml::from_str(toml_str)?;
        Self::from_config(cfg)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, Box<dyn Error>> {
        let s = fs::read_to_string(path)?;
        Self::from_toml_str(&s)
    }
}
