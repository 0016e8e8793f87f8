use std::collections::HashMap;
use std::error::Error;
use std::fs;
use std::path::Path;

use super::color::rgb;
use super::config::BlocksConfig;
use super::types::{Block, BlockId, Fluid, Tint};

#[derive(Clone, Debug)]
pub struct BlockType {
    pub id: BlockId,
    pub name: String,
    pub color: u32,
    pub tint: Tint,
    pub fluid: Option<Fluid>,
}

#[derive(Default, Clone, Debug)]
pub struct BlockRegistry {
    pub blocks: Vec<Option<BlockType>>,
    pub by_name: HashMap<String, BlockId>,
}

impl BlockRegistry {
    pub fn new() -> Self {
        Self {
            blocks: Vec::new(),
            by_name: HashMap::new(),
        }
    }

    #[inline]
    pub fn get(&self, id: BlockId) -> Option<&BlockType> {
        self.blocks.get(id as usize).and_then(Option::as_ref)
    }

    pub fn id_by_name(&self, name: &str) -> Option<BlockId> {
        self.by_name.get(name).copied()
    }

    /// Block with the given name, or air when the palette has no such entry.
    pub fn block(&self, name: &str) -> Block {
        self.id_by_name(name).map(Block::new).unwrap_or(Block::AIR)
    }

    /// Raw map color (`0xRRGGBB`), zero for air and unknown ids.
    #[inline]
    pub fn color(&self, block: Block) -> u32 {
        self.get(block.id).map(|ty| ty.color).unwrap_or(0)
    }

    #[inline]
    pub fn fluid(&self, block: Block) -> Option<Fluid> {
        self.get(block.id).and_then(|ty| ty.fluid)
    }

    #[inline]
    pub fn tint(&self, block: Block) -> Tint {
        self.get(block.id).map(|ty| ty.tint).unwrap_or_default()
    }

    /// Color of the first lava block in the palette.
    pub fn lava_color(&self) -> u32 {
        self.blocks
            .iter()
            .flatten()
            .find(|ty| ty.fluid == Some(Fluid::Lava))
            .map(|ty| ty.color)
            .unwrap_or(0)
    }

    /// Registers (or replaces) a block type under an explicit id.
    pub fn register(
        &mut self,
        id: BlockId,
        name: &str,
        color: u32,
        tint: Tint,
        fluid: Option<Fluid>,
    ) {
        let idx = id as usize;
        if self.blocks.len() <= idx {
            self.blocks.resize(idx + 1, None);
        }
        if let Some(old) = self.blocks[idx].take() {
            self.by_name.remove(&old.name);
        }
        self.by_name.insert(name.to_string(), id);
        self.blocks[idx] = Some(BlockType {
            id,
            name: name.to_string(),
            color: rgb(color),
            tint,
            fluid,
        });
    }

    pub fn from_config(cfg: BlocksConfig) -> Result<Self, Box<dyn Error>> {
        let mut reg = BlockRegistry::new();
        let mut next_id: u16 = 0;
        for def in cfg.blocks {
            let id = def.id.unwrap_or(next_id);
            if reg.get(id).is_some() {
                return Err(format!("duplicate block id {} ({})", id, def.name).into());
            }
            if reg.by_name.contains_key(&def.name) {
                return Err(format!("duplicate block name {}", def.name).into());
            }
            // Water is tinted by the biome even when the palette does not say so.
            let tint = def.tint.unwrap_or(match def.fluid {
                Some(Fluid::Water) => Tint::Water,
                _ => Tint::None,
            });
            reg.register(id, &def.name, def.color, tint, def.fluid);
            next_id = id.saturating_add(1).max(next_id);
        }
        match reg.get(0) {
            Some(air) if air.color == 0 => Ok(reg),
            Some(other) => Err(format!("block id 0 ({}) must have no color", other.name).into()),
            None => Err("palette has no block with id 0".into()),
        }
    }

    pub fn from_toml_str(toml_str: &str) -> Result<Self, Box<dyn Error>> {
        let cfg: BlocksConfig = toml::from_str(toml_str)?;
        Self::from_config(cfg)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, Box<dyn Error>> {
        let s = fs::read_to_string(path)?;
        Self::from_toml_str(&s)
    }
}
