use serde::Deserialize;

pub type BlockId = u16;

/// A voxel as reported by a world source, identified by its palette id.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Block {
    pub id: BlockId,
}

impl Block {
    pub const AIR: Block = Block { id: 0 };

    #[inline]
    pub const fn new(id: BlockId) -> Self {
        Self { id }
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BiomeId(pub u16);

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Fluid {
    Water,
    Lava,
}

impl Fluid {
    #[inline]
    pub fn is_lava(self) -> bool {
        matches!(self, Fluid::Lava)
    }
}

/// Which biome color replaces a block's raw color on the map.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tint {
    #[default]
    None,
    Grass,
    Foliage,
    Water,
}
