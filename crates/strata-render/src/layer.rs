use serde::Deserialize;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layer {
    Biomes,
    Blocks,
    Fluids,
    Heights,
}

impl Layer {
    pub const ALL: [Layer; 4] = [Layer::Biomes, Layer::Blocks, Layer::Fluids, Layer::Heights];

    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn name(self) -> &'static str {
        match self {
            Layer::Biomes => "biomes",
            Layer::Blocks => "blocks",
            Layer::Fluids => "fluids",
            Layer::Heights => "heights",
        }
    }
}

impl std::fmt::Display for Layer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
