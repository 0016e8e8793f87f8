use strata_blocks::color::average_rgb;
use strata_blocks::{BiomeId, Block, Palette, Tint};
use strata_world::{BlockPos, WorldSource};

use crate::chunk_cache::ChunkCache;
use crate::config::MAX_BIOME_BLEND;

/// Turns blocks and biomes into map colors, blending biome-dependent colors
/// over a square neighborhood when a blend radius is set.
#[derive(Clone, Copy)]
pub struct ColorResolver<'a> {
    palette: &'a Palette,
    blend: i32,
}

impl<'a> ColorResolver<'a> {
    pub fn new(palette: &'a Palette, blend: u32) -> Self {
        Self {
            palette,
            blend: blend.min(MAX_BIOME_BLEND) as i32,
        }
    }

    pub fn palette(&self) -> &'a Palette {
        self.palette
    }

    /// Raw `0xRRGGBB` map color; zero means "keep looking".
    #[inline]
    pub fn block_color(&self, block: Block) -> u32 {
        self.palette.blocks.color(block)
    }

    pub fn lava_color(&self) -> u32 {
        self.palette.blocks.lava_color()
    }

    /// Biome map color at `pos`, averaged over the blend neighborhood.
    pub fn biome_color<W>(
        &self,
        world: &W,
        cache: &mut ChunkCache<W::Chunk>,
        center: BiomeId,
        pos: BlockPos,
    ) -> u32
    where
        W: WorldSource + ?Sized,
    {
        let biomes = &self.palette.biomes;
        self.blended(world, cache, center, pos, |id| biomes.color(id))
    }

    /// Block color with grass, foliage and water tints replaced by the
    /// (blended) biome color. Blocks without a color stay uncolored.
    pub fn tinted_color<W>(
        &self,
        world: &W,
        cache: &mut ChunkCache<W::Chunk>,
        center: BiomeId,
        block: Block,
        pos: BlockPos,
    ) -> u32
    where
        W: WorldSource + ?Sized,
    {
        let raw = self.block_color(block);
        if raw == 0 {
            return 0;
        }
        let biomes = &self.palette.biomes;
        match self.palette.blocks.tint(block) {
            Tint::None => raw,
            Tint::Grass => self.blended(world, cache, center, pos, |id| biomes.grass(id)),
            Tint::Foliage => self.blended(world, cache, center, pos, |id| biomes.foliage(id)),
            Tint::Water => self.blended(world, cache, center, pos, |id| biomes.water(id)),
        }
    }

    pub fn water_color<W>(&self, world: &W, cache: &mut ChunkCache<W::Chunk>, pos: BlockPos) -> u32
    where
        W: WorldSource + ?Sized,
    {
        let center = cache.biome(world, pos);
        let biomes = &self.palette.biomes;
        self.blended(world, cache, center, pos, |id| biomes.water(id))
    }

    fn blended<W>(
        &self,
        world: &W,
        cache: &mut ChunkCache<W::Chunk>,
        center: BiomeId,
        pos: BlockPos,
        pick: impl Fn(BiomeId) -> u32,
    ) -> u32
    where
        W: WorldSource + ?Sized,
    {
        if self.blend <= 0 {
            return pick(center);
        }
        let r = self.blend;
        let mut samples = Vec::with_capacity(((2 * r + 1) * (2 * r + 1)) as usize);
        for dz in -r..=r {
            for dx in -r..=r {
                let id = if dx == 0 && dz == 0 {
                    center
                } else {
                    cache.biome(world, pos.offset(dx, 0, dz))
                };
                samples.push(pick(id));
            }
        }
        average_rgb(samples)
    }
}
