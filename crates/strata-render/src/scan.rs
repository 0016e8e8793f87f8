//! Region scanning: walks every column of a region top-down and rasterizes the
//! enabled layers.

use std::sync::Arc;
use std::time::Instant;

use strata_blocks::color::opaque_or_empty;
use strata_blocks::{BiomeId, Block, BlockRegistry, Palette};
use strata_world::{BlockPos, CHUNK_SIZE, ChunkCoord, RegionCoord, WorldSource};

use crate::RenderError;
use crate::chunk_cache::ChunkCache;
use crate::config::RenderConfig;
use crate::image_set::ImageSet;
use crate::layer::Layer;
use crate::progress::{CancelToken, Progress};
use crate::resolve::ColorResolver;
use crate::shade::{fluid_color, fluid_depth, height_shade};

pub const DEFAULT_CACHE_CAPACITY: usize = 48;

const SIDE: usize = CHUNK_SIZE as usize;

/// Result of a descent through one column.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Column {
    /// Y of the last block read; the terminal block.
    pub y: i32,
    pub block: Block,
    /// Raw color of the last non-fluid block read, zero if none had a color.
    pub color: u32,
    /// Fluid blocks passed on the way down.
    pub fluid_blocks: u32,
    /// Set by the first fluid block met.
    pub lava: Option<bool>,
    pub biome: Option<BiomeId>,
}

/// Scratch state reused across the columns of one region.
#[derive(Clone, Debug, Default)]
pub struct ScanState {
    /// Terminal y of the previous column to the north, per local x.
    pub last_y: [Option<i32>; SIDE],
}

#[derive(Debug)]
pub enum ScanOutcome {
    Complete(ImageSet),
    /// Cancellation was observed after this many chunks; the images are dropped.
    Cancelled { scanned_chunks: u64 },
}

/// Walks down from the surface of world column `x`/`z` until it meets a block
/// with a color, passing through fluids when `translucent` is set.
pub fn descend<W>(
    world: &W,
    chunk: &W::Chunk,
    blocks: &BlockRegistry,
    translucent: bool,
    x: i32,
    z: i32,
) -> Column
where
    W: WorldSource + ?Sized,
{
    let min_y = world.min_build_height();
    let mut col = Column {
        y: world.surface_height(chunk, x, z) + 1,
        block: Block::AIR,
        color: 0,
        fluid_blocks: 0,
        lava: None,
        biome: None,
    };
    loop {
        col.y -= 1;
        col.block = world.block_at(chunk, BlockPos::new(x, col.y, z));
        let fluid = if translucent { blocks.fluid(col.block) } else { None };
        match fluid {
            Some(f) => {
                col.lava.get_or_insert(f.is_lava());
                col.fluid_blocks += 1;
            }
            None => col.color = blocks.color(col.block),
        }
        if col.y <= min_y || (fluid.is_none() && col.color != 0) {
            break;
        }
    }
    col
}

/// One region's worth of scanning work, owning its chunk cache and images.
pub struct RegionScan<'a, W: WorldSource + ?Sized> {
    world: &'a W,
    resolver: ColorResolver<'a>,
    config: &'a RenderConfig,
    region: RegionCoord,
    cache: ChunkCache<W::Chunk>,
    images: ImageSet,
    state: ScanState,
}

impl<'a, W: WorldSource + ?Sized> RegionScan<'a, W> {
    pub fn new(
        world: &'a W,
        palette: &'a Palette,
        config: &'a RenderConfig,
        region: RegionCoord,
        cache_capacity: usize,
    ) -> Self {
        Self {
            world,
            resolver: ColorResolver::new(palette, config.biome_blend),
            config,
            region,
            cache: ChunkCache::new(cache_capacity),
            images: ImageSet::new(region, config),
            state: ScanState::default(),
        }
    }

    /// Scans all chunks of the region in z-major order. The chunk cache is
    /// released on every exit path.
    pub fn run(
        mut self,
        progress: &Progress,
        cancel: &CancelToken,
    ) -> Result<ScanOutcome, RenderError> {
        let t0 = Instant::now();
        let scanned = self.scan_chunks(progress, cancel);
        let stats = self.cache.stats();
        self.cache.clear();
        log::debug!(
            target: "render",
            "{} scan finished in {} ms (cache hits={} misses={} evictions={} biome_hits={}/{})",
            self.region,
            t0.elapsed().as_millis(),
            stats.hits,
            stats.misses,
            stats.evictions,
            stats.biome_hits,
            stats.biome_lookups
        );
        match scanned? {
            None => Ok(ScanOutcome::Complete(self.images)),
            Some(n) => Ok(ScanOutcome::Cancelled { scanned_chunks: n }),
        }
    }

    /// `Some(n)` when cancellation stopped the loop after `n` chunks.
    fn scan_chunks(
        &mut self,
        progress: &Progress,
        cancel: &CancelToken,
    ) -> Result<Option<u64>, RenderError> {
        let mut scanned = 0u64;
        for coord in self.region.chunks() {
            if cancel.is_cancelled() {
                return Ok(Some(scanned));
            }
            if let Some(chunk) = self.cache.chunk(self.world, coord)? {
                self.scan_chunk(coord, &chunk)?;
            }
            progress.chunk_done();
            scanned += 1;
        }
        Ok(None)
    }

    fn scan_chunk(&mut self, coord: ChunkCoord, chunk: &Arc<W::Chunk>) -> Result<(), RenderError> {
        let heights = self.config.renders(Layer::Heights);
        let (bx, bz) = (coord.block_x(), coord.block_z());
        for lz in 0..SIDE {
            if lz == 0 && heights {
                self.seed_north_row(coord)?;
            }
            for lx in 0..SIDE {
                self.scan_column(chunk, bx + lx as i32, bz + lz as i32, lx);
            }
        }
        Ok(())
    }

    /// Loads the southmost row of the chunk to the north so the first row of
    /// this chunk has something to shade against.
    fn seed_north_row(&mut self, coord: ChunkCoord) -> Result<(), RenderError> {
        let north = coord.north();
        match self.cache.chunk(self.world, north)? {
            None => self.state.last_y = [None; SIDE],
            Some(chunk) => {
                let z = north.block_z() + CHUNK_SIZE - 1;
                let translucent = self.config.translucent_fluids;
                let blocks = &self.resolver.palette().blocks;
                for lx in 0..SIDE {
                    let x = north.block_x() + lx as i32;
                    let col = descend(self.world, &chunk, blocks, translucent, x, z);
                    self.state.last_y[lx] = Some(col.y);
                }
            }
        }
        Ok(())
    }

    fn scan_column(&mut self, chunk: &W::Chunk, x: i32, z: i32, lx: usize) {
        let cfg = self.config;
        let blocks = &self.resolver.palette().blocks;
        let mut col = descend(self.world, chunk, blocks, cfg.translucent_fluids, x, z);
        let pos = BlockPos::new(x, col.y, z);
        let (px, pz) = pos.pixel();

        let wants_biome = cfg.renders(Layer::Biomes) || cfg.renders(Layer::Blocks);
        if wants_biome {
            col.biome = Some(self.cache.biome(self.world, pos));
        }
        let biome = col.biome.unwrap_or_default();

        if cfg.renders(Layer::Biomes) {
            let color = self.resolver.biome_color(self.world, &mut self.cache, biome, pos);
            self.images.set_pixel(Layer::Biomes, px, pz, opaque_or_empty(color));
        }

        if cfg.renders(Layer::Blocks) {
            // a descent that hit the floor without a colored block leaves the pixel empty
            let color = if col.color == 0 {
                0
            } else {
                self.resolver.tinted_color(self.world, &mut self.cache, biome, col.block, pos)
            };
            self.images.set_pixel(Layer::Blocks, px, pz, opaque_or_empty(color));
        }

        if cfg.renders(Layer::Fluids) && col.fluid_blocks > 0 {
            let lava = col.lava.unwrap_or(false);
            let base = if lava {
                self.resolver.lava_color()
            } else {
                let surface = pos.offset(0, col.fluid_blocks as i32, 0);
                self.resolver.water_color(self.world, &mut self.cache, surface)
            };
            let color = fluid_color(base, fluid_depth(col.fluid_blocks), lava);
            self.images.set_pixel(Layer::Fluids, px, pz, color);
        }

        if cfg.renders(Layer::Heights) {
            let shade = height_shade(col.y, self.state.last_y[lx]);
            self.images.set_pixel(Layer::Heights, px, pz, shade);
            self.state.last_y[lx] = Some(col.y);
        }
    }
}

/// Scans `region` with a fresh chunk cache of the default size.
pub fn scan_region<W>(
    world: &W,
    palette: &Palette,
    config: &RenderConfig,
    region: RegionCoord,
    progress: &Progress,
    cancel: &CancelToken,
) -> Result<ScanOutcome, RenderError>
where
    W: WorldSource + ?Sized,
{
    RegionScan::new(world, palette, config, region, DEFAULT_CACHE_CAPACITY).run(progress, cancel)
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_blocks::{BiomeId, Fluid, Tint};
    use strata_world::WorldError;

    /// Every column is the same stack, listed bottom-up from y = 0.
    struct Stack(Vec<Block>);

    impl WorldSource for Stack {
        type Chunk = ();
        fn chunk(&self, _: ChunkCoord) -> Result<Option<Arc<()>>, WorldError> {
            Ok(Some(Arc::new(())))
        }
        fn surface_height(&self, _: &(), _: i32, _: i32) -> i32 {
            self.0.len() as i32 - 1
        }
        fn block_at(&self, _: &(), pos: BlockPos) -> Block {
            self.0.get(pos.y as usize).copied().unwrap_or(Block::AIR)
        }
        fn biome_at(&self, _: BlockPos) -> BiomeId {
            BiomeId(0)
        }
        fn min_build_height(&self) -> i32 {
            0
        }
    }

    fn registry() -> BlockRegistry {
        let mut reg = BlockRegistry::new();
        reg.register(0, "air", 0, Tint::None, None);
        reg.register(1, "stone", 0x707070, Tint::None, None);
        reg.register(2, "water", 0x4040FF, Tint::Water, Some(Fluid::Water));
        reg.register(3, "glass", 0, Tint::None, None);
        reg
    }

    #[test]
    fn descent_stops_at_first_colored_block() {
        let reg = registry();
        let world = Stack(vec![Block::new(1), Block::new(1), Block::new(3), Block::new(3)]);
        let col = descend(&world, &(), &reg, true, 0, 0);
        assert_eq!(col.y, 1);
        assert_eq!(col.color, 0x707070);
        assert_eq!(col.fluid_blocks, 0);
        assert_eq!(col.lava, None);
    }

    #[test]
    fn descent_counts_fluid_when_translucent() {
        let reg = registry();
        let mut stack = vec![Block::new(1)];
        stack.extend(std::iter::repeat_n(Block::new(2), 5));
        let world = Stack(stack);
        let col = descend(&world, &(), &reg, true, 0, 0);
        assert_eq!((col.y, col.fluid_blocks, col.lava), (0, 5, Some(false)));
        assert_eq!(col.block, Block::new(1));

        let opaque = descend(&world, &(), &reg, false, 0, 0);
        assert_eq!((opaque.y, opaque.fluid_blocks, opaque.color), (5, 0, 0x4040FF));
        assert_eq!(opaque.block, Block::new(2));
    }

    #[test]
    fn descent_ends_at_the_floor() {
        let reg = registry();
        let world = Stack(vec![Block::new(3), Block::new(3), Block::new(2)]);
        let col = descend(&world, &(), &reg, true, 0, 0);
        assert_eq!(col.y, 0);
        assert_eq!(col.color, 0);
        assert_eq!(col.block, Block::new(3));
        assert_eq!(col.fluid_blocks, 1);
    }
}
