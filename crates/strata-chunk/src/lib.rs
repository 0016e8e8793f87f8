//! Chunk column buffers and reference world sources built on them.
#![forbid(unsafe_code)]

mod memory;
mod noise;

pub use memory::MemoryWorld;
pub use noise::NoiseWorld;

use strata_blocks::{BiomeId, Block};
use strata_world::{BlockPos, CHUNK_SIZE, ChunkCoord};

const SX: usize = CHUNK_SIZE as usize;
const SZ: usize = CHUNK_SIZE as usize;

/// One full-height 16×16 chunk: blocks, per-column biome, and a surface heightmap.
#[derive(Clone, Debug)]
pub struct ChunkBuf {
    pub coord: ChunkCoord,
    pub min_y: i32,
    pub sy: usize,
    pub blocks: Vec<Block>,
    pub biomes: Vec<BiomeId>,
    heights: Vec<i32>,
}

impl ChunkBuf {
    pub fn new(coord: ChunkCoord, min_y: i32, sy: usize) -> Self {
        Self {
            coord,
            min_y,
            sy,
            blocks: vec![Block::AIR; SX * sy * SZ],
            biomes: vec![BiomeId::default(); SX * SZ],
            heights: vec![min_y - 1; SX * SZ],
        }
    }

    pub fn from_blocks_local(
        coord: ChunkCoord,
        min_y: i32,
        sy: usize,
        blocks: Vec<Block>,
        biomes: Vec<BiomeId>,
    ) -> Self {
        let mut b = blocks;
        b.resize(SX * sy * SZ, Block::AIR);
        let mut bi = biomes;
        bi.resize(SX * SZ, BiomeId::default());
        let mut buf = ChunkBuf {
            coord,
            min_y,
            sy,
            blocks: b,
            biomes: bi,
            heights: vec![min_y - 1; SX * SZ],
        };
        buf.recompute_heights();
        buf
    }

    #[inline]
    pub fn idx(&self, x: usize, y: usize, z: usize) -> usize {
        (y * SZ + z) * SX + x
    }

    #[inline]
    fn column_idx(x: usize, z: usize) -> usize {
        z * SX + x
    }

    #[inline]
    pub fn max_y(&self) -> i32 {
        self.min_y + self.sy as i32 - 1
    }

    #[inline]
    pub fn get_local(&self, x: usize, y: usize, z: usize) -> Block {
        self.blocks[self.idx(x, y, z)]
    }

    /// Writes a block and keeps the column's surface height current.
    pub fn set_local(&mut self, x: usize, y: usize, z: usize, block: Block) {
        let idx = self.idx(x, y, z);
        self.blocks[idx] = block;
        let wy = self.min_y + y as i32;
        let col = Self::column_idx(x, z);
        if block != Block::AIR {
            if wy > self.heights[col] {
                self.heights[col] = wy;
            }
        } else if wy == self.heights[col] {
            self.heights[col] = self.scan_surface(x, z);
        }
    }

    #[inline]
    pub fn contains_world(&self, wx: i32, wy: i32, wz: i32) -> bool {
        let base_x = self.coord.block_x();
        let base_z = self.coord.block_z();
        if wy < self.min_y || wy > self.max_y() {
            return false;
        }
        wx >= base_x && wx < base_x + SX as i32 && wz >= base_z && wz < base_z + SZ as i32
    }

    #[inline]
    pub fn get_world(&self, wx: i32, wy: i32, wz: i32) -> Option<Block> {
        if !self.contains_world(wx, wy, wz) {
            return None;
        }
        let lx = (wx - self.coord.block_x()) as usize;
        let ly = (wy - self.min_y) as usize;
        let lz = (wz - self.coord.block_z()) as usize;
        Some(self.get_local(lx, ly, lz))
    }

    /// Returns false when the position lies outside this chunk.
    pub fn set_world(&mut self, pos: BlockPos, block: Block) -> bool {
        if !self.contains_world(pos.x, pos.y, pos.z) {
            return false;
        }
        let lx = (pos.x - self.coord.block_x()) as usize;
        let ly = (pos.y - self.min_y) as usize;
        let lz = (pos.z - self.coord.block_z()) as usize;
        self.set_local(lx, ly, lz, block);
        true
    }

    /// Topmost non-air y of a local column, `min_y - 1` when empty.
    #[inline]
    pub fn surface_local(&self, x: usize, z: usize) -> i32 {
        self.heights[Self::column_idx(x, z)]
    }

    /// Surface height for world x/z; coordinates are masked into this chunk.
    #[inline]
    pub fn surface_world(&self, wx: i32, wz: i32) -> i32 {
        self.surface_local((wx & (SX as i32 - 1)) as usize, (wz & (SZ as i32 - 1)) as usize)
    }

    #[inline]
    pub fn biome_local(&self, x: usize, z: usize) -> BiomeId {
        self.biomes[Self::column_idx(x, z)]
    }

    pub fn set_biome_local(&mut self, x: usize, z: usize, biome: BiomeId) {
        self.biomes[Self::column_idx(x, z)] = biome;
    }

    pub fn recompute_heights(&mut self) {
        for z in 0..SZ {
            for x in 0..SX {
                self.heights[Self::column_idx(x, z)] = self.scan_surface(x, z);
            }
        }
    }

    fn scan_surface(&self, x: usize, z: usize) -> i32 {
        (0..self.sy)
            .rev()
            .find(|&y| self.get_local(x, y, z) != Block::AIR)
            .map(|y| self.min_y + y as i32)
            .unwrap_or(self.min_y - 1)
    }
}
