use std::collections::HashMap;
use std::sync::Arc;

use strata_blocks::{BiomeId, Block};
use strata_world::{BlockPos, CHUNK_SIZE, ChunkCoord, WorldError, WorldSource};

use crate::ChunkBuf;

/// World held entirely in memory; chunks that were never touched are absent.
#[derive(Clone, Debug)]
pub struct MemoryWorld {
    pub min_y: i32,
    pub sy: usize,
    pub default_biome: BiomeId,
    chunks: HashMap<ChunkCoord, Arc<ChunkBuf>>,
}

impl MemoryWorld {
    pub fn new(min_y: i32, sy: usize) -> Self {
        Self {
            min_y,
            sy,
            default_biome: BiomeId::default(),
            chunks: HashMap::new(),
        }
    }

    pub fn insert(&mut self, chunk: ChunkBuf) {
        self.chunks.insert(chunk.coord, Arc::new(chunk));
    }

    pub fn contains(&self, coord: ChunkCoord) -> bool {
        self.chunks.contains_key(&coord)
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Mutable chunk, created empty (with the default biome) if missing.
    pub fn chunk_mut(&mut self, coord: ChunkCoord) -> &mut ChunkBuf {
        let (min_y, sy, biome) = (self.min_y, self.sy, self.default_biome);
        let entry = self.chunks.entry(coord).or_insert_with(|| {
            let mut buf = ChunkBuf::new(coord, min_y, sy);
            buf.biomes.fill(biome);
            Arc::new(buf)
        });
        Arc::make_mut(entry)
    }

    pub fn set_block(&mut self, pos: BlockPos, block: Block) -> bool {
        self.chunk_mut(pos.chunk()).set_world(pos, block)
    }

    /// Fills `y_from..=y_to` of one column.
    pub fn fill_column(&mut self, x: i32, z: i32, y_from: i32, y_to: i32, block: Block) {
        let chunk = self.chunk_mut(ChunkCoord::containing_block(x, z));
        for y in y_from..=y_to {
            chunk.set_world(BlockPos::new(x, y, z), block);
        }
    }

    pub fn set_biome(&mut self, x: i32, z: i32, biome: BiomeId) {
        let mask = CHUNK_SIZE - 1;
        self.chunk_mut(ChunkCoord::containing_block(x, z))
            .set_biome_local((x & mask) as usize, (z & mask) as usize, biome);
    }
}

impl WorldSource for MemoryWorld {
    type Chunk = ChunkBuf;

    fn chunk(&self, coord: ChunkCoord) -> Result<Option<Arc<ChunkBuf>>, WorldError> {
        Ok(self.chunks.get(&coord).cloned())
    }

    fn surface_height(&self, chunk: &ChunkBuf, x: i32, z: i32) -> i32 {
        chunk.surface_world(x, z)
    }

    fn block_at(&self, chunk: &ChunkBuf, pos: BlockPos) -> Block {
        chunk.get_world(pos.x, pos.y, pos.z).unwrap_or(Block::AIR)
    }

    fn biome_at(&self, pos: BlockPos) -> BiomeId {
        let mask = CHUNK_SIZE - 1;
        self.chunks
            .get(&pos.chunk())
            .map(|c| c.biome_local((pos.x & mask) as usize, (pos.z & mask) as usize))
            .unwrap_or(self.default_biome)
    }

    fn min_build_height(&self) -> i32 {
        self.min_y
    }
}
