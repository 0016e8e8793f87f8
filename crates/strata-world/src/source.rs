use std::sync::Arc;

use strata_blocks::{BiomeId, Block};

use crate::coords::{BlockPos, ChunkCoord};

#[derive(Debug, thiserror::Error)]
pub enum WorldError {
    #[error("chunk {0:?} could not be read: {1}")]
    ChunkRead(ChunkCoord, String),
    #[error("world source unavailable: {0}")]
    Unavailable(String),
}

/// Read-only access to voxel data. Implementations are shared by every scan worker
/// at once, so all methods take `&self`.
pub trait WorldSource: Send + Sync {
    type Chunk: Send + Sync;

    /// `Ok(None)` when the chunk is not generated or not loaded.
    fn chunk(&self, coord: ChunkCoord) -> Result<Option<Arc<Self::Chunk>>, WorldError>;

    /// Y of the topmost non-air block of the column at world `x`/`z` inside `chunk`,
    /// or `min_build_height() - 1` for an empty column.
    fn surface_height(&self, chunk: &Self::Chunk, x: i32, z: i32) -> i32;

    /// Block at a world position inside `chunk`; air outside its vertical range.
    fn block_at(&self, chunk: &Self::Chunk, pos: BlockPos) -> Block;

    fn biome_at(&self, pos: BlockPos) -> BiomeId;

    fn min_build_height(&self) -> i32;
}

impl<W: WorldSource + ?Sized> WorldSource for Arc<W> {
    type Chunk = W::Chunk;

    fn chunk(&self, coord: ChunkCoord) -> Result<Option<Arc<Self::Chunk>>, WorldError> {
        (**self).chunk(coord)
    }

    fn surface_height(&self, chunk: &Self::Chunk, x: i32, z: i32) -> i32 {
        (**self).surface_height(chunk, x, z)
    }

    fn block_at(&self, chunk: &Self::Chunk, pos: BlockPos) -> Block {
        (**self).block_at(chunk, pos)
    }

    fn biome_at(&self, pos: BlockPos) -> BiomeId {
        (**self).biome_at(pos)
    }

    fn min_build_height(&self) -> i32 {
        (**self).min_build_height()
    }
}
