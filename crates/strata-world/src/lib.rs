//! World addressing, the world-source boundary, and terrain sampling.
#![forbid(unsafe_code)]

pub mod coords;
pub mod source;
pub mod terrain;

pub use coords::{
    BlockPos, CHUNK_SIZE, ChunkCoord, IMAGE_SIZE, REGION_CHUNKS, RegionCoord,
};
pub use source::{WorldError, WorldSource};
pub use terrain::{BiomeKind, Terrain, TerrainParams};
