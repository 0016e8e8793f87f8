use std::sync::Arc;

use strata_blocks::{BiomeId, Block, Palette};
use strata_world::terrain::BiomeKind;
use strata_world::{
    BlockPos, CHUNK_SIZE, ChunkCoord, Terrain, TerrainParams, WorldError, WorldSource,
};

use crate::ChunkBuf;

#[derive(Clone, Copy, Debug)]
struct TerrainBlocks {
    bedrock: Block,
    stone: Block,
    dirt: Block,
    grass: Block,
    sand: Block,
    gravel: Block,
    snow: Block,
    water: Block,
    lava: Block,
    log: Block,
    leaves: Block,
}

impl TerrainBlocks {
    fn resolve(palette: &Palette) -> Self {
        let reg = &palette.blocks;
        let pick = |name: &str| {
            let block = reg.block(name);
            if block == Block::AIR {
                log::warn!("palette has no '{}' block; generating air instead", name);
            }
            block
        };
        Self {
            bedrock: pick("bedrock"),
            stone: pick("stone"),
            dirt: pick("dirt"),
            grass: pick("grass_block"),
            sand: pick("sand"),
            gravel: pick("gravel"),
            snow: pick("snow_block"),
            water: pick("water"),
            lava: pick("lava"),
            log: pick("oak_log"),
            leaves: pick("oak_leaves"),
        }
    }
}

/// Procedural world generated on demand from noise. Every call regenerates the
/// chunk, so repeated reads of one chunk are exactly what a chunk cache is for.
pub struct NoiseWorld {
    terrain: Terrain,
    blocks: TerrainBlocks,
    biome_ids: [BiomeId; BiomeKind::ALL.len()],
    sy: usize,
}

impl NoiseWorld {
    pub fn new(params: TerrainParams, palette: &Palette) -> Self {
        let biome_ids = BiomeKind::ALL.map(|kind| {
            palette.biomes.id_by_name(kind.name()).unwrap_or_else(|| {
                log::warn!("palette has no '{}' biome; using id 0", kind.name());
                BiomeId::default()
            })
        });
        let sy = (params.max_y - params.min_y) as usize;
        Self {
            terrain: Terrain::new(params),
            blocks: TerrainBlocks::resolve(palette),
            biome_ids,
            sy,
        }
    }

    pub fn terrain(&self) -> &Terrain {
        &self.terrain
    }

    fn biome_id(&self, kind: BiomeKind) -> BiomeId {
        let idx = BiomeKind::ALL
            .iter()
            .position(|k| *k == kind)
            .unwrap_or_default();
        self.biome_ids[idx]
    }

    pub fn generate_chunk(&self, coord: ChunkCoord) -> ChunkBuf {
        let p = &self.terrain.params;
        let mut buf = ChunkBuf::new(coord, p.min_y, self.sy);
        let b = self.blocks;
        for lz in 0..CHUNK_SIZE {
            for lx in 0..CHUNK_SIZE {
                let wx = coord.block_x() + lx;
                let wz = coord.block_z() + lz;
                let height = self.terrain.height(wx, wz);
                let kind = self.terrain.biome(wx, wz);
                buf.set_biome_local(lx as usize, lz as usize, self.biome_id(kind));

                let underwater = height < p.sea_level;
                let (top, filler) = match kind {
                    BiomeKind::Desert => (b.sand, b.sand),
                    BiomeKind::Ocean | BiomeKind::WarmOcean => (b.gravel, b.sand),
                    BiomeKind::SnowyPlains if !underwater => (b.snow, b.dirt),
                    _ if underwater => (b.dirt, b.dirt),
                    _ => (b.grass, b.dirt),
                };

                let mut put = |y: i32, block: Block| {
                    buf.set_world(BlockPos::new(wx, y, wz), block);
                };
                put(p.min_y, b.bedrock);
                for y in p.min_y + 1..height - 3 {
                    put(y, b.stone);
                }
                for y in (height - 3).max(p.min_y + 1)..height {
                    put(y, filler);
                }
                put(height, top);

                if underwater {
                    for y in height + 1..=p.sea_level {
                        put(y, b.water);
                    }
                } else if self.terrain.is_lava_pool(wx, wz) {
                    for y in height - 2..=height {
                        put(y, b.lava);
                    }
                } else if kind == BiomeKind::Forest && column_hash(p.seed, wx, wz) % 29 == 0 {
                    for y in height + 1..=height + 3 {
                        put(y, b.log);
                    }
                    put(height + 4, b.leaves);
                }
            }
        }
        buf
    }
}

fn column_hash(seed: i32, x: i32, z: i32) -> u32 {
    let mut h = seed as u32 ^ 0x9E37_79B9;
    for v in [x as u32, z as u32] {
        h ^= v;
        h = h.wrapping_mul(0x85EB_CA6B);
        h ^= h >> 13;
    }
    h
}

impl WorldSource for NoiseWorld {
    type Chunk = ChunkBuf;

    fn chunk(&self, coord: ChunkCoord) -> Result<Option<Arc<ChunkBuf>>, WorldError> {
        if !self.terrain.is_generated(coord.cx, coord.cz) {
            return Ok(None);
        }
        Ok(Some(Arc::new(self.generate_chunk(coord))))
    }

    fn surface_height(&self, chunk: &ChunkBuf, x: i32, z: i32) -> i32 {
        chunk.surface_world(x, z)
    }

    fn block_at(&self, chunk: &ChunkBuf, pos: BlockPos) -> Block {
        chunk.get_world(pos.x, pos.y, pos.z).unwrap_or(Block::AIR)
    }

    fn biome_at(&self, pos: BlockPos) -> BiomeId {
        self.biome_id(self.terrain.biome(pos.x, pos.z))
    }

    fn min_build_height(&self) -> i32 {
        self.terrain.params.min_y
    }
}
