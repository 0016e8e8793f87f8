use proptest::prelude::*;
use strata_blocks::{BiomeId, Block, Palette};
use strata_chunk::{ChunkBuf, MemoryWorld, NoiseWorld};
use strata_world::{BlockPos, ChunkCoord, TerrainParams, WorldSource};

fn small_i32() -> impl Strategy<Value = i32> {
    -1_000_000i32..=1_000_000
}

fn dim_y() -> impl Strategy<Value = usize> {
    1usize..=24
}

proptest! {
    // idx maps each (x,y,z) within bounds to unique in-range indices
    #[test]
    fn idx_is_unique_and_in_range(cx in small_i32(), cz in small_i32(), sy in dim_y()) {
        let buf = ChunkBuf::new(ChunkCoord::new(cx, cz), 0, sy);
        let expect = 16 * sy * 16;
        let mut seen = vec![false; expect];
        for y in 0..sy { for z in 0..16 { for x in 0..16 {
            let i = buf.idx(x, y, z);
            prop_assert!(i < expect);
            prop_assert!(!seen[i]);
            seen[i] = true;
        }}}
        prop_assert!(seen.into_iter().all(|b| b));
    }

    // contains_world matches the chunk's box and aligns with get_world
    #[test]
    fn contains_world_and_get_world_agree(
        cx in small_i32(),
        cz in small_i32(),
        min_y in -64i32..64,
        sy in dim_y(),
    ) {
        let coord = ChunkCoord::new(cx, cz);
        let buf = ChunkBuf::new(coord, min_y, sy);
        let (x0, z0) = (coord.block_x(), coord.block_z());
        let top = min_y + sy as i32 - 1;
        let candidates = [
            (x0, min_y, z0),
            (x0 + 15, top, z0 + 15),
            (x0 - 1, min_y, z0),
            (x0 + 16, min_y, z0),
            (x0, min_y - 1, z0),
            (x0, top + 1, z0),
            (x0, min_y, z0 - 1),
            (x0, min_y, z0 + 16),
        ];
        for (wx, wy, wz) in candidates {
            let inside = wy >= min_y
                && wy <= top
                && (x0..x0 + 16).contains(&wx)
                && (z0..z0 + 16).contains(&wz);
            prop_assert_eq!(buf.contains_world(wx, wy, wz), inside);
            prop_assert_eq!(buf.get_world(wx, wy, wz).is_some(), inside);
        }
    }

    // The heightmap always reports the topmost non-air block
    #[test]
    fn surface_tracks_edits(
        ys in proptest::collection::vec((0usize..16, 0usize..24, any::<bool>()), 1..40),
    ) {
        let mut buf = ChunkBuf::new(ChunkCoord::new(0, 0), -8, 24);
        for (x, y, solid) in ys {
            let block = if solid { Block::new(1) } else { Block::AIR };
            buf.set_local(x, y, 3, block);
            let expect = (0..24).rev()
                .find(|&yy| buf.get_local(x, yy, 3) != Block::AIR)
                .map(|yy| -8 + yy as i32)
                .unwrap_or(-9);
            prop_assert_eq!(buf.surface_local(x, 3), expect);
        }
    }
}

#[test]
fn from_blocks_local_resizes_and_computes_heights() {
    let coord = ChunkCoord::new(2, -3);
    let mut blocks = vec![Block::AIR; 16 * 16 * 4];
    blocks[(2 * 16 + 5) * 16 + 7] = Block::new(3);
    let buf = ChunkBuf::from_blocks_local(coord, 10, 4, blocks, Vec::new());
    assert_eq!(buf.blocks.len(), 16 * 16 * 4);
    assert_eq!(buf.biomes.len(), 256);
    assert_eq!(buf.surface_local(7, 5), 12);
    assert_eq!(buf.surface_local(0, 0), 9);
    let short = ChunkBuf::from_blocks_local(coord, 0, 4, vec![Block::AIR; 3], Vec::new());
    assert_eq!(short.blocks.len(), 16 * 16 * 4);
}

#[test]
fn memory_world_reports_absent_chunks() {
    let mut world = MemoryWorld::new(0, 16);
    world.default_biome = BiomeId(4);
    assert!(world.chunk(ChunkCoord::new(0, 0)).unwrap().is_none());

    world.fill_column(-1, 17, 0, 5, Block::new(2));
    world.set_biome(-1, 17, BiomeId(9));
    let coord = ChunkCoord::containing_block(-1, 17);
    let chunk = world.chunk(coord).unwrap().expect("chunk present");
    assert_eq!(world.surface_height(&chunk, -1, 17), 5);
    assert_eq!(world.block_at(&chunk, BlockPos::new(-1, 5, 17)), Block::new(2));
    assert_eq!(world.block_at(&chunk, BlockPos::new(-1, 99, 17)), Block::AIR);
    assert_eq!(world.biome_at(BlockPos::new(-1, 5, 17)), BiomeId(9));
    assert_eq!(world.biome_at(BlockPos::new(-2, 5, 17)), BiomeId(4));
    assert_eq!(world.biome_at(BlockPos::new(500, 5, 500)), BiomeId(4));
}

#[test]
fn noise_world_is_deterministic_and_bounded() {
    let palette = Palette::builtin().unwrap();
    let params = TerrainParams {
        generated_radius: Some(1),
        ..TerrainParams::default()
    };
    let world = NoiseWorld::new(params.clone(), &palette);
    let again = NoiseWorld::new(params, &palette);
    let coord = ChunkCoord::new(1, -1);
    let a = world.chunk(coord).unwrap().unwrap();
    let b = again.chunk(coord).unwrap().unwrap();
    assert_eq!(a.blocks, b.blocks);
    assert_eq!(a.biomes, b.biomes);
    assert!(world.chunk(ChunkCoord::new(2, 0)).unwrap().is_none());

    let bedrock = palette.blocks.block("bedrock");
    for z in 0..16 {
        for x in 0..16 {
            let wx = coord.block_x() + x;
            let wz = coord.block_z() + z;
            let surface = world.surface_height(&a, wx, wz);
            assert!(surface >= world.terrain().height(wx, wz));
            assert_eq!(world.block_at(&a, BlockPos::new(wx, -64, wz)), bedrock);
            assert_eq!(
                world.biome_at(BlockPos::new(wx, surface, wz)),
                a.biome_local(x as usize, z as usize)
            );
        }
    }
}
