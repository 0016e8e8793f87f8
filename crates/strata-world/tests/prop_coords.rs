use proptest::prelude::*;
use strata_world::{BlockPos, ChunkCoord, IMAGE_SIZE, RegionCoord};

fn block() -> impl Strategy<Value = i32> {
    -30_000_000i32..=30_000_000
}

proptest! {
    // A block's chunk lies inside that block's region
    #[test]
    fn chunk_region_agrees_with_block_region(x in block(), z in block()) {
        let chunk = ChunkCoord::containing_block(x, z);
        prop_assert_eq!(chunk.region(), RegionCoord::containing_block(x, z));
        prop_assert!(x >= chunk.block_x() && x < chunk.block_x() + 16);
        prop_assert!(z >= chunk.block_z() && z < chunk.block_z() + 16);
    }

    // Pixel = offset from the region's block origin
    #[test]
    fn pixel_is_offset_from_region_origin(x in block(), y in -64i32..320, z in block()) {
        let region = RegionCoord::containing_block(x, z);
        let (ox, oz) = region.block_origin();
        let (px, pz) = BlockPos::new(x, y, z).pixel();
        prop_assert_eq!(px as i32, x - ox);
        prop_assert_eq!(pz as i32, z - oz);
        prop_assert!((px as i32) < IMAGE_SIZE && (pz as i32) < IMAGE_SIZE);
    }

    // Region origins stay on the 32-chunk grid
    #[test]
    fn region_chunk_origin_is_aligned(rx in -60_000i32..60_000, rz in -60_000i32..60_000) {
        let origin = RegionCoord::new(rx, rz).chunk_origin();
        prop_assert_eq!(origin.cx.rem_euclid(32), 0);
        prop_assert_eq!(origin.cz.rem_euclid(32), 0);
        prop_assert_eq!(origin.region(), RegionCoord::new(rx, rz));
    }
}
