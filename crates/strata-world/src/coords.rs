use serde::{Deserialize, Serialize};

/// Columns along one edge of a chunk.
pub const CHUNK_SIZE: i32 = 16;
/// Chunks along one edge of a region.
pub const REGION_CHUNKS: i32 = 32;
/// Pixels (= block columns) along one edge of a region image.
pub const IMAGE_SIZE: i32 = CHUNK_SIZE * REGION_CHUNKS;

const CHUNK_SHIFT: u32 = 4;
const REGION_SHIFT: u32 = 5;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RegionCoord {
    pub rx: i32,
    pub rz: i32,
}

impl RegionCoord {
    #[inline]
    pub const fn new(rx: i32, rz: i32) -> Self {
        Self { rx, rz }
    }

    #[inline]
    pub const fn containing_chunk(chunk: ChunkCoord) -> Self {
        Self::new(chunk.cx >> REGION_SHIFT, chunk.cz >> REGION_SHIFT)
    }

    #[inline]
    pub const fn containing_block(x: i32, z: i32) -> Self {
        Self::containing_chunk(ChunkCoord::containing_block(x, z))
    }

    /// North-west chunk of the region.
    #[inline]
    pub const fn chunk_origin(self) -> ChunkCoord {
        ChunkCoord::new(self.rx << REGION_SHIFT, self.rz << REGION_SHIFT)
    }

    /// World x/z of the region's north-west column.
    #[inline]
    pub const fn block_origin(self) -> (i32, i32) {
        (
            self.rx << (REGION_SHIFT + CHUNK_SHIFT),
            self.rz << (REGION_SHIFT + CHUNK_SHIFT),
        )
    }

    /// Every chunk of the region, z-major so a chunk's northern neighbor comes first.
    pub fn chunks(self) -> impl Iterator<Item = ChunkCoord> {
        let origin = self.chunk_origin();
        (0..REGION_CHUNKS).flat_map(move |dz| {
            (0..REGION_CHUNKS).map(move |dx| origin.offset(dx, dz))
        })
    }

    #[inline]
    pub fn chunk_count() -> u64 {
        (REGION_CHUNKS * REGION_CHUNKS) as u64
    }
}

impl std::fmt::Display for RegionCoord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "r.{}.{}", self.rx, self.rz)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChunkCoord {
    pub cx: i32,
    pub cz: i32,
}

impl ChunkCoord {
    #[inline]
    pub const fn new(cx: i32, cz: i32) -> Self {
        Self { cx, cz }
    }

    #[inline]
    pub const fn containing_block(x: i32, z: i32) -> Self {
        Self::new(x >> CHUNK_SHIFT, z >> CHUNK_SHIFT)
    }

    #[inline]
    pub const fn offset(self, dx: i32, dz: i32) -> Self {
        Self {
            cx: self.cx + dx,
            cz: self.cz + dz,
        }
    }

    #[inline]
    pub const fn north(self) -> Self {
        self.offset(0, -1)
    }

    #[inline]
    pub const fn block_x(self) -> i32 {
        self.cx << CHUNK_SHIFT
    }

    #[inline]
    pub const fn block_z(self) -> i32 {
        self.cz << CHUNK_SHIFT
    }

    #[inline]
    pub const fn region(self) -> RegionCoord {
        RegionCoord::containing_chunk(self)
    }
}

impl From<(i32, i32)> for ChunkCoord {
    fn from(value: (i32, i32)) -> Self {
        Self::new(value.0, value.1)
    }
}

impl From<ChunkCoord> for (i32, i32) {
    fn from(value: ChunkCoord) -> Self {
        (value.cx, value.cz)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct BlockPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl BlockPos {
    #[inline]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    #[inline]
    pub const fn offset(self, dx: i32, dy: i32, dz: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            z: self.z + dz,
        }
    }

    #[inline]
    pub const fn chunk(self) -> ChunkCoord {
        ChunkCoord::containing_block(self.x, self.z)
    }

    /// Pixel inside the owning region image.
    #[inline]
    pub const fn pixel(self) -> (usize, usize) {
        (
            (self.x & (IMAGE_SIZE - 1)) as usize,
            (self.z & (IMAGE_SIZE - 1)) as usize,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn region_origins_align_to_grid() {
        let r = RegionCoord::new(-1, 2);
        assert_eq!(r.chunk_origin(), ChunkCoord::new(-32, 64));
        assert_eq!(r.block_origin(), (-512, 1024));
        assert_eq!(RegionCoord::containing_block(-1, 1024), r);
        assert_eq!(RegionCoord::containing_block(-512, 1535), r);
    }

    #[test]
    fn region_chunks_are_z_major() {
        let chunks: Vec<_> = RegionCoord::new(0, 0).chunks().collect();
        assert_eq!(chunks.len() as u64, RegionCoord::chunk_count());
        assert_eq!(chunks[0], ChunkCoord::new(0, 0));
        assert_eq!(chunks[1], ChunkCoord::new(1, 0));
        assert_eq!(chunks[32], ChunkCoord::new(0, 1));
        assert_eq!(chunks[1023], ChunkCoord::new(31, 31));
    }

    #[test]
    fn pixels_wrap_negative_coordinates() {
        assert_eq!(BlockPos::new(-1, 64, -512).pixel(), (511, 0));
        assert_eq!(BlockPos::new(512, 0, 513).pixel(), (0, 1));
    }
}
