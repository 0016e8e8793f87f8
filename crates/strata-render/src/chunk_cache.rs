use std::collections::VecDeque;
use std::sync::Arc;

use hashbrown::HashMap;
use strata_blocks::BiomeId;
use strata_world::{BlockPos, ChunkCoord, WorldError, WorldSource};

/// Biome lookups remembered before the memo is flushed.
const BIOME_MEMO_LIMIT: usize = 1 << 18;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ChunkCacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub entries: usize,
    pub biome_lookups: u64,
    pub biome_hits: u64,
}

/// Per-task memo of chunk and biome lookups.
///
/// Owned by a single region task, so there is no locking. Absent chunks are
/// remembered too, which keeps repeated north-row lookups off the world source.
pub struct ChunkCache<C> {
    chunks: HashMap<ChunkCoord, Option<Arc<C>>>,
    order: VecDeque<ChunkCoord>,
    biomes: HashMap<BlockPos, BiomeId>,
    capacity: usize,
    stats: ChunkCacheStats,
}

impl<C> ChunkCache<C> {
    pub fn new(capacity: usize) -> Self {
        Self {
            chunks: HashMap::new(),
            order: VecDeque::new(),
            biomes: HashMap::new(),
            capacity: capacity.max(1),
            stats: ChunkCacheStats::default(),
        }
    }

    pub fn chunk<W>(&mut self, world: &W, coord: ChunkCoord) -> Result<Option<Arc<C>>, WorldError>
    where
        W: WorldSource<Chunk = C> + ?Sized,
    {
        if let Some(entry) = self.chunks.get(&coord) {
            let entry = entry.clone();
            self.stats.hits += 1;
            self.touch(coord);
            return Ok(entry);
        }
        self.stats.misses += 1;
        let loaded = world.chunk(coord)?;
        self.chunks.insert(coord, loaded.clone());
        self.order.push_back(coord);
        self.enforce_capacity();
        Ok(loaded)
    }

    pub fn biome<W>(&mut self, world: &W, pos: BlockPos) -> BiomeId
    where
        W: WorldSource + ?Sized,
    {
        self.stats.biome_lookups += 1;
        if let Some(id) = self.biomes.get(&pos) {
            self.stats.biome_hits += 1;
            return *id;
        }
        if self.biomes.len() >= BIOME_MEMO_LIMIT {
            self.biomes.clear();
        }
        let id = world.biome_at(pos);
        self.biomes.insert(pos, id);
        id
    }

    pub fn clear(&mut self) {
        self.stats.evictions += self.chunks.len() as u64;
        self.chunks.clear();
        self.order.clear();
        self.biomes.clear();
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn stats(&self) -> ChunkCacheStats {
        ChunkCacheStats {
            entries: self.chunks.len(),
            ..self.stats
        }
    }

    fn touch(&mut self, coord: ChunkCoord) {
        if let Some(pos) = self.order.iter().rposition(|c| *c == coord) {
            if let Some(entry) = self.order.remove(pos) {
                self.order.push_back(entry);
            }
        }
    }

    fn enforce_capacity(&mut self) {
        while self.chunks.len() > self.capacity {
            let Some(oldest) = self.order.pop_front() else {
                break;
            };
            if self.chunks.remove(&oldest).is_some() {
                self.stats.evictions += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use strata_blocks::Block;

    struct Counting {
        loads: AtomicUsize,
        biomes: AtomicUsize,
    }

    impl WorldSource for Counting {
        type Chunk = ChunkCoord;

        fn chunk(&self, coord: ChunkCoord) -> Result<Option<Arc<ChunkCoord>>, WorldError> {
            self.loads.fetch_add(1, Ordering::Relaxed);
            Ok((coord.cx >= 0).then(|| Arc::new(coord)))
        }
        fn surface_height(&self, _: &ChunkCoord, _: i32, _: i32) -> i32 {
            0
        }
        fn block_at(&self, _: &ChunkCoord, _: BlockPos) -> Block {
            Block::AIR
        }
        fn biome_at(&self, pos: BlockPos) -> BiomeId {
            self.biomes.fetch_add(1, Ordering::Relaxed);
            BiomeId(pos.x as u16)
        }
        fn min_build_height(&self) -> i32 {
            0
        }
    }

    fn world() -> Counting {
        Counting {
            loads: AtomicUsize::new(0),
            biomes: AtomicUsize::new(0),
        }
    }

    #[test]
    fn remembers_present_and_absent_chunks() {
        let w = world();
        let mut cache = ChunkCache::new(4);
        let a = ChunkCoord::new(1, 1);
        let missing = ChunkCoord::new(-1, 0);
        assert_eq!(cache.chunk(&w, a).unwrap().as_deref(), Some(&a));
        assert_eq!(cache.chunk(&w, a).unwrap().as_deref(), Some(&a));
        assert!(cache.chunk(&w, missing).unwrap().is_none());
        assert!(cache.chunk(&w, missing).unwrap().is_none());
        assert_eq!(w.loads.load(Ordering::Relaxed), 2);
        let s = cache.stats();
        assert_eq!((s.hits, s.misses, s.entries), (2, 2, 2));
    }

    #[test]
    fn evicts_least_recently_used() {
        let w = world();
        let mut cache = ChunkCache::new(2);
        let (a, b, c) = (ChunkCoord::new(0, 0), ChunkCoord::new(1, 0), ChunkCoord::new(2, 0));
        cache.chunk(&w, a).unwrap();
        cache.chunk(&w, b).unwrap();
        cache.chunk(&w, a).unwrap();
        cache.chunk(&w, c).unwrap();
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.stats().evictions, 1);
        // b was evicted, a was kept
        cache.chunk(&w, a).unwrap();
        assert_eq!(w.loads.load(Ordering::Relaxed), 3);
        cache.chunk(&w, b).unwrap();
        assert_eq!(w.loads.load(Ordering::Relaxed), 4);
    }

    #[test]
    fn biome_lookups_are_memoized_and_cleared() {
        let w = world();
        let mut cache: ChunkCache<ChunkCoord> = ChunkCache::new(2);
        let p = BlockPos::new(7, 64, 3);
        assert_eq!(cache.biome(&w, p), BiomeId(7));
        assert_eq!(cache.biome(&w, p), BiomeId(7));
        assert_eq!(w.biomes.load(Ordering::Relaxed), 1);
        cache.chunk(&w, ChunkCoord::new(0, 0)).unwrap();
        cache.clear();
        assert!(cache.is_empty());
        cache.biome(&w, p);
        assert_eq!(w.biomes.load(Ordering::Relaxed), 2);
    }
}
