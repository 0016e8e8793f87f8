use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{Duration, Instant};

use strata_world::RegionCoord;

/// Cooperative cancellation flag shared by every task of a job.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Live counters for one render job. Written by workers, read by anyone.
#[derive(Debug)]
pub struct Progress {
    total_regions: u64,
    total_chunks: u64,
    processed_chunks: AtomicU64,
    processed_regions: AtomicU64,
    saved_regions: AtomicU64,
    failed_regions: AtomicU64,
    started: Instant,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProgressSnapshot {
    pub total_regions: u64,
    pub total_chunks: u64,
    pub processed_chunks: u64,
    pub processed_regions: u64,
    pub saved_regions: u64,
    pub failed_regions: u64,
    pub elapsed: Duration,
}

impl ProgressSnapshot {
    /// Share of chunks scanned, 0..=100.
    pub fn percent(&self) -> f64 {
        if self.total_chunks == 0 {
            return 100.0;
        }
        self.processed_chunks as f64 * 100.0 / self.total_chunks as f64
    }

    pub fn chunks_per_sec(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs <= 0.0 {
            return 0.0;
        }
        self.processed_chunks as f64 / secs
    }
}

impl std::fmt::Display for ProgressSnapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:.1}% ({}/{} chunks, {}/{} regions, {} saved, {} failed) {:.0} cps",
            self.percent(),
            self.processed_chunks,
            self.total_chunks,
            self.processed_regions,
            self.total_regions,
            self.saved_regions,
            self.failed_regions,
            self.chunks_per_sec()
        )
    }
}

impl Progress {
    pub fn new(total_regions: u64) -> Self {
        Self {
            total_regions,
            total_chunks: total_regions * RegionCoord::chunk_count(),
            processed_chunks: AtomicU64::new(0),
            processed_regions: AtomicU64::new(0),
            saved_regions: AtomicU64::new(0),
            failed_regions: AtomicU64::new(0),
            started: Instant::now(),
        }
    }

    pub fn total_regions(&self) -> u64 {
        self.total_regions
    }

    pub fn total_chunks(&self) -> u64 {
        self.total_chunks
    }

    #[inline]
    pub fn chunk_done(&self) {
        self.processed_chunks.fetch_add(1, Ordering::Relaxed);
    }

    pub fn region_done(&self) {
        self.processed_regions.fetch_add(1, Ordering::Relaxed);
    }

    pub fn region_saved(&self) {
        self.saved_regions.fetch_add(1, Ordering::Relaxed);
    }

    pub fn region_failed(&self) {
        self.failed_regions.fetch_add(1, Ordering::Relaxed);
    }

    pub fn processed_chunks(&self) -> u64 {
        self.processed_chunks.load(Ordering::Relaxed)
    }

    pub fn processed_regions(&self) -> u64 {
        self.processed_regions.load(Ordering::Relaxed)
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            total_regions: self.total_regions,
            total_chunks: self.total_chunks,
            processed_chunks: self.processed_chunks.load(Ordering::Relaxed),
            processed_regions: self.processed_regions.load(Ordering::Relaxed),
            saved_regions: self.saved_regions.load(Ordering::Relaxed),
            failed_regions: self.failed_regions.load(Ordering::Relaxed),
            elapsed: self.started.elapsed(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancel_is_shared_between_clones() {
        let token = CancelToken::new();
        let other = token.clone();
        assert!(!other.is_cancelled());
        token.cancel();
        assert!(other.is_cancelled());
    }

    #[test]
    fn snapshot_math() {
        let p = Progress::new(2);
        assert_eq!(p.total_chunks(), 2048);
        for _ in 0..512 {
            p.chunk_done();
        }
        p.region_done();
        let s = p.snapshot();
        assert_eq!(s.processed_chunks, 512);
        assert!((s.percent() - 25.0).abs() < 1e-9);
        assert_eq!(Progress::new(0).snapshot().percent(), 100.0);
    }
}
