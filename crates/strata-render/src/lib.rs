//! Region rasterization: concurrent scan and save pools over a world source.
#![forbid(unsafe_code)]

pub mod chunk_cache;
pub mod config;
pub mod image_set;
pub mod layer;
pub mod progress;
pub mod resolve;
pub mod scan;
pub mod shade;
pub mod store;

use std::any::Any;
use std::collections::BTreeSet;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, bounded, unbounded};
use rayon::{ThreadPool, ThreadPoolBuilder};
use strata_blocks::Palette;
use strata_world::{RegionCoord, WorldError, WorldSource};

pub use chunk_cache::{ChunkCache, ChunkCacheStats};
pub use config::{LayerFlags, RenderConfig, SchedulerOptions};
pub use image_set::{ImageSet, LayerImage};
pub use layer::Layer;
pub use progress::{CancelToken, Progress, ProgressSnapshot};
pub use resolve::ColorResolver;
pub use scan::{RegionScan, ScanOutcome, scan_region};
pub use store::{PngTileStore, TileStore};

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error(transparent)]
    World(#[from] WorldError),
    #[error("tile encoding failed: {0}")]
    Image(#[from] image::ImageError),
    #[error("tile i/o failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("{0} image has the wrong pixel count")]
    BufferSize(Layer),
    #[error("worker pool could not start: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),
    #[error("task panicked: {0}")]
    Panicked(String),
}

/// How a single region of a job ended. Every submitted region reports exactly one.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RegionOutcome {
    Saved,
    SaveFailed(String),
    /// Cancelled part-way through scanning; nothing was written.
    Discarded,
    /// Cancelled before scanning started.
    Skipped,
    Failed(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RegionReport {
    pub region: RegionCoord,
    pub outcome: RegionOutcome,
}

#[derive(Clone, Debug)]
pub struct RenderSummary {
    pub reports: Vec<RegionReport>,
    pub progress: ProgressSnapshot,
}

impl RenderSummary {
    pub fn count(&self, pred: impl Fn(&RegionOutcome) -> bool) -> usize {
        self.reports.iter().filter(|r| pred(&r.outcome)).count()
    }

    pub fn saved(&self) -> Vec<RegionCoord> {
        self.reports
            .iter()
            .filter(|r| r.outcome == RegionOutcome::Saved)
            .map(|r| r.region)
            .collect()
    }

    pub fn failures(&self) -> impl Iterator<Item = &RegionReport> {
        self.reports.iter().filter(|r| {
            matches!(r.outcome, RegionOutcome::Failed(_) | RegionOutcome::SaveFailed(_))
        })
    }
}

/// State shared by all tasks of one submitted job.
struct JobShared<W: WorldSource> {
    world: Arc<W>,
    config: RenderConfig,
    progress: Arc<Progress>,
    cancel: CancelToken,
    reports: Sender<RegionReport>,
}

impl<W: WorldSource> JobShared<W> {
    fn report(&self, region: RegionCoord, outcome: RegionOutcome) {
        let _ = self.reports.send(RegionReport { region, outcome });
    }
}

struct ScanJob<W: WorldSource> {
    job: Arc<JobShared<W>>,
    region: RegionCoord,
}

struct SaveJob {
    images: ImageSet,
    progress: Arc<Progress>,
    reports: Sender<RegionReport>,
}

/// Handle to a running job.
pub struct RenderHandle {
    progress: Arc<Progress>,
    cancel: CancelToken,
    reports: Receiver<RegionReport>,
    received: Vec<RegionReport>,
    expected: usize,
}

impl RenderHandle {
    pub fn progress(&self) -> &Progress {
        &self.progress
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    fn drain(&mut self) {
        self.received.extend(self.reports.try_iter());
    }

    /// Reports received so far.
    pub fn reports(&mut self) -> &[RegionReport] {
        self.drain();
        &self.received
    }

    pub fn is_finished(&mut self) -> bool {
        self.drain();
        self.received.len() >= self.expected
    }

    /// Waits up to `timeout` for the job to finish; true when it has.
    pub fn wait_timeout(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        while self.received.len() < self.expected {
            match self.reports.recv_deadline(deadline) {
                Ok(r) => self.received.push(r),
                Err(RecvTimeoutError::Timeout) => return false,
                Err(RecvTimeoutError::Disconnected) => return true,
            }
        }
        true
    }

    /// Blocks until every region has reported.
    pub fn wait(mut self) -> RenderSummary {
        while self.received.len() < self.expected {
            match self.reports.recv() {
                Ok(r) => self.received.push(r),
                Err(_) => {
                    log::warn!(
                        target: "render",
                        "job ended with {} of {} regions unreported",
                        self.expected - self.received.len(),
                        self.expected
                    );
                    break;
                }
            }
        }
        RenderSummary {
            reports: self.received,
            progress: self.progress.snapshot(),
        }
    }
}

/// Scan and save pools for rendering regions of worlds of type `W`.
///
/// Scan workers rasterize one region at a time and hand finished images to the
/// save workers through a bounded queue, so scanning stalls when saving falls
/// behind. Dropping the renderer lets queued work drain and then stops the workers.
pub struct Renderer<W: WorldSource + 'static> {
    scan_tx: Sender<ScanJob<W>>,
    _scan_pool: Arc<ThreadPool>,
    _save_pool: Arc<ThreadPool>,
    q_scan: Arc<AtomicUsize>,
    inflight_scan: Arc<AtomicUsize>,
    q_save: Arc<AtomicUsize>,
    inflight_save: Arc<AtomicUsize>,
    pub w_scan: usize,
    pub w_save: usize,
}

impl<W: WorldSource + 'static> Renderer<W> {
    pub fn new(
        palette: Arc<Palette>,
        store: Arc<dyn TileStore>,
        options: &SchedulerOptions,
    ) -> Result<Self, RenderError> {
        let (scan_tx, scan_rx) = unbounded::<ScanJob<W>>();
        let (save_tx, save_rx) = bounded::<SaveJob>(options.save_queue.max(1));

        let w_scan = options.scan_workers();
        let w_save = options.save_workers();
        let cache_capacity = options.chunk_cache_capacity.max(1);

        let q_scan_ctr = Arc::new(AtomicUsize::new(0));
        let inflight_scan_ctr = Arc::new(AtomicUsize::new(0));
        let q_save_ctr = Arc::new(AtomicUsize::new(0));
        let inflight_save_ctr = Arc::new(AtomicUsize::new(0));

        let scan_pool = Arc::new(
            ThreadPoolBuilder::new()
                .num_threads(w_scan)
                .thread_name(|i| format!("strata-scan-{i}"))
                .panic_handler(|p| {
                    log::error!(target: "render", "scan worker died: {}", panic_message(&*p))
                })
                .build()?,
        );
        for _ in 0..w_scan {
            let rx = scan_rx.clone();
            let save_tx = save_tx.clone();
            let palette = palette.clone();
            let q_scan = q_scan_ctr.clone();
            let inflight_scan = inflight_scan_ctr.clone();
            let q_save = q_save_ctr.clone();
            scan_pool.spawn(move || {
                while let Ok(task) = rx.recv() {
                    q_scan.fetch_sub(1, Ordering::Relaxed);
                    inflight_scan.fetch_add(1, Ordering::Relaxed);
                    run_region_task(task, palette.as_ref(), cache_capacity, &save_tx, &q_save);
                    inflight_scan.fetch_sub(1, Ordering::Relaxed);
                }
            });
        }

        let save_pool = Arc::new(
            ThreadPoolBuilder::new()
                .num_threads(w_save)
                .thread_name(|i| format!("strata-save-{i}"))
                .panic_handler(|p| {
                    log::error!(target: "render", "save worker died: {}", panic_message(&*p))
                })
                .build()?,
        );
        for _ in 0..w_save {
            let rx = save_rx.clone();
            let store = store.clone();
            let q_save = q_save_ctr.clone();
            let inflight_save = inflight_save_ctr.clone();
            save_pool.spawn(move || {
                while let Ok(job) = rx.recv() {
                    q_save.fetch_sub(1, Ordering::Relaxed);
                    inflight_save.fetch_add(1, Ordering::Relaxed);
                    run_save(job, store.as_ref());
                    inflight_save.fetch_sub(1, Ordering::Relaxed);
                }
            });
        }

        log::info!(
            target: "render",
            "renderer up: {} scan workers, {} save workers, save queue {}, chunk cache {}",
            w_scan,
            w_save,
            options.save_queue.max(1),
            cache_capacity
        );

        Ok(Self {
            scan_tx,
            _scan_pool: scan_pool,
            _save_pool: save_pool,
            q_scan: q_scan_ctr,
            inflight_scan: inflight_scan_ctr,
            q_save: q_save_ctr,
            inflight_save: inflight_save_ctr,
            w_scan,
            w_save,
        })
    }

    /// Queues one task per distinct region, in ascending (rx, rz) order.
    pub fn submit_job(
        &self,
        world: Arc<W>,
        regions: impl IntoIterator<Item = RegionCoord>,
        config: RenderConfig,
        cancel: CancelToken,
    ) -> RenderHandle {
        let regions: BTreeSet<RegionCoord> = regions.into_iter().collect();
        let progress = Arc::new(Progress::new(regions.len() as u64));
        let (report_tx, report_rx) = unbounded::<RegionReport>();
        let job = Arc::new(JobShared {
            world,
            config,
            progress: progress.clone(),
            cancel: cancel.clone(),
            reports: report_tx,
        });
        log::info!(
            target: "render",
            "job submitted: {} regions ({} chunks)",
            progress.total_regions(),
            progress.total_chunks()
        );
        for region in &regions {
            self.q_scan.fetch_add(1, Ordering::Relaxed);
            let task = ScanJob {
                job: job.clone(),
                region: *region,
            };
            if let Err(e) = self.scan_tx.send(task) {
                self.q_scan.fetch_sub(1, Ordering::Relaxed);
                let task = e.into_inner();
                task.job.progress.region_failed();
                task.job
                    .report(task.region, RegionOutcome::Failed("scan pool is gone".to_string()));
            }
        }
        RenderHandle {
            progress,
            cancel,
            reports: report_rx,
            received: Vec::new(),
            expected: regions.len(),
        }
    }

    /// (queued scans, running scans, queued saves, running saves)
    pub fn queue_debug_counts(&self) -> (usize, usize, usize, usize) {
        (
            self.q_scan.load(Ordering::Relaxed),
            self.inflight_scan.load(Ordering::Relaxed),
            self.q_save.load(Ordering::Relaxed),
            self.inflight_save.load(Ordering::Relaxed),
        )
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Failure boundary for one region: nothing that happens here reaches other tasks.
fn run_region_task<W: WorldSource>(
    task: ScanJob<W>,
    palette: &Palette,
    cache_capacity: usize,
    save_tx: &Sender<SaveJob>,
    q_save: &AtomicUsize,
) {
    let ScanJob { job, region } = task;
    if job.cancel.is_cancelled() {
        log::debug!(target: "render", "{} skipped, job cancelled", region);
        job.report(region, RegionOutcome::Skipped);
        return;
    }

    let t0 = Instant::now();
    let scanned = catch_unwind(AssertUnwindSafe(|| {
        RegionScan::new(job.world.as_ref(), palette, &job.config, region, cache_capacity)
            .run(&job.progress, &job.cancel)
    }));
    job.progress.region_done();

    let result = match scanned {
        Ok(r) => r,
        Err(p) => Err(RenderError::Panicked(panic_message(&*p))),
    };
    match result {
        Ok(ScanOutcome::Complete(images)) => {
            log::debug!(
                target: "render",
                "{} scanned in {} ms",
                region,
                t0.elapsed().as_millis()
            );
            q_save.fetch_add(1, Ordering::Relaxed);
            let save = SaveJob {
                images,
                progress: job.progress.clone(),
                reports: job.reports.clone(),
            };
            if save_tx.send(save).is_err() {
                q_save.fetch_sub(1, Ordering::Relaxed);
                job.progress.region_failed();
                job.report(region, RegionOutcome::SaveFailed("save pool is gone".to_string()));
            }
        }
        Ok(ScanOutcome::Cancelled { scanned_chunks }) => {
            log::debug!(
                target: "render",
                "{} discarded after {} chunks, job cancelled",
                region,
                scanned_chunks
            );
            job.report(region, RegionOutcome::Discarded);
        }
        Err(e) => {
            log::error!(target: "render", "{} failed: {}", region, e);
            job.progress.region_failed();
            job.report(region, RegionOutcome::Failed(e.to_string()));
        }
    }
}

fn run_save(job: SaveJob, store: &dyn TileStore) {
    let region = job.images.region();
    let t0 = Instant::now();
    let saved = catch_unwind(AssertUnwindSafe(|| store.save(region, &job.images)));
    let result = match saved {
        Ok(r) => r,
        Err(p) => Err(RenderError::Panicked(panic_message(&*p))),
    };
    let outcome = match result {
        Ok(()) => {
            job.progress.region_saved();
            log::debug!(target: "render", "{} saved in {} ms", region, t0.elapsed().as_millis());
            RegionOutcome::Saved
        }
        Err(e) => {
            job.progress.region_failed();
            log::error!(target: "render", "{} could not be saved: {}", region, e);
            RegionOutcome::SaveFailed(e.to_string())
        }
    };
    let _ = job.reports.send(RegionReport { region, outcome });
}
