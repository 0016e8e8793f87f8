mod config;

use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use strata_chunk::NoiseWorld;
use strata_render::{CancelToken, PngTileStore, RegionOutcome, Renderer};
use strata_world::RegionCoord;

use crate::config::AppConfig;

#[derive(Parser, Debug)]
#[command(name = "strata")]
#[command(about = "Render map tiles for a rectangle of world regions")]
struct Args {
    /// TOML file with [terrain], [render], [scheduler], [palette] and [output] tables
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output directory (overrides [output].dir)
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// First region of the rectangle, as "rx,rz"
    #[arg(long, default_value = "-1,-1", value_parser = parse_region, allow_hyphen_values = true)]
    from: RegionCoord,

    /// Last region of the rectangle (inclusive), as "rx,rz"
    #[arg(long, default_value = "0,0", value_parser = parse_region, allow_hyphen_values = true)]
    to: RegionCoord,

    /// Terrain seed (overrides [terrain].seed)
    #[arg(short, long)]
    seed: Option<i32>,

    /// Scan worker threads (overrides [scheduler].scan_threads)
    #[arg(short = 't', long)]
    threads: Option<usize>,

    /// Biome blend radius (overrides [render].biome_blend)
    #[arg(long)]
    blend: Option<u32>,

    /// Render fluids as solid blocks and skip the fluid layer
    #[arg(long)]
    opaque_fluids: bool,

    /// Milliseconds between progress lines
    #[arg(long, default_value = "500")]
    progress_ms: u64,
}

fn parse_region(s: &str) -> Result<RegionCoord, String> {
    let (x, z) = s
        .split_once(',')
        .ok_or_else(|| format!("expected \"rx,rz\", got \"{s}\""))?;
    let rx = x.trim().parse::<i32>().map_err(|e| format!("bad rx \"{x}\": {e}"))?;
    let rz = z.trim().parse::<i32>().map_err(|e| format!("bad rz \"{z}\": {e}"))?;
    Ok(RegionCoord::new(rx, rz))
}

fn region_rect(a: RegionCoord, b: RegionCoord) -> Vec<RegionCoord> {
    let (x0, x1) = (a.rx.min(b.rx), a.rx.max(b.rx));
    let (z0, z1) = (a.rz.min(b.rz), a.rz.max(b.rz));
    (z0..=z1)
        .flat_map(|rz| (x0..=x1).map(move |rx| RegionCoord::new(rx, rz)))
        .collect()
}

fn load_config(args: &Args) -> Result<AppConfig, Box<dyn Error>> {
    let mut cfg = match &args.config {
        Some(path) => AppConfig::from_path(path)?,
        None => AppConfig::default(),
    };
    if let Some(out) = &args.out {
        cfg.output.dir = out.clone();
    }
    if let Some(seed) = args.seed {
        cfg.terrain.seed = seed;
    }
    if let Some(threads) = args.threads {
        cfg.scheduler.scan_threads = threads;
    }
    if let Some(blend) = args.blend {
        cfg.render.biome_blend = blend;
    }
    if args.opaque_fluids {
        cfg.render.translucent_fluids = false;
    }
    cfg.validate()?;
    Ok(cfg)
}

fn run(args: Args) -> Result<bool, Box<dyn Error>> {
    let cfg = load_config(&args)?;
    let palette = Arc::new(cfg.load_palette()?);
    let world = Arc::new(NoiseWorld::new(cfg.terrain.clone(), &palette));
    let store = Arc::new(PngTileStore::new(&cfg.output.dir));
    let renderer: Renderer<NoiseWorld> = Renderer::new(palette, store, &cfg.scheduler)?;

    let regions = region_rect(args.from, args.to);
    log::info!(
        "rendering {} regions from {} to {} into {}",
        regions.len(),
        args.from,
        args.to,
        cfg.output.dir.display()
    );
    let layers: Vec<_> = cfg.render.enabled_layers().map(|l| l.name()).collect();
    log::info!("layers: {}", layers.join(", "));

    let mut handle = renderer.submit_job(world, regions, cfg.render.clone(), CancelToken::new());
    let tick = Duration::from_millis(args.progress_ms.max(50));
    while !handle.wait_timeout(tick) {
        log::info!(target: "progress", "{}", handle.progress().snapshot());
    }
    let summary = handle.wait();
    for report in summary.failures() {
        log::error!("{}: {:?}", report.region, report.outcome);
    }
    log::info!(
        "done in {:.1}s: {}",
        summary.progress.elapsed.as_secs_f64(),
        summary.progress
    );
    let clean = summary.count(|o| *o == RegionOutcome::Saved) == summary.reports.len();
    Ok(clean)
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    match run(args) {
        Ok(true) => {}
        Ok(false) => std::process::exit(2),
        Err(e) => {
            log::error!("{}", e);
            std::process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_region_pairs() {
        assert_eq!(parse_region("-3, 4").unwrap(), RegionCoord::new(-3, 4));
        assert!(parse_region("3").is_err());
        assert!(parse_region("a,1").is_err());
    }

    #[test]
    fn rect_is_inclusive_and_order_free() {
        let rect = region_rect(RegionCoord::new(1, 0), RegionCoord::new(-1, 1));
        assert_eq!(rect.len(), 6);
        assert_eq!(rect[0], RegionCoord::new(-1, 0));
        assert_eq!(rect[5], RegionCoord::new(1, 1));
    }

    #[test]
    fn flags_override_the_file() {
        let args = Args::parse_from([
            "strata",
            "--seed",
            "9",
            "--opaque-fluids",
            "--from",
            "-2,-2",
            "-t",
            "3",
        ]);
        let cfg = load_config(&args).unwrap();
        assert_eq!(cfg.terrain.seed, 9);
        assert!(!cfg.render.translucent_fluids);
        assert_eq!(cfg.scheduler.scan_threads, 3);
        assert_eq!(args.from, RegionCoord::new(-2, -2));
    }
}
