//! Headless Grid Stress Runner
//!
//! Spawns a population of rectangles, moves them through batch updates for a
//! number of ticks while running a query mix, and reports timings plus final
//! grid statistics as JSON or text.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use clap::Parser;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use spatial_grid::{GridConfig, GridStats, ObjectId, RadiusPrecision, Rect, Result, SpatialGrid};
use tracing_subscriber::EnvFilter;

/// Grid Stress Runner - synthetic move/query workload
#[derive(Parser, Debug)]
#[command(name = "grid_stress")]
#[command(about = "Drive a spatial grid with moving objects and report timings")]
struct Args {
    /// Number of objects to spawn
    #[arg(long, default_value_t = 10_000)]
    objects: i32,

    /// Number of simulated ticks
    #[arg(long, default_value_t = 100)]
    ticks: u32,

    /// World edge length; objects spawn in [-world/2, world/2)
    #[arg(long, default_value_t = 10_000)]
    world: i32,

    /// Largest object edge
    #[arg(long, default_value_t = 120)]
    max_size: i32,

    /// Largest per-tick move along each axis
    #[arg(long, default_value_t = 8)]
    max_step: i32,

    /// Queries issued per tick for each query kind
    #[arg(long, default_value_t = 50)]
    queries: u32,

    /// Radius used by radius queries
    #[arg(long, default_value_t = 250)]
    radius: i32,

    /// Cell size; overrides the config file
    #[arg(long)]
    cell_size: Option<i32>,

    /// TOML grid config
    #[arg(long)]
    config: Option<PathBuf>,

    /// Random seed for deterministic runs
    #[arg(long)]
    seed: Option<u64>,

    /// Output format: json or text
    #[arg(long, default_value = "json")]
    format: String,
}

/// JSON output structure
#[derive(Serialize)]
struct StressReport {
    seed: u64,
    cell_size: i32,
    objects: usize,
    ticks: u32,
    spawn_ms: f64,
    avg_batch_update_ms: f64,
    avg_point_query_us: f64,
    avg_rect_query_us: f64,
    avg_radius_query_us: [f64; 3],
    avg_results_per_radius_query: [f64; 3],
    cells: usize,
    stats: GridStats,
    memory_estimate_bytes: usize,
}

#[derive(Default)]
struct Timing {
    total: Duration,
    samples: u32,
    results: usize,
}

impl Timing {
    fn record(&mut self, elapsed: Duration, results: usize) {
        self.total += elapsed;
        self.samples += 1;
        self.results += results;
    }

    fn avg_us(&self) -> f64 {
        if self.samples == 0 {
            return 0.0;
        }
        self.total.as_secs_f64() * 1e6 / self.samples as f64
    }

    fn avg_results(&self) -> f64 {
        if self.samples == 0 {
            return 0.0;
        }
        self.results as f64 / self.samples as f64
    }
}

const PRECISIONS: [RadiusPrecision; 3] =
    [RadiusPrecision::Square, RadiusPrecision::Center, RadiusPrecision::Bounds];

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("spatial_grid=info")),
        )
        .init();

    let args = Args::parse();
    if let Err(e) = run(&args) {
        tracing::error!("Stress run failed: {}", e);
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => GridConfig::load(path)?,
        None => GridConfig::default(),
    };
    if let Some(cell_size) = args.cell_size {
        config.cell_size = cell_size;
    }

    let seed = args.seed.unwrap_or_else(|| rand::random());
    let mut rng = StdRng::seed_from_u64(seed);
    let mut grid = SpatialGrid::with_config(&config)?;
    let half = (args.world / 2).max(1);
    let max_size = args.max_size.max(1);
    let step = args.max_step.saturating_abs();

    tracing::info!(
        "Starting stress run: {} objects, {} ticks, cell_size={}, seed={}",
        args.objects,
        args.ticks,
        config.cell_size,
        seed
    );

    // Spawn
    let spawn_start = Instant::now();
    let mut ids = Vec::with_capacity(args.objects.max(0) as usize);
    let mut rects = Vec::with_capacity(ids.capacity());
    for i in 0..args.objects {
        let rect = Rect::new(
            rng.gen_range(-half..half),
            rng.gen_range(-half..half),
            rng.gen_range(1..=max_size),
            rng.gen_range(1..=max_size),
        );
        grid.add_object(ObjectId(i), rect);
        ids.push(ObjectId(i));
        rects.push(rect);
    }
    let spawn_time = spawn_start.elapsed();

    let mut batch_time = Duration::ZERO;
    let mut point = Timing::default();
    let mut rect_q = Timing::default();
    let mut radius: [Timing; 3] = Default::default();

    let mut xs = vec![0; rects.len()];
    let mut ys = vec![0; rects.len()];
    let mut widths = vec![0; rects.len()];
    let mut heights = vec![0; rects.len()];

    for tick in 0..args.ticks {
        for (i, rect) in rects.iter_mut().enumerate() {
            rect.x = rect.x.saturating_add(rng.gen_range(-step..=step)).clamp(-half, half);
            rect.y = rect.y.saturating_add(rng.gen_range(-step..=step)).clamp(-half, half);
            xs[i] = rect.x;
            ys[i] = rect.y;
            widths[i] = rect.width;
            heights[i] = rect.height;
        }

        let start = Instant::now();
        grid.update_objects_batch(&ids, &xs, &ys, &widths, &heights)?;
        batch_time += start.elapsed();

        for _ in 0..args.queries {
            let (x, y) = (rng.gen_range(-half..half), rng.gen_range(-half..half));

            let start = Instant::now();
            let found = grid.objects_at(x, y).len();
            point.record(start.elapsed(), found);

            let start = Instant::now();
            let found = grid.objects_in_rect(Rect::new(x, y, args.radius, args.radius)).len();
            rect_q.record(start.elapsed(), found);

            for (timing, precision) in radius.iter_mut().zip(PRECISIONS) {
                let start = Instant::now();
                let found = grid.objects_in_radius(x, y, args.radius, precision).len();
                timing.record(start.elapsed(), found);
            }
        }

        tracing::debug!("Tick {} done: {} cells", tick, grid.cell_count());
    }

    let report = StressReport {
        seed,
        cell_size: grid.cell_size(),
        objects: grid.object_count(),
        ticks: args.ticks,
        spawn_ms: spawn_time.as_secs_f64() * 1e3,
        avg_batch_update_ms: if args.ticks == 0 {
            0.0
        } else {
            batch_time.as_secs_f64() * 1e3 / args.ticks as f64
        },
        avg_point_query_us: point.avg_us(),
        avg_rect_query_us: rect_q.avg_us(),
        avg_radius_query_us: [radius[0].avg_us(), radius[1].avg_us(), radius[2].avg_us()],
        avg_results_per_radius_query: [
            radius[0].avg_results(),
            radius[1].avg_results(),
            radius[2].avg_results(),
        ],
        cells: grid.cell_count(),
        stats: grid.stats(),
        memory_estimate_bytes: grid.memory_estimate(),
    };

    if args.format == "text" {
        print_text(&report);
    } else {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }
    Ok(())
}

fn print_text(report: &StressReport) {
    println!("\n=== Grid stress (seed {}) ===", report.seed);
    println!("Objects: {}  Cells: {}  Cell size: {}", report.objects, report.cells, report.cell_size);
    println!("Spawn time: {:.2} ms", report.spawn_ms);
    println!("Avg batch update: {:.3} ms", report.avg_batch_update_ms);
    println!("Avg point query: {:.2} us", report.avg_point_query_us);
    println!("Avg rect query: {:.2} us", report.avg_rect_query_us);
    for (i, precision) in PRECISIONS.iter().enumerate() {
        println!(
            "Avg radius query ({:?}): {:.2} us, {:.1} results",
            precision, report.avg_radius_query_us[i], report.avg_results_per_radius_query[i]
        );
    }
    println!(
        "Occupancy: max {} / avg {:.2} per cell, {} references",
        report.stats.max_objects_per_cell,
        report.stats.avg_objects_per_cell,
        report.stats.total_references
    );
    println!("Memory estimate: {} KiB", report.memory_estimate_bytes / 1024);
}
