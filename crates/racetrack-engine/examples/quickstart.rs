//! Racetrack quickstart: train on a small course and print what was
//! learned.
//!
//! Demonstrates:
//!   1. Parsing a track layout and building the state grid
//!   2. Starting a training run with a throttled progress hook
//!   3. Shutting down and reading the shutdown report
//!   4. Reading the value map and following the greedy route
//!
//! Run with:
//!   RUST_LOG=info cargo run --example quickstart

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use racetrack_core::{CellType, StateKey};
use racetrack_engine::{rollout, train, CancelToken, Throttled, TrainConfig};
use racetrack_grid::{Grid, GridConfig, Track};
use tracing_subscriber::EnvFilter;

// ─── Track ──────────────────────────────────────────────────────

const LAYOUT: &str = "
    WWWWWWWWWWWW
    Woooooooooo+
    Woooooooooo+
    WooooooWWWWW
    WooooooWWWWW
    WoooooWWWWWW
    WoooooWWWWWW
    WooooWWWWWWW
    WooooWWWWWWW
    W----WWWWWWW
";

const TRAIN_FOR: Duration = Duration::from_secs(3);

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init()
        .ok();

    // ─── 1. Grid ────────────────────────────────────────────────
    let track: Track = LAYOUT.parse()?;
    let grid = Arc::new(Grid::build(&track, &GridConfig::default())?);
    println!(
        "track {}x{}, {} states",
        grid.width(),
        grid.height(),
        grid.len()
    );

    // ─── 2. Train ───────────────────────────────────────────────
    let config = TrainConfig {
        alpha: 0.05,
        epsilon: 0.1,
        seed: 7,
        ..TrainConfig::default()
    };
    let hook = Throttled::new(
        |count: u64| tracing::info!(episodes = count, "progress"),
        10_000,
    );
    let training = train(CancelToken::new(), Arc::clone(&grid), &config, hook)?;
    thread::sleep(TRAIN_FOR);

    // ─── 3. Shut down ───────────────────────────────────────────
    let report = training.shutdown();
    println!(
        "{} episodes ({} steps) on {} workers in {:.1?}",
        report.metrics.episodes_processed,
        report.metrics.steps_processed,
        report.worker_count,
        report.elapsed
    );

    // ─── 4. Value map: best moving state per cell ───────────────
    let mut best = vec![vec![String::new(); grid.width() as usize]; grid.height() as usize];
    grid.visit_by_position(|view| {
        let row = (grid.height() - 1 - view.y) as usize;
        best[row][view.x as usize] = match view.cell {
            CellType::Wall => "   W".to_string(),
            _ => match view.max_value_state() {
                Some(s) => format!("{:4.0}", s.value().read()),
                None => "   ?".to_string(),
            },
        };
    });
    for row in &best {
        println!("{}", row.join(""));
    }

    // ─── Greedy route from the first start cell ─────────────────
    if let Some(&start) = grid.states_of_type(CellType::Start).first() {
        let key = grid.state(start).key();
        let start = grid
            .id_of(StateKey::new(key.x, key.y, 0, 1))
            .unwrap_or(start);
        let path = rollout(&grid, start, 200);
        println!("greedy route from {}:", grid.state(start).key());
        for step in &path {
            println!("  {}", grid.state(step.successor).key());
        }
        let total: f64 = path.iter().map(|s| s.reward).sum();
        println!("return {total}");
    }

    Ok(())
}
