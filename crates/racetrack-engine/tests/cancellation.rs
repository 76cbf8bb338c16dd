//! Cancellation must stop every thread promptly, whatever each one is
//! blocked on.

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use racetrack_engine::{train, CancelToken, TrainConfig};
use racetrack_test_utils::{open_grid, scenario_grid, wait_until};

const PROMPT: Duration = Duration::from_secs(5);

#[test]
fn already_cancelled_token_runs_nothing() {
    let grid = Arc::new(scenario_grid());
    let cancel = CancelToken::new();
    cancel.cancel();
    let config = TrainConfig {
        worker_count: Some(3),
        ..TrainConfig::default()
    };
    let training = train(cancel, grid, &config, |_: u64| {}).unwrap();
    assert!(wait_until(PROMPT, || training.is_finished()));

    let report = training.shutdown();
    assert!(report.all_joined());
    assert_eq!(report.metrics.episodes_processed, 0);
}

#[test]
fn cancel_interrupts_endless_episodes() {
    // No terminal cells and no step cap: workers never finish an episode.
    let grid = Arc::new(open_grid());
    let cancel = CancelToken::new();
    let config = TrainConfig {
        worker_count: Some(2),
        max_episode_steps: None,
        ..TrainConfig::default()
    };
    let training = train(cancel.clone(), grid, &config, |_: u64| {}).unwrap();
    thread::sleep(Duration::from_millis(50));

    let started = Instant::now();
    cancel.cancel();
    assert!(wait_until(PROMPT, || training.is_finished()));
    assert!(started.elapsed() < PROMPT);

    let report = training.shutdown();
    assert!(report.all_joined());
    assert_eq!(report.metrics.episodes_generated, 0);
}

#[test]
fn step_cap_drops_endless_episodes() {
    let grid = Arc::new(open_grid());
    let config = TrainConfig {
        worker_count: Some(2),
        max_episode_steps: Some(20),
        ..TrainConfig::default()
    };
    let training = train(CancelToken::new(), grid, &config, |_: u64| {}).unwrap();
    assert!(wait_until(PROMPT, || training.metrics().episodes_truncated >= 10));

    let report = training.shutdown();
    assert!(report.all_joined());
    assert_eq!(report.metrics.episodes_processed, 0);
}

#[test]
fn cancel_unblocks_backpressured_workers() {
    // A slow estimator with tiny channels keeps every worker blocked on send.
    let grid = Arc::new(scenario_grid());
    let config = TrainConfig {
        worker_count: Some(8),
        channel_capacity: 1,
        ..TrainConfig::default()
    };
    let slow = |_: u64| thread::sleep(Duration::from_millis(5));
    let training = train(CancelToken::new(), grid, &config, slow).unwrap();
    assert!(wait_until(PROMPT, || training.metrics().episodes_processed >= 5));

    let started = Instant::now();
    let report = training.shutdown();
    assert!(started.elapsed() < PROMPT);
    assert!(report.all_joined());
    assert_eq!(report.worker_count, 8);
}
