//! Training entry point and run handle.
//!
//! [`train`] wires one thread per worker, a merge thread, and the
//! estimator thread, then returns a [`Training`] handle at once:
//!
//! ```text
//! worker-0 ─┐
//! worker-1 ─┼─ bounded ─▶ merge ─ bounded ─▶ estimator ─▶ grid values
//! worker-N ─┘
//! ```
//!
//! The run continues until the [`CancelToken`] fires. Episodes still in a
//! channel at that point are dropped.

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::bounded;
use racetrack_grid::Grid;
use tracing::{info, warn};

use crate::config::{ConfigError, TrainConfig};
use crate::estimator::{estimator_loop, Estimator};
use crate::hook::ProgressHook;
use crate::merge::{merge, CancelToken};
use crate::metrics::{MetricsSnapshot, TrainingMetrics};
use crate::worker::{worker_loop, EpisodeGenerator};

// ── TrainingReport ─────────────────────────────────────────────────

/// Summary returned by [`Training::shutdown`].
#[derive(Clone, Debug, PartialEq)]
pub struct TrainingReport {
    /// Worker threads started.
    pub worker_count: usize,
    /// Worker threads that exited without panicking.
    pub workers_joined: usize,
    /// Whether the merge thread exited without panicking.
    pub merge_joined: bool,
    /// Whether the estimator thread exited without panicking.
    pub estimator_joined: bool,
    /// Episodes the merge thread handed to the estimator.
    pub episodes_forwarded: u64,
    /// Wall-clock time from start to the end of shutdown.
    pub elapsed: Duration,
    /// Final counter values.
    pub metrics: MetricsSnapshot,
}

impl TrainingReport {
    /// Whether every thread exited cleanly.
    pub fn all_joined(&self) -> bool {
        self.workers_joined == self.worker_count && self.merge_joined && self.estimator_joined
    }
}

// ── Training ───────────────────────────────────────────────────────

/// Handle to a running training session.
///
/// Dropping the handle cancels the run and joins every thread.
#[derive(Debug)]
pub struct Training {
    cancel: CancelToken,
    grid: Arc<Grid>,
    metrics: Arc<TrainingMetrics>,
    worker_count: usize,
    workers: Vec<JoinHandle<u64>>,
    merge: Option<JoinHandle<u64>>,
    estimator: Option<JoinHandle<u64>>,
    started: Instant,
}

// Compile-time assertion: Training must be Send.
const _: fn() = || {
    fn assert<T: Send>() {}
    assert::<Training>();
};

impl Training {
    /// Signal every thread to stop. Does not wait.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// The token shared by this run's threads.
    pub fn cancel_token(&self) -> &CancelToken {
        &self.cancel
    }

    /// The grid being trained.
    pub fn grid(&self) -> &Arc<Grid> {
        &self.grid
    }

    /// Current counter values.
    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Whether every thread has exited.
    pub fn is_finished(&self) -> bool {
        self.workers.iter().all(JoinHandle::is_finished)
            && self.merge.as_ref().is_none_or(JoinHandle::is_finished)
            && self.estimator.as_ref().is_none_or(JoinHandle::is_finished)
    }

    /// Cancel the run, wait for every thread, and report.
    pub fn shutdown(mut self) -> TrainingReport {
        self.join_all()
    }

    fn join_all(&mut self) -> TrainingReport {
        self.cancel.cancel();

        let mut workers_joined = 0;
        for (i, handle) in self.workers.drain(..).enumerate() {
            match handle.join() {
                Ok(_) => workers_joined += 1,
                Err(_) => warn!(worker = i, "worker thread panicked"),
            }
        }
        let (merge_joined, episodes_forwarded) = match self.merge.take().map(JoinHandle::join) {
            Some(Ok(n)) => (true, n),
            Some(Err(_)) => {
                warn!("merge thread panicked");
                (false, 0)
            }
            None => (false, 0),
        };
        let estimator_joined = match self.estimator.take().map(JoinHandle::join) {
            Some(Ok(_)) => true,
            Some(Err(_)) => {
                warn!("estimator thread panicked");
                false
            }
            None => false,
        };

        let report = TrainingReport {
            worker_count: self.worker_count,
            workers_joined,
            merge_joined,
            estimator_joined,
            episodes_forwarded,
            elapsed: self.started.elapsed(),
            metrics: self.metrics.snapshot(),
        };
        info!(
            workers_joined,
            merge_joined,
            estimator_joined,
            episodes = report.metrics.episodes_processed,
            truncated = report.metrics.episodes_truncated,
            discarded = report.metrics.updates_discarded,
            elapsed_ms = report.elapsed.as_millis() as u64,
            "training stopped"
        );
        report
    }

    fn has_threads(&self) -> bool {
        !self.workers.is_empty() || self.merge.is_some() || self.estimator.is_some()
    }
}

impl Drop for Training {
    fn drop(&mut self) {
        if self.has_threads() {
            self.join_all();
        }
    }
}

fn spawn<T, F>(name: String, f: F) -> Result<JoinHandle<T>, ConfigError>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    thread::Builder::new()
        .name(name.clone())
        .spawn(f)
        .map_err(|e| ConfigError::ThreadSpawnFailed {
            reason: format!("{name}: {e}"),
        })
}

// ── train ──────────────────────────────────────────────────────────

/// Start training on `grid` and return immediately.
///
/// Validates `config`, builds one [`EpisodeGenerator`] per worker, and
/// spawns the worker, merge, and estimator threads. The run stops when
/// `cancel` fires, when [`Training::shutdown`] is called, or when the
/// handle is dropped. `hook` runs on the estimator thread.
///
/// If a thread fails to spawn, `cancel` is fired, the threads already
/// started are joined, and [`ConfigError::ThreadSpawnFailed`] is
/// returned.
pub fn train<H>(
    cancel: CancelToken,
    grid: Arc<Grid>,
    config: &TrainConfig,
    hook: H,
) -> Result<Training, ConfigError>
where
    H: ProgressHook + 'static,
{
    config.validate()?;
    let worker_count = config.resolved_worker_count();
    let generators = (0..worker_count)
        .map(|i| EpisodeGenerator::new(Arc::clone(&grid), i, config))
        .collect::<Result<Vec<_>, _>>()?;

    let metrics = Arc::new(TrainingMetrics::default());
    let mut training = Training {
        cancel: cancel.clone(),
        grid: Arc::clone(&grid),
        metrics: Arc::clone(&metrics),
        worker_count,
        workers: Vec::with_capacity(worker_count),
        merge: None,
        estimator: None,
        started: Instant::now(),
    };

    info!(
        workers = worker_count,
        states = grid.len(),
        alpha = config.alpha,
        gamma = config.gamma,
        epsilon = config.epsilon,
        seed = config.seed,
        "training started"
    );

    let (merged_tx, merged_rx) = bounded(config.channel_capacity);
    {
        let estimator = Estimator::new(Arc::clone(&grid), config.alpha, config.gamma);
        let cancel = cancel.clone();
        let metrics = Arc::clone(&metrics);
        training.estimator = Some(spawn("racetrack-estimator".into(), move || {
            estimator_loop(estimator, merged_rx, cancel, hook, metrics).processed()
        })?);
    }

    let mut inputs = Vec::with_capacity(worker_count);
    let mut outputs = Vec::with_capacity(worker_count);
    for _ in 0..worker_count {
        let (tx, rx) = bounded(config.channel_capacity);
        inputs.push(rx);
        outputs.push(tx);
    }
    {
        let cancel = cancel.clone();
        training.merge = Some(spawn("racetrack-merge".into(), move || {
            merge(inputs, merged_tx, &cancel)
        })?);
    }

    for (i, (generator, tx)) in generators.into_iter().zip(outputs).enumerate() {
        let cancel = cancel.clone();
        let metrics = Arc::clone(&metrics);
        training.workers.push(spawn(
            format!("racetrack-worker-{i}"),
            move || worker_loop(generator, tx, cancel, metrics),
        )?);
    }

    Ok(training)
}

#[cfg(test)]
mod tests {
    use super::*;
    use racetrack_test_utils::{scenario_grid, wait_until};

    fn small_config() -> TrainConfig {
        TrainConfig {
            worker_count: Some(2),
            alpha: 0.2,
            epsilon: 0.2,
            seed: 11,
            ..TrainConfig::default()
        }
    }

    #[test]
    fn invalid_config_rejected_before_spawning() {
        let grid = Arc::new(scenario_grid());
        let config = TrainConfig {
            alpha: 2.0,
            ..small_config()
        };
        let err = train(CancelToken::new(), grid, &config, |_: u64| {}).unwrap_err();
        assert_eq!(err, ConfigError::InvalidAlpha { value: 2.0 });
    }

    #[test]
    fn shutdown_joins_every_thread() {
        let grid = Arc::new(scenario_grid());
        let training = train(CancelToken::new(), grid, &small_config(), |_: u64| {}).unwrap();
        assert!(wait_until(Duration::from_secs(10), || {
            training.metrics().episodes_processed >= 20
        }));
        assert!(!training.is_finished());

        let report = training.shutdown();
        assert_eq!(report.worker_count, 2);
        assert!(report.all_joined());
        assert!(report.metrics.episodes_processed >= 20);
        assert!(report.episodes_forwarded >= report.metrics.episodes_processed);
    }

    #[test]
    fn external_cancel_finishes_run() {
        let grid = Arc::new(scenario_grid());
        let cancel = CancelToken::new();
        let training = train(cancel.clone(), grid, &small_config(), |_: u64| {}).unwrap();
        cancel.cancel();
        assert!(wait_until(Duration::from_secs(10), || training.is_finished()));
        assert!(training.cancel_token().is_cancelled());
        assert!(training.shutdown().all_joined());
    }

    #[test]
    fn drop_cancels_and_joins() {
        let grid = Arc::new(scenario_grid());
        let cancel = CancelToken::new();
        let training = train(
            cancel.clone(),
            Arc::clone(&grid),
            &small_config(),
            |_: u64| {},
        )
        .unwrap();
        drop(training);
        assert!(cancel.is_cancelled());
        assert_eq!(Arc::strong_count(&grid), 1);
    }
}
