//! Episode generator workers.
//!
//! Each worker thread owns an [`EpisodeGenerator`] and loops: sample a
//! start state, step the policy until the car hits a wall or crosses the
//! finish, hand the episode to the merge layer, repeat. Workers only
//! read the grid; value writes belong to the estimator.

use std::sync::Arc;

use crossbeam_channel::{select, Sender};
use racetrack_core::{CellType, StateId};
use racetrack_grid::{kinematics, Grid};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::debug;

use crate::config::{ConfigError, TrainConfig};
use crate::episode::{Episode, Step};
use crate::merge::CancelToken;
use crate::metrics::TrainingMetrics;
use crate::policy::EpsilonGreedy;

/// How a call to [`EpisodeGenerator::generate`] ended.
#[derive(Debug, PartialEq)]
pub enum Generated {
    /// The episode reached a terminal state.
    Complete(Episode),
    /// The episode hit the step cap and was discarded.
    Truncated {
        /// Steps taken before giving up.
        steps: usize,
    },
    /// Cancellation was observed mid-episode.
    Cancelled,
}

/// Per-worker episode source.
#[derive(Debug)]
pub struct EpisodeGenerator {
    grid: Arc<Grid>,
    worker: usize,
    policy: EpsilonGreedy,
    max_steps: Option<usize>,
    /// Every moving state on a track or start cell.
    departures: Vec<StateId>,
    rng: ChaCha8Rng,
}

impl EpisodeGenerator {
    /// Generator for worker `worker`, seeded with `config.seed ^ worker`.
    ///
    /// Fails with [`ConfigError::NoDepartureCells`] if the grid has no
    /// track or start cell to begin an episode from.
    pub fn new(grid: Arc<Grid>, worker: usize, config: &TrainConfig) -> Result<Self, ConfigError> {
        let departures: Vec<StateId> = CellType::ALL
            .iter()
            .filter(|c| c.is_departure())
            .flat_map(|&c| grid.states_of_type(c).iter().copied())
            .filter(|&id| !grid.state(id).key().is_stationary())
            .collect();
        if departures.is_empty() {
            return Err(ConfigError::NoDepartureCells);
        }
        Ok(Self {
            grid,
            worker,
            policy: EpsilonGreedy::new(config.epsilon),
            max_steps: config.max_episode_steps,
            departures,
            rng: ChaCha8Rng::seed_from_u64(config.seed ^ worker as u64),
        })
    }

    /// Index of the owning worker.
    pub fn worker(&self) -> usize {
        self.worker
    }

    /// Uniformly random departure cell with a uniformly random non-zero
    /// velocity.
    ///
    /// Every position carries the same set of velocities, so drawing one
    /// moving state from the pooled list is the same distribution as
    /// drawing a position and then rejecting zero velocity.
    pub fn sample_start(&mut self) -> StateId {
        self.departures[self.rng.random_range(0..self.departures.len())]
    }

    /// Run one episode from a fresh start state.
    pub fn generate(&mut self, cancel: &CancelToken) -> Generated {
        let mut state = self.sample_start();
        let mut episode = Episode::new(self.worker);
        loop {
            if cancel.is_cancelled() {
                return Generated::Cancelled;
            }
            if self.max_steps.is_some_and(|cap| episode.len() >= cap) {
                return Generated::Truncated {
                    steps: episode.len(),
                };
            }
            let (next, action) = self.policy.select(&self.grid, state, &mut self.rng);
            episode.push(Step {
                state,
                action,
                successor: next,
                reward: kinematics::reward(&self.grid, next),
            });
            if kinematics::is_terminal(&self.grid, next) {
                return Generated::Complete(episode);
            }
            state = next;
        }
    }
}

/// Main loop for a worker thread.
///
/// Runs until cancelled or the merge side of `tx` disconnects. Returns
/// the number of episodes sent.
pub(crate) fn worker_loop(
    mut generator: EpisodeGenerator,
    tx: Sender<Episode>,
    cancel: CancelToken,
    metrics: Arc<TrainingMetrics>,
) -> u64 {
    let worker = generator.worker();
    debug!(worker, "episode generator started");
    let mut sent = 0u64;
    while !cancel.is_cancelled() {
        match generator.generate(&cancel) {
            Generated::Complete(episode) => {
                select! {
                    send(tx, episode) -> res => {
                        if res.is_err() {
                            break;
                        }
                        sent += 1;
                        metrics.record_generated();
                    }
                    recv(cancel.done()) -> _ => break,
                }
            }
            Generated::Truncated { steps } => {
                metrics.record_truncated();
                debug!(worker, steps, "episode exceeded step cap, dropped");
            }
            Generated::Cancelled => break,
        }
    }
    debug!(worker, sent, "episode generator stopped");
    sent
}
