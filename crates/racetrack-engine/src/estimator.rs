//! The single writer of value estimates.
//!
//! Episodes are applied one at a time, backward from the terminal step,
//! with every-visit constant-alpha Monte-Carlo updates:
//!
//! ```text
//! V(terminal) = r_last
//! G           = r_t + gamma * G
//! V(s_t)     += alpha * (G - V(s_t))
//! ```
//!
//! Workers read the same values concurrently. Each update is one
//! read followed by one compare-and-swap; a lost race discards that
//! update instead of retrying it.

use std::sync::Arc;

use crossbeam_channel::{select, Receiver};
use racetrack_grid::Grid;
use tracing::warn;

use crate::episode::Episode;
use crate::hook::ProgressHook;
use crate::merge::CancelToken;
use crate::metrics::TrainingMetrics;

/// Result of applying one episode.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct UpdateOutcome {
    /// Origin-state updates attempted.
    pub steps: usize,
    /// Updates lost to a concurrent write.
    pub discarded: u64,
}

/// Applies episodes to the shared grid.
#[derive(Debug)]
pub struct Estimator {
    grid: Arc<Grid>,
    alpha: f64,
    gamma: f64,
    processed: u64,
}

impl Estimator {
    /// Estimator with step size `alpha` and discount `gamma`.
    pub fn new(grid: Arc<Grid>, alpha: f64, gamma: f64) -> Self {
        Self {
            grid,
            alpha,
            gamma,
            processed: 0,
        }
    }

    /// Episodes applied so far.
    pub fn processed(&self) -> u64 {
        self.processed
    }

    /// The grid being written.
    pub fn grid(&self) -> &Arc<Grid> {
        &self.grid
    }

    /// Apply one episode. An empty episode is a no-op and is not counted.
    pub fn apply(&mut self, episode: &Episode) -> UpdateOutcome {
        let Some(last) = episode.last() else {
            return UpdateOutcome::default();
        };
        self.grid.state(last.successor).value().set(last.reward);

        let mut ret = 0.0;
        let mut discarded = 0;
        for step in episode.steps().iter().rev() {
            ret = step.reward + self.gamma * ret;
            let value = self.grid.state(step.state).value();
            let delta = self.alpha * (ret - value.read());
            let (_, stored) = value.add_and_get(delta);
            if !stored {
                discarded += 1;
            }
        }

        self.processed += 1;
        UpdateOutcome {
            steps: episode.len(),
            discarded,
        }
    }
}

/// Main loop for the estimator thread.
///
/// Drains `rx` until it disconnects or `cancel` fires, calling `hook`
/// after each episode. Returns the estimator so the caller can inspect
/// its counters.
pub(crate) fn estimator_loop<H: ProgressHook>(
    mut estimator: Estimator,
    rx: Receiver<Episode>,
    cancel: CancelToken,
    mut hook: H,
    metrics: Arc<TrainingMetrics>,
) -> Estimator {
    loop {
        select! {
            recv(rx) -> msg => {
                let Ok(episode) = msg else { break };
                let outcome = estimator.apply(&episode);
                metrics.record_processed(outcome.steps);
                if outcome.discarded > 0 {
                    metrics.record_discarded(outcome.discarded);
                    warn!(
                        worker = episode.worker(),
                        discarded = outcome.discarded,
                        "value updates lost to a concurrent write"
                    );
                }
                hook.on_episode(estimator.processed());
            }
            recv(cancel.done()) -> _ => break,
        }
    }
    estimator
}
