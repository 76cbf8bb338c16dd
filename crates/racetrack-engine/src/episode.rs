//! Transition and trajectory records.

use racetrack_core::StateId;
use racetrack_grid::{kinematics, Action, Grid};

/// One transition: where the car was, what it did, where it ended up,
/// and what that cost.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Step {
    /// Origin state.
    pub state: StateId,
    /// Acceleration applied.
    pub action: Action,
    /// State reached.
    pub successor: StateId,
    /// Reward for reaching `successor`.
    pub reward: f64,
}

impl Step {
    /// Build the step for `action` taken in `state`, resolving the
    /// successor and reward through the kinematics.
    pub fn resolve(grid: &Grid, state: StateId, action: Action) -> Self {
        let successor = kinematics::successor(grid, state, action);
        Self {
            state,
            action,
            successor,
            reward: kinematics::reward(grid, successor),
        }
    }
}

/// A complete trajectory from a start state to a wall or the finish.
///
/// Owned by the worker that built it until it is sent for merging, then
/// by the estimator.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Episode {
    worker: usize,
    steps: Vec<Step>,
}

impl Episode {
    /// An empty episode produced by `worker`.
    pub fn new(worker: usize) -> Self {
        Self {
            worker,
            steps: Vec::new(),
        }
    }

    /// Wrap pre-built steps.
    pub fn from_steps(worker: usize, steps: Vec<Step>) -> Self {
        Self { worker, steps }
    }

    /// Replay `actions` from `start`, stopping early at a terminal state.
    pub fn from_actions(grid: &Grid, worker: usize, start: StateId, actions: &[Action]) -> Self {
        let mut episode = Self::new(worker);
        let mut state = start;
        for &action in actions {
            let step = Step::resolve(grid, state, action);
            episode.push(step);
            if kinematics::is_terminal(grid, step.successor) {
                break;
            }
            state = step.successor;
        }
        episode
    }

    /// Append a step.
    pub fn push(&mut self, step: Step) {
        self.steps.push(step);
    }

    /// Index of the worker that generated this episode.
    pub fn worker(&self) -> usize {
        self.worker
    }

    /// The steps in order.
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Number of steps.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Whether there are no steps.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// The final (terminal) step.
    pub fn last(&self) -> Option<&Step> {
        self.steps.last()
    }

    /// Undiscounted sum of rewards.
    pub fn total_return(&self) -> f64 {
        self.steps.iter().map(|s| s.reward).sum()
    }
}
