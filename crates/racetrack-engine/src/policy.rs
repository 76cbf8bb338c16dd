//! Epsilon-greedy action selection over the current value estimates.
//!
//! Zero-velocity successors are never chosen: a car that stops dead can
//! idle forever, so both branches only consider successors with some
//! velocity. At least one such successor exists for every state whenever
//! the velocity range contains a non-zero value.

use racetrack_core::StateId;
use racetrack_grid::{kinematics, Action, Grid};
use rand::Rng;
use smallvec::SmallVec;

use crate::episode::Step;

type Candidates = SmallVec<[(Action, StateId); 9]>;

/// Behaviour policy used by the episode generators.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EpsilonGreedy {
    epsilon: f64,
}

impl EpsilonGreedy {
    /// Policy exploring with probability `epsilon`.
    ///
    /// Values outside `[0, 1]` are clamped; NaN is treated as 0.
    pub fn new(epsilon: f64) -> Self {
        let epsilon = if epsilon.is_nan() {
            0.0
        } else {
            epsilon.clamp(0.0, 1.0)
        };
        Self { epsilon }
    }

    /// Policy that never explores.
    pub fn greedy() -> Self {
        Self { epsilon: 0.0 }
    }

    /// Exploration probability.
    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    /// Choose an action in `state` and return the successor it leads to.
    pub fn select<R: Rng + ?Sized>(
        &self,
        grid: &Grid,
        state: StateId,
        rng: &mut R,
    ) -> (StateId, Action) {
        let candidates = moving_successors(grid, state);
        if self.epsilon > 0.0 && rng.random_bool(self.epsilon) {
            let (action, next) = candidates[rng.random_range(0..candidates.len())];
            return (next, action);
        }
        best(grid, &candidates)
    }

    /// The greedy choice alone: the successor with the strictly greatest
    /// value, first in [`Action::ALL`] order on ties.
    pub fn exploit(&self, grid: &Grid, state: StateId) -> (StateId, Action) {
        best(grid, &moving_successors(grid, state))
    }
}

impl Default for EpsilonGreedy {
    fn default() -> Self {
        Self::new(0.1)
    }
}

/// Successors with non-zero velocity, in action order. Falls back to all
/// nine when none move.
fn moving_successors(grid: &Grid, state: StateId) -> Candidates {
    let all = kinematics::successors(grid, state);
    let moving: Candidates = all
        .iter()
        .copied()
        .filter(|&(_, next)| !grid.state(next).key().is_stationary())
        .collect();
    if moving.is_empty() {
        all
    } else {
        moving
    }
}

fn best(grid: &Grid, candidates: &[(Action, StateId)]) -> (StateId, Action) {
    let (mut action, mut next) = candidates[0];
    let mut best = grid.state(next).value().read();
    for &(a, s) in &candidates[1..] {
        let v = grid.state(s).value().read();
        if v > best {
            best = v;
            action = a;
            next = s;
        }
    }
    (next, action)
}

/// Follow the greedy policy from `start` for at most `max_steps` steps,
/// stopping at the first terminal state.
///
/// Reads the live estimates, so the path may change from one call to the
/// next while training runs.
pub fn rollout(grid: &Grid, start: StateId, max_steps: usize) -> Vec<Step> {
    let policy = EpsilonGreedy::greedy();
    let mut path = Vec::new();
    let mut state = start;
    while path.len() < max_steps {
        let (next, action) = policy.exploit(grid, state);
        path.push(Step {
            state,
            action,
            successor: next,
            reward: kinematics::reward(grid, next),
        });
        if kinematics::is_terminal(grid, next) {
            break;
        }
        state = next;
    }
    path
}
