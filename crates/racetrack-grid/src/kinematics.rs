//! Deterministic transitions: accelerate, move, collide.
//!
//! The collision check is deliberately conservative. Rather than
//! rasterizing the straight line from the old position to the new one,
//! it walks the whole axis-aligned rectangle spanned by the velocity and
//! stops at the first wall it finds. Cars crash slightly more often than
//! exact physics would allow.

use racetrack_core::{CellType, StateId, StateKey};
use smallvec::SmallVec;

use crate::grid::Grid;

/// One discrete acceleration step applied to both velocity components.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Action {
    /// Change in horizontal velocity, in `-1..=1`.
    pub dvx: i32,
    /// Change in vertical velocity, in `-1..=1`.
    pub dvy: i32,
}

impl Action {
    /// All nine actions, `dvx` outer and `dvy` inner, each over `-1, 0, 1`.
    ///
    /// Greedy action selection evaluates them in exactly this order.
    pub const ALL: [Action; 9] = [
        Action::new(-1, -1),
        Action::new(-1, 0),
        Action::new(-1, 1),
        Action::new(0, -1),
        Action::new(0, 0),
        Action::new(0, 1),
        Action::new(1, -1),
        Action::new(1, 0),
        Action::new(1, 1),
    ];

    /// Build an action. Components outside `-1..=1` are not rejected here
    /// but are never produced by the engine.
    pub const fn new(dvx: i32, dvy: i32) -> Self {
        Self { dvx, dvy }
    }
}

/// Offsets `0, ±1, …, v` walking from zero toward `v`, inclusive.
fn sweep(v: i32) -> impl Iterator<Item = i32> {
    let step = v.signum();
    (0..=v.abs()).map(move |k| k * step)
}

/// The state reached by applying `action` in `state`.
///
/// 1. New velocity is the old one plus the action, clamped to the grid's
///    velocity range.
/// 2. The destination is the old position plus the new velocity, clamped
///    to the grid edges. Leaving the grid is not a crash.
/// 3. Every in-grid cell `(x + dx, y + dy)` with `dx` between 0 and the
///    new `vx` and `dy` between 0 and the new `vy` is checked, `dx` outer.
///    The first wall found is the successor, carrying the new velocity.
/// 4. Without a wall, the successor is the clamped destination.
pub fn successor(grid: &Grid, state: StateId, action: Action) -> StateId {
    let key = grid.state(state).key();
    let range = grid.velocity_range();
    let vx = range.clamp(key.vx + action.dvx);
    let vy = range.clamp(key.vy + action.dvy);

    let nx = (key.x + vx).clamp(0, grid.width() - 1);
    let ny = (key.y + vy).clamp(0, grid.height() - 1);

    for dx in sweep(vx) {
        for dy in sweep(vy) {
            let (cx, cy) = (key.x + dx, key.y + dy);
            if let Some(cell) = grid.cell_at(cx, cy) {
                if cell == CellType::Wall {
                    return grid.index(StateKey::new(cx, cy, vx, vy));
                }
            }
        }
    }

    grid.index(StateKey::new(nx, ny, vx, vy))
}

/// Every action paired with its successor, in [`Action::ALL`] order.
pub fn successors(grid: &Grid, state: StateId) -> SmallVec<[(Action, StateId); 9]> {
    Action::ALL
        .iter()
        .map(|&a| (a, successor(grid, state, a)))
        .collect()
}

/// Reward for a transition that lands on `successor`.
pub fn reward(grid: &Grid, successor: StateId) -> f64 {
    grid.rewards().reward(grid.state(successor).cell())
}

/// Whether an episode ends on reaching `state` (a wall or the finish).
pub fn is_terminal(grid: &Grid, state: StateId) -> bool {
    grid.state(state).is_terminal()
}
