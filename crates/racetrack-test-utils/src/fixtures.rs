//! Reusable track and grid fixtures.
//!
//! - [`SCENARIO_TRACK`]: a small L-shaped course, start at the bottom,
//!   finish on the right.
//! - [`OPEN_TRACK`]: no walls and no finish, so no episode can end.

use std::thread;
use std::time::{Duration, Instant};

use racetrack_grid::{Grid, GridConfig, Track, VelocityRange};

/// A 6×8 course: two start cells on the bottom row, a two-wide corridor
/// up the left, and a finish line on the right of rows 1 and 2.
pub const SCENARIO_TRACK: [&str; 8] = [
    "WWWWWW", "Woooo+", "Woooo+", "WooWWW", "WooWWW", "WooWWW", "WooWWW", "W--WWW",
];

/// Only track and start cells. Leaving the grid clamps, so a car can
/// drive forever.
pub const OPEN_TRACK: [&str; 3] = ["oooo", "o-oo", "oooo"];

/// Build a grid from `layout` with `config`, panicking on bad input.
pub fn grid_with(layout: &[&str], config: &GridConfig) -> Grid {
    let track = Track::parse(layout).expect("fixture layout must parse");
    Grid::build(&track, config).expect("fixture config must be valid")
}

/// [`SCENARIO_TRACK`] with the default configuration.
pub fn scenario_grid() -> Grid {
    grid_with(&SCENARIO_TRACK, &GridConfig::default())
}

/// [`SCENARIO_TRACK`] with velocities in `-4..=4`.
pub fn signed_scenario_grid() -> Grid {
    let config = GridConfig {
        velocity: VelocityRange::SIGNED,
        ..GridConfig::default()
    };
    grid_with(&SCENARIO_TRACK, &config)
}

/// [`OPEN_TRACK`] with the default configuration.
pub fn open_grid() -> Grid {
    grid_with(&OPEN_TRACK, &GridConfig::default())
}

/// Poll `cond` every millisecond until it holds or `timeout` elapses.
/// Returns whether it held.
pub fn wait_until(timeout: Duration, mut cond: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    loop {
        if cond() {
            return true;
        }
        if Instant::now() >= deadline {
            return false;
        }
        thread::sleep(Duration::from_millis(1));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixtures_build() {
        let g = scenario_grid();
        assert_eq!((g.width(), g.height()), (6, 8));
        assert_eq!(g.len(), 6 * 8 * 25);
        assert_eq!(signed_scenario_grid().len(), 6 * 8 * 81);
    }

    #[test]
    fn open_grid_has_no_terminal_states() {
        let g = open_grid();
        let mut terminal = 0;
        g.visit_all(|s| terminal += usize::from(s.is_terminal()));
        assert_eq!(terminal, 0);
    }

    #[test]
    fn wait_until_reports_timeout() {
        assert!(wait_until(Duration::from_millis(10), || true));
        assert!(!wait_until(Duration::from_millis(10), || false));
    }
}
