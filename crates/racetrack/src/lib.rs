//! Racetrack: concurrent, lock-free Monte-Carlo value estimation over a
//! discretized position × velocity grid.
//!
//! This is the top-level facade crate that re-exports the public API from
//! the racetrack sub-crates.
//!
//! # Quick start
//!
//! ```rust
//! use racetrack::prelude::*;
//! use std::sync::Arc;
//!
//! let track: Track = "
//!     WWWW+
//!     Wooo+
//!     W--WW
//! ".parse().unwrap();
//! let grid = Arc::new(Grid::build(&track, &GridConfig::default()).unwrap());
//!
//! let config = TrainConfig { worker_count: Some(1), seed: 1, ..TrainConfig::default() };
//! let training = train(CancelToken::new(), Arc::clone(&grid), &config, |_: u64| {}).unwrap();
//! while training.metrics().episodes_processed < 10 {
//!     std::thread::yield_now();
//! }
//! let report = training.shutdown();
//! assert!(report.all_joined());
//!
//! // Every finish cell holds either the untouched initial value or the
//! // step penalty.
//! for &id in grid.states_of_type(CellType::Finish) {
//!     let v = grid.state(id).value().read();
//!     assert!(v == -100.0 || v == -1.0);
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `racetrack-core` | Atomic scalar, cell types, state ids, track errors |
//! | [`grid`] | `racetrack-grid` | Track parsing, the state grid, kinematics |
//! | [`engine`] | `racetrack-engine` | Policy, workers, merge, estimator, `train` |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core types (`racetrack-core`).
///
/// Contains [`types::AtomicScalar`], the lock-free float every value
/// estimate lives in.
pub use racetrack_core as types;

/// Track layouts, the state grid, and transitions (`racetrack-grid`).
pub use racetrack_grid as grid;

/// Training engine (`racetrack-engine`).
///
/// [`engine::train`] starts a run; [`engine::Training`] controls it.
pub use racetrack_engine as engine;

/// Common imports for typical racetrack usage.
///
/// ```rust
/// use racetrack::prelude::*;
/// ```
pub mod prelude {
    // Core
    pub use racetrack_core::{AtomicScalar, CellType, StateId, StateKey, TrackError};

    // Grid
    pub use racetrack_grid::{
        Action, Grid, GridConfig, GridConfigError, RewardConfig, State, Track, VelocityRange,
    };

    // Engine
    pub use racetrack_engine::{
        rollout, train, CancelToken, ConfigError, Episode, EpsilonGreedy, ProgressHook, Step,
        Throttled, TrainConfig, Training, TrainingReport,
    };
}
