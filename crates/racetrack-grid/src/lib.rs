//! State grid and kinematics for the racetrack value estimator.
//!
//! A [`Track`] is parsed from a textual layout and expanded by
//! [`Grid::build`] into the full position × velocity state space, one
//! [`AtomicScalar`](racetrack_core::AtomicScalar) value estimate per state.
//! The [`kinematics`] module turns a `(state, action)` pair into its
//! successor, including the conservative wall sweep.
//!
//! # Coordinates
//!
//! `x` grows to the right and `y` grows upward, so the first row of the
//! layout has the highest `y`. Positive velocity means moving toward
//! increasing `x`/`y`.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod grid;
pub mod kinematics;
pub mod track;

pub use config::{GridConfig, GridConfigError, RewardConfig, VelocityRange};
pub use grid::{max_value_state, Grid, PositionView, State};
pub use kinematics::{is_terminal, reward, successor, successors, Action};
pub use track::Track;
