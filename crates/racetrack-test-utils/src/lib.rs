//! Test fixtures for racetrack development.
//!
//! Provides canonical track layouts, prebuilt grids, and a polling helper
//! for tests that wait on background threads.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

pub use fixtures::{
    grid_with, open_grid, scenario_grid, signed_scenario_grid, wait_until, OPEN_TRACK,
    SCENARIO_TRACK,
};
