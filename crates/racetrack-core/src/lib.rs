//! Core types for the racetrack Monte-Carlo value estimator.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the fundamental building blocks shared across the workspace: the
//! lock-free [`AtomicScalar`] value cell, cell types, state identifiers,
//! and track parsing errors.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod cell;
pub mod error;
pub mod id;
pub mod scalar;

pub use cell::CellType;
pub use error::TrackError;
pub use id::{StateId, StateKey};
pub use scalar::AtomicScalar;
