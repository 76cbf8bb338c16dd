//! Error types for track layout parsing.

use std::error::Error;
use std::fmt;

/// Errors detected while parsing a textual track layout.
///
/// The grid builder assumes a rectangular layout over the four known
/// cell characters; parsing is where that assumption is enforced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TrackError {
    /// The layout has no rows, or its rows are empty.
    Empty,
    /// A row's length differs from the first row's.
    RaggedRow {
        /// Zero-based index of the offending row in the input.
        row: usize,
        /// Length of the first row.
        expected: usize,
        /// Length of the offending row.
        found: usize,
    },
    /// A character outside `W`, `o`, `-`, `+`.
    UnknownCell {
        /// Zero-based row index in the input.
        row: usize,
        /// Zero-based column index in the input.
        col: usize,
        /// The offending character.
        found: char,
    },
}

impl fmt::Display for TrackError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "track layout is empty"),
            Self::RaggedRow {
                row,
                expected,
                found,
            } => write!(f, "track row {row} has {found} cells, expected {expected}"),
            Self::UnknownCell { row, col, found } => {
                write!(f, "unknown cell '{found}' at row {row}, column {col}")
            }
        }
    }
}

impl Error for TrackError {}
