//! Textual track layouts.
//!
//! A layout is a list of equal-length rows over `W` (wall), `o` (track),
//! `-` (start) and `+` (finish). The first row is the top of the picture.

use std::fmt;
use std::str::FromStr;

use racetrack_core::{CellType, TrackError};

/// A parsed, rectangular track layout.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Track {
    width: usize,
    height: usize,
    /// Row-major in input order: `rows[0]` first.
    cells: Vec<CellType>,
}

impl Track {
    /// Parse a layout from its rows.
    ///
    /// Rejects an empty layout, rows of differing length, and unknown
    /// characters, so anything that reaches [`Grid::build`] is well formed.
    ///
    /// [`Grid::build`]: crate::Grid::build
    pub fn parse<S: AsRef<str>>(rows: &[S]) -> Result<Self, TrackError> {
        let width = match rows.first() {
            Some(first) => first.as_ref().chars().count(),
            None => return Err(TrackError::Empty),
        };
        if width == 0 {
            return Err(TrackError::Empty);
        }

        let mut cells = Vec::with_capacity(width * rows.len());
        for (row, line) in rows.iter().enumerate() {
            let line = line.as_ref();
            let found = line.chars().count();
            if found != width {
                return Err(TrackError::RaggedRow {
                    row,
                    expected: width,
                    found,
                });
            }
            for (col, c) in line.chars().enumerate() {
                let cell = CellType::from_char(c).ok_or(TrackError::UnknownCell {
                    row,
                    col,
                    found: c,
                })?;
                cells.push(cell);
            }
        }

        Ok(Self {
            width,
            height: rows.len(),
            cells,
        })
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of rows.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Cell type at grid position `(x, y)`, with `y` counted from the
    /// bottom row. `None` outside the layout.
    pub fn cell(&self, x: usize, y: usize) -> Option<CellType> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let row = self.height - 1 - y;
        Some(self.cells[row * self.width + x])
    }

    /// Cells of column `x` from the bottom row up. Empty outside the
    /// layout.
    pub fn column(&self, x: usize) -> impl Iterator<Item = CellType> + '_ {
        let rows = if x < self.width { self.height } else { 0 };
        (0..rows).rev().map(move |row| self.cells[row * self.width + x])
    }

    /// Number of cells of the given type.
    pub fn count(&self, cell: CellType) -> usize {
        self.cells.iter().filter(|&&c| c == cell).count()
    }
}

impl FromStr for Track {
    type Err = TrackError;

    /// Parse newline-separated rows. Surrounding blank lines and
    /// per-line whitespace are ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rows: Vec<&str> = s.lines().map(str::trim).filter(|l| !l.is_empty()).collect();
        Self::parse(&rows)
    }
}

impl fmt::Display for Track {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, row) in self.cells.chunks(self.width).enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            for cell in row {
                write!(f, "{}", cell.as_char())?;
            }
        }
        Ok(())
    }
}
