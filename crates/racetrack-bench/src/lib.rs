//! Benchmark profiles for the racetrack value estimator.
//!
//! - [`reference_layout`]: a generated L-shaped course of any size
//! - [`reference_grid`]: that course as a grid with default settings

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use std::error::Error;

use racetrack_grid::{Grid, GridConfig, Track};

/// An L-shaped course `width` wide and `height` tall: a vertical corridor
/// half the width on the left, a horizontal arm across the top third, a
/// start line on the bottom row and a finish column on the right edge of
/// the arm. Both dimensions are raised to at least 6.
pub fn reference_layout(width: usize, height: usize) -> Vec<String> {
    let width = width.max(6);
    let height = height.max(6);
    let corridor = width / 2;
    let arm = height / 3;

    (0..height)
        .map(|row| {
            (0..width)
                .map(|col| {
                    let edge = row == 0 || col == 0;
                    let in_arm = row >= 1 && row <= arm;
                    let in_corridor = col < corridor;
                    if edge {
                        'W'
                    } else if in_arm && col == width - 1 {
                        '+'
                    } else if row == height - 1 && in_corridor {
                        '-'
                    } else if in_arm || in_corridor {
                        'o'
                    } else {
                        'W'
                    }
                })
                .collect()
        })
        .collect()
}

/// [`reference_layout`] built with the default grid configuration.
pub fn reference_grid(width: usize, height: usize) -> Result<Grid, Box<dyn Error>> {
    let track = Track::parse(&reference_layout(width, height))?;
    Ok(Grid::build(&track, &GridConfig::default())?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use racetrack_core::CellType;

    #[test]
    fn reference_layout_has_every_cell_type() {
        let track = Track::parse(&reference_layout(20, 30)).unwrap();
        assert_eq!(track.width(), 20);
        assert_eq!(track.height(), 30);
        for cell in CellType::ALL {
            assert!(track.count(cell) > 0, "no {cell} cells");
        }
    }

    #[test]
    fn small_sizes_are_raised() {
        let grid = reference_grid(1, 1).unwrap();
        assert_eq!((grid.width(), grid.height()), (6, 6));
    }
}
