//! Track cell types.

use std::fmt;

/// The kind of terrain at an `(x, y)` position.
///
/// Shared by every velocity substate at that position.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CellType {
    /// Impassable; entering one ends the episode with a collision.
    Wall,
    /// Ordinary drivable surface.
    Track,
    /// Start line. Drivable, and a valid episode departure cell.
    Start,
    /// Finish line; entering one ends the episode.
    Finish,
}

impl CellType {
    /// All cell types in declaration order.
    pub const ALL: [CellType; 4] = [
        CellType::Wall,
        CellType::Track,
        CellType::Start,
        CellType::Finish,
    ];

    /// Map a track layout character to its cell type.
    ///
    /// `W` wall, `o` track, `-` start, `+` finish. Anything else is `None`.
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'W' => Some(Self::Wall),
            'o' => Some(Self::Track),
            '-' => Some(Self::Start),
            '+' => Some(Self::Finish),
            _ => None,
        }
    }

    /// The layout character for this cell type.
    pub fn as_char(self) -> char {
        match self {
            Self::Wall => 'W',
            Self::Track => 'o',
            Self::Start => '-',
            Self::Finish => '+',
        }
    }

    /// Whether an episode ends on entering this cell.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Wall | Self::Finish)
    }

    /// Whether an episode may begin on this cell.
    pub fn is_departure(self) -> bool {
        matches!(self, Self::Track | Self::Start)
    }
}

impl fmt::Display for CellType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Wall => "wall",
            Self::Track => "track",
            Self::Start => "start",
            Self::Finish => "finish",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn char_mapping_round_trips() {
        for cell in CellType::ALL {
            assert_eq!(CellType::from_char(cell.as_char()), Some(cell));
        }
        assert_eq!(CellType::from_char('x'), None);
        assert_eq!(CellType::from_char('w'), None);
    }

    #[test]
    fn terminal_iff_wall_or_finish() {
        assert!(CellType::Wall.is_terminal());
        assert!(CellType::Finish.is_terminal());
        assert!(!CellType::Track.is_terminal());
        assert!(!CellType::Start.is_terminal());
    }

    #[test]
    fn departure_cells_are_the_non_terminal_ones() {
        for cell in CellType::ALL {
            assert_eq!(cell.is_departure(), !cell.is_terminal());
        }
    }
}
