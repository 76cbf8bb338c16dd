//! State identifiers.

use std::fmt;

/// Dense index of a state within a grid's flat storage.
///
/// Only meaningful for the grid that issued it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StateId(pub u32);

impl StateId {
    /// The id as a `usize` index.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for StateId {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

/// Coordinate form of a state: position `(x, y)` and velocity `(vx, vy)`.
///
/// `y` grows upward: the first row of a track layout has the highest `y`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StateKey {
    /// Column index.
    pub x: i32,
    /// Row index, counted from the bottom of the layout.
    pub y: i32,
    /// Horizontal velocity.
    pub vx: i32,
    /// Vertical velocity.
    pub vy: i32,
}

impl StateKey {
    /// Build a key from its four components.
    pub const fn new(x: i32, y: i32, vx: i32, vy: i32) -> Self {
        Self { x, y, vx, vy }
    }

    /// Whether both velocity components are zero.
    pub fn is_stationary(&self) -> bool {
        self.vx == 0 && self.vy == 0
    }
}

impl fmt::Display for StateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {} | {}, {})", self.x, self.y, self.vx, self.vy)
    }
}
