//! Grid configuration: velocity bounds, rewards, and initial values.

use std::error::Error;
use std::fmt;

use racetrack_core::CellType;

// ── VelocityRange ──────────────────────────────────────────────────

/// Inclusive bounds applied to both velocity components.
///
/// Two conventions are in common use: unsigned `0..=4` (the car only
/// ever moves up and right) and signed `-4..=4`. Both are supported; the
/// grid materializes `(max - min + 1)²` velocity substates per cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VelocityRange {
    /// Smallest legal component value.
    pub min: i32,
    /// Largest legal component value.
    pub max: i32,
}

impl VelocityRange {
    /// `0..=4`.
    pub const UNSIGNED: Self = Self { min: 0, max: 4 };
    /// `-4..=4`.
    pub const SIGNED: Self = Self { min: -4, max: 4 };

    /// Number of legal values per component.
    pub fn span(&self) -> usize {
        (self.max - self.min + 1).max(0) as usize
    }

    /// Whether `v` lies within the bounds.
    pub fn contains(&self, v: i32) -> bool {
        v >= self.min && v <= self.max
    }

    /// Clamp `v` into the bounds.
    pub fn clamp(&self, v: i32) -> i32 {
        v.clamp(self.min, self.max)
    }

    /// All legal component values in ascending order.
    pub fn values(&self) -> std::ops::RangeInclusive<i32> {
        self.min..=self.max
    }
}

impl Default for VelocityRange {
    fn default() -> Self {
        Self::UNSIGNED
    }
}

// ── RewardConfig ───────────────────────────────────────────────────

/// Per-transition rewards, keyed on the successor's cell type.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RewardConfig {
    /// Reward for driving into a wall. Default: -100.0.
    pub collision_penalty: f64,
    /// Reward for every other transition. Default: -1.0.
    pub step_penalty: f64,
}

impl RewardConfig {
    /// Reward for a transition landing on `cell`.
    pub fn reward(&self, cell: CellType) -> f64 {
        match cell {
            CellType::Wall => self.collision_penalty,
            CellType::Track | CellType::Start | CellType::Finish => self.step_penalty,
        }
    }
}

impl Default for RewardConfig {
    fn default() -> Self {
        Self {
            collision_penalty: -100.0,
            step_penalty: -1.0,
        }
    }
}

// ── GridConfigError ────────────────────────────────────────────────

/// Errors detected by [`GridConfig::validate()`] and [`Grid::build`].
///
/// [`Grid::build`]: crate::Grid::build
#[derive(Clone, Debug, PartialEq)]
pub enum GridConfigError {
    /// `min > max`, or the range admits no non-zero velocity.
    InvalidVelocityRange {
        /// Configured minimum.
        min: i32,
        /// Configured maximum.
        max: i32,
    },
    /// A reward constant is NaN or infinite.
    NonFiniteReward {
        /// Which reward.
        name: &'static str,
        /// The offending value.
        value: f64,
    },
    /// The initial value estimate is NaN or infinite.
    NonFiniteInitialValue {
        /// The offending value.
        value: f64,
    },
    /// The state space does not fit in a `u32` index.
    TooManyStates {
        /// Number of states the track would need, saturated at
        /// `usize::MAX`.
        count: usize,
    },
    /// A track dimension does not fit in an `i32` coordinate.
    TrackTooLarge {
        /// Columns in the track.
        width: usize,
        /// Rows in the track.
        height: usize,
    },
}

impl fmt::Display for GridConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidVelocityRange { min, max } => write!(
                f,
                "velocity range {min}..={max} must be non-empty and admit a non-zero velocity"
            ),
            Self::NonFiniteReward { name, value } => {
                write!(f, "{name} must be finite, got {value}")
            }
            Self::NonFiniteInitialValue { value } => {
                write!(f, "initial value must be finite, got {value}")
            }
            Self::TooManyStates { count } => {
                write!(f, "state count {count} exceeds u32::MAX")
            }
            Self::TrackTooLarge { width, height } => {
                write!(f, "track {width}x{height} exceeds i32 coordinates")
            }
        }
    }
}

impl Error for GridConfigError {}

// ── GridConfig ─────────────────────────────────────────────────────

/// Everything [`Grid::build`](crate::Grid::build) needs besides the track.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridConfig {
    /// Velocity component bounds.
    pub velocity: VelocityRange,
    /// Transition rewards.
    pub rewards: RewardConfig,
    /// Starting value estimate of every state. Defaults to the collision
    /// penalty so unexplored states look as bad as a crash.
    pub initial_value: f64,
}

impl GridConfig {
    /// Check all invariants.
    pub fn validate(&self) -> Result<(), GridConfigError> {
        let VelocityRange { min, max } = self.velocity;
        if min > max || (min == 0 && max == 0) {
            return Err(GridConfigError::InvalidVelocityRange { min, max });
        }
        if !self.rewards.collision_penalty.is_finite() {
            return Err(GridConfigError::NonFiniteReward {
                name: "collision_penalty",
                value: self.rewards.collision_penalty,
            });
        }
        if !self.rewards.step_penalty.is_finite() {
            return Err(GridConfigError::NonFiniteReward {
                name: "step_penalty",
                value: self.rewards.step_penalty,
            });
        }
        if !self.initial_value.is_finite() {
            return Err(GridConfigError::NonFiniteInitialValue {
                value: self.initial_value,
            });
        }
        Ok(())
    }
}

impl Default for GridConfig {
    fn default() -> Self {
        let rewards = RewardConfig::default();
        Self {
            velocity: VelocityRange::default(),
            rewards,
            initial_value: rewards.collision_penalty,
        }
    }
}
