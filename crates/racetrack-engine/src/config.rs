//! Training configuration, validation, and error types.

use std::error::Error;
use std::fmt;

// ── ConfigError ────────────────────────────────────────────────────

/// Errors detected by [`TrainConfig::validate()`] or while starting a
/// training run.
#[derive(Clone, Debug, PartialEq)]
pub enum ConfigError {
    /// `alpha` is NaN or outside `[0, 1]`.
    InvalidAlpha {
        /// The invalid value.
        value: f64,
    },
    /// `gamma` is NaN or outside `[0, 1]`.
    InvalidGamma {
        /// The invalid value.
        value: f64,
    },
    /// `epsilon` is NaN or outside `[0, 1]`.
    InvalidEpsilon {
        /// The invalid value.
        value: f64,
    },
    /// `channel_capacity` is zero.
    ChannelCapacityZero,
    /// `max_episode_steps` is `Some(0)`.
    EpisodeCapZero,
    /// The grid has no track or start cell to depart from.
    NoDepartureCells,
    /// A background thread could not be spawned.
    ThreadSpawnFailed {
        /// Description of which thread failed.
        reason: String,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidAlpha { value } => write!(f, "alpha must be in [0, 1], got {value}"),
            Self::InvalidGamma { value } => write!(f, "gamma must be in [0, 1], got {value}"),
            Self::InvalidEpsilon { value } => {
                write!(f, "epsilon must be in [0, 1], got {value}")
            }
            Self::ChannelCapacityZero => write!(f, "channel_capacity must be at least 1"),
            Self::EpisodeCapZero => write!(f, "max_episode_steps must be at least 1"),
            Self::NoDepartureCells => write!(f, "grid has no track or start cells"),
            Self::ThreadSpawnFailed { reason } => write!(f, "thread spawn failed: {reason}"),
        }
    }
}

impl Error for ConfigError {}

// ── TrainConfig ────────────────────────────────────────────────────

/// Configuration for a training run started by [`train`](crate::train).
#[derive(Clone, Debug, PartialEq)]
pub struct TrainConfig {
    /// Number of episode generator threads. `None` = auto-detect
    /// (`available_parallelism - 1`, clamped to `[1, 64]`, leaving a core
    /// for the estimator).
    pub worker_count: Option<usize>,
    /// Step size of the value update. Default: 0.1.
    pub alpha: f64,
    /// Discount applied when accumulating returns. Default: 1.0
    /// (undiscounted).
    pub gamma: f64,
    /// Probability of a random action. Default: 0.1.
    pub epsilon: f64,
    /// Capacity of each worker's episode channel and of the merged
    /// channel feeding the estimator. Default: 16.
    pub channel_capacity: usize,
    /// Base RNG seed. Worker `i` is seeded with `seed ^ i`. Default: 0.
    pub seed: u64,
    /// Episodes longer than this are dropped instead of sent. `None`
    /// disables the cap. Default: `Some(10_000)`.
    pub max_episode_steps: Option<usize>,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            worker_count: None,
            alpha: 0.1,
            gamma: 1.0,
            epsilon: 0.1,
            channel_capacity: 16,
            seed: 0,
            max_episode_steps: Some(10_000),
        }
    }
}

fn unit_interval(v: f64) -> bool {
    (0.0..=1.0).contains(&v)
}

impl TrainConfig {
    /// Resolve the actual worker count, applying auto-detection if `None`.
    ///
    /// Explicit values are clamped to `[1, 256]`.
    pub fn resolved_worker_count(&self) -> usize {
        match self.worker_count {
            Some(n) => n.clamp(1, 256),
            None => {
                let cpus = std::thread::available_parallelism()
                    .map(|n| n.get())
                    .unwrap_or(4);
                cpus.saturating_sub(1).clamp(1, 64)
            }
        }
    }

    /// Check all invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !unit_interval(self.alpha) {
            return Err(ConfigError::InvalidAlpha { value: self.alpha });
        }
        if !unit_interval(self.gamma) {
            return Err(ConfigError::InvalidGamma { value: self.gamma });
        }
        if !unit_interval(self.epsilon) {
            return Err(ConfigError::InvalidEpsilon {
                value: self.epsilon,
            });
        }
        if self.channel_capacity == 0 {
            return Err(ConfigError::ChannelCapacityZero);
        }
        if self.max_episode_steps == Some(0) {
            return Err(ConfigError::EpisodeCapZero);
        }
        Ok(())
    }
}
