//! Concurrent Monte-Carlo value estimation for the racetrack problem.
//!
//! Many [`EpisodeGenerator`] workers roll out epsilon-greedy episodes over
//! a shared [`Grid`](racetrack_grid::Grid); a merge thread funnels them to
//! one [`Estimator`], the only thread that writes value estimates. Reads
//! and writes meet only at per-state atomic scalars, so no locks are held
//! on the hot path.
//!
//! Start a run with [`train`] and stop it with its [`CancelToken`] or the
//! returned [`Training`] handle.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod episode;
pub mod estimator;
pub mod hook;
pub mod merge;
pub mod metrics;
pub mod policy;
pub mod trainer;
pub mod worker;

pub use config::{ConfigError, TrainConfig};
pub use episode::{Episode, Step};
pub use estimator::{Estimator, UpdateOutcome};
pub use hook::{NoProgress, ProgressHook, Throttled};
pub use merge::{merge, CancelToken};
pub use metrics::{MetricsSnapshot, TrainingMetrics};
pub use policy::{rollout, EpsilonGreedy};
pub use trainer::{train, Training, TrainingReport};
pub use worker::{EpisodeGenerator, Generated};
