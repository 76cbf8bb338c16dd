//! Training counters shared by every thread of a run.
//!
//! [`TrainingMetrics`] is written with relaxed atomic increments from the
//! workers and the estimator; [`MetricsSnapshot`] is a plain copy for
//! callers.

use std::sync::atomic::{AtomicU64, Ordering};

/// Live counters for one training run.
#[derive(Debug, Default)]
pub struct TrainingMetrics {
    episodes_generated: AtomicU64,
    episodes_truncated: AtomicU64,
    episodes_processed: AtomicU64,
    steps_processed: AtomicU64,
    updates_discarded: AtomicU64,
}

impl TrainingMetrics {
    pub(crate) fn record_generated(&self) {
        self.episodes_generated.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_truncated(&self) {
        self.episodes_truncated.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_processed(&self, steps: usize) {
        self.steps_processed
            .fetch_add(steps as u64, Ordering::Relaxed);
        self.episodes_processed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_discarded(&self, n: u64) {
        if n > 0 {
            self.updates_discarded.fetch_add(n, Ordering::Relaxed);
        }
    }

    /// Copy the current counter values.
    ///
    /// Each counter is read independently; the snapshot is not a
    /// consistent cut while training runs.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            episodes_generated: self.episodes_generated.load(Ordering::Relaxed),
            episodes_truncated: self.episodes_truncated.load(Ordering::Relaxed),
            episodes_processed: self.episodes_processed.load(Ordering::Relaxed),
            steps_processed: self.steps_processed.load(Ordering::Relaxed),
            updates_discarded: self.updates_discarded.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of [`TrainingMetrics`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    /// Episodes that reached a terminal state and were handed to the merge
    /// layer.
    pub episodes_generated: u64,
    /// Episodes dropped for exceeding the step cap.
    pub episodes_truncated: u64,
    /// Episodes applied by the estimator.
    pub episodes_processed: u64,
    /// Steps applied by the estimator.
    pub steps_processed: u64,
    /// Value updates lost to a failed compare-and-swap.
    pub updates_discarded: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_metrics_are_zero() {
        assert_eq!(
            TrainingMetrics::default().snapshot(),
            MetricsSnapshot::default()
        );
    }

    #[test]
    fn counters_accumulate() {
        let m = TrainingMetrics::default();
        m.record_generated();
        m.record_generated();
        m.record_truncated();
        m.record_processed(7);
        m.record_processed(3);
        m.record_discarded(0);
        m.record_discarded(2);
        let s = m.snapshot();
        assert_eq!(s.episodes_generated, 2);
        assert_eq!(s.episodes_truncated, 1);
        assert_eq!(s.episodes_processed, 2);
        assert_eq!(s.steps_processed, 10);
        assert_eq!(s.updates_discarded, 2);
    }
}
