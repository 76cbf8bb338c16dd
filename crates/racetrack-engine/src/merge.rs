//! Fan-in of worker episodes and cooperative cancellation.
//!
//! Every worker owns a bounded channel. [`merge`] selects across all of
//! them and forwards episodes, in arrival order, into the single bounded
//! channel the estimator drains. Backpressure flows back to the workers
//! through the bounded sends; nothing is dropped while the run is live.
//!
//! [`CancelToken`] is both a flag for loop heads and a channel that
//! disconnects on cancel, so a thread blocked in `select!` wakes at once.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use crossbeam_channel::{select, Receiver, Select, Sender};

use crate::episode::Episode;

/// Uninhabited message type: the cancel channel only ever disconnects.
#[derive(Debug)]
pub(crate) enum Never {}

struct CancelInner {
    cancelled: AtomicBool,
    trigger: Mutex<Option<Sender<Never>>>,
    done: Receiver<Never>,
}

/// Broadcast cancellation signal shared by every thread of a run.
///
/// Cloning yields another handle to the same signal. Cancelling is
/// idempotent and cannot be undone.
#[derive(Clone)]
pub struct CancelToken {
    inner: Arc<CancelInner>,
}

impl CancelToken {
    /// A fresh, un-cancelled token.
    pub fn new() -> Self {
        let (trigger, done) = crossbeam_channel::bounded(0);
        Self {
            inner: Arc::new(CancelInner {
                cancelled: AtomicBool::new(false),
                trigger: Mutex::new(Some(trigger)),
                done,
            }),
        }
    }

    /// Signal cancellation to every holder.
    pub fn cancel(&self) {
        self.inner.cancelled.store(true, Ordering::Release);
        // Dropping the only sender disconnects `done` for all receivers.
        let mut trigger = self.inner.trigger.lock().unwrap_or_else(|e| e.into_inner());
        trigger.take();
    }

    /// Whether [`cancel`](Self::cancel) has been called.
    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::Acquire)
    }

    /// Receiver that becomes ready (disconnected) once cancelled.
    pub(crate) fn done(&self) -> &Receiver<Never> {
        &self.inner.done
    }
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for CancelToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CancelToken")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

// ── merge ──────────────────────────────────────────────────────────

/// Forward episodes from every input to `output` until cancelled, the
/// output disconnects, or all inputs disconnect.
///
/// Blocks the calling thread. Returns the number of episodes forwarded.
pub fn merge(
    mut inputs: Vec<Receiver<Episode>>,
    output: Sender<Episode>,
    cancel: &CancelToken,
) -> u64 {
    let mut forwarded = 0;
    while !inputs.is_empty() {
        let (index, received) = {
            let mut sel = Select::new();
            let done = sel.recv(cancel.done());
            for rx in &inputs {
                sel.recv(rx);
            }
            let op = sel.select();
            let chosen = op.index();
            if chosen == done {
                let _ = op.recv(cancel.done());
                return forwarded;
            }
            let index = chosen - 1;
            (index, op.recv(&inputs[index]))
        };

        match received {
            Ok(episode) => {
                select! {
                    send(output, episode) -> res => {
                        if res.is_err() {
                            return forwarded;
                        }
                        forwarded += 1;
                    }
                    recv(cancel.done()) -> _ => return forwarded,
                }
            }
            Err(_) => {
                inputs.swap_remove(index);
            }
        }
    }
    forwarded
}
