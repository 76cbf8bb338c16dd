//! Progress notification from the estimator thread.

/// Receives the running count of processed episodes.
///
/// Called synchronously on the estimator thread after each episode, so a
/// slow hook slows training. The count starts at 1 and increases by one
/// per call.
pub trait ProgressHook: Send {
    /// Called once per processed episode.
    fn on_episode(&mut self, count: u64);
}

impl<F> ProgressHook for F
where
    F: FnMut(u64) + Send,
{
    fn on_episode(&mut self, count: u64) {
        self(count)
    }
}

/// A hook that ignores every call.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoProgress;

impl ProgressHook for NoProgress {
    fn on_episode(&mut self, _count: u64) {}
}

/// Forwards only every `every`-th call to the inner hook.
#[derive(Debug)]
pub struct Throttled<H> {
    inner: H,
    every: u64,
}

impl<H: ProgressHook> Throttled<H> {
    /// Wrap `inner`. An `every` of 0 is treated as 1.
    pub fn new(inner: H, every: u64) -> Self {
        Self {
            inner,
            every: every.max(1),
        }
    }

    /// Unwrap the inner hook.
    pub fn into_inner(self) -> H {
        self.inner
    }
}

impl<H: ProgressHook> ProgressHook for Throttled<H> {
    fn on_episode(&mut self, count: u64) {
        if count % self.every == 0 {
            self.inner.on_episode(count);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closures_are_hooks() {
        let mut seen = Vec::new();
        {
            let mut hook = |c: u64| seen.push(c);
            for c in 1..=3 {
                hook.on_episode(c);
            }
        }
        assert_eq!(seen, vec![1, 2, 3]);
    }

    #[test]
    fn throttled_forwards_every_kth() {
        let mut seen = Vec::new();
        let mut hook = Throttled::new(|c: u64| seen.push(c), 4);
        for c in 1..=10 {
            hook.on_episode(c);
        }
        drop(hook);
        assert_eq!(seen, vec![4, 8]);
    }

    #[test]
    fn throttled_zero_means_every_call() {
        let mut n = 0u64;
        let mut hook = Throttled::new(|_: u64| n += 1, 0);
        for c in 1..=5 {
            hook.on_episode(c);
        }
        drop(hook);
        assert_eq!(n, 5);
    }
}
