//! Lock-free `f64` cell backed by an `AtomicU64`.
//!
//! The float's bit pattern is the only thing stored. Every conversion
//! between `f64` and `u64` happens inside a single atomic load or
//! compare-exchange, so a reader can never observe a partially written
//! value and no address into the float is ever held across calls.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// A 64-bit float supporting torn-free reads and compare-and-swap writes.
///
/// In the training engine every grid state owns one of these. Worker
/// threads read them concurrently; the estimator is the only writer.
pub struct AtomicScalar {
    bits: AtomicU64,
}

// Compile-time assertion: AtomicScalar must be Send + Sync.
const _: fn() = || {
    fn assert<T: Send + Sync>() {}
    assert::<AtomicScalar>();
};

impl AtomicScalar {
    /// Create a cell holding `value`.
    pub fn new(value: f64) -> Self {
        Self {
            bits: AtomicU64::new(value.to_bits()),
        }
    }

    /// Read the most recently completed write.
    pub fn read(&self) -> f64 {
        f64::from_bits(self.bits.load(Ordering::Acquire))
    }

    /// Replace the stored value with `new_value` iff it currently
    /// bit-equals `expected`. Returns whether the swap happened.
    ///
    /// Comparison is on the raw bits: `0.0` and `-0.0` differ, and a NaN
    /// payload matches only itself.
    pub fn compare_and_swap(&self, expected: f64, new_value: f64) -> bool {
        self.bits
            .compare_exchange(
                expected.to_bits(),
                new_value.to_bits(),
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok()
    }

    /// Store `new_value`, retrying the read + CAS pair until it lands.
    ///
    /// Unconditional overwrite: the previous value does not feed into the
    /// result, so retrying is always correct here.
    pub fn set(&self, new_value: f64) {
        loop {
            let current = self.read();
            if self.compare_and_swap(current, new_value) {
                return;
            }
        }
    }

    /// Compute `read() + delta` once and attempt a single CAS.
    ///
    /// Returns `(value, succeeded)`. On success `value` is the newly
    /// stored value. On failure another writer got in between the read
    /// and the swap; `value` is the sum that was *not* stored and the
    /// cell is left untouched. Whether to recompute or drop the update
    /// is up to the caller.
    pub fn add_and_get(&self, delta: f64) -> (f64, bool) {
        let current = self.read();
        let next = current + delta;
        (next, self.compare_and_swap(current, next))
    }
}

impl Default for AtomicScalar {
    fn default() -> Self {
        Self::new(0.0)
    }
}

impl From<f64> for AtomicScalar {
    fn from(v: f64) -> Self {
        Self::new(v)
    }
}

impl fmt::Debug for AtomicScalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("AtomicScalar").field(&self.read()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::sync::{Arc, Mutex};
    use std::thread;

    #[test]
    fn new_reads_back_initial_value() {
        let s = AtomicScalar::new(-100.0);
        assert_eq!(s.read(), -100.0);
        assert_eq!(AtomicScalar::default().read(), 0.0);
    }

    #[test]
    fn cas_with_correct_expected_swaps() {
        let s = AtomicScalar::new(1.5);
        assert!(s.compare_and_swap(1.5, 2.25));
        assert_eq!(s.read(), 2.25);
    }

    #[test]
    fn cas_with_stale_expected_leaves_value() {
        let s = AtomicScalar::new(1.5);
        assert!(!s.compare_and_swap(1.0, 9.0));
        assert_eq!(s.read(), 1.5);
    }

    #[test]
    fn cas_compares_bits_not_numeric_equality() {
        let s = AtomicScalar::new(0.0);
        assert!(!s.compare_and_swap(-0.0, 1.0));
        assert_eq!(s.read(), 0.0);

        let nan = f64::NAN;
        let s = AtomicScalar::new(nan);
        assert!(s.compare_and_swap(nan, 3.0));
        assert_eq!(s.read(), 3.0);
    }

    #[test]
    fn set_overwrites() {
        let s = AtomicScalar::new(7.0);
        s.set(-1.0);
        assert_eq!(s.read(), -1.0);
    }

    #[test]
    fn add_and_get_uncontended_succeeds() {
        let s = AtomicScalar::new(10.0);
        let (v, ok) = s.add_and_get(-2.5);
        assert!(ok);
        assert_eq!(v, 7.5);
        assert_eq!(s.read(), 7.5);
    }

    #[test]
    fn concurrent_adds_retried_by_caller_net_to_original() {
        const THREADS: usize = 8;
        const PER_THREAD: usize = 500;

        let cell = Arc::new(AtomicScalar::new(42.0));
        let handles: Vec<_> = (0..THREADS)
            .map(|t| {
                let cell = Arc::clone(&cell);
                thread::spawn(move || {
                    let delta = if t % 2 == 0 { 1.0 } else { -1.0 };
                    for _ in 0..PER_THREAD {
                        // The caller decides to recompute: loop until it lands.
                        while !cell.add_and_get(delta).1 {}
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(cell.read(), 42.0);
    }

    #[test]
    fn externally_serialized_adds_never_fail() {
        let cell = Arc::new(AtomicScalar::new(0.0));
        let gate = Arc::new(Mutex::new(()));
        let handles: Vec<_> = (0..4)
            .map(|t| {
                let cell = Arc::clone(&cell);
                let gate = Arc::clone(&gate);
                thread::spawn(move || {
                    let delta = if t < 2 { 1.0 } else { -1.0 };
                    for _ in 0..250 {
                        let _g = gate.lock().unwrap();
                        assert!(cell.add_and_get(delta).1, "single writer must not fail");
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(cell.read(), 0.0);
    }

    #[test]
    fn readers_never_observe_torn_values() {
        // Two patterns whose bit halves differ: a torn read would mix them.
        const A: f64 = 1.0e300;
        const B: f64 = -3.5e-200;

        let cell = Arc::new(AtomicScalar::new(A));
        let writer = {
            let cell = Arc::clone(&cell);
            thread::spawn(move || {
                for i in 0..20_000 {
                    cell.set(if i % 2 == 0 { B } else { A });
                }
            })
        };
        let readers: Vec<_> = (0..3)
            .map(|_| {
                let cell = Arc::clone(&cell);
                thread::spawn(move || {
                    for _ in 0..20_000 {
                        let v = cell.read();
                        assert!(v == A || v == B, "torn read: {v:e}");
                    }
                })
            })
            .collect();
        writer.join().unwrap();
        for r in readers {
            r.join().unwrap();
        }
    }

    #[test]
    fn set_races_retried_adds_without_losing_atomicity() {
        const SETS: usize = 5_000;
        const ADDS: usize = 500;
        const LOW: f64 = 0.0;
        const HIGH: f64 = 10_000.0;

        let cell = Arc::new(AtomicScalar::new(HIGH));
        let setter = {
            let cell = Arc::clone(&cell);
            thread::spawn(move || {
                // Ends on LOW: SETS is even.
                for i in 0..SETS {
                    cell.set(if i % 2 == 0 { HIGH } else { LOW });
                }
            })
        };
        let adder = {
            let cell = Arc::clone(&cell);
            thread::spawn(move || {
                for _ in 0..ADDS {
                    while !cell.add_and_get(1.0).1 {}
                }
            })
        };
        setter.join().unwrap();
        adder.join().unwrap();

        // The last set wrote LOW; only whole adds can have landed since.
        let landed = cell.read() - LOW;
        assert_eq!(landed.fract(), 0.0, "partial update: {landed}");
        assert!(
            (0.0..=ADDS as f64).contains(&landed),
            "{landed} was never written"
        );

        cell.set(HIGH);
        assert_eq!(cell.read(), HIGH);
    }

    proptest! {
        #[test]
        fn read_after_successful_cas_is_new_value(
            initial in proptest::num::f64::NORMAL,
            next in proptest::num::f64::NORMAL,
        ) {
            let s = AtomicScalar::new(initial);
            prop_assert!(s.compare_and_swap(initial, next));
            prop_assert_eq!(s.read().to_bits(), next.to_bits());
        }
    }
}
