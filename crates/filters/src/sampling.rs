//! Periodic sampling gate
//!
//! Drops every `period`-th record that reaches it. The gate is stateful and
//! its answer depends on call order, so exactly one gate must exist per run
//! and it must be consulted once per candidate record. The counter update is
//! a single atomic read-modify-write, so the gate can be shared between
//! worker threads without losing increments.

use std::sync::atomic::{AtomicUsize, Ordering};

/// Default sampling period: every tenth candidate is dropped
pub const SAMPLING_PERIOD: usize = 10;

/// Stateful gate rejecting every `period`-th call
#[derive(Debug)]
pub struct SamplingGate {
    period: usize,
    count: AtomicUsize,
    calls: AtomicUsize,
}

impl SamplingGate {
    /// Create a gate with the default period
    pub fn new() -> Self {
        Self {
            period: SAMPLING_PERIOD,
            count: AtomicUsize::new(0),
            calls: AtomicUsize::new(0),
        }
    }

    /// Gate with a shorter period for exercising the reset in tests
    #[cfg(test)]
    pub(crate) fn with_period(period: usize) -> Self {
        assert!(period > 0, "sampling period must be at least 1");
        Self {
            period,
            count: AtomicUsize::new(0),
            calls: AtomicUsize::new(0),
        }
    }

    /// Advance the counter and report whether this call is admitted
    ///
    /// Returns `false` on the `period`-th call, resetting the counter to zero.
    pub fn admit(&self) -> bool {
        self.calls.fetch_add(1, Ordering::Relaxed);
        let period = self.period;
        let previous = self
            .count
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |count| {
                let next = count + 1;
                Some(if next >= period { 0 } else { next })
            })
            .unwrap_or_else(|count| count);
        previous + 1 < period
    }

    pub fn period(&self) -> usize {
        self.period
    }

    /// Total number of calls to [`SamplingGate::admit`]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }

    /// Number of calls rejected so far
    pub fn rejected(&self) -> usize {
        self.calls() / self.period
    }
}

impl Default for SamplingGate {
    fn default() -> Self {
        Self::new()
    }
}
