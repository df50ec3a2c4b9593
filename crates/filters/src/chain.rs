//! Filter composition
//!
//! Applies the value threshold, the suffix exclusion and the sampling gate
//! in that order, stopping at the first failure. The sampling gate only
//! sees records that passed both earlier stages.

use crate::address_filter::{passes_suffix_filter, EXCLUDED_SUFFIXES};
use crate::sampling::SamplingGate;
use crate::value_filter::{passes_value_threshold, VALUE_THRESHOLD};
use propdedup_formats::PropertyRecord;
use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::trace;

/// Stage of the chain that rejected a record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterStage {
    ValueThreshold,
    AddressSuffix,
    Sampling,
}

/// Outcome of running a record through the chain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterVerdict {
    Pass,
    Rejected(FilterStage),
}

impl FilterVerdict {
    pub fn is_pass(&self) -> bool {
        matches!(self, FilterVerdict::Pass)
    }
}

/// Snapshot of the chain's counters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterStats {
    pub evaluated: usize,
    pub passed: usize,
    pub rejected_value: usize,
    pub rejected_suffix: usize,
    pub rejected_sampling: usize,
}

impl FilterStats {
    pub fn rejected(&self) -> usize {
        self.rejected_value + self.rejected_suffix + self.rejected_sampling
    }

    /// Percentage of evaluated records that were rejected
    pub fn filter_rate(&self) -> f64 {
        if self.evaluated > 0 {
            (self.rejected() as f64 / self.evaluated as f64) * 100.0
        } else {
            0.0
        }
    }
}

/// The three-stage filter chain
///
/// Safe to share across threads; all counters and the sampling gate use
/// atomic updates.
#[derive(Debug)]
pub struct FilterChain {
    threshold: i64,
    gate: Arc<SamplingGate>,
    evaluated: AtomicUsize,
    passed: AtomicUsize,
    rejected_value: AtomicUsize,
    rejected_suffix: AtomicUsize,
    rejected_sampling: AtomicUsize,
}

impl FilterChain {
    /// Create a chain with its own sampling gate
    pub fn new() -> Self {
        Self::with_gate(Arc::new(SamplingGate::new()))
    }

    /// Create a chain around an existing sampling gate
    pub fn with_gate(gate: Arc<SamplingGate>) -> Self {
        Self {
            threshold: VALUE_THRESHOLD,
            gate,
            evaluated: AtomicUsize::new(0),
            passed: AtomicUsize::new(0),
            rejected_value: AtomicUsize::new(0),
            rejected_suffix: AtomicUsize::new(0),
            rejected_sampling: AtomicUsize::new(0),
        }
    }

    /// Override the value threshold
    #[cfg(test)]
    pub(crate) fn with_threshold(mut self, threshold: i64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn threshold(&self) -> i64 {
        self.threshold
    }

    pub fn gate(&self) -> &Arc<SamplingGate> {
        &self.gate
    }

    /// Run a record through all stages
    pub fn evaluate(&self, record: &PropertyRecord) -> FilterVerdict {
        self.evaluated.fetch_add(1, Ordering::Relaxed);

        let verdict = if !passes_value_threshold(record, self.threshold) {
            self.rejected_value.fetch_add(1, Ordering::Relaxed);
            FilterVerdict::Rejected(FilterStage::ValueThreshold)
        } else if !passes_suffix_filter(record, &EXCLUDED_SUFFIXES) {
            self.rejected_suffix.fetch_add(1, Ordering::Relaxed);
            FilterVerdict::Rejected(FilterStage::AddressSuffix)
        } else if !self.gate.admit() {
            self.rejected_sampling.fetch_add(1, Ordering::Relaxed);
            FilterVerdict::Rejected(FilterStage::Sampling)
        } else {
            self.passed.fetch_add(1, Ordering::Relaxed);
            FilterVerdict::Pass
        };

        trace!("Record {} -> {:?}", record.key, verdict);
        verdict
    }

    /// Check if a record passes every stage
    pub fn passes(&self, record: &PropertyRecord) -> bool {
        self.evaluate(record).is_pass()
    }

    pub fn stats(&self) -> FilterStats {
        FilterStats {
            evaluated: self.evaluated.load(Ordering::Relaxed),
            passed: self.passed.load(Ordering::Relaxed),
            rejected_value: self.rejected_value.load(Ordering::Relaxed),
            rejected_suffix: self.rejected_suffix.load(Ordering::Relaxed),
            rejected_sampling: self.rejected_sampling.load(Ordering::Relaxed),
        }
    }
}

impl Default for FilterChain {
    fn default() -> Self {
        Self::new()
    }
}
