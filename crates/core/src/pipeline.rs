//! Split-filter-merge pipeline
//!
//! Partitions the store's key order into two contiguous halves and spawns
//! one worker thread per half. Each worker sends its passing records on a
//! bounded channel of capacity two. The pipeline blocks until exactly two
//! messages have arrived, then concatenates first-half results followed by
//! second-half results.
//!
//! The store is only read during this phase. The sampling gate inside the
//! filter chain is the one piece of state both workers mutate, and it uses
//! an atomic counter. Which records the gate drops depends on how the two
//! workers interleave, but the number it drops does not.

use crate::store::ResultStore;
use crate::{Error, Result};
use propdedup_filters::FilterChain;
use propdedup_formats::{PropertyRecord, RecordKey};
use serde::{Deserialize, Serialize};
use std::ops::Range;
use std::sync::mpsc::{self, Receiver};
use std::thread::{self, ThreadId};
use tracing::{debug, info, warn};

/// Number of concurrent workers
pub const WORKER_COUNT: usize = 2;

/// Where the second half ends
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SplitBoundary {
    /// Second half is `[n/2, n)`; every key is filtered
    #[default]
    Full,
    /// Second half is `[n/2, n-1)`; the last key is never filtered
    Legacy,
}

impl SplitBoundary {
    /// Index ranges of the two halves for `n` keys
    pub fn ranges(&self, n: usize) -> (Range<usize>, Range<usize>) {
        let mid = n / 2;
        let end = match self {
            SplitBoundary::Full => n,
            SplitBoundary::Legacy => n.saturating_sub(1).max(mid),
        };
        (0..mid, mid..end)
    }
}

/// Which half a worker processed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Half {
    First,
    Second,
}

impl Half {
    fn index(&self) -> usize {
        match self {
            Half::First => 0,
            Half::Second => 1,
        }
    }
}

/// One worker's message on the merge channel
#[derive(Debug)]
struct HalfOutput {
    half: Half,
    worker: ThreadId,
    records: Vec<PropertyRecord>,
}

/// Counters for one pipeline run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PipelineStats {
    pub total_keys: usize,
    pub first_half_keys: usize,
    pub second_half_keys: usize,
    pub first_half_passed: usize,
    pub second_half_passed: usize,
    /// Keys excluded by the boundary and never filtered
    pub unprocessed_keys: usize,
}

impl PipelineStats {
    pub fn passed(&self) -> usize {
        self.first_half_passed + self.second_half_passed
    }

    /// Percentage of processed keys that passed the filters
    pub fn retention_rate(&self) -> f64 {
        let processed = self.first_half_keys + self.second_half_keys;
        if processed > 0 {
            (self.passed() as f64 / processed as f64) * 100.0
        } else {
            0.0
        }
    }
}

/// Merged pipeline output
#[derive(Debug, Clone, Default)]
pub struct PipelineOutput {
    pub records: Vec<PropertyRecord>,
    pub stats: PipelineStats,
}

/// Two-way concurrent split-filter-merge
#[derive(Debug, Clone, Default)]
pub struct SplitMergePipeline {
    boundary: SplitBoundary,
}

impl SplitMergePipeline {
    pub fn new(boundary: SplitBoundary) -> Self {
        Self { boundary }
    }

    pub fn boundary(&self) -> SplitBoundary {
        self.boundary
    }

    /// Filter the store's records in two concurrent halves and merge them
    pub fn run(&self, store: &ResultStore, filters: &FilterChain) -> Result<PipelineOutput> {
        let keys = store.keys();
        let (first, second) = self.boundary.ranges(keys.len());

        let mut stats = PipelineStats {
            total_keys: keys.len(),
            first_half_keys: first.len(),
            second_half_keys: second.len(),
            unprocessed_keys: keys.len() - first.len() - second.len(),
            ..Default::default()
        };

        info!(
            "Split-merge over {} keys: first half {:?}, second half {:?} ({:?} boundary)",
            keys.len(),
            first,
            second,
            self.boundary
        );

        let halves = [(Half::First, &keys[first]), (Half::Second, &keys[second])];
        let outputs = run_workers(halves, store, filters)?;

        let mut merged = Vec::new();
        let mut second_out = Vec::new();
        for output in outputs {
            debug!(
                "{:?} half delivered {} records from {:?}",
                output.half,
                output.records.len(),
                output.worker
            );
            match output.half {
                Half::First => merged = output.records,
                Half::Second => second_out = output.records,
            }
        }

        stats.first_half_passed = merged.len();
        stats.second_half_passed = second_out.len();
        merged.extend(second_out);

        info!(
            "Split-merge complete: {} + {} records passed",
            stats.first_half_passed, stats.second_half_passed
        );

        Ok(PipelineOutput {
            records: merged,
            stats,
        })
    }
}

/// Spawn one worker per half and wait for both of their messages
fn run_workers(
    halves: [(Half, &[RecordKey]); WORKER_COUNT],
    store: &ResultStore,
    filters: &FilterChain,
) -> Result<Vec<HalfOutput>> {
    thread::scope(|scope| {
        let (tx, rx) = mpsc::sync_channel(WORKER_COUNT);
        let mut handles = Vec::with_capacity(WORKER_COUNT);

        for (half, keys) in halves {
            let tx = tx.clone();
            let handle = thread::Builder::new()
                .name(format!("split-worker-{}", half.index()))
                .spawn_scoped(scope, move || {
                    let records = filter_half(half, keys, store, filters);
                    let output = HalfOutput {
                        half,
                        worker: thread::current().id(),
                        records,
                    };
                    if tx.send(output).is_err() {
                        warn!("{:?} half finished after the merge gave up", half);
                    }
                })
                .map_err(|e| Error::Pipeline(format!("failed to start worker: {}", e)))?;
            handles.push(handle);
        }
        drop(tx);

        let received = receive_halves(&rx);

        // Join every worker so a panic surfaces here instead of at scope exit
        let mut panicked = 0;
        for handle in handles {
            if handle.join().is_err() {
                panicked += 1;
            }
        }
        if panicked > 0 {
            return Err(Error::Pipeline(format!("{} split worker(s) panicked", panicked)));
        }

        received
    })
}

/// Block until exactly [`WORKER_COUNT`] messages arrive
fn receive_halves(rx: &Receiver<HalfOutput>) -> Result<Vec<HalfOutput>> {
    let mut outputs = Vec::with_capacity(WORKER_COUNT);
    for _ in 0..WORKER_COUNT {
        let output = rx.recv().map_err(|_| {
            Error::Pipeline(format!(
                "merge channel closed after {} of {} halves",
                outputs.len(),
                WORKER_COUNT
            ))
        })?;
        outputs.push(output);
    }
    Ok(outputs)
}

fn filter_half(
    half: Half,
    keys: &[RecordKey],
    store: &ResultStore,
    filters: &FilterChain,
) -> Vec<PropertyRecord> {
    let mut passed = Vec::new();
    for key in keys {
        match store.get(key) {
            Some(record) => {
                if filters.passes(record) {
                    passed.push(record.clone());
                }
            }
            None => warn!("Key {} in order list but not in store", key),
        }
    }
    debug!(
        "{:?} half: {} of {} records passed",
        half,
        passed.len(),
        keys.len()
    );
    passed
}
