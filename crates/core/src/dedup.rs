//! Duplicate handling policies
//!
//! Every policy is built on [`ResultStore::try_insert`] and differs only in
//! what it does when the key is already present.

use crate::store::{Insertion, ResultStore};
use crate::{Error, Result};
use propdedup_filters::{FilterChain, FilterStage, FilterVerdict};
use propdedup_formats::PropertyRecord;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, info};

/// Rule deciding which records survive a shared key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DedupPolicy {
    /// Later records overwrite earlier ones
    KeepLast,
    /// The first record for a key wins
    KeepFirst,
    /// A duplicate evicts the stored record and is itself discarded
    KeepNeither,
    /// Only records passing the filter chain are inserted, first one wins
    FilteredInsert,
}

/// What happened to one ingested record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Stored under a new key
    Inserted,
    /// Overwrote the record already stored under its key
    Replaced,
    /// Discarded because its key was already stored
    DroppedDuplicate,
    /// Caused the stored record for its key to be removed
    Evicted,
    /// Rejected by a filter stage before reaching the store
    Filtered(FilterStage),
}

impl DedupPolicy {
    /// Apply the policy to one record
    pub fn apply(
        &self,
        record: PropertyRecord,
        store: &mut ResultStore,
        filters: &FilterChain,
    ) -> Outcome {
        match self {
            DedupPolicy::KeepLast => match store.try_insert(record) {
                Insertion::Fresh => Outcome::Inserted,
                Insertion::Duplicate(record) => {
                    store.replace(record);
                    Outcome::Replaced
                }
            },
            DedupPolicy::KeepFirst => match store.try_insert(record) {
                Insertion::Fresh => Outcome::Inserted,
                Insertion::Duplicate(_) => Outcome::DroppedDuplicate,
            },
            DedupPolicy::KeepNeither => match store.try_insert(record) {
                Insertion::Fresh => Outcome::Inserted,
                Insertion::Duplicate(record) => {
                    store.remove(&record.key);
                    Outcome::Evicted
                }
            },
            DedupPolicy::FilteredInsert => match filters.evaluate(&record) {
                FilterVerdict::Rejected(stage) => Outcome::Filtered(stage),
                FilterVerdict::Pass => match store.try_insert(record) {
                    Insertion::Fresh => Outcome::Inserted,
                    Insertion::Duplicate(_) => Outcome::DroppedDuplicate,
                },
            },
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            DedupPolicy::KeepLast => "keep-last",
            DedupPolicy::KeepFirst => "keep-first",
            DedupPolicy::KeepNeither => "keep-neither",
            DedupPolicy::FilteredInsert => "filtered-insert",
        }
    }
}

impl fmt::Display for DedupPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DedupPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "keep-last" => Ok(DedupPolicy::KeepLast),
            "keep-first" => Ok(DedupPolicy::KeepFirst),
            "keep-neither" => Ok(DedupPolicy::KeepNeither),
            "filtered-insert" => Ok(DedupPolicy::FilteredInsert),
            other => Err(Error::InvalidConfig(format!(
                "unknown dedup policy: {}",
                other
            ))),
        }
    }
}

/// Statistics for ingestion
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DedupStats {
    /// Total number of records ingested
    pub total_seen: usize,
    pub inserted: usize,
    pub replaced: usize,
    pub dropped_duplicates: usize,
    pub evicted: usize,
    pub filtered: usize,
}

impl DedupStats {
    /// Duplicates handled by any policy, as a percentage of records seen
    pub fn dedup_rate(&self) -> f64 {
        if self.total_seen == 0 {
            0.0
        } else {
            let duplicates = self.replaced + self.dropped_duplicates + self.evicted;
            (duplicates as f64 / self.total_seen as f64) * 100.0
        }
    }
}

/// Sequential ingestor applying one policy to a store
pub struct Deduplicator {
    policy: DedupPolicy,
    store: ResultStore,
    filters: Arc<FilterChain>,
    stats: DedupStats,
}

impl Deduplicator {
    /// Create a deduplicator with a fresh filter chain
    pub fn new(policy: DedupPolicy) -> Self {
        Self::with_filters(policy, Arc::new(FilterChain::new()))
    }

    /// Create a deduplicator sharing an existing filter chain
    pub fn with_filters(policy: DedupPolicy, filters: Arc<FilterChain>) -> Self {
        info!("Creating Deduplicator with policy {}", policy);
        Self {
            policy,
            store: ResultStore::new(),
            filters,
            stats: DedupStats::default(),
        }
    }

    /// Ingest one record
    pub fn ingest(&mut self, record: PropertyRecord) -> Outcome {
        self.stats.total_seen += 1;
        let key = record.key.clone();
        let outcome = self.policy.apply(record, &mut self.store, &self.filters);

        match outcome {
            Outcome::Inserted => self.stats.inserted += 1,
            Outcome::Replaced => self.stats.replaced += 1,
            Outcome::DroppedDuplicate => self.stats.dropped_duplicates += 1,
            Outcome::Evicted => self.stats.evicted += 1,
            Outcome::Filtered(_) => self.stats.filtered += 1,
        }
        debug!("Record {} -> {:?}", key, outcome);
        outcome
    }

    pub fn policy(&self) -> DedupPolicy {
        self.policy
    }

    pub fn store(&self) -> &ResultStore {
        &self.store
    }

    pub fn filters(&self) -> &Arc<FilterChain> {
        &self.filters
    }

    pub fn stats(&self) -> &DedupStats {
        &self.stats
    }

    /// Consume the deduplicator, returning the store and statistics
    pub fn into_parts(self) -> (ResultStore, DedupStats) {
        (self.store, self.stats)
    }
}
