//! Run orchestration
//!
//! An [`Engine`] ingests parsed records under the policy for its
//! [`RunMode`], then produces the final record list: the whole store for
//! modes 1-4, the merged split-merge output for mode 5.

use crate::dedup::{DedupPolicy, DedupStats, Deduplicator, Outcome};
use crate::mode::RunMode;
use crate::pipeline::{PipelineStats, SplitBoundary, SplitMergePipeline};
use crate::{Error, Result};
use propdedup_filters::{FilterChain, FilterStats};
use propdedup_formats::PropertyRecord;
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

/// Engine configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    /// Half boundary used by split-merge
    pub split_boundary: SplitBoundary,
    /// Policy used to build the store before split-merge
    pub split_ingest_policy: DedupPolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            split_boundary: SplitBoundary::Full,
            split_ingest_policy: DedupPolicy::KeepFirst,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<()> {
        if self.split_ingest_policy == DedupPolicy::FilteredInsert {
            return Err(Error::InvalidConfig(
                "split-merge must ingest without filtering; use keep-first, keep-last or keep-neither"
                    .to_string(),
            ));
        }
        Ok(())
    }
}

/// Counters gathered over a whole run
#[derive(Debug, Clone, Serialize)]
pub struct RunStats {
    pub mode: u8,
    pub policy: DedupPolicy,
    pub dedup: DedupStats,
    pub filters: FilterStats,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pipeline: Option<PipelineStats>,
    pub output_records: usize,
}

/// Final result of a run
#[derive(Debug, Clone)]
pub struct RunReport {
    pub mode: RunMode,
    pub records: Vec<PropertyRecord>,
    pub stats: RunStats,
}

/// Drives one run from ingestion to final output
pub struct Engine {
    mode: RunMode,
    config: EngineConfig,
    dedup: Deduplicator,
}

impl Engine {
    /// Create an engine for `mode`
    pub fn new(mode: RunMode, config: EngineConfig) -> Result<Self> {
        config.validate()?;

        // One filter chain, and so one sampling gate, for the whole run.
        let filters = Arc::new(FilterChain::new());
        let policy = mode.ingest_policy(config.split_ingest_policy);
        info!("Run mode {} using {} ingestion", mode, policy);

        Ok(Self {
            mode,
            config,
            dedup: Deduplicator::with_filters(policy, filters),
        })
    }

    pub fn mode(&self) -> RunMode {
        self.mode
    }

    /// Ingest one parsed record
    pub fn ingest(&mut self, record: PropertyRecord) -> Outcome {
        self.dedup.ingest(record)
    }

    /// Ingest every record, stopping at the first read error
    pub fn ingest_all<I, E>(&mut self, records: I) -> Result<()>
    where
        I: IntoIterator<Item = std::result::Result<PropertyRecord, E>>,
        Error: From<E>,
    {
        for record in records {
            self.ingest(record?);
        }
        Ok(())
    }

    /// Finish ingestion and produce the final output
    pub fn finish(self) -> Result<RunReport> {
        let Engine { mode, config, dedup } = self;
        let policy = dedup.policy();
        let filters = Arc::clone(dedup.filters());

        info!(
            "Ingestion complete: {} records seen, {} stored",
            dedup.stats().total_seen,
            dedup.store().len()
        );

        let (store, dedup_stats) = dedup.into_parts();
        let (records, pipeline) = match mode {
            RunMode::SplitMerge => {
                let output =
                    SplitMergePipeline::new(config.split_boundary).run(&store, &filters)?;
                (output.records, Some(output.stats))
            }
            _ => (store.into_records(), None),
        };

        let stats = RunStats {
            mode: mode.number(),
            policy,
            dedup: dedup_stats,
            filters: filters.stats(),
            pipeline,
            output_records: records.len(),
        };
        Ok(RunReport {
            mode,
            records,
            stats,
        })
    }

    /// Ingest everything from `records` and finish
    pub fn run<I, E>(mut self, records: I) -> Result<RunReport>
    where
        I: IntoIterator<Item = std::result::Result<PropertyRecord, E>>,
        Error: From<E>,
    {
        self.ingest_all(records)?;
        self.finish()
    }
}
