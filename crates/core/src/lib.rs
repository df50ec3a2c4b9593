//! Deduplication and filtering engine for property valuation datasets
//!
//! Records are ingested one at a time under a [`DedupPolicy`] into a
//! [`ResultStore`]. Mode 5 additionally runs the [`SplitMergePipeline`],
//! which filters the deduplicated store in two concurrent halves.

pub mod dedup;
pub mod engine;
pub mod error;
pub mod mode;
pub mod pipeline;
pub mod store;

pub use dedup::{DedupPolicy, DedupStats, Deduplicator, Outcome};
pub use engine::{Engine, EngineConfig, RunReport, RunStats};
pub use error::{Error, Result};
pub use mode::RunMode;
pub use pipeline::{Half, PipelineOutput, PipelineStats, SplitBoundary, SplitMergePipeline};
pub use store::{Insertion, ResultStore};
