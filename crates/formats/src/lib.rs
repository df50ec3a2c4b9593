//! Record formats for property valuation datasets
//!
//! This crate provides the record model, the tab-delimited line parser,
//! a streaming reader with gzip support, and the output writers.

pub mod error;
pub mod record;
pub mod tsv;
pub mod writer;

pub use error::{Error, Result};
pub use record::{PropertyRecord, RecordKey};
pub use tsv::{open_dataset, parse_line, LineRejection, ReaderStats, TsvReader};
pub use writer::{OutputFormat, RecordWriter};
