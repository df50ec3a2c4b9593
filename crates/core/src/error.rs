//! Error types for the deduplication engine

use thiserror::Error;

/// Core engine errors
#[derive(Error, Debug)]
pub enum Error {
    #[error("Format error: {0}")]
    Format(#[from] propdedup_formats::Error),

    #[error("Invalid mode: {0}")]
    InvalidMode(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Pipeline error: {0}")]
    Pipeline(String),
}

/// Result type alias for core operations
pub type Result<T> = std::result::Result<T, Error>;
