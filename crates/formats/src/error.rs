//! Error types for record formats

use thiserror::Error;

/// Format reader and writer errors
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid file: {0}")]
    InvalidFile(String),

    #[error("Unsupported output format: {0}")]
    UnsupportedFormat(String),
}

/// Result type alias for format operations
pub type Result<T> = std::result::Result<T, Error>;
