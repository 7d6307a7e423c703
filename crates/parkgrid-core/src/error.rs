//! Error types for Parkgrid core library.

use thiserror::Error;

/// Result type alias using Parkgrid Error.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for Parkgrid operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// A domain invariant was violated before any request was made
    /// (e.g. a coordinate out of range, an inverted time window).
    #[error("Validation error: {0}")]
    Validation(String),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
