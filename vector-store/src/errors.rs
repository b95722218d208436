//! Unified error types for the crate.

use thiserror::Error;

/// Top-level error for vector-store operations.
#[derive(Debug, Error)]
pub enum VectorError {
    /// I/O or filesystem errors.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing / serialization errors.
    #[error("parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Invalid or unsupported configuration.
    #[error("config error: {0}")]
    Config(String),

    /// HTTP transport errors talking to the remote index.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Remote index returned a non-success status.
    #[error("index HTTP {status} from {url}: {snippet}")]
    Api {
        status: u16,
        url: String,
        snippet: String,
    },

    /// Mismatch in vector dimensionality.
    #[error("vector size mismatch: got {got}, want {want}")]
    VectorSizeMismatch { got: usize, want: usize },

    /// Embedding backend failed.
    #[error("embedding error: {0}")]
    Embedding(String),
}
