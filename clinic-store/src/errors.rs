//! Unified error type for the store crate.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    /// Underlying SQLite error.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Filesystem error (database directory creation, mtime reads).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization of detail blobs.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}
