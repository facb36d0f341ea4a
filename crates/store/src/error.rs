//! Store errors

use thiserror::Error;

/// Errors from the persistence layer
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0} not found: {1}")]
    NotFound(&'static str, String),

    #[error("Corrupt row: {0}")]
    Corrupt(String),

    #[error("Evidence blob not found: {0}")]
    MissingBlob(String),
}
