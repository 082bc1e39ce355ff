//! Storage error types.

use std::path::PathBuf;

use thiserror::Error;

/// Failures at the persistence boundary.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading or writing the store file failed.
    #[error("io error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The store file is not a valid document.
    #[error("malformed store document {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// `load` or `save` called on a manager built without a store.
    #[error("no backing store configured")]
    NoStore,
}

/// Result type for storage operations.
pub type StoreResult<T> = Result<T, StoreError>;
