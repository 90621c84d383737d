//! Error types for loading schedule records.
//!
//! Only the outer document can fail to load. Individual records that do not
//! fit the expected shape are skipped by the loader, and records without a
//! usable date are skipped by the normalizer; neither is an error.

use std::path::PathBuf;

use thiserror::Error;

/// An error that occurred while reading a schedule document.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The document could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The document is not valid JSON.
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The document is JSON but neither a record list nor a snapshot.
    #[error("unsupported document shape: expected an array of records or an object with `sessions`/`tasks`, got {0}")]
    Shape(&'static str),
}

/// A specialized Result type for record loading.
pub type SourceResult<T> = Result<T, SourceError>;
