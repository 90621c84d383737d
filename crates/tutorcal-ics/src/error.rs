//! Error types for calendar document encoding and inspection.

use thiserror::Error;

/// An error raised while writing or reading a calendar document.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum IcsError {
    /// The encoder was handed an empty event list.
    #[error("no events to encode")]
    NoEvents,

    /// An event starts or ends outside the years RFC 5545 can express.
    #[error("event {id} falls outside the representable time range")]
    TimeOutOfRange { id: String },

    /// The document could not be parsed.
    #[error("failed to parse calendar document: {0}")]
    Parse(String),

    /// The document parsed but breaks RFC 5545 structure.
    #[error("malformed calendar document at line {line}: {reason}")]
    Malformed { line: usize, reason: String },
}

/// A specialized Result type for calendar document operations.
pub type IcsResult<T> = Result<T, IcsError>;
