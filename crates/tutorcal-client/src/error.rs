//! Client error types.

use thiserror::Error;
use tutorcal_core::TracingError;
use tutorcal_ics::IcsError;
use tutorcal_sources::SourceError;

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors that can occur in the client.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Configuration could not be read or is invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// A command-line value could not be interpreted.
    #[error("invalid argument: {0}")]
    Argument(String),

    /// Input records could not be loaded.
    #[error(transparent)]
    Source(#[from] SourceError),

    /// A calendar document could not be read back.
    #[error(transparent)]
    Ics(#[from] IcsError),

    /// The export finished with a failure outcome.
    #[error("export failed: {0}")]
    Export(String),

    /// Output could not be serialized.
    #[error("failed to serialize output: {0}")]
    Serialize(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Logging could not be initialized.
    #[error(transparent)]
    Tracing(#[from] TracingError),
}
