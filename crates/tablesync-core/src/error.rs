//! Error types for tablesync-core

use thiserror::Error;

use crate::remote::NetworkError;

/// Result type alias using tablesync-core's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in tablesync-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// The platform offers no persistent storage; offline features are disabled
    #[error("Local store unavailable: {0}")]
    StoreUnavailable(String),

    /// Remote call failed or returned a non-success status
    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    /// Entity absent from both remote and cached data
    #[error("Not found: {0}")]
    NotFound(String),

    /// Malformed write payload
    #[error("Invalid input: {0}")]
    Validation(String),

    /// libSQL error
    #[error("libSQL error: {0}")]
    LibSql(#[from] libsql::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Whether this error came from the remote side (transport, status, payload).
    pub const fn is_network(&self) -> bool {
        matches!(self, Self::Network(_))
    }
}
