//! Error types for idtoken-cache

use thiserror::Error;

/// Result type alias for credential cache operations
pub type Result<T> = std::result::Result<T, CacheError>;

/// Errors that can cross the credential cache boundary.
///
/// Only [`CacheError::InvalidServerUrl`] is produced by the cache operations
/// themselves. Backend unavailability is absorbed inside the facade and
/// reported as absence.
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Internal error: invalid server url for retrieving host name: {0}")]
    InvalidServerUrl(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CacheError {
    /// Whether this error signals a programming or configuration defect
    /// rather than an environment problem.
    pub fn is_internal(&self) -> bool {
        matches!(self, CacheError::InvalidServerUrl(_))
    }
}

/// Errors raised by a [`StorageBackend`](crate::storage::StorageBackend).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    /// The native secure-storage facility cannot be reached on this system.
    #[error("Secure storage unavailable: {0}")]
    Unavailable(String),

    /// The store was reachable but rejected the operation.
    #[error("Secure storage failure: {0}")]
    Failure(String),
}

impl BackendError {
    pub fn is_unavailable(&self) -> bool {
        matches!(self, BackendError::Unavailable(_))
    }
}
