//! Storage trait definitions

use crate::error::BackendError;

/// Trait for secure storage backends holding id tokens keyed by (host, user)
pub trait StorageBackend: Send + Sync {
    /// Retrieve the token stored for `(host, user)`.
    ///
    /// A missing entry is `Ok(None)`, never an error.
    fn get_credential(&self, host: &str, user: &str) -> Result<Option<String>, BackendError>;

    /// Store a token, overwriting any existing mapping
    fn set_credential(&self, host: &str, user: &str, token: &str) -> Result<(), BackendError>;

    /// Remove a mapping; succeeds if it does not exist
    fn delete_credential(&self, host: &str, user: &str) -> Result<(), BackendError>;

    /// Get a human-readable name for this storage backend
    fn backend_name(&self) -> &'static str;
}
