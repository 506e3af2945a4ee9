//! In-process storage backend
//!
//! Keeps tokens in a map for the life of the backend. Used by tests and by
//! hosts that want caching without touching the OS store. Keys are
//! case-folded the same way the keychain backends fold entry names.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use super::StorageBackend;
use crate::error::BackendError;
use crate::key::fold_key_part;

#[derive(Default)]
pub struct InMemoryBackend {
    entries: Mutex<HashMap<(String, String), String>>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn map_key(host: &str, user: &str) -> (String, String) {
    (fold_key_part(host), fold_key_part(user))
}

impl StorageBackend for InMemoryBackend {
    fn get_credential(&self, host: &str, user: &str) -> Result<Option<String>, BackendError> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.get(&map_key(host, user)).cloned())
    }

    fn set_credential(&self, host: &str, user: &str, token: &str) -> Result<(), BackendError> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(map_key(host, user), token.to_string());
        Ok(())
    }

    fn delete_credential(&self, host: &str, user: &str) -> Result<(), BackendError> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&map_key(host, user));
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "In-memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_and_get() {
        let backend = InMemoryBackend::new();
        backend.set_credential("acct.example.com", "alice", "t1").unwrap();
        assert_eq!(
            backend.get_credential("acct.example.com", "alice").unwrap(),
            Some("t1".to_string())
        );
        assert_eq!(backend.get_credential("acct.example.com", "bob").unwrap(), None);
    }

    #[test]
    fn test_set_overwrites() {
        let backend = InMemoryBackend::new();
        backend.set_credential("h", "u", "old").unwrap();
        backend.set_credential("h", "u", "new").unwrap();
        assert_eq!(backend.get_credential("h", "u").unwrap(), Some("new".to_string()));
        assert_eq!(backend.len(), 1);
    }

    #[test]
    fn test_keys_are_case_insensitive() {
        let backend = InMemoryBackend::new();
        backend.set_credential("acct.example.com", "Alice", "t1").unwrap();
        assert_eq!(
            backend.get_credential("ACCT.example.com", "alice").unwrap(),
            Some("t1".to_string())
        );

        backend.delete_credential("ACCT.EXAMPLE.COM", "ALICE").unwrap();
        assert!(backend.is_empty());
    }

    #[test]
    fn test_delete_missing_is_ok() {
        let backend = InMemoryBackend::new();
        backend.delete_credential("h", "u").unwrap();
        assert!(backend.is_empty());
    }
}
