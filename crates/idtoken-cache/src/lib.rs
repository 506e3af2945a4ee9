//! # idtoken-cache
//!
//! Caches short-lived id tokens for a database client so reconnects can skip
//! interactive authentication:
//! - OS keychain storage (macOS Keychain, Windows Credential Manager, Linux Secret Service)
//! - Backend selection for the running platform, with an inert fallback
//! - Thread-safe facade keyed by (host, user)
//! - Id tokens zeroed on drop and redacted from logs

pub mod cache;
pub mod config;
pub mod error;
pub mod key;
pub mod login;
pub mod storage;

pub use cache::{CacheSlot, CacheState, CredentialCache, InertReason};
pub use config::CacheConfig;
pub use error::{BackendError, CacheError, Result};
pub use key::{extract_host, CredentialKey};
pub use login::{IdToken, LoginInput, LoginOutput};
pub use storage::{InMemoryBackend, KeyringBackend, Platform, StorageBackend};
