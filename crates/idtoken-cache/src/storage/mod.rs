//! Storage backends for id token persistence
//!
//! This module provides:
//! 1. OS keychain backends (one naming scheme per platform)
//! 2. An in-memory backend
//! 3. Selection of the backend matching the running platform

mod keychain;
mod memory;
mod selector;
mod traits;

pub use keychain::{BackendKind, EntryName, KeyringBackend};
pub use memory::InMemoryBackend;
pub use selector::{select_backend, try_construct_backend, Platform};
pub use traits::StorageBackend;
