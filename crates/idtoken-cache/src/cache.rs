//! Credential cache facade
//!
//! [`CredentialCache`] is the one access point connection code uses to reuse
//! id tokens. It owns the backend chosen at construction and serializes every
//! operation behind a single lock. When no backend could be opened the cache
//! is inert: reads report absence and writes do nothing.

use std::sync::{Mutex, MutexGuard, OnceLock, PoisonError};
use tracing::{debug, info, warn};

use crate::config::CacheConfig;
use crate::error::{BackendError, Result};
use crate::key::CredentialKey;
use crate::login::{IdToken, LoginInput, LoginOutput};
use crate::storage::{select_backend, Platform, StorageBackend};

/// Whether the cache has a backend attached
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheState {
    /// A secure storage backend is attached
    Active,
    /// No backend; every operation is a no-op
    Inert,
}

/// Why an inert cache has no backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InertReason {
    /// Caching was switched off in the configuration
    Disabled,
    /// No secure storage could be opened on this system
    Unavailable,
}

/// Thread-safe id token cache over one storage backend
pub struct CredentialCache {
    backend: Option<Box<dyn StorageBackend>>,
    inert_reason: InertReason,
    lock: Mutex<()>,
}

impl CredentialCache {
    /// Create a cache for the running platform
    pub fn new(config: &CacheConfig) -> Self {
        Self::for_platform(&Platform::current(), config)
    }

    /// Create a cache, selecting the backend for `platform`
    pub fn for_platform(platform: &Platform, config: &CacheConfig) -> Self {
        let cache = Self::from_selected(select_backend(platform, config));
        if config.enabled {
            cache
        } else {
            Self {
                inert_reason: InertReason::Disabled,
                ..cache
            }
        }
    }

    /// Create a cache over an explicit backend
    pub fn with_backend(backend: impl StorageBackend + 'static) -> Self {
        Self::from_selected(Some(Box::new(backend)))
    }

    /// Create a cache with no backend
    pub fn inert() -> Self {
        Self::from_selected(None)
    }

    fn from_selected(backend: Option<Box<dyn StorageBackend>>) -> Self {
        Self {
            backend,
            inert_reason: InertReason::Unavailable,
            lock: Mutex::new(()),
        }
    }

    /// Process-wide cache, constructed on first use from the default config
    pub fn global() -> &'static CredentialCache {
        static GLOBAL: CacheSlot = CacheSlot::new();
        GLOBAL.get_or_init(|| CredentialCache::new(&CacheConfig::load_default()))
    }

    pub fn state(&self) -> CacheState {
        if self.backend.is_some() {
            CacheState::Active
        } else {
            CacheState::Inert
        }
    }

    /// Why the cache is inert, or `None` when a backend is attached
    pub fn inert_reason(&self) -> Option<InertReason> {
        match self.state() {
            CacheState::Active => None,
            CacheState::Inert => Some(self.inert_reason),
        }
    }

    /// Name of the attached backend, if any
    pub fn backend_name(&self) -> Option<&'static str> {
        self.backend.as_deref().map(|b| b.backend_name())
    }

    /// Look up the cached token for `user` at `server_url`.
    ///
    /// `Ok(None)` covers every kind of absence: inert cache, no entry, an
    /// empty stored value, or a store that stopped answering. A malformed
    /// URL is an error.
    pub fn get(&self, server_url: &str, user: &str) -> Result<Option<IdToken>> {
        let key = CredentialKey::from_server_url(server_url, user)?;
        Ok(self.active_backend().and_then(|backend| self.read(backend, &key)))
    }

    /// Cache `token` for `user` at `server_url`. Empty tokens are never written.
    pub fn set(&self, server_url: &str, user: &str, token: &IdToken) -> Result<()> {
        let key = CredentialKey::from_server_url(server_url, user)?;
        if let Some(backend) = self.active_backend() {
            self.write(backend, &key, token);
        }
        Ok(())
    }

    /// Remove the cached token for an already-normalized `host`
    pub fn delete(&self, host: &str, user: &str) {
        let Some(backend) = self.active_backend() else {
            return;
        };

        let _guard = self.guard();
        if let Err(e) = backend.delete_credential(host, user) {
            log_backend_error("delete", &e);
        }
    }

    /// Attach the cached token to `input`.
    ///
    /// When the cache is active the token field is replaced with the lookup
    /// result, which may be `None`. When inert, `input` is left untouched.
    pub fn fill_cached_id_token(&self, input: &mut LoginInput) -> Result<()> {
        let key = CredentialKey::from_server_url(&input.server_url, &input.user_name)?;
        let Some(backend) = self.active_backend() else {
            return Ok(());
        };

        input.id_token = self.read(backend, &key);
        Ok(())
    }

    /// Store the token returned by a successful login
    pub fn write_temporary_credential(&self, input: &LoginInput, output: &LoginOutput) -> Result<()> {
        let key = CredentialKey::from_server_url(&input.server_url, &input.user_name)?;
        let Some(backend) = self.active_backend() else {
            return Ok(());
        };

        match &output.id_token {
            Some(token) => self.write(backend, &key, token),
            None => debug!("No id token is given"),
        }
        Ok(())
    }

    /// Drop the cached token, e.g. after the server rejected it
    pub fn delete_id_token_cache(&self, host: &str, user: &str) {
        self.delete(host, user);
    }

    fn active_backend(&self) -> Option<&dyn StorageBackend> {
        let backend = self.backend.as_deref();
        if backend.is_none() {
            match self.inert_reason {
                InertReason::Disabled => {
                    debug!("Id token caching is disabled by configuration")
                }
                InertReason::Unavailable => info!(
                    "Secure local storage is not available. Fall back to normal authentication."
                ),
            }
        }
        backend
    }

    fn read(&self, backend: &dyn StorageBackend, key: &CredentialKey) -> Option<IdToken> {
        let _guard = self.guard();
        match backend.get_credential(&key.host, &key.user) {
            Ok(Some(token)) if !token.is_empty() => Some(IdToken::new(token)),
            Ok(Some(_)) => {
                debug!("Retrieved id token is empty");
                None
            }
            Ok(None) => {
                debug!("No id token cached for host {}", key.host);
                None
            }
            Err(e) => {
                log_backend_error("read", &e);
                None
            }
        }
    }

    fn write(&self, backend: &dyn StorageBackend, key: &CredentialKey, token: &IdToken) {
        if token.is_empty() {
            debug!("No id token is given");
            return;
        }

        let _guard = self.guard();
        if let Err(e) = backend.set_credential(&key.host, &key.user, token.expose()) {
            log_backend_error("write", &e);
        }
    }

    fn guard(&self) -> MutexGuard<'_, ()> {
        // The lock protects no data of its own, so a poisoned guard is still usable
        self.lock.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for CredentialCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialCache")
            .field("state", &self.state())
            .field("inert_reason", &self.inert_reason())
            .field("backend", &self.backend_name())
            .finish()
    }
}

fn log_backend_error(operation: &str, e: &BackendError) {
    match e {
        BackendError::Unavailable(reason) => info!(
            "Secure local storage unavailable during {} ({}). Fall back to normal authentication.",
            operation, reason
        ),
        BackendError::Failure(reason) => {
            warn!("Secure local storage {} failed: {}", operation, reason)
        }
    }
}

/// One-shot holder for a lazily constructed [`CredentialCache`].
///
/// The first caller builds the cache; everyone else gets the same instance
/// after a single atomic check.
#[derive(Default)]
pub struct CacheSlot {
    cell: OnceLock<CredentialCache>,
}

impl CacheSlot {
    pub const fn new() -> Self {
        Self {
            cell: OnceLock::new(),
        }
    }

    /// Get the cache, building it with `init` if this is the first access
    pub fn get_or_init<F>(&self, init: F) -> &CredentialCache
    where
        F: FnOnce() -> CredentialCache,
    {
        self.cell.get_or_init(init)
    }

    /// Get the cache, detecting the platform backend on first access
    pub fn get_or_detect(&self, config: &CacheConfig) -> &CredentialCache {
        self.get_or_init(|| CredentialCache::new(config))
    }

    /// The cache, if it has been constructed
    pub fn get(&self) -> Option<&CredentialCache> {
        self.cell.get()
    }
}
