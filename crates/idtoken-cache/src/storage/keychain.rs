//! OS keychain storage backends
//!
//! Uses the system keychain through the `keyring` crate:
//! - macOS: Keychain
//! - Windows: Credential Manager
//! - Linux: Secret Service (GNOME Keyring, KWallet)
//!
//! Each platform gets its own entry naming so tokens written by other
//! clients using the same convention are found.

use keyring::Entry;
use tracing::{debug, info};

use super::StorageBackend;
use crate::config::CacheConfig;
use crate::error::BackendError;
use crate::key::fold_key_part;

/// Account used to check that the native store answers at all
const PROBE_ACCOUNT: &str = "__idtoken_cache_probe__";

/// Platform flavor of a keyring-backed store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    MacKeychain,
    WindowsCredentialManager,
    LinuxSecretService,
}

impl BackendKind {
    pub fn name(&self) -> &'static str {
        match self {
            BackendKind::MacKeychain => "macOS Keychain",
            BackendKind::WindowsCredentialManager => "Windows Credential Manager",
            BackendKind::LinuxSecretService => "Linux Secret Service",
        }
    }

    /// Compute where the token for `(host, user)` lives in the native store.
    ///
    /// Host and user are upper-cased so lookups are case-insensitive.
    pub fn entry_name(
        &self,
        service_name: &str,
        credential_type: &str,
        host: &str,
        user: &str,
    ) -> EntryName {
        let host = fold_key_part(host);
        let user = fold_key_part(user);
        match self {
            BackendKind::MacKeychain => EntryName {
                target: None,
                service: host,
                account: user,
            },
            BackendKind::WindowsCredentialManager => EntryName {
                target: Some(format!(
                    "{}:{}:{}:{}",
                    host,
                    user,
                    service_name.to_uppercase(),
                    credential_type.to_uppercase()
                )),
                service: service_name.to_string(),
                account: user,
            },
            BackendKind::LinuxSecretService => EntryName {
                target: None,
                service: service_name.to_string(),
                account: format!("{}:{}:{}", host, user, credential_type.to_uppercase()),
            },
        }
    }
}

/// Location of one entry in the native store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryName {
    pub target: Option<String>,
    pub service: String,
    pub account: String,
}

/// Keyring-backed storage for one platform
pub struct KeyringBackend {
    kind: BackendKind,
    service_name: String,
    credential_type: String,
}

impl KeyringBackend {
    /// Construct the backend, checking that the native store is reachable.
    ///
    /// Returns [`BackendError::Unavailable`] when the platform store (or the
    /// service providing it) is missing on this system.
    pub fn try_new(kind: BackendKind, config: &CacheConfig) -> Result<Self, BackendError> {
        let backend = Self {
            kind,
            service_name: config.service_name.clone(),
            credential_type: config.credential_type.clone(),
        };

        backend.probe()?;
        debug!("{} is available", kind.name());
        Ok(backend)
    }

    pub fn kind(&self) -> BackendKind {
        self.kind
    }

    fn probe(&self) -> Result<(), BackendError> {
        let entry = Entry::new(&self.service_name, PROBE_ACCOUNT).map_err(map_keyring_error)?;
        match entry.get_password() {
            Ok(_) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => match map_keyring_error(e) {
                BackendError::Failure(reason) => {
                    // reachable, just unhappy with the probe entry
                    info!("{} probe returned: {}", self.kind.name(), reason);
                    Ok(())
                }
                unavailable => Err(unavailable),
            },
        }
    }

    fn entry(&self, host: &str, user: &str) -> Result<Entry, BackendError> {
        let name = self
            .kind
            .entry_name(&self.service_name, &self.credential_type, host, user);
        let entry = match &name.target {
            Some(target) => Entry::new_with_target(target, &name.service, &name.account),
            None => Entry::new(&name.service, &name.account),
        };
        entry.map_err(map_keyring_error)
    }
}

impl StorageBackend for KeyringBackend {
    fn get_credential(&self, host: &str, user: &str) -> Result<Option<String>, BackendError> {
        let entry = self.entry(host, user)?;

        match entry.get_password() {
            Ok(token) => {
                debug!("Retrieved id token from {} for host {}", self.kind.name(), host);
                Ok(Some(token))
            }
            Err(keyring::Error::NoEntry) => {
                debug!("No id token in {} for host {}", self.kind.name(), host);
                Ok(None)
            }
            Err(e) => Err(map_keyring_error(e)),
        }
    }

    fn set_credential(&self, host: &str, user: &str, token: &str) -> Result<(), BackendError> {
        let entry = self.entry(host, user)?;
        entry.set_password(token).map_err(map_keyring_error)?;

        debug!("Stored id token in {} for host {}", self.kind.name(), host);
        Ok(())
    }

    fn delete_credential(&self, host: &str, user: &str) -> Result<(), BackendError> {
        let entry = self.entry(host, user)?;

        match entry.delete_password() {
            Ok(()) => {
                debug!("Deleted id token from {} for host {}", self.kind.name(), host);
                Ok(())
            }
            Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(map_keyring_error(e)),
        }
    }

    fn backend_name(&self) -> &'static str {
        self.kind.name()
    }
}

/// Split keyring errors into "store missing" and "store refused"
fn map_keyring_error(e: keyring::Error) -> BackendError {
    match e {
        keyring::Error::PlatformFailure(inner) => BackendError::Unavailable(inner.to_string()),
        keyring::Error::NoStorageAccess(inner) => BackendError::Unavailable(inner.to_string()),
        other => BackendError::Failure(other.to_string()),
    }
}
