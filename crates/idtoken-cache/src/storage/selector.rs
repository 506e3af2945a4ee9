//! Backend selection for the running platform

use tracing::{info, warn};

use super::{BackendKind, KeyringBackend, StorageBackend};
use crate::config::CacheConfig;
use crate::error::BackendError;

/// Operating system family the process runs on
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Platform {
    MacOs,
    Windows,
    Linux,
    Other(String),
}

impl Platform {
    /// Detect the platform this binary was built for
    pub fn current() -> Self {
        Self::from_os(std::env::consts::OS)
    }

    pub fn from_os(os: &str) -> Self {
        match os {
            "macos" => Platform::MacOs,
            "windows" => Platform::Windows,
            "linux" => Platform::Linux,
            other => Platform::Other(other.to_string()),
        }
    }

    /// Keyring flavor matching this platform, if it has one
    pub fn backend_kind(&self) -> Option<BackendKind> {
        match self {
            Platform::MacOs => Some(BackendKind::MacKeychain),
            Platform::Windows => Some(BackendKind::WindowsCredentialManager),
            Platform::Linux => Some(BackendKind::LinuxSecretService),
            Platform::Other(_) => None,
        }
    }
}

/// Pick and construct the storage backend for `platform`.
///
/// Returns `None` when the platform is unsupported, caching is disabled, or
/// the native store is missing. None of these are errors for the caller.
pub fn select_backend(platform: &Platform, config: &CacheConfig) -> Option<Box<dyn StorageBackend>> {
    if !config.enabled {
        info!("Id token caching is disabled by configuration");
        return None;
    }

    let Some(kind) = platform.backend_kind() else {
        warn!(
            "Unsupported operating system {:?} for secure local storage. Expected: macOS, Windows, Linux",
            platform
        );
        return None;
    };

    try_construct_backend(kind, config, KeyringBackend::try_new)
}

/// Run a backend constructor, turning a missing native dependency into `None`
pub fn try_construct_backend<B, F>(
    kind: BackendKind,
    config: &CacheConfig,
    construct: F,
) -> Option<Box<dyn StorageBackend>>
where
    B: StorageBackend + 'static,
    F: FnOnce(BackendKind, &CacheConfig) -> Result<B, BackendError>,
{
    match construct(kind, config) {
        Ok(backend) => {
            info!("Using {} for id token caching", kind.name());
            Some(Box::new(backend))
        }
        Err(BackendError::Unavailable(reason)) => {
            info!(
                "{} is required for secure local storage but is not available ({}). Falling back to normal authentication.",
                kind.name(),
                reason
            );
            None
        }
        Err(e) => {
            warn!("Failed to open {}: {}. Id token caching disabled.", kind.name(), e);
            None
        }
    }
}
