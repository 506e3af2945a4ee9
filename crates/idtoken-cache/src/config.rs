//! Cache configuration
//!
//! Stores non-sensitive configuration in a plain JSON file. A missing file
//! means defaults.

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::error::{CacheError, Result};

/// Environment variable that can switch caching off (`false`/`0`) or on
pub const ENABLED_ENV_VAR: &str = "IDTOKEN_CACHE_ENABLED";

const DEFAULT_SERVICE_NAME: &str = "db-client-id-token";
const DEFAULT_CREDENTIAL_TYPE: &str = "ID_TOKEN";

/// Credential cache configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CacheConfig {
    /// Config file version
    pub version: u32,
    /// Whether id tokens are cached at all
    pub enabled: bool,
    /// Namespace used for keychain entries
    pub service_name: String,
    /// Kind of credential stored, part of the entry name
    pub credential_type: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            version: 1,
            enabled: true,
            service_name: DEFAULT_SERVICE_NAME.to_string(),
            credential_type: DEFAULT_CREDENTIAL_TYPE.to_string(),
        }
    }
}

impl CacheConfig {
    /// Default location of the config file
    pub fn default_path() -> Result<PathBuf> {
        ProjectDirs::from("com", "idtoken-cache", "idtoken-cache")
            .map(|dirs| dirs.config_dir().join("config.json"))
            .ok_or_else(|| CacheError::Config("Could not determine config directory".to_string()))
    }

    /// Load config from file, falling back to defaults when it does not exist
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("No config file found at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)?;
        let config: CacheConfig = serde_json::from_str(&contents)?;
        config.validate()?;
        debug!("Loaded cache config from {:?}", path);
        Ok(config)
    }

    /// Load from the default location with environment overrides applied.
    ///
    /// Any problem reading the file yields the defaults; caching is an
    /// optimization and must not block a connection.
    pub fn load_default() -> Self {
        let config = match Self::default_path().and_then(|path| Self::load(&path)) {
            Ok(config) => config,
            Err(e) => {
                warn!("Could not load cache config, using defaults: {}", e);
                Self::default()
            }
        };
        config.with_env_overrides()
    }

    /// Save config to file
    pub fn save(&self, path: &Path) -> Result<()> {
        self.validate()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = serde_json::to_string_pretty(self)?;

        // Write atomically using temp file
        let temp_path = path.with_extension("tmp");
        std::fs::write(&temp_path, &contents)?;
        std::fs::rename(&temp_path, path)?;

        debug!("Saved cache config to {:?}", path);
        Ok(())
    }

    pub fn with_env_overrides(mut self) -> Self {
        let value = std::env::var(ENABLED_ENV_VAR).ok();
        self.apply_enabled_override(value.as_deref());
        self
    }

    fn apply_enabled_override(&mut self, value: Option<&str>) {
        match value.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
            None | Some("") => {}
            Some("0" | "false" | "no" | "off") => self.enabled = false,
            Some("1" | "true" | "yes" | "on") => self.enabled = true,
            Some(other) => warn!("Ignoring unrecognized {} value '{}'", ENABLED_ENV_VAR, other),
        }
    }

    fn validate(&self) -> Result<()> {
        if self.service_name.trim().is_empty() {
            return Err(CacheError::Config("serviceName must not be empty".to_string()));
        }
        if self.credential_type.trim().is_empty() {
            return Err(CacheError::Config("credentialType must not be empty".to_string()));
        }
        Ok(())
    }
}
