//! Configuration file handling for ~/.gatewatch/config.ini.
//!
//! Loads and saves user configuration with sensible defaults.
//! Settings structs live in [`super::settings`], constants in [`super::defaults`],
//! parsing in [`super::parser`], and serialization in [`super::writer`].

use std::path::{Path, PathBuf};
use std::time::Duration;

use ini::Ini;
use thiserror::Error;

use super::defaults::{ENV_CLIENT_ID, ENV_CLIENT_SECRET};
use super::settings::ConfigFile;

use crate::airport::AirportRegistry;
use crate::cache::CachePolicy;
use crate::opensky::{ClientCredentials, OpenSkyConfig};
use crate::tracking::PollerConfig;

/// Configuration file errors.
#[derive(Debug, Error)]
pub enum ConfigFileError {
    /// Failed to read config file
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] ini::Error),

    /// Failed to write config file
    #[error("Failed to write config file: {0}")]
    WriteError(String),

    /// Invalid configuration value
    #[error("Invalid configuration: {section}.{key} = '{value}' - {reason}")]
    InvalidValue {
        section: String,
        key: String,
        value: String,
        reason: String,
    },

    /// Failed to create config directory
    #[error("Failed to create config directory: {0}")]
    DirectoryError(std::io::Error),
}

impl ConfigFile {
    /// Load configuration from the default path (~/.gatewatch/config.ini).
    pub fn load() -> Result<Self, ConfigFileError> {
        let path = config_file_path();
        Self::load_from(&path)
    }

    /// Load configuration from a specific path.
    ///
    /// If the file doesn't exist, returns defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigFileError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let ini = Ini::load_from_file(path)?;
        super::parser::parse_ini(&ini)
    }

    /// Save configuration to the default path (~/.gatewatch/config.ini).
    pub fn save(&self) -> Result<(), ConfigFileError> {
        let path = config_file_path();
        self.save_to(&path)
    }

    /// Save configuration to a specific path.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigFileError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(ConfigFileError::DirectoryError)?;
        }

        let content = super::writer::to_config_string(self);
        std::fs::write(path, content).map_err(|e| ConfigFileError::WriteError(e.to_string()))
    }

    /// Create the default config file if it doesn't exist.
    ///
    /// Returns the path to the config file.
    pub fn ensure_exists() -> Result<PathBuf, ConfigFileError> {
        let path = config_file_path();
        if !path.exists() {
            let config = Self::default();
            config.save_to(&path)?;
        }
        Ok(path)
    }

    /// Apply `OPENSKY_CLIENT_ID` / `OPENSKY_CLIENT_SECRET` from the environment.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(
            std::env::var(ENV_CLIENT_ID).ok(),
            std::env::var(ENV_CLIENT_SECRET).ok(),
        )
    }

    fn with_overrides(mut self, client_id: Option<String>, client_secret: Option<String>) -> Self {
        if let Some(id) = client_id.filter(|v| !v.trim().is_empty()) {
            self.opensky.client_id = Some(id.trim().to_string());
        }
        if let Some(secret) = client_secret.filter(|v| !v.trim().is_empty()) {
            self.opensky.client_secret = Some(secret.trim().to_string());
        }
        self
    }

    /// Client configuration. Credentials are set only when both halves are present.
    pub fn opensky_config(&self) -> OpenSkyConfig {
        let credentials = match (&self.opensky.client_id, &self.opensky.client_secret) {
            (Some(client_id), Some(client_secret)) => Some(ClientCredentials {
                client_id: client_id.clone(),
                client_secret: client_secret.clone(),
            }),
            _ => None,
        };

        OpenSkyConfig {
            api_url: self.opensky.api_url.clone(),
            token_url: self.opensky.token_url.clone(),
            credentials,
            timeout: Duration::from_secs(self.opensky.timeout_secs),
            landed_max_kts: self.tracking.landed_max_kts,
        }
    }

    pub fn cache_policy(&self) -> CachePolicy {
        CachePolicy {
            ephemeral_ttl: Duration::from_millis(self.cache.ephemeral_ttl_ms),
            fresh_ttl: Duration::from_millis(self.cache.fresh_ttl_ms),
            cooldown: Duration::from_secs(self.cache.cooldown_secs),
            max_cooldown: Duration::from_secs(self.cache.max_cooldown_secs),
            store_timeout: Duration::from_secs(self.cache.store_timeout_secs),
            offline_after: Duration::from_secs(self.tracking.offline_after_secs),
            allowed_prefixes: self.fleet.prefixes.clone(),
        }
    }

    pub fn poller_config(&self) -> PollerConfig {
        PollerConfig {
            interval: Duration::from_secs(self.tracking.poll_interval_secs),
            radius_nm: self.tracking.default_radius_nm,
            record_history: self.tracking.record_history,
        }
    }

    pub fn airport_registry(&self) -> AirportRegistry {
        self.bases.iter().cloned().collect()
    }
}

/// Get the path to the config directory (~/.gatewatch).
pub fn config_directory() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".gatewatch")
}

/// Get the path to the config file (~/.gatewatch/config.ini).
pub fn config_file_path() -> PathBuf {
    config_directory().join("config.ini")
}
