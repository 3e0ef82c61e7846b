//! Settings structs for all configuration sections.
//!
//! Each struct represents one `[section]` of the INI config file.
//! These are pure data types with no parsing or serialization logic.

use std::path::PathBuf;

use crate::airport::AirportBase;

/// Complete application configuration loaded from config.ini.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigFile {
    /// OpenSky API and OAuth settings
    pub opensky: OpenSkySettings,
    /// Cache tiers and backoff
    pub cache: CacheSettings,
    /// Callsign allow-list
    pub fleet: FleetSettings,
    /// Background polling and aircraft status
    pub tracking: TrackingSettings,
    /// Airport layout files
    pub layout: LayoutSettings,
    /// HTTP API
    pub server: ServerSettings,
    /// Tracked bases, in file order
    pub bases: Vec<AirportBase>,
    /// Logging settings
    pub logging: LoggingSettings,
}

/// OpenSky configuration.
#[derive(Clone, PartialEq)]
pub struct OpenSkySettings {
    pub api_url: String,
    pub token_url: String,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl std::fmt::Debug for OpenSkySettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenSkySettings")
            .field("api_url", &self.api_url)
            .field("token_url", &self.token_url)
            .field("client_id", &self.client_id)
            .field("client_secret", &self.client_secret.as_ref().map(|_| "<redacted>"))
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// Cache configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheSettings {
    pub ephemeral_ttl_ms: u64,
    pub fresh_ttl_ms: u64,
    pub cooldown_secs: u64,
    pub max_cooldown_secs: u64,
    pub store_timeout_secs: u64,
    /// Durable store directory. `None` keeps the durable tier in memory.
    pub directory: Option<PathBuf>,
}

/// Fleet configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct FleetSettings {
    /// Callsign prefixes to keep, uppercase
    pub prefixes: Vec<String>,
}

/// Tracking configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackingSettings {
    /// Silence after which an aircraft is reported offline
    pub offline_after_secs: u64,
    /// Ground speed at or below which an aircraft is reported landed
    pub landed_max_kts: f64,
    pub poll_interval_secs: u64,
    /// Radius used by pollers and by requests that omit one
    pub default_radius_nm: f64,
    /// Record latest state and track points for live results
    pub record_history: bool,
}

/// Layout configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutSettings {
    /// Directory holding `{BASE}.json` layout files
    pub directory: PathBuf,
}

/// HTTP server configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerSettings {
    /// Listen address, `host:port`
    pub bind: String,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct LoggingSettings {
    /// Log file path
    pub file: PathBuf,
}
