//! Default values and constants for all configuration settings.
//!
//! Contains all `DEFAULT_*` constants and the `ConfigFile::default()`
//! implementation.

use super::file::config_directory;
use super::settings::*;
use crate::aircraft::DEFAULT_LANDED_MAX_KTS;
use crate::airport::AirportRegistry;
use crate::cache::{
    DEFAULT_COOLDOWN, DEFAULT_EPHEMERAL_TTL, DEFAULT_FLEET_PREFIXES, DEFAULT_FRESH_TTL,
    DEFAULT_MAX_COOLDOWN, DEFAULT_OFFLINE_AFTER, DEFAULT_STORE_TIMEOUT,
};
use crate::opensky::{DEFAULT_API_URL, DEFAULT_TIMEOUT_SECS, DEFAULT_TOKEN_URL};
use crate::tracking::{DEFAULT_POLL_INTERVAL, DEFAULT_POLL_RADIUS_NM};

/// Default HTTP listen address.
pub const DEFAULT_SERVER_BIND: &str = "127.0.0.1:8080";

/// Default log file name inside the config directory.
pub const DEFAULT_LOG_FILE_NAME: &str = "gatewatch.log";

/// Environment variable overriding `[opensky] client_id`.
pub const ENV_CLIENT_ID: &str = "OPENSKY_CLIENT_ID";

/// Environment variable overriding `[opensky] client_secret`.
pub const ENV_CLIENT_SECRET: &str = "OPENSKY_CLIENT_SECRET";

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            opensky: OpenSkySettings {
                api_url: DEFAULT_API_URL.to_string(),
                token_url: DEFAULT_TOKEN_URL.to_string(),
                client_id: None,
                client_secret: None,
                timeout_secs: DEFAULT_TIMEOUT_SECS,
            },
            cache: CacheSettings {
                ephemeral_ttl_ms: DEFAULT_EPHEMERAL_TTL.as_millis() as u64,
                fresh_ttl_ms: DEFAULT_FRESH_TTL.as_millis() as u64,
                cooldown_secs: DEFAULT_COOLDOWN.as_secs(),
                max_cooldown_secs: DEFAULT_MAX_COOLDOWN.as_secs(),
                store_timeout_secs: DEFAULT_STORE_TIMEOUT.as_secs(),
                directory: None,
            },
            fleet: FleetSettings {
                prefixes: DEFAULT_FLEET_PREFIXES.iter().map(|p| p.to_string()).collect(),
            },
            tracking: TrackingSettings {
                offline_after_secs: DEFAULT_OFFLINE_AFTER.as_secs(),
                landed_max_kts: DEFAULT_LANDED_MAX_KTS,
                poll_interval_secs: DEFAULT_POLL_INTERVAL.as_secs(),
                default_radius_nm: DEFAULT_POLL_RADIUS_NM,
                record_history: false,
            },
            layout: LayoutSettings {
                directory: config_directory().join("layouts"),
            },
            server: ServerSettings {
                bind: DEFAULT_SERVER_BIND.to_string(),
            },
            bases: AirportRegistry::with_defaults().iter().cloned().collect(),
            logging: LoggingSettings {
                file: config_directory().join(DEFAULT_LOG_FILE_NAME),
            },
        }
    }
}
