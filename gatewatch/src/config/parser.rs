//! INI parsing logic for converting `Ini` → `ConfigFile`.
//!
//! This module contains the `parse_ini()` function and its helpers.
//! It is the single place where INI key names are mapped to struct fields.

use std::net::SocketAddr;
use std::path::PathBuf;

use ini::Ini;

use super::file::ConfigFileError;
use super::settings::ConfigFile;
use crate::airport::AirportBase;
use crate::cache::validate_radius;

/// Parse an `Ini` object into a `ConfigFile`.
///
/// Starts from `ConfigFile::default()` and overlays any values found in the INI.
pub(super) fn parse_ini(ini: &Ini) -> Result<ConfigFile, ConfigFileError> {
    let mut config = ConfigFile::default();

    // [opensky] section
    if let Some(section) = ini.section(Some("opensky")) {
        if let Some(v) = non_empty(section.get("api_url")) {
            config.opensky.api_url = v.to_string();
        }
        if let Some(v) = non_empty(section.get("token_url")) {
            config.opensky.token_url = v.to_string();
        }
        if let Some(v) = non_empty(section.get("client_id")) {
            config.opensky.client_id = Some(v.to_string());
        }
        if let Some(v) = non_empty(section.get("client_secret")) {
            config.opensky.client_secret = Some(v.to_string());
        }
        if let Some(v) = section.get("timeout_secs") {
            config.opensky.timeout_secs = parse_positive("opensky", "timeout_secs", v)?;
        }
    }

    // [cache] section
    if let Some(section) = ini.section(Some("cache")) {
        if let Some(v) = section.get("ephemeral_ttl_ms") {
            config.cache.ephemeral_ttl_ms = parse_positive("cache", "ephemeral_ttl_ms", v)?;
        }
        if let Some(v) = section.get("fresh_ttl_ms") {
            config.cache.fresh_ttl_ms = parse_positive("cache", "fresh_ttl_ms", v)?;
        }
        if let Some(v) = section.get("cooldown_secs") {
            config.cache.cooldown_secs = parse_positive("cache", "cooldown_secs", v)?;
        }
        if let Some(v) = section.get("max_cooldown_secs") {
            config.cache.max_cooldown_secs = parse_positive("cache", "max_cooldown_secs", v)?;
        }
        if let Some(v) = section.get("store_timeout_secs") {
            config.cache.store_timeout_secs = parse_positive("cache", "store_timeout_secs", v)?;
        }
        if let Some(v) = non_empty(section.get("directory")) {
            config.cache.directory = Some(expand_tilde(v));
        }
    }

    if config.cache.max_cooldown_secs < config.cache.cooldown_secs {
        return Err(ConfigFileError::InvalidValue {
            section: "cache".to_string(),
            key: "max_cooldown_secs".to_string(),
            value: config.cache.max_cooldown_secs.to_string(),
            reason: format!(
                "must be at least cooldown_secs ({})",
                config.cache.cooldown_secs
            ),
        });
    }

    // [fleet] section
    if let Some(section) = ini.section(Some("fleet")) {
        if let Some(v) = section.get("prefixes") {
            let prefixes: Vec<String> = v
                .split(',')
                .map(|p| p.trim().to_uppercase())
                .filter(|p| !p.is_empty())
                .collect();
            if prefixes.is_empty() {
                return Err(ConfigFileError::InvalidValue {
                    section: "fleet".to_string(),
                    key: "prefixes".to_string(),
                    value: v.to_string(),
                    reason: "at least one callsign prefix is required".to_string(),
                });
            }
            config.fleet.prefixes = prefixes;
        }
    }

    // [tracking] section
    if let Some(section) = ini.section(Some("tracking")) {
        if let Some(v) = section.get("offline_after_secs") {
            config.tracking.offline_after_secs =
                parse_positive("tracking", "offline_after_secs", v)?;
        }
        if let Some(v) = section.get("landed_max_kts") {
            let kts: f64 = v.trim().parse().unwrap_or(f64::NAN);
            if !kts.is_finite() || kts < 0.0 {
                return Err(ConfigFileError::InvalidValue {
                    section: "tracking".to_string(),
                    key: "landed_max_kts".to_string(),
                    value: v.to_string(),
                    reason: "must be a non-negative number of knots".to_string(),
                });
            }
            config.tracking.landed_max_kts = kts;
        }
        if let Some(v) = section.get("poll_interval_secs") {
            config.tracking.poll_interval_secs =
                parse_positive("tracking", "poll_interval_secs", v)?;
        }
        if let Some(v) = section.get("default_radius_nm") {
            let radius: f64 = v.trim().parse().unwrap_or(f64::NAN);
            config.tracking.default_radius_nm =
                validate_radius(radius).map_err(|e| ConfigFileError::InvalidValue {
                    section: "tracking".to_string(),
                    key: "default_radius_nm".to_string(),
                    value: v.to_string(),
                    reason: e.to_string(),
                })?;
        }
        if let Some(v) = section.get("record_history") {
            config.tracking.record_history = parse_bool(v);
        }
    }

    // [layout] section
    if let Some(section) = ini.section(Some("layout")) {
        if let Some(v) = non_empty(section.get("directory")) {
            config.layout.directory = expand_tilde(v);
        }
    }

    // [server] section
    if let Some(section) = ini.section(Some("server")) {
        if let Some(v) = section.get("bind") {
            let v = v.trim();
            if v.parse::<SocketAddr>().is_err() {
                return Err(ConfigFileError::InvalidValue {
                    section: "server".to_string(),
                    key: "bind".to_string(),
                    value: v.to_string(),
                    reason: "expected host:port, e.g. 127.0.0.1:8080".to_string(),
                });
            }
            config.server.bind = v.to_string();
        }
    }

    // [bases] section replaces the built-in list when it has entries
    if let Some(section) = ini.section(Some("bases")) {
        let mut bases = Vec::new();
        for (code, value) in section.iter() {
            let base =
                AirportBase::parse_entry(code, value).map_err(|e| ConfigFileError::InvalidValue {
                    section: "bases".to_string(),
                    key: code.to_string(),
                    value: value.to_string(),
                    reason: e.to_string(),
                })?;
            bases.push(base);
        }
        if !bases.is_empty() {
            config.bases = bases;
        }
    }

    // [logging] section
    if let Some(section) = ini.section(Some("logging")) {
        if let Some(v) = non_empty(section.get("file")) {
            config.logging.file = expand_tilde(v);
        }
    }

    Ok(config)
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn parse_positive(section: &str, key: &str, value: &str) -> Result<u64, ConfigFileError> {
    match value.trim().parse::<u64>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(ConfigFileError::InvalidValue {
            section: section.to_string(),
            key: key.to_string(),
            value: value.to_string(),
            reason: "must be a positive integer".to_string(),
        }),
    }
}

/// Parse a boolean value from a config string.
/// Accepts: true/false, yes/no, 1/0, on/off (case-insensitive)
pub(super) fn parse_bool(value: &str) -> bool {
    let v = value.trim().to_lowercase();
    v == "true" || v == "1" || v == "yes" || v == "on"
}

/// Expand ~ to home directory in paths.
pub(super) fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}
