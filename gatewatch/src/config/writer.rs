//! INI serialization logic for converting `ConfigFile` → INI string.
//!
//! This module contains the `to_config_string()` function that produces
//! the commented INI representation written to `config.ini`.

use std::path::Path;

use super::settings::ConfigFile;

/// Convert a `ConfigFile` to a commented INI string for saving.
pub(super) fn to_config_string(config: &ConfigFile) -> String {
    let client_id = config.opensky.client_id.as_deref().unwrap_or("");
    let client_secret = config.opensky.client_secret.as_deref().unwrap_or("");
    let cache_directory = config
        .cache
        .directory
        .as_ref()
        .map(|p| path_to_string(p))
        .unwrap_or_default();
    let bases: String = config
        .bases
        .iter()
        .map(|base| format!("{} = {}\n", base.code, base.to_entry()))
        .collect();

    format!(
        r#"[opensky]
; OpenSky REST API base URL
api_url = {}
; OAuth2 token endpoint
token_url = {}
; OAuth2 client credentials. OPENSKY_CLIENT_ID and OPENSKY_CLIENT_SECRET
; in the environment take precedence over these values.
client_id = {}
client_secret = {}
; Per-request timeout in seconds
timeout_secs = {}

[cache]
; In-process cache lifetime in milliseconds
ephemeral_ttl_ms = {}
; Age in milliseconds under which a stored result is served without refetching
fresh_ttl_ms = {}
; Base upstream cooldown after a failure, doubled per consecutive failure
cooldown_secs = {}
; Ceiling for the doubled cooldown
max_cooldown_secs = {}
; Timeout for a single durable store operation
store_timeout_secs = {}
; Durable store directory. Leave empty to keep the durable tier in memory.
directory = {}

[fleet]
; Comma-separated callsign prefixes to report
prefixes = {}

[tracking]
; Seconds without contact before an aircraft is reported offline
offline_after_secs = {}
; Ground speed in knots at or below which an aircraft is reported landed
landed_max_kts = {}
; Background poll interval per base
poll_interval_secs = {}
; Radius used by pollers and by requests that omit radiusNm
default_radius_nm = {}
; Record latest state and track points for every live result
record_history = {}

[layout]
; Directory holding BASE.json airport layouts (gates, runways, taxi graph)
directory = {}

[server]
; HTTP listen address
bind = {}

[bases]
; CODE = ICAO,latitude,longitude
; Any entry here replaces the built-in list.
{}
[logging]
; Log file location
file = {}
"#,
        config.opensky.api_url,
        config.opensky.token_url,
        client_id,
        client_secret,
        config.opensky.timeout_secs,
        config.cache.ephemeral_ttl_ms,
        config.cache.fresh_ttl_ms,
        config.cache.cooldown_secs,
        config.cache.max_cooldown_secs,
        config.cache.store_timeout_secs,
        cache_directory,
        config.fleet.prefixes.join(","),
        config.tracking.offline_after_secs,
        config.tracking.landed_max_kts,
        config.tracking.poll_interval_secs,
        config.tracking.default_radius_nm,
        config.tracking.record_history,
        path_to_string(&config.layout.directory),
        config.server.bind,
        bases,
        path_to_string(&config.logging.file),
    )
}

/// Convert path to string, collapsing home dir to ~.
fn path_to_string(path: &Path) -> String {
    if let Some(home) = dirs::home_dir() {
        if let Ok(stripped) = path.strip_prefix(&home) {
            return format!("~/{}", stripped.display());
        }
    }
    path.display().to_string()
}
