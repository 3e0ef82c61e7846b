//! Configuration for the OpenSky client.

use std::time::Duration;

use crate::aircraft::DEFAULT_LANDED_MAX_KTS;

/// Base URL of the OpenSky REST API.
pub const DEFAULT_API_URL: &str = "https://opensky-network.org/api";

/// OpenSky's OAuth2 token endpoint.
pub const DEFAULT_TOKEN_URL: &str =
    "https://auth.opensky-network.org/auth/realms/opensky-network/protocol/openid-connect/token";

/// Default timeout for a single upstream request.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// OAuth2 client-credentials pair.
#[derive(Clone, PartialEq, Eq)]
pub struct ClientCredentials {
    pub client_id: String,
    pub client_secret: String,
}

impl std::fmt::Debug for ClientCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .finish()
    }
}

/// Configuration for [`TelemetryClient`](super::TelemetryClient) and
/// [`TokenManager`](super::TokenManager).
#[derive(Debug, Clone)]
pub struct OpenSkyConfig {
    pub api_url: String,
    pub token_url: String,
    /// `None` means every fetch fails with an auth error.
    pub credentials: Option<ClientCredentials>,
    pub timeout: Duration,
    /// Ground speed at or below which a fetched aircraft counts as landed.
    pub landed_max_kts: f64,
}

impl Default for OpenSkyConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            token_url: DEFAULT_TOKEN_URL.to_string(),
            credentials: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            landed_max_kts: DEFAULT_LANDED_MAX_KTS,
        }
    }
}

impl OpenSkyConfig {
    /// URL of the all-states endpoint.
    pub fn states_url(&self) -> String {
        format!("{}/states/all", self.api_url.trim_end_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = OpenSkyConfig::default();
        assert!(config.credentials.is_none());
        assert_eq!(config.timeout, Duration::from_secs(10));
        assert_eq!(
            config.states_url(),
            "https://opensky-network.org/api/states/all"
        );
    }

    #[test]
    fn test_states_url_trims_trailing_slash() {
        let config = OpenSkyConfig {
            api_url: "http://localhost:9000/api/".to_string(),
            ..Default::default()
        };
        assert_eq!(config.states_url(), "http://localhost:9000/api/states/all");
    }

    #[test]
    fn test_credentials_debug_redacts_secret() {
        let creds = ClientCredentials {
            client_id: "ramp".to_string(),
            client_secret: "hunter2".to_string(),
        };
        let printed = format!("{creds:?}");
        assert!(printed.contains("ramp"));
        assert!(!printed.contains("hunter2"));
    }
}
