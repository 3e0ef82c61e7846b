//! OAuth2 client-credentials token lifecycle.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Deserialize;
use tracing::{debug, info, warn};

use super::config::OpenSkyConfig;
use super::error::TelemetryError;
use super::http::{HttpTransport, TransportError};
use crate::time::{add_duration, Clock};

/// Tokens are treated as expired this long before the server says so.
const EXPIRY_MARGIN_SECS: u64 = 60;

/// Shortest lifetime we will cache a token for.
const MIN_TOKEN_TTL_SECS: u64 = 60;

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
}

#[derive(Debug, Clone)]
struct CachedToken {
    token: String,
    expires_at: DateTime<Utc>,
}

/// Produces bearer tokens for the OpenSky API, refreshing only when needed.
///
/// The cached token is shared per process. Two callers racing on an empty
/// cache may both run the exchange; the last one to finish wins.
pub struct TokenManager<T: HttpTransport> {
    transport: Arc<T>,
    config: OpenSkyConfig,
    clock: Arc<dyn Clock>,
    cached: Mutex<Option<CachedToken>>,
}

impl<T: HttpTransport> TokenManager<T> {
    pub fn new(transport: Arc<T>, config: OpenSkyConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            transport,
            config,
            clock,
            cached: Mutex::new(None),
        }
    }

    /// Return a valid bearer token.
    ///
    /// The cached token is reused unless `force_refresh` is set or it has
    /// expired. There is no retry here; a failed exchange is returned as
    /// [`TelemetryError::Auth`].
    pub async fn get_token(&self, force_refresh: bool) -> Result<String, TelemetryError> {
        let now = self.clock.now();

        if !force_refresh {
            if let Some(cached) = self.cached.lock().as_ref() {
                if now < cached.expires_at {
                    return Ok(cached.token.clone());
                }
            }
        }

        let fresh = self.exchange().await?;
        let token = fresh.token.clone();
        *self.cached.lock() = Some(fresh);
        Ok(token)
    }

    /// Drop the cached token.
    pub fn invalidate(&self) {
        *self.cached.lock() = None;
    }

    /// Expiry of the cached token, if any.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.cached.lock().as_ref().map(|c| c.expires_at)
    }

    async fn exchange(&self) -> Result<CachedToken, TelemetryError> {
        let Some(credentials) = &self.config.credentials else {
            warn!("OpenSky credentials are not configured");
            return Err(TelemetryError::Auth {
                status: None,
                body: "missing client credentials".to_string(),
            });
        };

        let form = [
            ("grant_type", "client_credentials"),
            ("client_id", credentials.client_id.as_str()),
            ("client_secret", credentials.client_secret.as_str()),
        ];

        let response = self
            .transport
            .post_form(&self.config.token_url, &form, self.config.timeout)
            .await
            .map_err(|e| match e {
                TransportError::Timeout => TelemetryError::Auth {
                    status: None,
                    body: "token request timed out".to_string(),
                },
                TransportError::Connection(msg) => TelemetryError::auth(None, msg.as_bytes()),
            })?;

        if !response.is_success() {
            warn!(status = response.status, "OpenSky token exchange rejected");
            return Err(TelemetryError::auth(Some(response.status), &response.body));
        }

        let parsed: TokenResponse = serde_json::from_slice(&response.body)
            .map_err(|_| TelemetryError::auth(Some(response.status), &response.body))?;

        let ttl = token_ttl(parsed.expires_in.unwrap_or(0));
        let expires_at = add_duration(self.clock.now(), ttl);

        info!(ttl_secs = ttl.as_secs(), "Obtained OpenSky access token");
        debug!(expires_at = %expires_at, "Token cached");

        Ok(CachedToken {
            token: parsed.access_token,
            expires_at,
        })
    }
}

/// Cache lifetime for a token the server says is valid for `expires_in` seconds.
fn token_ttl(expires_in: u64) -> Duration {
    Duration::from_secs(
        expires_in
            .saturating_sub(EXPIRY_MARGIN_SECS)
            .max(MIN_TOKEN_TTL_SECS),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::opensky::config::ClientCredentials;
    use crate::opensky::http::HttpResponse;
    use crate::time::ManualClock;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Transport that answers every token request with a scripted response.
    struct MockTokenTransport {
        status: u16,
        body: String,
        posts: AtomicUsize,
    }

    impl MockTokenTransport {
        fn ok(token: &str, expires_in: u64) -> Self {
            Self {
                status: 200,
                body: format!(r#"{{"access_token":"{token}","expires_in":{expires_in}}}"#),
                posts: AtomicUsize::new(0),
            }
        }

        fn failing(status: u16, body: &str) -> Self {
            Self {
                status,
                body: body.to_string(),
                posts: AtomicUsize::new(0),
            }
        }
    }

    impl HttpTransport for MockTokenTransport {
        async fn get_with_bearer(
            &self,
            _url: &str,
            _query: &[(&str, String)],
            _bearer_token: &str,
            _timeout: Duration,
        ) -> Result<HttpResponse, TransportError> {
            Err(TransportError::Connection("not used".to_string()))
        }

        async fn post_form(
            &self,
            _url: &str,
            form: &[(&str, &str)],
            _timeout: Duration,
        ) -> Result<HttpResponse, TransportError> {
            assert_eq!(form[0], ("grant_type", "client_credentials"));
            self.posts.fetch_add(1, Ordering::SeqCst);
            Ok(HttpResponse {
                status: self.status,
                body: self.body.clone().into_bytes(),
            })
        }
    }

    fn config_with_credentials() -> OpenSkyConfig {
        OpenSkyConfig {
            credentials: Some(ClientCredentials {
                client_id: "id".to_string(),
                client_secret: "secret".to_string(),
            }),
            ..Default::default()
        }
    }

    fn clock() -> ManualClock {
        ManualClock::new(DateTime::from_timestamp(1_700_000_000, 0).unwrap())
    }

    #[test]
    fn test_token_ttl_margin_and_floor() {
        assert_eq!(token_ttl(1800), Duration::from_secs(1740));
        assert_eq!(token_ttl(90), Duration::from_secs(60));
        assert_eq!(token_ttl(0), Duration::from_secs(60));
    }

    #[tokio::test]
    async fn test_cached_token_is_reused() {
        let transport = Arc::new(MockTokenTransport::ok("abc", 1800));
        let manager = TokenManager::new(transport.clone(), config_with_credentials(), Arc::new(clock()));

        assert_eq!(manager.get_token(false).await.unwrap(), "abc");
        assert_eq!(manager.get_token(false).await.unwrap(), "abc");
        assert_eq!(transport.posts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_force_refresh_always_exchanges() {
        let transport = Arc::new(MockTokenTransport::ok("abc", 1800));
        let manager = TokenManager::new(transport.clone(), config_with_credentials(), Arc::new(clock()));

        manager.get_token(false).await.unwrap();
        manager.get_token(true).await.unwrap();
        assert_eq!(transport.posts.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_token_refreshes_after_expiry() {
        let transport = Arc::new(MockTokenTransport::ok("abc", 300));
        let clock = clock();
        let manager = TokenManager::new(transport.clone(), config_with_credentials(), Arc::new(clock.clone()));

        manager.get_token(false).await.unwrap();
        assert_eq!(
            manager.expires_at(),
            Some(clock.now() + chrono::Duration::seconds(240))
        );

        clock.advance(Duration::from_secs(239));
        manager.get_token(false).await.unwrap();
        assert_eq!(transport.posts.load(Ordering::SeqCst), 1);

        clock.advance(Duration::from_secs(1));
        manager.get_token(false).await.unwrap();
        assert_eq!(transport.posts.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_missing_credentials_is_auth_error() {
        let transport = Arc::new(MockTokenTransport::ok("abc", 1800));
        let manager = TokenManager::new(transport.clone(), OpenSkyConfig::default(), Arc::new(clock()));

        let err = manager.get_token(false).await.unwrap_err();
        assert!(matches!(err, TelemetryError::Auth { status: None, .. }));
        assert_eq!(transport.posts.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_rejected_exchange_carries_status_and_snippet() {
        let body = format!("invalid_client {}", "x".repeat(400));
        let transport = Arc::new(MockTokenTransport::failing(401, &body));
        let manager = TokenManager::new(transport, config_with_credentials(), Arc::new(clock()));

        match manager.get_token(false).await.unwrap_err() {
            TelemetryError::Auth { status, body } => {
                assert_eq!(status, Some(401));
                assert!(body.starts_with("invalid_client"));
                assert_eq!(body.chars().count(), 200);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_invalidate_forces_exchange() {
        let transport = Arc::new(MockTokenTransport::ok("abc", 1800));
        let manager = TokenManager::new(transport.clone(), config_with_credentials(), Arc::new(clock()));

        manager.get_token(false).await.unwrap();
        manager.invalidate();
        assert!(manager.expires_at().is_none());
        manager.get_token(false).await.unwrap();
        assert_eq!(transport.posts.load(Ordering::SeqCst), 2);
    }
}
