//! HTTP transport abstraction for testability.
//!
//! The transport reports every completed exchange as an [`HttpResponse`],
//! including non-2xx statuses, so the caller can react to specific codes
//! (401 triggers a token refresh). Only failures to complete the exchange
//! are errors.

use std::future::Future;
use std::time::Duration;

/// Status and body of a completed HTTP exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Failure to complete an HTTP exchange.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    #[error("request timed out")]
    Timeout,

    #[error("request failed: {0}")]
    Connection(String),
}

/// Async HTTP operations needed by the OpenSky client.
pub trait HttpTransport: Send + Sync {
    /// GET with query parameters and a bearer token.
    fn get_with_bearer(
        &self,
        url: &str,
        query: &[(&str, String)],
        bearer_token: &str,
        timeout: Duration,
    ) -> impl Future<Output = Result<HttpResponse, TransportError>> + Send;

    /// POST an `application/x-www-form-urlencoded` body.
    fn post_form(
        &self,
        url: &str,
        form: &[(&str, &str)],
        timeout: Duration,
    ) -> impl Future<Output = Result<HttpResponse, TransportError>> + Send;
}

/// User-Agent sent with every request.
const USER_AGENT: &str = concat!("gatewatch/", env!("CARGO_PKG_VERSION"));

/// Transport backed by a pooled `reqwest::Client`.
#[derive(Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Creates a transport with connection pooling and keepalive.
    ///
    /// Per-request timeouts are supplied by the caller.
    pub fn new() -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_keepalive(Duration::from_secs(60))
            .build()
            .map_err(|e| {
                TransportError::Connection(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self { client })
    }

    async fn finish(
        request: reqwest::RequestBuilder,
    ) -> Result<HttpResponse, TransportError> {
        let response = request.send().await.map_err(map_reqwest_error)?;
        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(map_reqwest_error)?;

        Ok(HttpResponse {
            status,
            body: body.to_vec(),
        })
    }
}

fn map_reqwest_error(e: reqwest::Error) -> TransportError {
    if e.is_timeout() {
        TransportError::Timeout
    } else {
        TransportError::Connection(e.to_string())
    }
}

impl HttpTransport for ReqwestTransport {
    async fn get_with_bearer(
        &self,
        url: &str,
        query: &[(&str, String)],
        bearer_token: &str,
        timeout: Duration,
    ) -> Result<HttpResponse, TransportError> {
        let request = self
            .client
            .get(url)
            .query(query)
            .bearer_auth(bearer_token)
            .timeout(timeout);

        Self::finish(request).await
    }

    async fn post_form(
        &self,
        url: &str,
        form: &[(&str, &str)],
        timeout: Duration,
    ) -> Result<HttpResponse, TransportError> {
        let request = self.client.post(url).form(form).timeout(timeout);

        Self::finish(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_response_success_range() {
        let ok = HttpResponse {
            status: 204,
            body: vec![],
        };
        let unauthorized = HttpResponse {
            status: 401,
            body: vec![],
        };
        assert!(ok.is_success());
        assert!(!unauthorized.is_success());
    }

    #[test]
    fn test_reqwest_transport_creation() {
        assert!(ReqwestTransport::new().is_ok());
    }
}
