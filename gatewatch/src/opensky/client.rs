//! State source trait and the OpenSky implementation.

use std::future::Future;
use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use super::config::OpenSkyConfig;
use super::error::TelemetryError;
use super::http::{HttpResponse, HttpTransport, TransportError};
use super::token::TokenManager;
use super::vector::normalize;
use crate::aircraft::AircraftSnapshot;
use crate::geo::BoundingBox;
use crate::time::Clock;

/// Trait for fetching the aircraft currently inside a bounding box.
///
/// The cache coordinator depends on this rather than on the concrete client,
/// so tests can count and script upstream calls.
pub trait StateSource: Send + Sync {
    fn fetch_aircraft(
        &self,
        bbox: &BoundingBox,
    ) -> impl Future<Output = Result<Vec<AircraftSnapshot>, TelemetryError>> + Send;
}

impl<T: StateSource> StateSource for Arc<T> {
    fn fetch_aircraft(
        &self,
        bbox: &BoundingBox,
    ) -> impl Future<Output = Result<Vec<AircraftSnapshot>, TelemetryError>> + Send {
        (**self).fetch_aircraft(bbox)
    }
}

/// Body of `/states/all`. `states` is `null` when nothing is in the box.
#[derive(Deserialize)]
struct StatesResponse {
    #[serde(default)]
    states: Option<Vec<Value>>,
}

/// OpenSky REST client.
pub struct TelemetryClient<T: HttpTransport> {
    transport: Arc<T>,
    tokens: TokenManager<T>,
    config: OpenSkyConfig,
    clock: Arc<dyn Clock>,
}

impl<T: HttpTransport> TelemetryClient<T> {
    pub fn new(transport: T, config: OpenSkyConfig, clock: Arc<dyn Clock>) -> Self {
        let transport = Arc::new(transport);
        let tokens = TokenManager::new(Arc::clone(&transport), config.clone(), Arc::clone(&clock));

        Self {
            transport,
            tokens,
            config,
            clock,
        }
    }

    pub fn tokens(&self) -> &TokenManager<T> {
        &self.tokens
    }

    /// Fetch raw state vectors for a bounding box.
    ///
    /// A 401 triggers one forced token refresh and one retry. Other failures
    /// are returned as-is for the caller's fallback policy.
    pub async fn fetch_states(&self, bbox: &BoundingBox) -> Result<Vec<Value>, TelemetryError> {
        let token = self.tokens.get_token(false).await?;
        let mut response = self.get_states(bbox, &token).await?;

        if response.status == 401 {
            debug!("OpenSky returned 401, refreshing token and retrying once");
            let token = self.tokens.get_token(true).await?;
            response = self.get_states(bbox, &token).await?;
        }

        if !response.is_success() {
            warn!(status = response.status, "OpenSky states request failed");
            return Err(TelemetryError::upstream(Some(response.status), &response.body));
        }

        let parsed: StatesResponse = serde_json::from_slice(&response.body).map_err(|e| {
            warn!(error = %e, "Malformed OpenSky states response");
            TelemetryError::upstream(None, &response.body)
        })?;

        Ok(parsed.states.unwrap_or_default())
    }

    async fn get_states(
        &self,
        bbox: &BoundingBox,
        token: &str,
    ) -> Result<HttpResponse, TelemetryError> {
        let mut query: Vec<(&str, String)> = bbox.to_query().into_iter().collect();
        query.push(("extended", "1".to_string()));

        self.transport
            .get_with_bearer(&self.config.states_url(), &query, token, self.config.timeout)
            .await
            .map_err(|e| match e {
                TransportError::Timeout => TelemetryError::Timeout,
                TransportError::Connection(msg) => TelemetryError::upstream(None, msg.as_bytes()),
            })
    }
}

impl<T: HttpTransport> StateSource for TelemetryClient<T> {
    async fn fetch_aircraft(
        &self,
        bbox: &BoundingBox,
    ) -> Result<Vec<AircraftSnapshot>, TelemetryError> {
        let raw = self.fetch_states(bbox).await?;
        let snapshots = normalize(&raw, self.clock.now(), self.config.landed_max_kts);

        debug!(
            raw = raw.len(),
            usable = snapshots.len(),
            "OpenSky state vectors normalized"
        );

        Ok(snapshots)
    }
}
