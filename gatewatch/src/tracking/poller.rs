//! Background poll loop for one base.
//!
//! Each [`BasePoller`] drives the coordinator on a fixed interval so trails
//! keep updating and the cache stays warm even when no client is polling.
//! Follows the adapter pattern used elsewhere: `new()` + `start()` spawns a
//! task running an interval loop until the cancellation token fires.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::trail::TrailTracker;
use crate::cache::{AircraftResponse, CacheCoordinator, CoordinatorError};
use crate::opensky::StateSource;
use crate::store::{DurableStore, StoreError, TrackPoint};

/// Default interval between polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);

/// Default radius polled around each base.
pub const DEFAULT_POLL_RADIUS_NM: f64 = 50.0;

/// Poll loop settings.
#[derive(Debug, Clone, PartialEq)]
pub struct PollerConfig {
    pub interval: Duration,
    pub radius_nm: f64,
    /// Record latest state and track points for live results.
    pub record_history: bool,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            radius_nm: DEFAULT_POLL_RADIUS_NM,
            record_history: false,
        }
    }
}

/// Poll loop for one base.
pub struct BasePoller<S: StateSource, D: DurableStore> {
    base: String,
    coordinator: Arc<CacheCoordinator<S, D>>,
    trails: Arc<TrailTracker>,
    config: PollerConfig,
}

impl<S, D> BasePoller<S, D>
where
    S: StateSource + 'static,
    D: DurableStore + 'static,
{
    pub fn new(
        base: &str,
        coordinator: Arc<CacheCoordinator<S, D>>,
        trails: Arc<TrailTracker>,
        config: PollerConfig,
    ) -> Self {
        Self {
            base: base.trim().to_uppercase(),
            coordinator,
            trails,
            config,
        }
    }

    /// Start the poll loop as an async task.
    pub fn start(self, cancel: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(async move {
            self.run(cancel).await;
        })
    }

    async fn run(self, cancel: CancellationToken) {
        info!(
            base = %self.base,
            radius_nm = self.config.radius_nm,
            interval_secs = self.config.interval.as_secs(),
            record_history = self.config.record_history,
            "Base poller started"
        );

        let mut interval = tokio::time::interval(self.config.interval);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = interval.tick() => {}
            }

            if let Err(e) = self.poll_once().await {
                // Only an unknown base fails here, which will not fix itself.
                warn!(base = %self.base, error = %e, "Base poller stopping");
                break;
            }
        }

        info!(base = %self.base, "Base poller stopped");
    }

    /// Run one poll: fetch, update trails, record history.
    pub async fn poll_once(&self) -> Result<AircraftResponse, CoordinatorError> {
        let response = self
            .coordinator
            .get_aircraft(&self.base, self.config.radius_nm, false)
            .await?;

        self.trails
            .update(&response.aircraft, self.coordinator.clock().now());

        debug!(
            base = %self.base,
            source = %response.source,
            aircraft = response.aircraft.len(),
            trails = self.trails.len(),
            "Poll complete"
        );

        if self.config.record_history && response.source.is_live() {
            self.record_history(&response).await;
        }

        Ok(response)
    }

    async fn record_history(&self, response: &AircraftResponse) {
        let store = self.coordinator.store();
        let timeout = self.coordinator.policy().store_timeout;

        let latest = store.upsert_latest(&self.base, &response.aircraft);
        if let Err(e) = bounded(timeout, latest).await {
            warn!(base = %self.base, error = %e, "Failed to record latest aircraft state");
        }

        let points: Vec<TrackPoint> = response
            .aircraft
            .iter()
            .map(|a| TrackPoint::from_snapshot(&self.base, a))
            .collect();
        if let Err(e) = bounded(timeout, store.insert_track_points(&points)).await {
            warn!(base = %self.base, error = %e, "Failed to record track points");
        }
    }
}

async fn bounded(
    timeout: Duration,
    fut: impl std::future::Future<Output = Result<(), StoreError>>,
) -> Result<(), StoreError> {
    tokio::time::timeout(timeout, fut)
        .await
        .unwrap_or(Err(StoreError::Timeout(timeout)))
}
