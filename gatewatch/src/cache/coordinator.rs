//! Cache coordinator: the entry point for aircraft polls.
//!
//! Decision order for one `(base, radius)` request:
//!
//! 1. Ephemeral tier, within its TTL and not failed since → `cache_fresh_mem`
//! 2. Durable tier, inside a cooldown window → `cache_cooldown` (stale)
//! 3. Durable tier, within the fresh TTL and not failed since → `cache_fresh`
//! 4. Live fetch, coalesced per key → `opensky_live`, or a stale fallback
//!    tagged with the failure class
//!
//! `force` skips steps 1-3 but still reads the durable entry so a failed
//! fetch has something to fall back to and the backoff keeps doubling.
//!
//! Store failures never fail a request. They are logged and counted. A failed
//! read falls back to the last entry this process saw for the key, and the
//! cooldown that follows is kept in process only so a good durable payload is
//! never overwritten from incomplete state.

use std::future::Future;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::coalesce::{InFlightRegistry, Registration};
use super::ephemeral::EphemeralCache;
use super::policy::CachePolicy;
use super::stats::CacheStats;
use super::types::{CacheEntry, CacheKey, FetchSource};
use crate::aircraft::{filter_allowed, AircraftSnapshot};
use crate::airport::{AirportBase, AirportRegistry};
use crate::geo::{bounding_box_from_center, BoundingBox};
use crate::opensky::{StateSource, TelemetryError};
use crate::store::{DurableStore, StoreError};
use crate::time::{add_duration, Clock};

/// Errors returned by [`CacheCoordinator::get_aircraft`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoordinatorError {
    #[error("Unknown base '{0}'")]
    UnknownBase(String),
}

/// Per-request cache detail, exposed with the `debug` query flag.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DebugInfo {
    pub cache_key: String,
    pub bbox: BoundingBox,
    pub cooldown_until: Option<DateTime<Utc>>,
    pub consecutive_failures: u32,
}

/// Filtered aircraft for one base and radius.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AircraftResponse {
    pub airport: String,
    pub radius_nm: f64,
    pub aircraft: Vec<AircraftSnapshot>,
    /// True when the payload is a fallback older than the freshness window.
    pub stale: bool,
    pub source: FetchSource,
    /// Time of the fetch that produced the payload.
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debug: Option<DebugInfo>,
}

impl AircraftResponse {
    /// Copy without debug detail.
    pub fn without_debug(mut self) -> Self {
        self.debug = None;
        self
    }
}

/// Orchestrates both cache tiers, cooldown state and upstream fetches.
///
/// Constructed once per process and shared behind an `Arc`.
pub struct CacheCoordinator<S: StateSource, D: DurableStore> {
    source: S,
    store: Arc<D>,
    registry: AirportRegistry,
    policy: CachePolicy,
    clock: Arc<dyn Clock>,
    ephemeral: EphemeralCache,
    in_flight: InFlightRegistry<CacheKey, AircraftResponse>,
    stats: CacheStats,
}

impl<S: StateSource, D: DurableStore> CacheCoordinator<S, D> {
    pub fn new(
        source: S,
        store: Arc<D>,
        registry: AirportRegistry,
        policy: CachePolicy,
        clock: Arc<dyn Clock>,
    ) -> Self {
        info!(
            bases = registry.len(),
            ephemeral_ttl_ms = policy.ephemeral_ttl.as_millis() as u64,
            fresh_ttl_ms = policy.fresh_ttl.as_millis() as u64,
            cooldown_secs = policy.cooldown.as_secs(),
            max_cooldown_secs = policy.max_cooldown.as_secs(),
            prefixes = ?policy.allowed_prefixes,
            "Cache coordinator initialized"
        );

        Self {
            source,
            store,
            registry,
            policy,
            clock,
            ephemeral: EphemeralCache::new(),
            in_flight: InFlightRegistry::new(),
            stats: CacheStats::new(),
        }
    }

    pub fn registry(&self) -> &AirportRegistry {
        &self.registry
    }

    pub fn policy(&self) -> &CachePolicy {
        &self.policy
    }

    pub fn store(&self) -> &Arc<D> {
        &self.store
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }

    /// Number of keys with a live fetch in progress.
    pub fn in_flight_count(&self) -> usize {
        self.in_flight.len()
    }

    /// Drop the ephemeral entry for a key. The durable entry is untouched.
    pub fn invalidate(&self, base: &str, radius_nm: f64) -> bool {
        self.ephemeral.remove(&CacheKey::new(base, radius_nm))
    }

    /// Aircraft near `base` within `radius_nm`, filtered to the fleet.
    pub async fn get_aircraft(
        &self,
        base: &str,
        radius_nm: f64,
        force: bool,
    ) -> Result<AircraftResponse, CoordinatorError> {
        let airport = self
            .registry
            .get(base)
            .cloned()
            .ok_or_else(|| CoordinatorError::UnknownBase(base.trim().to_uppercase()))?;

        let key = CacheKey::new(&airport.code, radius_nm);
        let bbox = bounding_box_from_center(airport.center(), key.radius_nm());
        let now = self.clock.now();

        if !force {
            if let Some(entry) = self
                .ephemeral
                .get_fresh(&key, now, self.policy.ephemeral_ttl)
            {
                self.stats.record_memory_hit();
                debug!(key = %key, "Ephemeral cache hit");
                return Ok(self.respond(&airport, &bbox, &entry, FetchSource::CacheFreshMem, false));
            }
        }

        let durable = self.read_durable(&key).await;
        let persist = !matches!(durable, DurableRead::Unavailable);
        let previous = match durable {
            DurableRead::Found(entry) => Some(entry),
            DurableRead::Absent => None,
            DurableRead::Unavailable => self.ephemeral.get(&key),
        };

        if !force {
            if let Some(entry) = &previous {
                if entry.in_cooldown(now) {
                    self.stats.record_cooldown_hit();
                    debug!(
                        key = %key,
                        cooldown_until = ?entry.cooldown_until,
                        failures = entry.consecutive_failures,
                        "Key cooling down, serving cached payload"
                    );
                    return Ok(self.respond(&airport, &bbox, entry, FetchSource::CacheCooldown, true));
                }

                let fresh = persist
                    && entry.cooldown_until.is_none()
                    && entry
                        .age_ms(now)
                        .is_some_and(|age| age < self.policy.fresh_ttl.as_millis());
                if fresh {
                    self.stats.record_durable_hit();
                    debug!(key = %key, "Durable cache hit");
                    self.ephemeral.insert(entry.clone());
                    return Ok(self.respond(&airport, &bbox, entry, FetchSource::CacheFresh, false));
                }
            }
        }

        let fetch = LiveFetch {
            airport: &airport,
            key: &key,
            bbox: &bbox,
            previous: previous.as_ref(),
            persist,
        };
        Ok(self.fetch_coalesced(fetch).await)
    }

    /// Run one live fetch per key; concurrent callers share its outcome.
    async fn fetch_coalesced(&self, fetch: LiveFetch<'_>) -> AircraftResponse {
        let key = fetch.key;
        loop {
            match self.in_flight.register(key) {
                Registration::Leader(guard) => {
                    let response = self.fetch_live(&fetch).await;
                    guard.complete(response.clone());
                    return response;
                }
                Registration::Follower(mut rx) => {
                    self.stats.record_coalesced_wait();
                    match rx.recv().await {
                        Ok(response) => return response,
                        Err(_) => {
                            debug!(key = %key, "In-flight leader abandoned, retrying");
                        }
                    }
                }
            }
        }
    }

    async fn fetch_live(&self, fetch: &LiveFetch<'_>) -> AircraftResponse {
        let LiveFetch {
            airport,
            key,
            bbox,
            previous,
            persist,
        } = *fetch;
        debug!(key = %key, "Fetching live aircraft");
        let result = self.source.fetch_aircraft(bbox).await;
        let now = self.clock.now();

        match result {
            Ok(aircraft) => {
                self.stats.record_live_fetch();
                let entry = CacheEntry::fresh(key.clone(), aircraft, now);

                debug!(key = %key, aircraft = entry.aircraft.len(), "Live fetch succeeded");

                self.ephemeral.insert(entry.clone());
                self.write_durable(&entry).await;
                self.respond(airport, bbox, &entry, FetchSource::OpenskyLive, false)
            }
            Err(error) => {
                self.stats.record_live_failure();
                let entry = self.cooldown_entry(key, previous, now);

                warn!(
                    key = %key,
                    error = %error,
                    failures = entry.consecutive_failures,
                    cooldown_until = ?entry.cooldown_until,
                    "Live fetch failed, serving fallback"
                );

                self.ephemeral.insert(entry.clone());
                if persist {
                    self.write_durable(&entry).await;
                } else {
                    debug!(key = %key, "Durable read failed, keeping cooldown in process only");
                }
                self.respond(airport, bbox, &entry, source_for_error(&error), true)
            }
        }
    }

    /// Next durable entry after a failure: previous payload, doubled cooldown.
    fn cooldown_entry(
        &self,
        key: &CacheKey,
        previous: Option<&CacheEntry>,
        now: DateTime<Utc>,
    ) -> CacheEntry {
        let failures = previous
            .map(|e| e.consecutive_failures)
            .unwrap_or(0)
            .saturating_add(1);
        let cooldown = self.policy.cooldown_for(failures);

        CacheEntry {
            key: key.clone(),
            aircraft: previous.map(|e| e.aircraft.clone()).unwrap_or_default(),
            fetched_at: previous.and_then(|e| e.fetched_at),
            cooldown_until: Some(add_duration(now, cooldown)),
            consecutive_failures: failures,
        }
    }

    fn respond(
        &self,
        airport: &AirportBase,
        bbox: &BoundingBox,
        entry: &CacheEntry,
        source: FetchSource,
        stale: bool,
    ) -> AircraftResponse {
        let now = self.clock.now();
        let aircraft = filter_allowed(&entry.aircraft, &self.policy.allowed_prefixes)
            .into_iter()
            .map(|a| a.with_status_at(now, self.policy.offline_after))
            .collect();

        AircraftResponse {
            airport: airport.code.clone(),
            radius_nm: entry.key.radius_nm(),
            aircraft,
            stale,
            source,
            updated_at: entry.fetched_at.unwrap_or(now),
            debug: Some(DebugInfo {
                cache_key: entry.key.to_string(),
                bbox: *bbox,
                cooldown_until: entry.cooldown_until,
                consecutive_failures: entry.consecutive_failures,
            }),
        }
    }

    async fn read_durable(&self, key: &CacheKey) -> DurableRead {
        match self.bounded("read", self.store.read_by_key(key)).await {
            Some(Some(entry)) => DurableRead::Found(entry),
            Some(None) => DurableRead::Absent,
            None => DurableRead::Unavailable,
        }
    }

    async fn write_durable(&self, entry: &CacheEntry) {
        self.bounded("upsert", self.store.upsert(entry)).await;
    }

    /// Apply the store timeout; any failure is logged and becomes `None`.
    async fn bounded<T>(
        &self,
        op: &'static str,
        fut: impl Future<Output = Result<T, StoreError>>,
    ) -> Option<T> {
        let result = match tokio::time::timeout(self.policy.store_timeout, fut).await {
            Ok(result) => result,
            Err(_) => Err(StoreError::Timeout(self.policy.store_timeout)),
        };

        match result {
            Ok(value) => Some(value),
            Err(error) => {
                self.stats.record_store_error();
                warn!(op, error = %error, "Durable store call failed, continuing without it");
                None
            }
        }
    }
}

/// Outcome of a durable read. `Unavailable` covers errors and timeouts.
enum DurableRead {
    Found(CacheEntry),
    Absent,
    Unavailable,
}

/// Everything a leader needs to run one live fetch.
#[derive(Clone, Copy)]
struct LiveFetch<'a> {
    airport: &'a AirportBase,
    key: &'a CacheKey,
    bbox: &'a BoundingBox,
    /// Entry the fallback and backoff build on.
    previous: Option<&'a CacheEntry>,
    /// False when the durable read failed; the cooldown then stays in process.
    persist: bool,
}

fn source_for_error(error: &TelemetryError) -> FetchSource {
    match error {
        TelemetryError::Auth { .. } => FetchSource::UpstreamAuthError,
        TelemetryError::Upstream { .. } => FetchSource::UpstreamError,
        TelemetryError::Timeout => FetchSource::UpstreamTimeout,
    }
}
