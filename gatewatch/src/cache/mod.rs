//! Two-tier aircraft cache.
//!
//! An ephemeral process-local tier shadows a durable tier shared between
//! process instances. The [`CacheCoordinator`] decides per request which tier
//! answers, when to go upstream, and how long to back off after failures.

mod coalesce;
mod coordinator;
mod ephemeral;
mod policy;
mod stats;
mod types;

pub use coalesce::{InFlightRegistry, LeaderGuard, Registration};
pub use coordinator::{AircraftResponse, CacheCoordinator, CoordinatorError, DebugInfo};
pub use ephemeral::EphemeralCache;
pub use policy::{
    CachePolicy, DEFAULT_COOLDOWN, DEFAULT_EPHEMERAL_TTL, DEFAULT_FLEET_PREFIXES,
    DEFAULT_FRESH_TTL, DEFAULT_MAX_COOLDOWN, DEFAULT_OFFLINE_AFTER, DEFAULT_STORE_TIMEOUT,
};
pub use stats::{CacheStats, CacheStatsSnapshot};
pub use types::{
    validate_radius, CacheEntry, CacheKey, FetchSource, InvalidRadius, MAX_RADIUS_NM, MIN_RADIUS_NM,
};
