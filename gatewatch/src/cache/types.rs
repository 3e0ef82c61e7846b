//! Core types for the aircraft cache.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::aircraft::AircraftSnapshot;

/// Smallest radius a key can represent.
pub const MIN_RADIUS_NM: f64 = 0.1;

/// Largest radius accepted from clients.
pub const MAX_RADIUS_NM: f64 = 1_000.0;

/// A requested radius outside `[MIN_RADIUS_NM, MAX_RADIUS_NM]` after rounding.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
#[error("radius must be between 0.1 and 1000 nautical miles, got {0}")]
pub struct InvalidRadius(pub f64);

/// Check a requested radius before it becomes a [`CacheKey`].
///
/// The check runs on the rounded value, so `0.04` is rejected rather than
/// collapsing to a zero-area box.
pub fn validate_radius(radius_nm: f64) -> Result<f64, InvalidRadius> {
    if !radius_nm.is_finite() || radius_nm > MAX_RADIUS_NM {
        return Err(InvalidRadius(radius_nm));
    }
    if (radius_nm * 10.0).round() < 1.0 {
        return Err(InvalidRadius(radius_nm));
    }
    Ok(radius_nm)
}

/// Cache key identifying one (base, radius) query.
///
/// The radius is stored in tenths of a nautical mile so near-identical
/// requests (e.g. `50` and `50.04`) share an entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheKey {
    /// Airport base code, uppercase (e.g. "SAV")
    pub base: String,
    /// Radius in tenths of a nautical mile
    pub radius_tenths: u32,
}

impl CacheKey {
    /// Create a key, normalizing the base code and rounding the radius.
    ///
    /// The rounded radius never drops below one tenth. Callers taking input
    /// from users run it through [`validate_radius`] first.
    pub fn new(base: &str, radius_nm: f64) -> Self {
        let radius_tenths = ((radius_nm.max(0.0) * 10.0).round() as u32).max(1);
        Self {
            base: base.trim().to_uppercase(),
            radius_tenths,
        }
    }

    /// Rounded radius in nautical miles.
    pub fn radius_nm(&self) -> f64 {
        f64::from(self.radius_tenths) / 10.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{:.1}", self.base, self.radius_nm())
    }
}

/// Cached result of an upstream fetch for one key.
///
/// A key is fresh, cooling down, or absent. A successful fetch writes an
/// entry with no cooldown and a zero failure count; a failed fetch keeps the
/// previous payload and `fetched_at` and only moves the cooldown forward.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry {
    pub key: CacheKey,
    /// Unfiltered aircraft from the last successful fetch.
    pub aircraft: Vec<AircraftSnapshot>,
    /// Time of the last successful fetch. `None` if the key has only failed.
    pub fetched_at: Option<DateTime<Utc>>,
    pub cooldown_until: Option<DateTime<Utc>>,
    /// Failures since the last success; drives the backoff doubling.
    #[serde(default)]
    pub consecutive_failures: u32,
}

impl CacheEntry {
    /// Entry for a successful fetch.
    pub fn fresh(key: CacheKey, aircraft: Vec<AircraftSnapshot>, fetched_at: DateTime<Utc>) -> Self {
        Self {
            key,
            aircraft,
            fetched_at: Some(fetched_at),
            cooldown_until: None,
            consecutive_failures: 0,
        }
    }

    /// Age of the payload in milliseconds, if it was ever fetched.
    pub fn age_ms(&self, now: DateTime<Utc>) -> Option<u128> {
        self.fetched_at
            .map(|fetched| crate::time::elapsed_ms(fetched, now))
    }

    pub fn in_cooldown(&self, now: DateTime<Utc>) -> bool {
        self.cooldown_until.is_some_and(|until| now < until)
    }
}

/// Where a response payload came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchSource {
    /// Process-local cache within its TTL
    CacheFreshMem,
    /// Durable cache within the fresh TTL
    CacheFresh,
    /// Durable cache while the key cools down after a failure
    CacheCooldown,
    /// Live upstream fetch
    OpenskyLive,
    /// Fallback after a token exchange failure
    UpstreamAuthError,
    /// Fallback after a non-2xx or malformed upstream response
    UpstreamError,
    /// Fallback after an upstream timeout
    UpstreamTimeout,
}

impl FetchSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CacheFreshMem => "cache_fresh_mem",
            Self::CacheFresh => "cache_fresh",
            Self::CacheCooldown => "cache_cooldown",
            Self::OpenskyLive => "opensky_live",
            Self::UpstreamAuthError => "upstream_auth_error",
            Self::UpstreamError => "upstream_error",
            Self::UpstreamTimeout => "upstream_timeout",
        }
    }

    /// True for payloads served from the upstream in this request.
    pub fn is_live(&self) -> bool {
        matches!(self, Self::OpenskyLive)
    }
}

impl fmt::Display for FetchSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_key_rounds_radius() {
        assert_eq!(CacheKey::new("sav", 50.04), CacheKey::new("SAV", 50.0));
        assert_ne!(CacheKey::new("SAV", 50.06), CacheKey::new("SAV", 50.0));
        assert_eq!(CacheKey::new(" sav ", 500.0).to_string(), "SAV:500.0");
    }

    #[test]
    fn test_cache_key_radius_never_rounds_to_zero() {
        assert_eq!(CacheKey::new("SAV", -3.0).radius_tenths, 1);
        assert_eq!(CacheKey::new("SAV", 0.04).radius_tenths, 1);
        assert_eq!(CacheKey::new("SAV", 0.04).radius_nm(), MIN_RADIUS_NM);
    }

    #[test]
    fn test_validate_radius_uses_rounded_value() {
        assert_eq!(validate_radius(0.05), Ok(0.05));
        assert_eq!(validate_radius(50.0), Ok(50.0));
        assert_eq!(validate_radius(MAX_RADIUS_NM), Ok(MAX_RADIUS_NM));

        assert_eq!(validate_radius(0.04), Err(InvalidRadius(0.04)));
        assert_eq!(validate_radius(0.0), Err(InvalidRadius(0.0)));
        assert_eq!(validate_radius(-5.0), Err(InvalidRadius(-5.0)));
        assert_eq!(validate_radius(1000.1), Err(InvalidRadius(1000.1)));
        assert!(validate_radius(f64::NAN).is_err());
        assert!(validate_radius(f64::INFINITY).is_err());
    }

    #[test]
    fn test_smallest_valid_radius_has_nonempty_box() {
        use crate::geo::{bounding_box_from_center, GeoPoint};

        let radius = validate_radius(0.05).unwrap();
        let key = CacheKey::new("SAV", radius);
        let bbox = bounding_box_from_center(GeoPoint::new(32.1276, -81.2021), key.radius_nm());
        assert!(bbox.lamin < bbox.lamax);
        assert!(bbox.lomin < bbox.lomax);
    }

    #[test]
    fn test_fetch_source_serde_matches_as_str() {
        let all = [
            FetchSource::CacheFreshMem,
            FetchSource::CacheFresh,
            FetchSource::CacheCooldown,
            FetchSource::OpenskyLive,
            FetchSource::UpstreamAuthError,
            FetchSource::UpstreamError,
            FetchSource::UpstreamTimeout,
        ];
        for source in all {
            let json = serde_json::to_value(source).unwrap();
            assert_eq!(json, source.as_str());
        }
    }

    #[test]
    fn test_entry_cooldown_window() {
        let now = Utc::now();
        let mut entry = CacheEntry::fresh(CacheKey::new("SAV", 50.0), vec![], now);
        assert!(!entry.in_cooldown(now));

        entry.cooldown_until = Some(now + chrono::Duration::seconds(30));
        assert!(entry.in_cooldown(now));
        assert!(!entry.in_cooldown(now + chrono::Duration::seconds(30)));
    }
}
