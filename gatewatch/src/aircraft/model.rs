//! Normalized aircraft state.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::geo::GeoPoint;

/// Conversion factor from meters per second to knots.
pub const MS_TO_KNOTS: f64 = 1.943844;

/// Default ground speed at or below which an aircraft is reported as landed.
pub const DEFAULT_LANDED_MAX_KTS: f64 = 40.0;

/// Flight status as shown to the map layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AircraftStatus {
    Active,
    Landed,
    Offline,
}

impl AircraftStatus {
    /// Status implied by a telemetry sample.
    ///
    /// `Offline` is never derived here; it depends on the silence window and
    /// is applied at read time by [`AircraftSnapshot::status_at`].
    pub fn from_motion(on_ground: bool, ground_speed_kt: Option<f64>, landed_max_kts: f64) -> Self {
        let slow = ground_speed_kt.is_some_and(|kt| kt <= landed_max_kts);
        if on_ground || slow {
            Self::Landed
        } else {
            Self::Active
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Landed => "landed",
            Self::Offline => "offline",
        }
    }
}

impl std::fmt::Display for AircraftStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One aircraft as seen by a single upstream fetch.
///
/// Snapshots are replaced wholesale by the next fetch for the same `icao24`;
/// nothing mutates one in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AircraftSnapshot {
    /// Stable 24-bit transponder address, lowercase hex.
    pub icao24: String,
    pub callsign: Option<String>,
    pub lat: f64,
    pub lon: f64,
    pub on_ground: bool,
    pub ground_speed_kt: Option<f64>,
    /// True track in degrees, 0-360.
    pub track: Option<f64>,
    pub last_contact_epoch_sec: Option<i64>,
    pub status: AircraftStatus,
    pub source: String,
    pub updated_at: DateTime<Utc>,
}

impl AircraftSnapshot {
    pub fn position(&self) -> GeoPoint {
        GeoPoint::new(self.lat, self.lon)
    }

    /// Status as of `now`, given a silence window.
    ///
    /// Falls back to `updated_at` when the upstream reported no contact time.
    pub fn status_at(&self, now: DateTime<Utc>, offline_after: Duration) -> AircraftStatus {
        let last_heard = self
            .last_contact_epoch_sec
            .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0))
            .unwrap_or(self.updated_at);

        let silent_ms = (now - last_heard).num_milliseconds();
        if silent_ms > offline_after.as_millis() as i64 {
            AircraftStatus::Offline
        } else {
            self.status
        }
    }

    /// Copy of this snapshot with its status recomputed for `now`.
    pub fn with_status_at(&self, now: DateTime<Utc>, offline_after: Duration) -> Self {
        Self {
            status: self.status_at(now, offline_after),
            ..self.clone()
        }
    }
}
