//! Parsing of OpenSky state vectors.
//!
//! Each state vector is a fixed-position JSON array. Fields are checked one
//! by one; a vector whose identity or position cannot be read is dropped.
//!
//! | index | field          |
//! |-------|----------------|
//! | 0     | icao24         |
//! | 1     | callsign       |
//! | 4     | last_contact   |
//! | 5     | longitude      |
//! | 6     | latitude       |
//! | 8     | on_ground      |
//! | 9     | velocity (m/s) |
//! | 10    | true_track     |

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::aircraft::{AircraftSnapshot, AircraftStatus, MS_TO_KNOTS};

/// `source` tag carried by snapshots built from OpenSky vectors.
pub const STATES_SOURCE: &str = "opensky";

const IDX_ICAO24: usize = 0;
const IDX_CALLSIGN: usize = 1;
const IDX_LAST_CONTACT: usize = 4;
const IDX_LON: usize = 5;
const IDX_LAT: usize = 6;
const IDX_ON_GROUND: usize = 8;
const IDX_VELOCITY: usize = 9;
const IDX_TRACK: usize = 10;

/// The subset of a state vector this crate uses.
#[derive(Debug, Clone, PartialEq)]
pub struct StateVector {
    pub icao24: String,
    pub callsign: Option<String>,
    pub last_contact: Option<i64>,
    pub lon: f64,
    pub lat: f64,
    pub on_ground: bool,
    pub velocity_ms: Option<f64>,
    pub true_track: Option<f64>,
}

impl StateVector {
    /// Parse one raw vector, returning `None` if it is unusable.
    pub fn parse(raw: &Value) -> Option<Self> {
        let fields = raw.as_array()?;

        let icao24 = fields.get(IDX_ICAO24)?.as_str()?.trim().to_lowercase();
        if icao24.is_empty() {
            return None;
        }

        let lat = finite(fields.get(IDX_LAT))?;
        let lon = finite(fields.get(IDX_LON))?;
        if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
            return None;
        }

        let callsign = fields
            .get(IDX_CALLSIGN)
            .and_then(Value::as_str)
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());

        Some(Self {
            icao24,
            callsign,
            last_contact: fields.get(IDX_LAST_CONTACT).and_then(Value::as_i64),
            lon,
            lat,
            on_ground: fields
                .get(IDX_ON_GROUND)
                .and_then(Value::as_bool)
                .unwrap_or(false),
            velocity_ms: finite(fields.get(IDX_VELOCITY)),
            true_track: finite(fields.get(IDX_TRACK)),
        })
    }

    /// Convert to a snapshot stamped with `fetched_at`.
    pub fn into_snapshot(self, fetched_at: DateTime<Utc>, landed_max_kts: f64) -> AircraftSnapshot {
        let ground_speed_kt = self.velocity_ms.map(|v| v * MS_TO_KNOTS);
        let status = AircraftStatus::from_motion(self.on_ground, ground_speed_kt, landed_max_kts);

        AircraftSnapshot {
            icao24: self.icao24,
            callsign: self.callsign,
            lat: self.lat,
            lon: self.lon,
            on_ground: self.on_ground,
            ground_speed_kt,
            track: self.true_track,
            last_contact_epoch_sec: self.last_contact,
            status,
            source: STATES_SOURCE.to_string(),
            updated_at: fetched_at,
        }
    }
}

fn finite(value: Option<&Value>) -> Option<f64> {
    value.and_then(Value::as_f64).filter(|v| v.is_finite())
}

/// Normalize raw state vectors into snapshots, silently dropping unusable ones.
pub fn normalize(
    raw: &[Value],
    fetched_at: DateTime<Utc>,
    landed_max_kts: f64,
) -> Vec<AircraftSnapshot> {
    raw.iter()
        .filter_map(StateVector::parse)
        .map(|v| v.into_snapshot(fetched_at, landed_max_kts))
        .collect()
}
