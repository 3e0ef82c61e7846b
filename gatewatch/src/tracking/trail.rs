//! Short position trails for moving aircraft.
//!
//! Trails are rebuilt from the poll stream and never persisted. Only moving
//! aircraft accumulate points, and a point is only appended once the aircraft
//! has moved far enough from the previous one to rule out position jitter.

use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;

use crate::aircraft::AircraftSnapshot;
use crate::geo::{haversine_meters, GeoPoint};

/// Aircraft at or below this speed do not extend their trail.
pub const TRAIL_MIN_KTS: f64 = 5.0;

/// Minimum distance from the last stored point before appending.
pub const MIN_MOVE_METERS: f64 = 25.0;

/// Points older than this are pruned.
pub const MAX_TRAIL_AGE: Duration = Duration::from_secs(120);

/// Most recent points kept per aircraft.
pub const MAX_TRAIL_POINTS: usize = 18;

/// One sampled position.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrailPoint {
    pub icao24: String,
    pub lat: f64,
    pub lon: f64,
    pub timestamp_ms: i64,
}

impl TrailPoint {
    fn position(&self) -> GeoPoint {
        GeoPoint::new(self.lat, self.lon)
    }
}

/// Per-aircraft bounded trails for one base.
#[derive(Debug, Default)]
pub struct TrailTracker {
    trails: Mutex<HashMap<String, VecDeque<TrailPoint>>>,
}

impl TrailTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one poll's aircraft list into the trails.
    ///
    /// Aircraft missing from `snapshots` lose their trail.
    pub fn update(&self, snapshots: &[AircraftSnapshot], now: DateTime<Utc>) {
        let now_ms = now.timestamp_millis();
        let cutoff_ms = now_ms - MAX_TRAIL_AGE.as_millis() as i64;
        let present: HashSet<&str> = snapshots.iter().map(|s| s.icao24.as_str()).collect();

        let mut trails = self.trails.lock();
        trails.retain(|icao24, _| present.contains(icao24.as_str()));

        for snapshot in snapshots {
            if !snapshot.ground_speed_kt.is_some_and(|kt| kt > TRAIL_MIN_KTS) {
                continue;
            }

            let trail = trails.entry(snapshot.icao24.clone()).or_default();
            let moved = trail.back().map_or(true, |last| {
                haversine_meters(last.position(), snapshot.position()) >= MIN_MOVE_METERS
            });
            if !moved {
                continue;
            }

            trail.push_back(TrailPoint {
                icao24: snapshot.icao24.clone(),
                lat: snapshot.lat,
                lon: snapshot.lon,
                timestamp_ms: now_ms,
            });

            while trail.front().is_some_and(|p| p.timestamp_ms < cutoff_ms) {
                trail.pop_front();
            }
            while trail.len() > MAX_TRAIL_POINTS {
                trail.pop_front();
            }
        }
    }

    /// Unexpired points for one aircraft, oldest first.
    pub fn trail(&self, icao24: &str, now: DateTime<Utc>) -> Vec<TrailPoint> {
        let cutoff_ms = now.timestamp_millis() - MAX_TRAIL_AGE.as_millis() as i64;
        self.trails
            .lock()
            .get(icao24)
            .map(|trail| {
                trail
                    .iter()
                    .filter(|p| p.timestamp_ms >= cutoff_ms)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Unexpired trails for every tracked aircraft, keyed by `icao24`.
    pub fn all(&self, now: DateTime<Utc>) -> BTreeMap<String, Vec<TrailPoint>> {
        let icaos: Vec<String> = self.trails.lock().keys().cloned().collect();
        icaos
            .into_iter()
            .map(|icao24| {
                let trail = self.trail(&icao24, now);
                (icao24, trail)
            })
            .filter(|(_, trail)| !trail.is_empty())
            .collect()
    }

    /// Number of aircraft with a trail entry.
    pub fn len(&self) -> usize {
        self.trails.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
