//! In-process durable store.

use std::collections::{BTreeMap, HashMap};

use parking_lot::Mutex;

use super::{DurableStore, StoreError, TrackPoint};
use crate::aircraft::AircraftSnapshot;
use crate::cache::{CacheEntry, CacheKey};

/// Durable store backed by in-process maps.
///
/// Survives nothing; useful for tests and for single-instance deployments
/// that do not need entries to outlive the process.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<CacheKey, CacheEntry>>,
    latest: Mutex<HashMap<String, BTreeMap<String, AircraftSnapshot>>>,
    tracks: Mutex<HashMap<String, BTreeMap<(String, i64), TrackPoint>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entry_count(&self) -> usize {
        self.entries.lock().len()
    }

    /// Synchronous read, for inspection.
    pub fn get(&self, key: &CacheKey) -> Option<CacheEntry> {
        self.entries.lock().get(key).cloned()
    }

    /// Latest snapshots recorded for a base, ordered by `icao24`.
    pub fn latest(&self, base: &str) -> Vec<AircraftSnapshot> {
        self.latest
            .lock()
            .get(base)
            .map(|m| m.values().cloned().collect())
            .unwrap_or_default()
    }

    /// Track points recorded for a base, ordered by (icao24, ts).
    pub fn track_points(&self, base: &str) -> Vec<TrackPoint> {
        self.tracks
            .lock()
            .get(base)
            .map(|m| m.values().cloned().collect())
            .unwrap_or_default()
    }
}

impl DurableStore for MemoryStore {
    async fn read_by_key(&self, key: &CacheKey) -> Result<Option<CacheEntry>, StoreError> {
        Ok(self.get(key))
    }

    async fn upsert(&self, entry: &CacheEntry) -> Result<(), StoreError> {
        self.entries.lock().insert(entry.key.clone(), entry.clone());
        Ok(())
    }

    async fn upsert_latest(
        &self,
        base: &str,
        aircraft: &[AircraftSnapshot],
    ) -> Result<(), StoreError> {
        let mut latest = self.latest.lock();
        let per_base = latest.entry(base.to_string()).or_default();
        for snapshot in aircraft {
            per_base.insert(snapshot.icao24.clone(), snapshot.clone());
        }
        Ok(())
    }

    async fn insert_track_points(&self, points: &[TrackPoint]) -> Result<(), StoreError> {
        let mut tracks = self.tracks.lock();
        for point in points {
            tracks
                .entry(point.base.clone())
                .or_default()
                .entry((point.icao24.clone(), point.ts.timestamp_millis()))
                .or_insert_with(|| point.clone());
        }
        Ok(())
    }
}
