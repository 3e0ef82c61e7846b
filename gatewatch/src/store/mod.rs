//! Durable cache store.
//!
//! The durable tier is the source of truth for cache entries across process
//! restarts and the only state shared between process instances. It is
//! treated as a plain key-value interface: single-row upserts keyed by
//! (base, radius), last writer wins.
//!
//! Two extra collections back the history recorder: latest state per
//! `icao24` and an append-only track-point log per base.
//!
//! - [`MemoryStore`] - in-process maps, for tests and single-instance runs
//! - [`FileStore`] - JSON files under a directory

mod error;
mod file;
mod memory;

use std::future::Future;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::aircraft::AircraftSnapshot;
use crate::cache::{CacheEntry, CacheKey};

pub use error::StoreError;
pub use file::FileStore;
pub use memory::MemoryStore;

/// One logged position, keyed by (base, icao24, ts).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackPoint {
    pub base: String,
    pub icao24: String,
    pub ts: DateTime<Utc>,
    pub lat: f64,
    pub lon: f64,
    pub ground_speed_kt: Option<f64>,
    pub track: Option<f64>,
    pub on_ground: bool,
}

impl TrackPoint {
    /// Track point for a snapshot observed at one base.
    pub fn from_snapshot(base: &str, snapshot: &AircraftSnapshot) -> Self {
        Self {
            base: base.to_string(),
            icao24: snapshot.icao24.clone(),
            ts: snapshot.updated_at,
            lat: snapshot.lat,
            lon: snapshot.lon,
            ground_speed_kt: snapshot.ground_speed_kt,
            track: snapshot.track,
            on_ground: snapshot.on_ground,
        }
    }
}

/// Key-value interface over the durable store.
pub trait DurableStore: Send + Sync {
    /// Read the cache entry for a key.
    fn read_by_key(
        &self,
        key: &CacheKey,
    ) -> impl Future<Output = Result<Option<CacheEntry>, StoreError>> + Send;

    /// Insert or replace the cache entry for `entry.key`.
    fn upsert(&self, entry: &CacheEntry) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Upsert the latest known state of each aircraft, keyed by `icao24`.
    fn upsert_latest(
        &self,
        base: &str,
        aircraft: &[AircraftSnapshot],
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Append track points; a point with an existing (base, icao24, ts) is skipped.
    fn insert_track_points(
        &self,
        points: &[TrackPoint],
    ) -> impl Future<Output = Result<(), StoreError>> + Send;
}

/// Durable store chosen at startup from configuration.
pub enum StoreBackend {
    Memory(MemoryStore),
    File(FileStore),
}

impl StoreBackend {
    /// File-backed store under `directory`, or an in-memory store when `None`.
    pub async fn open(directory: Option<&std::path::Path>) -> Result<Self, StoreError> {
        match directory {
            Some(dir) => Ok(Self::File(FileStore::open(dir).await?)),
            None => Ok(Self::Memory(MemoryStore::new())),
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Self::Memory(_) => "memory".to_string(),
            Self::File(store) => format!("files under {}", store.root().display()),
        }
    }
}

impl DurableStore for StoreBackend {
    async fn read_by_key(&self, key: &CacheKey) -> Result<Option<CacheEntry>, StoreError> {
        match self {
            Self::Memory(store) => store.read_by_key(key).await,
            Self::File(store) => store.read_by_key(key).await,
        }
    }

    async fn upsert(&self, entry: &CacheEntry) -> Result<(), StoreError> {
        match self {
            Self::Memory(store) => store.upsert(entry).await,
            Self::File(store) => store.upsert(entry).await,
        }
    }

    async fn upsert_latest(
        &self,
        base: &str,
        aircraft: &[AircraftSnapshot],
    ) -> Result<(), StoreError> {
        match self {
            Self::Memory(store) => store.upsert_latest(base, aircraft).await,
            Self::File(store) => store.upsert_latest(base, aircraft).await,
        }
    }

    async fn insert_track_points(&self, points: &[TrackPoint]) -> Result<(), StoreError> {
        match self {
            Self::Memory(store) => store.insert_track_points(points).await,
            Self::File(store) => store.insert_track_points(points).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn entry() -> CacheEntry {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        CacheEntry::fresh(CacheKey::new("SAV", 50.0), vec![], at)
    }

    #[tokio::test]
    async fn test_backend_without_directory_is_memory() {
        let backend = StoreBackend::open(None).await.unwrap();
        assert_eq!(backend.describe(), "memory");

        backend.upsert(&entry()).await.unwrap();
        let read = backend.read_by_key(&entry().key).await.unwrap();
        assert_eq!(read, Some(entry()));
    }

    #[tokio::test]
    async fn test_backend_with_directory_is_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let backend = StoreBackend::open(Some(dir.path())).await.unwrap();
        assert!(backend.describe().starts_with("files under"));

        backend.upsert(&entry()).await.unwrap();
        assert!(backend.read_by_key(&entry().key).await.unwrap().is_some());
    }
}
