//! Process-local shadow of the durable cache.

use std::time::Duration;

use chrono::{DateTime, Utc};
use dashmap::DashMap;

use super::types::{CacheEntry, CacheKey};

/// Concurrent map of recently fetched entries.
///
/// Entries are only served as fresh while `now - fetched_at` is under the TTL
/// the caller passes in and no failure has been recorded since. Other entries
/// stay in the map as the last known state for the key.
#[derive(Debug, Default)]
pub struct EphemeralCache {
    entries: DashMap<CacheKey, CacheEntry>,
}

impl EphemeralCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Entry for `key` if it was fetched less than `ttl` ago and has not
    /// failed since.
    pub fn get_fresh(&self, key: &CacheKey, now: DateTime<Utc>, ttl: Duration) -> Option<CacheEntry> {
        let entry = self.entries.get(key)?;
        if entry.cooldown_until.is_some() {
            return None;
        }
        let age_ms = entry.age_ms(now)?;
        if age_ms < ttl.as_millis() {
            Some(entry.value().clone())
        } else {
            None
        }
    }

    /// Last known entry for `key`, whatever its age.
    pub fn get(&self, key: &CacheKey) -> Option<CacheEntry> {
        self.entries.get(key).map(|entry| entry.value().clone())
    }

    pub fn insert(&self, entry: CacheEntry) {
        self.entries.insert(entry.key.clone(), entry);
    }

    pub fn remove(&self, key: &CacheKey) -> bool {
        self.entries.remove(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
