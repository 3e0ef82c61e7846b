//! Cache statistics tracking and reporting.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Lock-free counters for cache decisions.
#[derive(Debug, Default)]
pub struct CacheStats {
    memory_hits: AtomicU64,
    durable_hits: AtomicU64,
    cooldown_hits: AtomicU64,
    live_fetches: AtomicU64,
    live_failures: AtomicU64,
    coalesced_waits: AtomicU64,
    store_errors: AtomicU64,
}

/// Point-in-time copy of [`CacheStats`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStatsSnapshot {
    pub memory_hits: u64,
    pub durable_hits: u64,
    pub cooldown_hits: u64,
    pub live_fetches: u64,
    pub live_failures: u64,
    pub coalesced_waits: u64,
    pub store_errors: u64,
}

impl CacheStatsSnapshot {
    /// Fraction of requests answered without going upstream.
    pub fn hit_rate(&self) -> f64 {
        let hits = self.memory_hits + self.durable_hits + self.cooldown_hits;
        let total = hits + self.live_fetches;
        if total == 0 {
            0.0
        } else {
            hits as f64 / total as f64
        }
    }
}

impl CacheStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_memory_hit(&self) {
        self.memory_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_durable_hit(&self) {
        self.durable_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_cooldown_hit(&self) {
        self.cooldown_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_live_fetch(&self) {
        self.live_fetches.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_live_failure(&self) {
        self.live_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_coalesced_wait(&self) {
        self.coalesced_waits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_store_error(&self) {
        self.store_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> CacheStatsSnapshot {
        CacheStatsSnapshot {
            memory_hits: self.memory_hits.load(Ordering::Relaxed),
            durable_hits: self.durable_hits.load(Ordering::Relaxed),
            cooldown_hits: self.cooldown_hits.load(Ordering::Relaxed),
            live_fetches: self.live_fetches.load(Ordering::Relaxed),
            live_failures: self.live_failures.load(Ordering::Relaxed),
            coalesced_waits: self.coalesced_waits.load(Ordering::Relaxed),
            store_errors: self.store_errors.load(Ordering::Relaxed),
        }
    }
}
