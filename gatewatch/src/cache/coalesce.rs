//! In-flight request coalescing for live fetches.
//!
//! When several pollers ask for the same key while a live fetch is running,
//! only the first (the leader) goes upstream. The rest subscribe to the
//! leader's broadcast channel and receive the same outcome.
//!
//! ```text
//! Request A ─┐
//!            │                          Upstream
//! Request B ─┼──► InFlightRegistry ───► fetch (leader only)
//!            │          │                   │
//! Request C ─┘          ▼                   ▼
//!               [B, C wait on the    [one network call]
//!                leader's channel]◄─────────┘
//! ```
//!
//! A leader that is dropped before completing removes its slot, which closes
//! the channel. Followers see the close and register again, so one of them
//! becomes the next leader instead of waiting forever.

use std::collections::HashMap;
use std::hash::Hash;

use parking_lot::Mutex;
use tokio::sync::broadcast;
use tracing::debug;

/// Registry of in-flight work keyed by `K`, broadcasting `T` to waiters.
pub struct InFlightRegistry<K, T> {
    in_flight: Mutex<HashMap<K, broadcast::Sender<T>>>,
}

/// Outcome of registering interest in a key.
pub enum Registration<'a, K: Eq + Hash + Clone, T: Clone> {
    /// First caller for the key; must do the work and call `complete`.
    Leader(LeaderGuard<'a, K, T>),
    /// Work is already running; wait on the receiver.
    Follower(broadcast::Receiver<T>),
}

impl<K, T> InFlightRegistry<K, T>
where
    K: Eq + Hash + Clone + std::fmt::Debug,
    T: Clone,
{
    pub fn new() -> Self {
        Self {
            in_flight: Mutex::new(HashMap::new()),
        }
    }

    /// Register for `key`, becoming the leader if nothing is in flight.
    pub fn register(&self, key: &K) -> Registration<'_, K, T> {
        let mut in_flight = self.in_flight.lock();

        if let Some(tx) = in_flight.get(key) {
            debug!(key = ?key, "Coalescing request onto in-flight fetch");
            return Registration::Follower(tx.subscribe());
        }

        // One message is ever sent per channel.
        let (tx, _rx) = broadcast::channel(1);
        in_flight.insert(key.clone(), tx);
        debug!(key = ?key, in_flight = in_flight.len(), "New in-flight fetch");

        Registration::Leader(LeaderGuard {
            registry: self,
            key: Some(key.clone()),
        })
    }

    /// Number of keys with a fetch in flight.
    pub fn len(&self) -> usize {
        self.in_flight.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn remove(&self, key: &K) -> Option<broadcast::Sender<T>> {
        self.in_flight.lock().remove(key)
    }
}

impl<K, T> Default for InFlightRegistry<K, T>
where
    K: Eq + Hash + Clone + std::fmt::Debug,
    T: Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

/// Leader's hold on an in-flight slot.
///
/// Dropping without calling [`complete`](Self::complete) releases the slot
/// and closes the channel.
pub struct LeaderGuard<'a, K: Eq + Hash + Clone, T: Clone> {
    registry: &'a InFlightRegistry<K, T>,
    key: Option<K>,
}

impl<K, T> LeaderGuard<'_, K, T>
where
    K: Eq + Hash + Clone + std::fmt::Debug,
    T: Clone,
{
    /// Release the slot and hand `value` to every waiter.
    pub fn complete(mut self, value: T) {
        let Some(key) = self.key.take() else {
            return;
        };

        if let Some(tx) = self.registry.remove(&key) {
            let waiters = tx.receiver_count();
            // Send fails only when nobody is waiting.
            let _ = tx.send(value);
            if waiters > 0 {
                debug!(key = ?key, waiters, "Broadcast fetch outcome to coalesced waiters");
            }
        }
    }
}

impl<K, T> Drop for LeaderGuard<'_, K, T>
where
    K: Eq + Hash + Clone,
    T: Clone,
{
    fn drop(&mut self) {
        if let Some(key) = self.key.take() {
            self.registry.in_flight.lock().remove(&key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    #[test]
    fn test_first_registration_leads() {
        let registry: InFlightRegistry<String, u32> = InFlightRegistry::new();
        let first = registry.register(&"SAV".to_string());
        assert!(matches!(first, Registration::Leader(_)));
        assert_eq!(registry.len(), 1);

        let second = registry.register(&"SAV".to_string());
        assert!(matches!(second, Registration::Follower(_)));

        let other = registry.register(&"CLT".to_string());
        assert!(matches!(other, Registration::Leader(_)));
        assert_eq!(registry.len(), 2);
    }

    #[tokio::test]
    async fn test_complete_broadcasts_to_followers() {
        let registry: InFlightRegistry<String, u32> = InFlightRegistry::new();
        let key = "SAV".to_string();

        let Registration::Leader(guard) = registry.register(&key) else {
            panic!("expected leader");
        };
        let Registration::Follower(mut rx1) = registry.register(&key) else {
            panic!("expected follower");
        };
        let Registration::Follower(mut rx2) = registry.register(&key) else {
            panic!("expected follower");
        };

        guard.complete(42);

        assert_eq!(rx1.recv().await.unwrap(), 42);
        assert_eq!(rx2.recv().await.unwrap(), 42);
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn test_dropped_leader_closes_channel() {
        let registry: InFlightRegistry<String, u32> = InFlightRegistry::new();
        let key = "SAV".to_string();

        let leader = registry.register(&key);
        let Registration::Follower(mut rx) = registry.register(&key) else {
            panic!("expected follower");
        };

        drop(leader);

        assert!(rx.recv().await.is_err());
        assert!(registry.is_empty());
        assert!(matches!(registry.register(&key), Registration::Leader(_)));
    }

    #[tokio::test]
    async fn test_concurrent_waiters_receive_same_value() {
        let registry: Arc<InFlightRegistry<String, u32>> = Arc::new(InFlightRegistry::new());
        let key = "SAV".to_string();

        let Registration::Leader(guard) = registry.register(&key) else {
            panic!("expected leader");
        };

        let mut handles = Vec::new();
        for _ in 0..5 {
            let Registration::Follower(mut rx) = registry.register(&key) else {
                panic!("expected follower");
            };
            handles.push(tokio::spawn(async move { rx.recv().await.unwrap() }));
        }

        tokio::time::sleep(Duration::from_millis(10)).await;
        guard.complete(7);

        for handle in handles {
            assert_eq!(handle.await.unwrap(), 7);
        }
    }
}
