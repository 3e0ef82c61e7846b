//! Cache freshness and backoff policy.

use std::time::Duration;

/// Default process-local TTL.
pub const DEFAULT_EPHEMERAL_TTL: Duration = Duration::from_millis(6_000);

/// Default durable freshness window.
pub const DEFAULT_FRESH_TTL: Duration = Duration::from_millis(5_000);

/// Cooldown after the first failure for a key.
pub const DEFAULT_COOLDOWN: Duration = Duration::from_secs(30);

/// Upper bound for the doubled cooldown.
pub const DEFAULT_MAX_COOLDOWN: Duration = Duration::from_secs(300);

/// Bound on any single durable store call.
pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(8);

/// Silence after which an aircraft is reported offline.
pub const DEFAULT_OFFLINE_AFTER: Duration = Duration::from_secs(120);

/// Default callsign allow-list.
pub const DEFAULT_FLEET_PREFIXES: &[&str] = &["JIA"];

/// Tunables for the cache coordinator.
#[derive(Debug, Clone, PartialEq)]
pub struct CachePolicy {
    pub ephemeral_ttl: Duration,
    pub fresh_ttl: Duration,
    pub cooldown: Duration,
    pub max_cooldown: Duration,
    pub store_timeout: Duration,
    pub offline_after: Duration,
    pub allowed_prefixes: Vec<String>,
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self {
            ephemeral_ttl: DEFAULT_EPHEMERAL_TTL,
            fresh_ttl: DEFAULT_FRESH_TTL,
            cooldown: DEFAULT_COOLDOWN,
            max_cooldown: DEFAULT_MAX_COOLDOWN,
            store_timeout: DEFAULT_STORE_TIMEOUT,
            offline_after: DEFAULT_OFFLINE_AFTER,
            allowed_prefixes: DEFAULT_FLEET_PREFIXES
                .iter()
                .map(|p| p.to_string())
                .collect(),
        }
    }
}

impl CachePolicy {
    /// Cooldown after `consecutive_failures` failures in a row.
    ///
    /// `cooldown * 2^(n-1)`, capped at `max_cooldown`.
    pub fn cooldown_for(&self, consecutive_failures: u32) -> Duration {
        let exponent = consecutive_failures.saturating_sub(1).min(20);
        self.cooldown
            .saturating_mul(2u32.saturating_pow(exponent))
            .min(self.max_cooldown)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cooldown_doubles_and_caps() {
        let policy = CachePolicy::default();
        assert_eq!(policy.cooldown_for(0), Duration::from_secs(30));
        assert_eq!(policy.cooldown_for(1), Duration::from_secs(30));
        assert_eq!(policy.cooldown_for(2), Duration::from_secs(60));
        assert_eq!(policy.cooldown_for(3), Duration::from_secs(120));
        assert_eq!(policy.cooldown_for(4), Duration::from_secs(240));
        assert_eq!(policy.cooldown_for(5), DEFAULT_MAX_COOLDOWN);
        assert_eq!(policy.cooldown_for(u32::MAX), DEFAULT_MAX_COOLDOWN);
    }

    #[test]
    fn test_default_prefixes() {
        assert_eq!(CachePolicy::default().allowed_prefixes, vec!["JIA"]);
    }
}
