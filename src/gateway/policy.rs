//! Gateway configuration and per-call policy selection.

use std::time::Duration;

use serde_json::Value;

/// Per-gateway settings. Immutable once the gateway is built.
///
/// ```rust
/// # use rpc_cachetools::GatewayConfig;
/// # use std::time::Duration;
/// // Call the remote, but serve the cached response if it takes over 1s.
/// let failover = GatewayConfig::failover(Duration::from_secs(1));
/// assert!(failover.failover_enabled());
///
/// // Serve warm keys from the cache without calling the remote.
/// let cache_first = GatewayConfig::cache_first();
/// assert!(cache_first.use_cache_first);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GatewayConfig {
    /// Serve warm keys straight from the cache. Default: false.
    pub use_cache_first: bool,
    /// Deadline for the real call when a cached response exists.
    /// Zero disables the race. Default: zero.
    pub failover_timeout: Duration,
    /// Include the method name in cache keys. Default: false, so calls with
    /// equal arguments share an entry across methods of one service.
    pub key_by_method: bool,
}

impl GatewayConfig {
    /// Plain caching: always call the remote, fall back to the cache on error.
    pub fn new() -> Self {
        Self::default()
    }

    /// Caching with a fail-over deadline for warm keys.
    pub fn failover(timeout: Duration) -> Self {
        Self::default().failover_timeout(timeout)
    }

    /// Cache-first: warm keys never reach the remote.
    pub fn cache_first() -> Self {
        Self::default().use_cache_first(true)
    }

    pub fn use_cache_first(mut self, enabled: bool) -> Self {
        self.use_cache_first = enabled;
        self
    }

    pub fn failover_timeout(mut self, timeout: Duration) -> Self {
        self.failover_timeout = timeout;
        self
    }

    pub fn key_by_method(mut self, enabled: bool) -> Self {
        self.key_by_method = enabled;
        self
    }

    /// Whether warm calls race the remote against a deadline.
    pub fn failover_enabled(&self) -> bool {
        !self.failover_timeout.is_zero()
    }

    /// Decide how to answer a call given the cache lookup result.
    pub fn select(&self, cached: Option<Value>) -> CallPolicy {
        match cached {
            Some(value) if self.use_cache_first => CallPolicy::ServeCached(value),
            Some(value) if self.failover_enabled() => CallPolicy::Race {
                fallback: value,
                deadline: self.failover_timeout,
            },
            fallback => CallPolicy::PassThrough { fallback },
        }
    }
}

/// How a single call is answered.
#[derive(Debug, Clone, PartialEq)]
pub enum CallPolicy {
    /// Return the cached value; the remote is not invoked.
    ServeCached(Value),
    /// Race the real call against `deadline`; `fallback` answers on
    /// error or overrun.
    Race { fallback: Value, deadline: Duration },
    /// Await the real call with no deadline; on error return `fallback`
    /// if there is one, otherwise propagate.
    PassThrough { fallback: Option<Value> },
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn defaults() {
        let config = GatewayConfig::default();
        assert!(!config.use_cache_first);
        assert_eq!(config.failover_timeout, Duration::ZERO);
        assert!(!config.failover_enabled());
        assert!(!config.key_by_method);
    }

    #[test]
    fn cold_key_always_passes_through() {
        for config in [
            GatewayConfig::new(),
            GatewayConfig::cache_first(),
            GatewayConfig::failover(Duration::from_secs(1)),
            GatewayConfig::cache_first().failover_timeout(Duration::from_secs(1)),
        ] {
            assert_eq!(
                config.select(None),
                CallPolicy::PassThrough { fallback: None }
            );
        }
    }

    #[test]
    fn warm_key_cache_first_serves_cached() {
        let policy = GatewayConfig::cache_first().select(Some(json!("hi")));
        assert_eq!(policy, CallPolicy::ServeCached(json!("hi")));
    }

    #[test]
    fn warm_key_with_timeout_races() {
        let policy = GatewayConfig::failover(Duration::from_millis(250)).select(Some(json!(1)));
        assert_eq!(
            policy,
            CallPolicy::Race {
                fallback: json!(1),
                deadline: Duration::from_millis(250),
            }
        );
    }

    #[test]
    fn warm_key_without_timeout_passes_through_with_fallback() {
        let policy = GatewayConfig::new().select(Some(json!(1)));
        assert_eq!(
            policy,
            CallPolicy::PassThrough {
                fallback: Some(json!(1))
            }
        );
    }

    #[test]
    fn cache_first_wins_over_failover() {
        let config = GatewayConfig::cache_first().failover_timeout(Duration::from_secs(1));
        assert_eq!(
            config.select(Some(json!(1))),
            CallPolicy::ServeCached(json!(1))
        );
    }
}
