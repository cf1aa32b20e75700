//! Bounded LRU (+ optional TTL) cache backend, backed by moka.
//!
//! Useful for long-running hosts where the set of distinct call
//! arguments is unbounded. Evicted or expired keys behave exactly like
//! cold keys: the next call goes to the remote and errors propagate.

use std::time::Duration;

use moka::sync::Cache;
use serde_json::Value;

use super::CacheBackend;
use crate::types::CacheKey;

/// Configuration for [`BoundedCache`].
///
/// ```rust
/// # use rpc_cachetools::BoundedCacheConfig;
/// # use std::time::Duration;
/// let config = BoundedCacheConfig::new()
///     .max_entries(10_000)
///     .ttl(Duration::from_secs(3600));
/// ```
#[derive(Debug, Clone)]
pub struct BoundedCacheConfig {
    /// Maximum number of cached entries. Default: 10,000.
    pub max_entries: u64,
    /// Time-to-live for cached entries. Default: none (no expiry).
    pub ttl: Option<Duration>,
}

impl Default for BoundedCacheConfig {
    fn default() -> Self {
        Self {
            max_entries: 10_000,
            ttl: None,
        }
    }
}

impl BoundedCacheConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum number of cached entries.
    pub fn max_entries(mut self, n: u64) -> Self {
        self.max_entries = n;
        self
    }

    /// Expire entries this long after insertion.
    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }
}

/// Thread-safe bounded store keyed on [`CacheKey`].
pub struct BoundedCache {
    entries: Cache<CacheKey, Value>,
}

impl BoundedCache {
    pub fn new(config: &BoundedCacheConfig) -> Self {
        let mut builder = Cache::builder().max_capacity(config.max_entries);
        if let Some(ttl) = config.ttl {
            builder = builder.time_to_live(ttl);
        }
        Self {
            entries: builder.build(),
        }
    }

    /// Apply pending evictions so `len()` is exact. Mostly for tests.
    pub fn run_pending_tasks(&self) {
        self.entries.run_pending_tasks();
    }
}

impl CacheBackend for BoundedCache {
    fn get(&self, key: &CacheKey) -> Option<Value> {
        self.entries.get(key)
    }

    fn insert(&self, key: CacheKey, value: Value) {
        self.entries.insert(key, value);
    }

    fn remove(&self, key: &CacheKey) -> Option<Value> {
        self.entries.remove(key)
    }

    fn clear(&self) {
        self.entries.invalidate_all();
        self.entries.run_pending_tasks();
    }

    fn len(&self) -> u64 {
        self.entries.entry_count()
    }
}
