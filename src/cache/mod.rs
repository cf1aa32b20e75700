//! Caching subsystem.
//!
//! Two layers:
//!
//! - [`CacheRegistry`] — the outer mapping from target-service name to that
//!   service's private cache. Construct one at wiring time and hand it to
//!   every gateway that should share cached responses. Gateways addressing
//!   different services never see each other's keys.
//!
//! - [`ServiceCache`] — one service's cache. Wraps a swappable
//!   [`CacheBackend`] so operators and tests can reset or replace the
//!   store wholesale; gateways resolve the current backend on every call.
//!
//! Backends:
//!
//! - [`MemoryCache`] — unbounded map, the default. No TTL, no eviction.
//! - [`BoundedCache`] — moka LRU with optional TTL.

mod bounded;
mod memory;

pub use bounded::{BoundedCache, BoundedCacheConfig};
pub use memory::MemoryCache;

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use serde_json::Value;

use crate::types::CacheKey;

/// Storage for one service's cached responses.
///
/// Implementations must be safe for concurrent lookup and insert. Each key
/// holds exactly one value, the most recent insert.
pub trait CacheBackend: Send + Sync {
    /// Look up a cached value. Returns `None` on a cold key.
    fn get(&self, key: &CacheKey) -> Option<Value>;

    /// Insert or overwrite the value for `key`.
    fn insert(&self, key: CacheKey, value: Value);

    /// Remove and return the value for `key`.
    fn remove(&self, key: &CacheKey) -> Option<Value>;

    /// Drop every entry.
    fn clear(&self);

    /// Number of entries currently cached.
    fn len(&self) -> u64;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Builds the backend for a newly registered service.
pub type BackendFactory = Arc<dyn Fn() -> Arc<dyn CacheBackend> + Send + Sync>;

// ============================================================================
// ServiceCache
// ============================================================================

/// Cache for a single target service.
///
/// All gateways for the same service over the same [`CacheRegistry`] hold
/// the same `Arc<ServiceCache>`.
pub struct ServiceCache {
    service: String,
    backend: RwLock<Arc<dyn CacheBackend>>,
}

impl ServiceCache {
    /// Create a standalone cache for `service` over `backend`.
    pub fn new(service: impl Into<String>, backend: Arc<dyn CacheBackend>) -> Self {
        Self {
            service: service.into(),
            backend: RwLock::new(backend),
        }
    }

    /// Name of the service this cache belongs to.
    pub fn service(&self) -> &str {
        &self.service
    }

    /// The backend currently in use.
    pub fn backend(&self) -> Arc<dyn CacheBackend> {
        Arc::clone(&self.backend.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// Swap in a different backend. Subsequent calls see only `backend`.
    ///
    /// Returns the previous backend.
    pub fn replace(&self, backend: Arc<dyn CacheBackend>) -> Arc<dyn CacheBackend> {
        let mut current = self.backend.write().unwrap_or_else(PoisonError::into_inner);
        std::mem::replace(&mut *current, backend)
    }

    /// Drop every entry, reverting every key to cold.
    pub fn reset(&self) {
        self.backend().clear();
    }

    pub fn get(&self, key: &CacheKey) -> Option<Value> {
        self.backend().get(key)
    }

    pub fn insert(&self, key: CacheKey, value: Value) {
        self.backend().insert(key, value);
    }

    pub fn remove(&self, key: &CacheKey) -> Option<Value> {
        self.backend().remove(key)
    }

    pub fn len(&self) -> u64 {
        self.backend().len()
    }

    pub fn is_empty(&self) -> bool {
        self.backend().is_empty()
    }
}

impl fmt::Debug for ServiceCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceCache")
            .field("service", &self.service)
            .field("entries", &self.len())
            .finish()
    }
}

// ============================================================================
// CacheRegistry
// ============================================================================

/// Outer mapping from service name to its [`ServiceCache`].
///
/// Cheap to clone; clones share the same services.
///
/// ```rust
/// # use rpc_cachetools::CacheRegistry;
/// # use std::sync::Arc;
/// let registry = CacheRegistry::new();
/// let a = registry.for_service("accounts");
/// let b = registry.for_service("accounts");
/// assert!(Arc::ptr_eq(&a, &b));
/// ```
#[derive(Clone)]
pub struct CacheRegistry {
    services: Arc<RwLock<HashMap<String, Arc<ServiceCache>>>>,
    factory: BackendFactory,
}

impl CacheRegistry {
    /// Registry whose services get unbounded [`MemoryCache`]s.
    pub fn new() -> Self {
        Self::with_factory(Arc::new(|| {
            Arc::new(MemoryCache::new()) as Arc<dyn CacheBackend>
        }))
    }

    /// Registry whose services get [`BoundedCache`]s built from `config`.
    pub fn bounded(config: BoundedCacheConfig) -> Self {
        Self::with_factory(Arc::new(move || {
            Arc::new(BoundedCache::new(&config)) as Arc<dyn CacheBackend>
        }))
    }

    /// Registry using a custom backend per service.
    pub fn with_factory(factory: BackendFactory) -> Self {
        Self {
            services: Arc::new(RwLock::new(HashMap::new())),
            factory,
        }
    }

    /// Get the cache for `service`, creating it on first use.
    ///
    /// Uses double-checked locking so concurrent first calls agree on a
    /// single cache object.
    pub fn for_service(&self, service: &str) -> Arc<ServiceCache> {
        // Fast path: already registered (read lock)
        if let Some(cache) = self.get(service) {
            return cache;
        }

        // Slow path: register (write lock)
        let mut services = self.services.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(cache) = services.get(service) {
            return Arc::clone(cache);
        }
        let cache = Arc::new(ServiceCache::new(service, (self.factory)()));
        services.insert(service.to_string(), Arc::clone(&cache));
        cache
    }

    /// Get the cache for `service` if one was created.
    pub fn get(&self, service: &str) -> Option<Arc<ServiceCache>> {
        self.services
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(service)
            .cloned()
    }

    /// Names of all registered services, sorted.
    pub fn services(&self) -> Vec<String> {
        let mut names: Vec<_> = self
            .services
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        names.sort();
        names
    }

    /// Reset every registered service cache to empty.
    pub fn reset_all(&self) {
        let services = self.services.read().unwrap_or_else(PoisonError::into_inner);
        for cache in services.values() {
            cache.reset();
        }
    }
}

impl Default for CacheRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for CacheRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheRegistry")
            .field("services", &self.services())
            .finish()
    }
}
