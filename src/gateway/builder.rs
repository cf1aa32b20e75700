//! Builder for configuring gateway instances

use std::sync::Arc;
use std::time::Duration;

use super::policy::GatewayConfig;
use super::proxy::CachedServiceProxy;
use crate::cache::CacheRegistry;
use crate::traits::RemoteCaller;

/// Builder for [`CachedServiceProxy`].
///
/// ```rust
/// # use rpc_cachetools::{CacheRegistry, CachedServiceProxy, MethodRouter};
/// # use std::sync::Arc;
/// # use std::time::Duration;
/// let registry = CacheRegistry::new();
/// let remote = Arc::new(MethodRouter::new("accounts"));
///
/// let proxy = CachedServiceProxy::builder(remote)
///     .cache_registry(registry.clone())
///     .failover_timeout(Duration::from_secs(1))
///     .build();
///
/// assert_eq!(proxy.service(), "accounts");
/// assert_eq!(registry.services(), vec!["accounts".to_string()]);
/// ```
pub struct GatewayBuilder {
    remote: Arc<dyn RemoteCaller>,
    registry: Option<CacheRegistry>,
    config: GatewayConfig,
}

impl GatewayBuilder {
    pub fn new(remote: Arc<dyn RemoteCaller>) -> Self {
        Self {
            remote,
            registry: None,
            config: GatewayConfig::default(),
        }
    }

    /// Share cached responses through `registry`.
    ///
    /// Without one, the proxy gets a private registry of its own.
    pub fn cache_registry(mut self, registry: CacheRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Replace the whole configuration.
    pub fn config(mut self, config: GatewayConfig) -> Self {
        self.config = config;
        self
    }

    /// Race warm calls against `timeout`, serving the cached response if
    /// the remote is slower. Zero disables the race.
    pub fn failover_timeout(mut self, timeout: Duration) -> Self {
        self.config.failover_timeout = timeout;
        self
    }

    /// Serve warm keys from the cache without calling the remote.
    pub fn cache_first(mut self) -> Self {
        self.config.use_cache_first = true;
        self
    }

    /// Include the method name in cache keys.
    pub fn key_by_method(mut self, enabled: bool) -> Self {
        self.config.key_by_method = enabled;
        self
    }

    pub fn build(self) -> CachedServiceProxy {
        let registry = self.registry.unwrap_or_default();
        CachedServiceProxy::new(self.remote, &registry, self.config)
    }
}
