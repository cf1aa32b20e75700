//! CachedServiceProxy - memoizing, fallback-aware gateway to one service
//!
//! # Call flow
//!
//! ```text
//! proxy.call("get_user", args)
//!         │
//!         ▼
//!   key = canonicalize(args)  ──►  ServiceCache lookup (current backend)
//!         │
//!         ▼
//!   GatewayConfig::select(cached)
//!         │
//!         ├── ServeCached ──► return cached value (remote untouched)
//!         │
//!         ├── Race ────────► spawn real call ─┬─ finishes first ─► cache + return
//!         │                                   │   (error: return cached)
//!         │                                   └─ deadline first ─► return cached,
//!         │                                       call keeps running detached and
//!         │                                       refreshes the cache on success
//!         │
//!         └── PassThrough ─► await real call ─┬─ ok ─► cache + return
//!                                             └─ error ─► cached value or propagate
//! ```

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use futures_util::FutureExt;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, error, instrument, warn};

use super::builder::GatewayBuilder;
use super::policy::{CallPolicy, GatewayConfig};
use crate::cache::{CacheRegistry, ServiceCache};
use crate::telemetry;
use crate::traits::RemoteCaller;
use crate::types::CacheKey;
use crate::{CachetoolsError, CallArgs, Result};

/// Gateway wrapping a [`RemoteCaller`] with a per-service response cache.
///
/// Every successful real call overwrites the cache entry for its
/// arguments. Cached entries are used either proactively (cache-first) or
/// reactively (when the real call fails or overruns its deadline). An
/// error reaches the caller only when there is no cached entry to serve.
///
/// Do not route state-changing calls through this proxy.
pub struct CachedServiceProxy {
    remote: Arc<dyn RemoteCaller>,
    cache: Arc<ServiceCache>,
    config: GatewayConfig,
}

impl CachedServiceProxy {
    /// Start building a proxy around `remote`.
    pub fn builder(remote: Arc<dyn RemoteCaller>) -> GatewayBuilder {
        GatewayBuilder::new(remote)
    }

    /// Create a proxy sharing `registry`'s cache for the remote's service.
    pub fn new(
        remote: Arc<dyn RemoteCaller>,
        registry: &CacheRegistry,
        config: GatewayConfig,
    ) -> Self {
        let cache = registry.for_service(remote.service());
        Self {
            remote,
            cache,
            config,
        }
    }

    /// Target service name.
    pub fn service(&self) -> &str {
        self.cache.service()
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// This service's cache, for inspection or reset.
    pub fn cache(&self) -> &Arc<ServiceCache> {
        &self.cache
    }

    /// Bind a method name, returning a callable proxy for it.
    pub fn method(&self, name: impl Into<String>) -> MethodProxy<'_> {
        MethodProxy {
            gateway: self,
            method: name.into(),
        }
    }

    /// The cache key this proxy uses for `method` called with `call`.
    pub fn cache_key(&self, method: &str, call: &CallArgs) -> CacheKey {
        if self.config.key_by_method {
            CacheKey::for_method_call(method, call)
        } else {
            CacheKey::for_call(call)
        }
    }

    /// Call `method` through the cache.
    #[instrument(skip(self, call), fields(service = %self.service()))]
    pub async fn call(&self, method: &str, call: CallArgs) -> Result<Value> {
        let key = self.cache_key(method, &call);
        let cached = self.cache.get(&key);
        self.record_lookup(cached.is_some());

        match self.config.select(cached) {
            CallPolicy::ServeCached(value) => {
                debug!(method, "serving cached response");
                self.record_call(method, "cache");
                Ok(value)
            }
            CallPolicy::Race { fallback, deadline } => {
                self.race(method, call, key, fallback, deadline).await
            }
            CallPolicy::PassThrough { fallback } => {
                self.pass_through(method, &call, key, fallback).await
            }
        }
    }

    /// Call `method` and deserialize the response.
    pub async fn call_as<T: DeserializeOwned>(&self, method: &str, call: CallArgs) -> Result<T> {
        let value = self.call(method, call).await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Await the real call with no deadline.
    ///
    /// A panicking remote is reported as [`CachetoolsError::TaskFailed`],
    /// the same as a panic inside a raced call.
    async fn pass_through(
        &self,
        method: &str,
        call: &CallArgs,
        key: CacheKey,
        fallback: Option<Value>,
    ) -> Result<Value> {
        let start = Instant::now();
        let result = AssertUnwindSafe(self.remote.invoke(method, call))
            .catch_unwind()
            .await
            .unwrap_or_else(|panic| Err(CachetoolsError::TaskFailed(panic_message(&*panic))));
        self.record_duration(method, start);

        match result {
            Ok(value) => {
                self.cache.insert(key, value.clone());
                self.record_call(method, "remote");
                Ok(value)
            }
            Err(e) => self.fall_back(method, fallback, e),
        }
    }

    /// Race the real call against `deadline`.
    ///
    /// The real call runs on its own task so it can outlive this call when
    /// the deadline wins; dropping the `timeout` future cancels the timer
    /// when the call wins.
    async fn race(
        &self,
        method: &str,
        call: CallArgs,
        key: CacheKey,
        fallback: Value,
        deadline: Duration,
    ) -> Result<Value> {
        let start = Instant::now();
        let mut task = {
            let remote = Arc::clone(&self.remote);
            let cache = Arc::clone(&self.cache);
            let method = method.to_owned();
            tokio::spawn(async move {
                let result = remote.invoke(&method, &call).await;
                if let Ok(ref value) = result {
                    cache.insert(key, value.clone());
                }
                result
            })
        };

        let outcome = tokio::time::timeout(deadline, &mut task).await;
        self.record_duration(method, start);

        match outcome {
            Ok(Ok(Ok(value))) => {
                self.record_call(method, "remote");
                Ok(value)
            }
            Ok(Ok(Err(e))) => self.fall_back(method, Some(fallback), e),
            Ok(Err(join_err)) => self.fall_back(method, Some(fallback), join_err.into()),
            Err(_elapsed) => {
                self.watch_abandoned(method, task);
                self.fall_back(method, Some(fallback), CachetoolsError::Timeout(deadline))
            }
        }
    }

    /// Observe a real call whose deadline already fired. The call is not
    /// aborted; its cache refresh happens inside the task itself.
    fn watch_abandoned(&self, method: &str, task: tokio::task::JoinHandle<Result<Value>>) {
        let service = self.service().to_owned();
        let method = method.to_owned();
        tokio::spawn(async move {
            let status = match task.await {
                Ok(Ok(_)) => {
                    debug!(service = %service, method = %method, "late response refreshed cache");
                    "ok"
                }
                Ok(Err(e)) => {
                    debug!(service = %service, method = %method, error = %e, "late call failed");
                    "error"
                }
                Err(e) => {
                    debug!(service = %service, method = %method, error = %e, "late call task failed");
                    "error"
                }
            };
            metrics::counter!(telemetry::BACKGROUND_REFRESHES_TOTAL,
                "service" => service,
                "status" => status,
            )
            .increment(1);
        });
    }

    /// Serve `fallback` in place of a failed real call, or propagate `err`.
    fn fall_back(
        &self,
        method: &str,
        fallback: Option<Value>,
        err: CachetoolsError,
    ) -> Result<Value> {
        let reason = if err.is_timeout() { "timeout" } else { "error" };
        match fallback {
            Some(value) => {
                warn!(
                    service = self.service(),
                    method,
                    reason,
                    error = %err,
                    "remote call failed, serving cached response"
                );
                metrics::counter!(telemetry::FALLBACKS_TOTAL,
                    "service" => self.service().to_owned(),
                    "reason" => reason,
                )
                .increment(1);
                self.record_call(method, "fallback");
                Ok(value)
            }
            None => {
                error!(
                    service = self.service(),
                    method,
                    error = %err,
                    "remote call failed and no cached response exists"
                );
                Err(err)
            }
        }
    }

    // ========================================================================
    // Metrics recording
    // ========================================================================

    fn record_lookup(&self, hit: bool) {
        let name = if hit {
            telemetry::CACHE_HITS_TOTAL
        } else {
            telemetry::CACHE_MISSES_TOTAL
        };
        metrics::counter!(name, "service" => self.service().to_owned()).increment(1);
    }

    fn record_call(&self, method: &str, source: &'static str) {
        metrics::counter!(telemetry::CALLS_TOTAL,
            "service" => self.service().to_owned(),
            "method" => method.to_owned(),
            "source" => source,
        )
        .increment(1);
    }

    fn record_duration(&self, method: &str, start: Instant) {
        metrics::histogram!(telemetry::REMOTE_DURATION_SECONDS,
            "service" => self.service().to_owned(),
            "method" => method.to_owned(),
        )
        .record(start.elapsed().as_secs_f64());
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        format!("remote call panicked: {msg}")
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        format!("remote call panicked: {msg}")
    } else {
        "remote call panicked".to_string()
    }
}

#[async_trait]
impl RemoteCaller for CachedServiceProxy {
    fn service(&self) -> &str {
        CachedServiceProxy::service(self)
    }

    async fn invoke(&self, method: &str, call: &CallArgs) -> Result<Value> {
        self.call(method, call.clone()).await
    }
}

impl std::fmt::Debug for CachedServiceProxy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CachedServiceProxy")
            .field("service", &self.service())
            .field("config", &self.config)
            .finish()
    }
}

/// A [`CachedServiceProxy`] bound to one method name.
#[derive(Debug)]
pub struct MethodProxy<'a> {
    gateway: &'a CachedServiceProxy,
    method: String,
}

impl MethodProxy<'_> {
    pub fn name(&self) -> &str {
        &self.method
    }

    pub async fn call(&self, call: CallArgs) -> Result<Value> {
        self.gateway.call(&self.method, call).await
    }

    pub async fn call_as<T: DeserializeOwned>(&self, call: CallArgs) -> Result<T> {
        self.gateway.call_as(&self.method, call).await
    }

    pub fn cache_key(&self, call: &CallArgs) -> CacheKey {
        self.gateway.cache_key(&self.method, call)
    }
}
