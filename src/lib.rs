//! rpc-cachetools - fallback-aware response caching for RPC service proxies
//!
//! Wraps a [`RemoteCaller`] so that successful responses are cached and
//! cached responses are used either proactively (cache-first: never call
//! the remote again for identical arguments) or reactively (call the
//! remote, but fall back to the cached response if the call errors or is
//! too slow). Resiliency and latency at the expense of consistency: do not
//! route state-changing calls through it.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use rpc_cachetools::{CacheRegistry, CachedServiceProxy, CallArgs, MethodRouter};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> rpc_cachetools::Result<()> {
//!     // Stand-in for a real RPC transport.
//!     let remote = MethodRouter::new("some_other_service").route(
//!         "some_method",
//!         |call: CallArgs| async move {
//!             Ok::<_, rpc_cachetools::CachetoolsError>(call.args[0].clone())
//!         },
//!     );
//!
//!     // Share one registry between every proxy in the application.
//!     let registry = CacheRegistry::new();
//!     let proxy = CachedServiceProxy::builder(Arc::new(remote))
//!         .cache_registry(registry.clone())
//!         .failover_timeout(Duration::from_secs(1))
//!         .build();
//!
//!     let reply = proxy
//!         .method("some_method")
//!         .call(CallArgs::new().arg("hi").kwarg("some_arg", true))
//!         .await?;
//!     assert_eq!(reply, json!("hi"));
//!
//!     // Operators and tests can reset the cache directly.
//!     proxy.cache().reset();
//!     Ok(())
//! }
//! ```

pub mod cache;
#[cfg(feature = "config")]
pub mod config;
pub mod error;
pub mod gateway;
pub mod remote;
pub mod telemetry;
pub mod traits;
pub mod types;

// Re-export main types at crate root
pub use cache::{
    BoundedCache, BoundedCacheConfig, CacheBackend, CacheRegistry, MemoryCache, ServiceCache,
};
pub use error::{CachetoolsError, Result};
pub use gateway::{CachedServiceProxy, CallPolicy, GatewayBuilder, GatewayConfig, MethodProxy};
pub use remote::MethodRouter;
pub use traits::RemoteCaller;
pub use types::{CacheKey, CallArgs, Value};
