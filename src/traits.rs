//! Core RemoteCaller trait

use async_trait::async_trait;
use serde_json::Value;

use crate::{CallArgs, Result};

/// Capability to invoke methods on one remote service.
///
/// Supplied by the host RPC framework: transport, wire encoding and
/// connection management live behind this trait. Failures should be
/// reported as [`CachetoolsError::Remote`](crate::CachetoolsError::Remote)
/// or [`CachetoolsError::Timeout`](crate::CachetoolsError::Timeout).
///
/// [`CachedServiceProxy`](crate::CachedServiceProxy) implements this trait
/// too, so a caching proxy can stand in wherever the plain caller was used.
#[async_trait]
pub trait RemoteCaller: Send + Sync {
    /// Name of the target service, used to select its cache.
    fn service(&self) -> &str;

    /// Invoke `method` with the given arguments.
    async fn invoke(&self, method: &str, call: &CallArgs) -> Result<Value>;
}
