//! In-process [`RemoteCaller`] built from an explicit method table.
//!
//! Each method name maps to an async handler taking the call arguments.
//! Useful for wiring local fakes of remote services and for tests.
//!
//! ```rust
//! # use rpc_cachetools::{CallArgs, MethodRouter, RemoteCaller};
//! # use serde_json::json;
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> rpc_cachetools::Result<()> {
//! let router = MethodRouter::new("greeter")
//!     .route("echo", |call: CallArgs| async move {
//!         Ok::<_, rpc_cachetools::CachetoolsError>(call.args[0].clone())
//!     });
//!
//! let reply = router.invoke("echo", &CallArgs::new().arg("hi")).await?;
//! assert_eq!(reply, json!("hi"));
//! # Ok(())
//! # }
//! ```

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use serde_json::Value;

use crate::traits::RemoteCaller;
use crate::{CachetoolsError, CallArgs, Result};

type Handler = Arc<dyn Fn(CallArgs) -> BoxFuture<'static, Result<Value>> + Send + Sync>;

/// Method-name → handler table for one service.
pub struct MethodRouter {
    service: String,
    methods: HashMap<String, Handler>,
}

impl MethodRouter {
    /// Create an empty router for `service`.
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            methods: HashMap::new(),
        }
    }

    /// Register `handler` for `method`, replacing any previous handler.
    pub fn route<F, Fut>(mut self, method: impl Into<String>, handler: F) -> Self
    where
        F: Fn(CallArgs) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value>> + Send + 'static,
    {
        let handler: Handler = Arc::new(move |call| handler(call).boxed());
        self.methods.insert(method.into(), handler);
        self
    }

    /// Whether a handler is registered for `method`.
    pub fn has_method(&self, method: &str) -> bool {
        self.methods.contains_key(method)
    }

    /// Registered method names, sorted.
    pub fn methods(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.methods.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

#[async_trait]
impl RemoteCaller for MethodRouter {
    fn service(&self) -> &str {
        &self.service
    }

    async fn invoke(&self, method: &str, call: &CallArgs) -> Result<Value> {
        let handler = self
            .methods
            .get(method)
            .ok_or_else(|| CachetoolsError::MethodNotFound(format!("{}.{method}", self.service)))?;
        handler(call.clone()).await
    }
}

impl fmt::Debug for MethodRouter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodRouter")
            .field("service", &self.service)
            .field("methods", &self.methods())
            .finish()
    }
}
