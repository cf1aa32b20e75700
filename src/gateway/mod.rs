//! Gateway implementations

mod builder;
mod policy;
mod proxy;

pub use builder::GatewayBuilder;
pub use policy::{CallPolicy, GatewayConfig};
pub use proxy::{CachedServiceProxy, MethodProxy};
