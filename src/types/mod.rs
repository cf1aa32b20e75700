//! Public types for the rpc-cachetools API.

mod call;
mod key;

pub use call::CallArgs;
pub use key::CacheKey;

pub use serde_json::Value;
