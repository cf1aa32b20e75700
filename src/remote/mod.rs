//! Remote caller implementations.
//!
//! Real transports come from the host RPC framework and implement
//! [`RemoteCaller`](crate::RemoteCaller) directly. This module only holds
//! the in-process [`MethodRouter`].

pub mod router;

pub use router::MethodRouter;
