//! Telemetry metric name constants.
//!
//! Centralised metric names for gateway operations. Consumers install
//! their own `metrics` recorder (e.g. prometheus, statsd); without a
//! recorder installed, all metric calls are no-ops.
//!
//! # Metric naming conventions
//!
//! All metrics are prefixed with `rpc_cachetools_`. Counters end in
//! `_total`, histograms use meaningful units (e.g. `_seconds`).
//!
//! # Common labels
//!
//! - `service` — target service name
//! - `method` — remote method invoked
//! - `source` — where a returned value came from: "remote", "cache" or "fallback"
//! - `reason` — why a fallback happened: "error" or "timeout"
//! - `status` — outcome: "ok" or "error"

/// Total calls answered by a gateway.
///
/// Labels: `service`, `method`, `source` ("remote" | "cache" | "fallback").
pub const CALLS_TOTAL: &str = "rpc_cachetools_calls_total";

/// Total cache lookups that found an entry.
///
/// Labels: `service`.
pub const CACHE_HITS_TOTAL: &str = "rpc_cachetools_cache_hits_total";

/// Total cache lookups that found nothing.
///
/// Labels: `service`.
pub const CACHE_MISSES_TOTAL: &str = "rpc_cachetools_cache_misses_total";

/// Total stale values served because the real call failed or overran.
///
/// Labels: `service`, `reason` ("error" | "timeout").
pub const FALLBACKS_TOTAL: &str = "rpc_cachetools_fallbacks_total";

/// Remote call duration in seconds, measured until the caller was answered.
///
/// Labels: `service`, `method`.
pub const REMOTE_DURATION_SECONDS: &str = "rpc_cachetools_remote_duration_seconds";

/// Detached calls that completed after their deadline already fired.
///
/// Labels: `service`, `status` ("ok" | "error").
pub const BACKGROUND_REFRESHES_TOTAL: &str = "rpc_cachetools_background_refreshes_total";
