//! Telemetry metric name constants.
//!
//! Consumers install their own `metrics` recorder (e.g. prometheus, statsd);
//! without a recorder installed, all metric calls are no-ops.
//!
//! All metrics are prefixed with `huginn_`. Counters end in `_total`,
//! histograms use meaningful units (e.g. `_seconds`).

/// Requests that reached the engine or were rejected before it.
///
/// Labels: `status` ("ok" | "error").
pub const REQUESTS_TOTAL: &str = "huginn_requests_total";

/// Time spent waiting for the engine, in seconds.
pub const REQUEST_DURATION_SECONDS: &str = "huginn_request_duration_seconds";

/// Requests abandoned because they exceeded the timeout.
pub const TIMEOUTS_TOTAL: &str = "huginn_timeouts_total";

/// Tokens reported by the engine for successful generations.
pub const TOKENS_TOTAL: &str = "huginn_tokens_total";

/// Response cache hits.
pub const CACHE_HITS_TOTAL: &str = "huginn_cache_hits_total";

/// Response cache misses.
pub const CACHE_MISSES_TOTAL: &str = "huginn_cache_misses_total";
