//! Response cache keyed by request fingerprint.
//!
//! [`ResponseCache`] remembers the first successful response produced for
//! each fingerprint (see [`fingerprint`](super::fingerprint)) and hands the
//! same value back to every later request that maps to it, regardless of
//! that request's own `request_id`.
//!
//! By default the cache is unbounded and entries never expire: they live as
//! long as the owning [`BackendService`](crate::BackendService). A bound and
//! a TTL can be set through [`CacheConfig`] for long-running processes.
//!
//! Lookups and inserts are synchronous (`moka::sync`), so the dispatcher
//! never holds the cache across an `.await`.

use std::time::Duration;

use moka::sync::Cache;
use serde::Deserialize;

use crate::InferenceResponse;
use crate::telemetry;

/// Configuration for the response cache.
///
/// ```rust
/// # use huginn::CacheConfig;
/// # use std::time::Duration;
/// let config = CacheConfig::new()
///     .max_entries(10_000)
///     .ttl(Duration::from_secs(3600));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CacheConfig {
    /// Maximum number of cached entries. Default: unbounded.
    #[serde(default)]
    pub max_entries: Option<u64>,
    /// Time-to-live for cached entries, in seconds. Default: never expire.
    #[serde(default)]
    pub ttl_secs: Option<u64>,
}

impl CacheConfig {
    /// Unbounded, non-expiring cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Cap the number of cached entries.
    pub fn max_entries(mut self, n: u64) -> Self {
        self.max_entries = Some(n);
        self
    }

    /// Expire entries this long after insertion.
    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.ttl_secs = Some(ttl.as_secs());
        self
    }
}

/// In-memory response cache.
pub struct ResponseCache {
    cache: Cache<String, InferenceResponse>,
}

impl ResponseCache {
    /// Create a new response cache with the given configuration.
    pub fn new(config: &CacheConfig) -> Self {
        let mut builder = Cache::builder();
        if let Some(max) = config.max_entries {
            builder = builder.max_capacity(max);
        }
        if let Some(secs) = config.ttl_secs {
            builder = builder.time_to_live(Duration::from_secs(secs));
        }
        Self {
            cache: builder.build(),
        }
    }

    /// Look up the response stored under `key`.
    ///
    /// Returns `None` on cache miss. Emits cache hit/miss metrics.
    pub fn get(&self, key: &str) -> Option<InferenceResponse> {
        match self.cache.get(key) {
            Some(response) => {
                metrics::counter!(telemetry::CACHE_HITS_TOTAL).increment(1);
                Some(response)
            }
            None => {
                metrics::counter!(telemetry::CACHE_MISSES_TOTAL).increment(1);
                None
            }
        }
    }

    /// Store `response` under `key` unless an entry is already there.
    ///
    /// Returns the response that ends up cached: `response` itself, or the
    /// earlier value when another request for the same key got there first.
    pub fn insert(&self, key: String, response: InferenceResponse) -> InferenceResponse {
        self.cache.entry(key).or_insert(response).into_value()
    }

    /// Number of entries currently in the cache.
    ///
    /// Flushes moka's pending bookkeeping first so the count includes
    /// inserts that happened just before the call.
    pub fn len(&self) -> u64 {
        self.cache.run_pending_tasks();
        self.cache.entry_count()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Evict all entries.
    pub fn clear(&self) {
        self.cache.invalidate_all();
    }
}

impl Default for ResponseCache {
    fn default() -> Self {
        Self::new(&CacheConfig::default())
    }
}
