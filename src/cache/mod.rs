//! Caching subsystem.
//!
//! - [`fingerprint`]: deterministic cache key derived from a request's
//!   model, prompt, temperature and top_p.
//! - [`ResponseCache`]: fingerprint → first successful response.

mod key;
pub mod response;

pub use key::fingerprint;
pub use response::{CacheConfig, ResponseCache};
