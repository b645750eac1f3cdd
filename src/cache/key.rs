//! Request fingerprinting.

use sha2::{Digest, Sha256};

use crate::InferenceRequest;

/// Derive the cache key for a request.
///
/// SHA-256 over `model_name:prompt:temperature:top_p`, as 64 lowercase hex
/// characters. `top_k`, `max_tokens`, `system_prompt` and `metadata` are not
/// part of the key, so requests differing only in those share one cached
/// response. Floats use their `Debug` rendering so `1.0` and `1` never
/// diverge between call sites.
pub fn fingerprint(request: &InferenceRequest) -> String {
    let key_data = format!(
        "{}:{}:{:?}:{:?}",
        request.model_name, request.prompt, request.temperature, request.top_p
    );
    format!("{:x}", Sha256::digest(key_data.as_bytes()))
}
