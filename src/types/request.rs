//! Inference request type.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::Message;

fn default_temperature() -> f64 {
    0.7
}

fn default_top_p() -> f64 {
    1.0
}

fn default_max_tokens() -> u32 {
    512
}

fn default_top_k() -> u32 {
    50
}

/// A single generation request.
///
/// `request_id` is supplied by the caller and must be unique among requests
/// that are in flight at the same time. It may be reused once the earlier
/// request has completed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InferenceRequest {
    /// Caller-supplied identifier.
    pub request_id: String,

    /// Model to generate with.
    pub model_name: String,

    /// User prompt.
    pub prompt: String,

    /// Sampling temperature. Default: 0.7.
    #[serde(default = "default_temperature")]
    pub temperature: f64,

    /// Maximum number of tokens to generate. Default: 512.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Nucleus sampling threshold. Default: 1.0.
    #[serde(default = "default_top_p")]
    pub top_p: f64,

    /// Top-k sampling. Default: 50.
    #[serde(default = "default_top_k")]
    pub top_k: u32,

    /// Optional system prompt, sent ahead of the user prompt when non-empty.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,

    /// Free-form caller metadata. Never inspected by the service.
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

impl InferenceRequest {
    /// Create a request with default sampling parameters.
    pub fn new(
        request_id: impl Into<String>,
        model_name: impl Into<String>,
        prompt: impl Into<String>,
    ) -> Self {
        Self {
            request_id: request_id.into(),
            model_name: model_name.into(),
            prompt: prompt.into(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            top_p: default_top_p(),
            top_k: default_top_k(),
            system_prompt: None,
            metadata: Map::new(),
        }
    }

    /// Set temperature.
    pub fn temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    /// Set max tokens.
    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Set top_p.
    pub fn top_p(mut self, top_p: f64) -> Self {
        self.top_p = top_p;
        self
    }

    /// Set top-k sampling.
    pub fn top_k(mut self, k: u32) -> Self {
        self.top_k = k;
        self
    }

    /// Set the system prompt.
    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    /// Attach a metadata entry.
    pub fn metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Messages for the engine: the system prompt (if non-empty) followed
    /// by exactly one user message.
    pub fn messages(&self) -> Vec<Message> {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = self.system_prompt.as_deref().filter(|s| !s.is_empty()) {
            messages.push(Message::system(system));
        }
        messages.push(Message::user(&self.prompt));
        messages
    }
}
