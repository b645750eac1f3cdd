//! Collaborator traits: the inference engine, the model manager, and
//! custom request handlers.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::{InferenceRequest, InferenceResponse, Message, Result};

/// Parameters for one chat-style engine call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateParams {
    pub model: String,
    pub messages: Vec<Message>,
    pub temperature: f64,
    pub max_tokens: u32,
    pub top_p: f64,
    pub top_k: u32,
}

impl From<&InferenceRequest> for GenerateParams {
    fn from(request: &InferenceRequest) -> Self {
        Self {
            model: request.model_name.clone(),
            messages: request.messages(),
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            top_p: request.top_p,
            top_k: request.top_k,
        }
    }
}

/// What an engine returns. Either field may be absent; the service reads a
/// missing `content` as an empty string and missing `tokens` as zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineOutput {
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub tokens: Option<u64>,
}

impl EngineOutput {
    pub fn new(content: impl Into<String>, tokens: u64) -> Self {
        Self {
            content: Some(content.into()),
            tokens: Some(tokens),
        }
    }
}

/// The external engine that actually runs models.
///
/// Model execution, batching and device placement all live behind this
/// trait. `cancel` fires when the service gives up on the call (timeout or
/// shutdown); implementations should stop work promptly once it does, but the
/// service never forces them to.
#[async_trait]
pub trait InferenceEngine: Send + Sync {
    /// Engine name for logging/debugging.
    fn name(&self) -> &str;

    /// Run one chat-style generation.
    async fn generate(&self, params: &GenerateParams, cancel: CancellationToken)
    -> Result<EngineOutput>;
}

/// Opaque model-management collaborator bound alongside the engine.
///
/// The service only stores it and hands it back to callers.
pub trait ModelManager: Send + Sync {
    fn name(&self) -> &str;

    /// Models this manager can currently serve.
    fn available_models(&self) -> Vec<String> {
        Vec::new()
    }
}

/// Observer invoked with every freshly computed response.
///
/// Cache hits and requests rejected because the service is stopped are not
/// reported. Handlers run inline on the request path and must not block. A
/// panicking handler is logged and skipped; the caller still gets its
/// response.
pub trait RequestHandler: Send + Sync {
    fn handle(&self, request: &InferenceRequest, response: &InferenceResponse);
}

impl<F> RequestHandler for F
where
    F: Fn(&InferenceRequest, &InferenceResponse) + Send + Sync,
{
    fn handle(&self, request: &InferenceRequest, response: &InferenceResponse) {
        self(request, response)
    }
}
