//! Ollama chat API engine.
//!
//! Sends each generation as a non-streaming `POST /api/chat`.
//! See: <https://github.com/ollama/ollama/blob/main/docs/api.md#generate-a-chat-completion>

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::traits::{EngineOutput, GenerateParams, InferenceEngine};
use crate::{HuginnError, Message, Result};

/// Default base URL of a local Ollama server.
pub const DEFAULT_BASE_URL: &str = "http://localhost:11434";

/// [`InferenceEngine`] backed by an Ollama-compatible HTTP server.
#[derive(Clone)]
pub struct OllamaEngine {
    http: Client,
    base_url: String,
}

impl OllamaEngine {
    /// Create an engine talking to `base_url` (e.g. `http://localhost:11434`).
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_timeout(base_url, Duration::from_secs(600))
    }

    /// Create an engine whose HTTP client gives up after `timeout`.
    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Self {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .expect("failed to build HTTP client");

        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn chat(&self, params: &GenerateParams) -> Result<EngineOutput> {
        let url = format!("{}/api/chat", self.base_url);
        let body = ChatRequest {
            model: &params.model,
            messages: &params.messages,
            stream: false,
            options: ChatOptions {
                temperature: params.temperature,
                top_p: params.top_p,
                top_k: params.top_k,
                num_predict: params.max_tokens,
            },
        };

        let response = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| HuginnError::Http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(HuginnError::Api {
                status: status.as_u16(),
                message: error_message(&text),
            });
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| HuginnError::Http(e.to_string()))?;

        Ok(EngineOutput {
            content: parsed.message.map(|m| m.content),
            tokens: parsed.eval_count,
        })
    }
}

impl Default for OllamaEngine {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

#[async_trait]
impl InferenceEngine for OllamaEngine {
    fn name(&self) -> &str {
        "ollama"
    }

    async fn generate(
        &self,
        params: &GenerateParams,
        cancel: CancellationToken,
    ) -> Result<EngineOutput> {
        tokio::select! {
            _ = cancel.cancelled() => Err(HuginnError::Cancelled),
            result = self.chat(params) => result,
        }
    }
}

/// Ollama reports failures as `{"error": "..."}`; fall back to the raw body.
fn error_message(body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .map(|e| e.error)
        .unwrap_or_else(|_| body.to_string())
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    stream: bool,
    options: ChatOptions,
}

#[derive(Serialize)]
struct ChatOptions {
    temperature: f64,
    top_p: f64,
    top_k: u32,
    num_predict: u32,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    message: Option<ChatMessage>,
    #[serde(default)]
    eval_count: Option<u64>,
}

#[derive(Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: String,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}
