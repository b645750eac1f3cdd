//! Inference response type.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Outcome of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseStatus {
    Success,
    Error,
    Processing,
}

/// Result of processing one [`InferenceRequest`](crate::InferenceRequest).
///
/// Responses built through [`success`](Self::success), [`error`](Self::error)
/// and [`processing`](Self::processing), which includes every response the
/// dispatcher returns, pair an `Error` status with an `error_message` and a
/// `Success` status with a `result`. Fields are public, so hand-built or
/// deserialized values are not checked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InferenceResponse {
    /// Mirrors the id of the request that produced this response.
    pub request_id: String,

    pub status: ResponseStatus,

    /// Generated text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,

    /// Wall-clock time spent in the engine call, in milliseconds.
    pub processing_time_ms: f64,

    pub tokens_generated: u64,

    /// Model used for generation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_name: Option<String>,

    /// When this response was created.
    pub timestamp: DateTime<Utc>,
}

impl InferenceResponse {
    /// A successful generation.
    pub fn success(
        request_id: impl Into<String>,
        result: impl Into<String>,
        tokens_generated: u64,
        model_name: impl Into<String>,
        processing_time_ms: f64,
    ) -> Self {
        Self {
            request_id: request_id.into(),
            status: ResponseStatus::Success,
            result: Some(result.into()),
            error_message: None,
            processing_time_ms: processing_time_ms.max(0.0),
            tokens_generated,
            model_name: Some(model_name.into()),
            timestamp: Utc::now(),
        }
    }

    /// A failed request with zero processing time.
    pub fn error(request_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
            status: ResponseStatus::Error,
            result: None,
            error_message: Some(message.into()),
            processing_time_ms: 0.0,
            tokens_generated: 0,
            model_name: None,
            timestamp: Utc::now(),
        }
    }

    /// A request still in flight.
    pub fn processing(request_id: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
            status: ResponseStatus::Processing,
            result: None,
            error_message: None,
            processing_time_ms: 0.0,
            tokens_generated: 0,
            model_name: None,
            timestamp: Utc::now(),
        }
    }

    /// Set the measured processing time.
    pub fn with_processing_time(mut self, ms: f64) -> Self {
        self.processing_time_ms = ms.max(0.0);
        self
    }

    pub fn is_success(&self) -> bool {
        self.status == ResponseStatus::Success
    }

    pub fn is_error(&self) -> bool {
        self.status == ResponseStatus::Error
    }
}
