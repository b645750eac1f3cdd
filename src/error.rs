//! Huginn error types

/// Huginn error types.
///
/// Every variant's display string is what a caller sees in
/// [`InferenceResponse::error_message`](crate::InferenceResponse::error_message)
/// when [`BackendService::process`](crate::BackendService::process) converts
/// a failure into an error response.
#[derive(Debug, thiserror::Error)]
pub enum HuginnError {
    // Lifecycle errors
    #[error("service not running")]
    NotRunning,

    #[error("request timeout")]
    Timeout,

    #[error("request cancelled")]
    Cancelled,

    // Engine errors
    #[error("inference engine not configured")]
    EngineUnconfigured,

    /// Failure raised by the engine itself, carried verbatim.
    #[error("{0}")]
    Engine(String),

    // Engine adapter (network) errors
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    // Data errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // Configuration errors
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl HuginnError {
    /// Wrap any displayable engine failure.
    pub fn engine(err: impl std::fmt::Display) -> Self {
        HuginnError::Engine(err.to_string())
    }

    /// Whether this error came from the lifecycle rather than the engine.
    pub fn is_lifecycle(&self) -> bool {
        matches!(
            self,
            HuginnError::NotRunning | HuginnError::Timeout | HuginnError::Cancelled
        )
    }
}

/// Result type alias for Huginn operations
pub type Result<T> = std::result::Result<T, HuginnError>;
