use huginn::{HuginnError, Result};

#[test]
fn test_lifecycle_messages() {
    assert_eq!(HuginnError::NotRunning.to_string(), "service not running");
    assert_eq!(HuginnError::Timeout.to_string(), "request timeout");
    assert_eq!(HuginnError::Cancelled.to_string(), "request cancelled");
}

#[test]
fn test_engine_unconfigured_message() {
    let msg = HuginnError::EngineUnconfigured.to_string();
    assert!(msg.contains("not configured"));
}

#[test]
fn test_engine_message_is_verbatim() {
    let err = HuginnError::engine("CUDA out of memory");
    assert_eq!(err.to_string(), "CUDA out of memory");
}

#[test]
fn test_api_error_display() {
    let err = HuginnError::Api {
        status: 503,
        message: "busy".into(),
    };
    assert_eq!(err.to_string(), "API error (503): busy");
}

#[test]
fn test_json_error_conversion() {
    let parse: std::result::Result<serde_json::Value, _> = serde_json::from_str("{");
    let err: HuginnError = parse.unwrap_err().into();
    assert!(err.to_string().starts_with("JSON error"));
}

#[test]
fn test_lifecycle_classification() {
    assert!(HuginnError::NotRunning.is_lifecycle());
    assert!(HuginnError::Timeout.is_lifecycle());
    assert!(HuginnError::Cancelled.is_lifecycle());
    assert!(!HuginnError::EngineUnconfigured.is_lifecycle());
    assert!(!HuginnError::engine("x").is_lifecycle());
}

#[test]
fn test_result_alias() {
    fn returns_error() -> Result<()> {
        Err(HuginnError::EngineUnconfigured)
    }
    assert!(returns_error().is_err());
}
