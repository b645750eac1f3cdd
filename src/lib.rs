//! Huginn - caching, timeout-bounded dispatch in front of an inference engine
//!
//! This crate accepts structured generation requests, answers repeats from
//! a fingerprint-keyed cache, bounds every engine call with a timeout, and
//! tracks in-flight work so it can be cancelled on shutdown. Model
//! execution itself stays behind the [`InferenceEngine`] trait.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use huginn::{InferenceRequest, ServiceConfig, ServiceManager};
//! use huginn::providers::OllamaEngine;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let manager = ServiceManager::new(ServiceConfig::default());
//!     let service = manager.initialize(Some(Arc::new(OllamaEngine::default())), None);
//!
//!     let request = InferenceRequest::new("req-1", "llama3", "What is the capital of France?")
//!         .system_prompt("Answer in one word.");
//!     let response = service.process(&request).await;
//!     println!("{:?}: {:?}", response.status, response.result);
//!
//!     manager.shutdown();
//! }
//! ```

pub mod cache;
pub mod config;
pub mod error;
pub mod manager;
#[cfg(feature = "ollama")]
pub mod providers;
pub mod service;
pub mod telemetry;
pub mod traits;
pub mod types;
mod version;

// Re-export main types at crate root
pub use cache::{CacheConfig, ResponseCache, fingerprint};
pub use config::ServiceConfig;
pub use error::{HuginnError, Result};
pub use manager::ServiceManager;
pub use service::BackendService;
pub use traits::{EngineOutput, GenerateParams, InferenceEngine, ModelManager, RequestHandler};
pub use version::{PKG_VERSION, version_string};

// Re-export all types
pub use types::{InferenceRequest, InferenceResponse, Message, ResponseStatus, Role, ServiceStatus};

pub use tokio_util::sync::CancellationToken;
