//! Ready-made [`InferenceEngine`](crate::InferenceEngine) implementations.

pub mod ollama;

pub use ollama::OllamaEngine;
