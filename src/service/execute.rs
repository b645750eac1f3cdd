//! One engine call for one request.

use std::sync::Arc;
use std::time::Instant;

use tokio_util::sync::CancellationToken;
use tracing::error;

use crate::traits::{EngineOutput, GenerateParams, InferenceEngine};
use crate::{HuginnError, InferenceRequest, InferenceResponse, Result};

/// Run `request` against `engine` and turn the outcome into a response.
///
/// The elapsed wall-clock time is reported on success and failure alike.
/// The engine call is raced against `cancel`; if the token fires first the
/// call is dropped and the response says so.
pub(crate) async fn execute(
    engine: Option<Arc<dyn InferenceEngine>>,
    request: InferenceRequest,
    cancel: CancellationToken,
) -> InferenceResponse {
    let start = Instant::now();
    let outcome = generate(engine.as_deref(), &request, cancel).await;
    let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;

    match outcome {
        Ok(output) => InferenceResponse::success(
            &request.request_id,
            output.content.unwrap_or_default(),
            output.tokens.unwrap_or(0),
            &request.model_name,
            elapsed_ms,
        ),
        Err(e) => {
            error!(
                request_id = %request.request_id,
                model = %request.model_name,
                elapsed_ms,
                error = %e,
                "inference execution failed"
            );
            InferenceResponse::error(&request.request_id, e.to_string())
                .with_processing_time(elapsed_ms)
        }
    }
}

async fn generate(
    engine: Option<&dyn InferenceEngine>,
    request: &InferenceRequest,
    cancel: CancellationToken,
) -> Result<EngineOutput> {
    let engine = engine.ok_or(HuginnError::EngineUnconfigured)?;
    let params = GenerateParams::from(request);

    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(HuginnError::Cancelled),
        result = engine.generate(&params, cancel.clone()) => result,
    }
}
