//! Tests for [`BackendService::process_batch`] fan-out.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use huginn::{
    BackendService, CancellationToken, EngineOutput, GenerateParams, HuginnError,
    InferenceEngine, InferenceRequest, ResponseStatus, Result, ServiceConfig,
};

/// Echoes prompts, hangs on `"slow"`, fails on `"fail"`. Tracks the peak
/// number of concurrent calls.
#[derive(Default)]
struct EchoEngine {
    in_flight: AtomicUsize,
    peak: AtomicUsize,
}

#[async_trait]
impl InferenceEngine for EchoEngine {
    fn name(&self) -> &str {
        "echo"
    }

    async fn generate(
        &self,
        params: &GenerateParams,
        cancel: CancellationToken,
    ) -> Result<EngineOutput> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);

        let prompt = params.messages.last().map(|m| m.content.clone()).unwrap_or_default();
        let result = match prompt.as_str() {
            "slow" => {
                cancel.cancelled().await;
                Err(HuginnError::Cancelled)
            }
            "fail" => Err(HuginnError::Engine("bad prompt".into())),
            other => {
                // Let the other requests in the batch start before finishing.
                tokio::time::sleep(std::time::Duration::from_millis(10)).await;
                Ok(EngineOutput::new(other.to_uppercase(), other.len() as u64))
            }
        };

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }
}

fn service(engine: Arc<EchoEngine>) -> BackendService {
    let service = BackendService::with_engine(engine, ServiceConfig::default());
    service.initialize();
    service
}

fn req(id: &str, prompt: &str) -> InferenceRequest {
    InferenceRequest::new(id, "m1", prompt)
}

#[tokio::test(start_paused = true)]
async fn batch_preserves_order_when_middle_request_times_out() {
    let service = service(Arc::new(EchoEngine::default()));
    let requests = vec![req("r1", "one"), req("r2", "slow"), req("r3", "three")];

    let responses = service.process_batch(&requests).await;

    assert_eq!(responses.len(), 3);
    assert_eq!(responses[0].request_id, "r1");
    assert_eq!(responses[0].result.as_deref(), Some("ONE"));
    assert_eq!(responses[1].request_id, "r2");
    assert_eq!(responses[1].status, ResponseStatus::Error);
    assert_eq!(responses[1].error_message.as_deref(), Some("request timeout"));
    assert_eq!(responses[2].request_id, "r3");
    assert_eq!(responses[2].result.as_deref(), Some("THREE"));
    assert_eq!(service.status().active_requests, 0);
}

#[tokio::test(start_paused = true)]
async fn batch_isolates_engine_failures() {
    let service = service(Arc::new(EchoEngine::default()));
    let requests = vec![req("a", "alpha"), req("b", "fail"), req("c", "gamma")];

    let responses = service.process_batch(&requests).await;

    assert!(responses[0].is_success());
    assert_eq!(responses[1].error_message.as_deref(), Some("bad prompt"));
    assert!(responses[2].is_success());
}

#[tokio::test(start_paused = true)]
async fn batch_runs_requests_concurrently() {
    let engine = Arc::new(EchoEngine::default());
    let service = service(engine.clone());
    let requests: Vec<_> = (0..4).map(|i| req(&format!("r{i}"), &format!("p{i}"))).collect();

    let responses = service.process_batch(&requests).await;

    assert!(responses.iter().all(|r| r.is_success()));
    assert_eq!(engine.peak.load(Ordering::SeqCst), 4);
}

#[tokio::test]
async fn empty_batch_returns_empty() {
    let service = service(Arc::new(EchoEngine::default()));
    assert!(service.process_batch(&[]).await.is_empty());
}

#[tokio::test]
async fn batch_on_stopped_service_rejects_every_request() {
    let service = BackendService::with_engine(
        Arc::new(EchoEngine::default()),
        ServiceConfig::default(),
    );
    let responses = service
        .process_batch(&[req("a", "alpha"), req("b", "beta")])
        .await;

    assert_eq!(responses.len(), 2);
    for resp in responses {
        assert_eq!(resp.error_message.as_deref(), Some("service not running"));
    }
}
