//! The request dispatcher.
//!
//! [`BackendService`] sits between callers and an [`InferenceEngine`]:
//!
//! 1. rejects work while the service is stopped,
//! 2. answers from the [`ResponseCache`] when the request's fingerprint has
//!    already been served,
//! 3. otherwise spawns the engine call as its own task, tracks it in the
//!    active-request table, and waits for it up to the configured timeout,
//! 4. caches successful responses.
//!
//! [`process`](BackendService::process) never fails: every error becomes an
//! [`InferenceResponse`] with `status = error`.
//!
//! # Cancellation
//!
//! The service owns a root [`CancellationToken`]; each request runs under a
//! child of it. A timeout cancels that request's token, and
//! [`shutdown`](BackendService::shutdown) cancels the root. Cancellation is
//! cooperative: an engine that ignores its token keeps running in the
//! background, and whatever it eventually returns is dropped.
//!
//! There is no admission limit. Every call to `process` that misses the
//! cache gets its own task.

mod active;
mod execute;

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::Instant;

use chrono::Utc;
use futures_util::future::join_all;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::cache::{ResponseCache, fingerprint};
use crate::config::ServiceConfig;
use crate::telemetry;
use crate::traits::{InferenceEngine, ModelManager, RequestHandler};
use crate::{HuginnError, InferenceRequest, InferenceResponse, Result, ServiceStatus};

use active::ActiveRequests;

/// Caching, timeout-bounded front end for an inference engine.
pub struct BackendService {
    config: ServiceConfig,
    engine: RwLock<Option<Arc<dyn InferenceEngine>>>,
    model_manager: RwLock<Option<Arc<dyn ModelManager>>>,
    cache: ResponseCache,
    active: ActiveRequests,
    handlers: RwLock<Vec<Arc<dyn RequestHandler>>>,
    running: AtomicBool,
    root_token: Mutex<CancellationToken>,
}

impl BackendService {
    /// Create a stopped service with no engine bound.
    pub fn new(config: ServiceConfig) -> Self {
        let cache = ResponseCache::new(&config.cache);
        Self {
            config,
            engine: RwLock::new(None),
            model_manager: RwLock::new(None),
            cache,
            active: ActiveRequests::new(),
            handlers: RwLock::new(Vec::new()),
            running: AtomicBool::new(false),
            root_token: Mutex::new(CancellationToken::new()),
        }
    }

    /// Create a stopped service bound to `engine`.
    pub fn with_engine(engine: Arc<dyn InferenceEngine>, config: ServiceConfig) -> Self {
        let service = Self::new(config);
        service.set_engine(Some(engine));
        service
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Bind (or unbind) the inference engine. Requests already in flight
    /// keep the engine they started with.
    pub fn set_engine(&self, engine: Option<Arc<dyn InferenceEngine>>) {
        if let Some(engine) = &engine {
            debug!(engine = engine.name(), "inference engine bound");
        }
        *self.engine.write().unwrap_or_else(PoisonError::into_inner) = engine;
    }

    pub fn engine(&self) -> Option<Arc<dyn InferenceEngine>> {
        self.engine
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn set_model_manager(&self, manager: Option<Arc<dyn ModelManager>>) {
        *self
            .model_manager
            .write()
            .unwrap_or_else(PoisonError::into_inner) = manager;
    }

    pub fn model_manager(&self) -> Option<Arc<dyn ModelManager>> {
        self.model_manager
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Start accepting requests.
    pub fn initialize(&self) {
        {
            let mut root = self.root_token.lock().unwrap_or_else(PoisonError::into_inner);
            if root.is_cancelled() {
                *root = CancellationToken::new();
            }
        }
        self.running.store(true, Ordering::SeqCst);
        let engine = self.engine();
        info!(
            engine = engine.as_ref().map(|e| e.name()),
            timeout_secs = self.config.request_timeout.as_secs_f64(),
            "backend service initialized"
        );
    }

    /// Stop accepting requests and cancel everything in flight.
    pub fn shutdown(&self) {
        self.running.store(false, Ordering::SeqCst);
        self.root_token
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .cancel();
        let cancelled = self.active.cancel_all();
        info!(cancelled, "backend service shutdown");
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Whether a request with this id is currently being served.
    pub fn is_active(&self, request_id: &str) -> bool {
        self.active.contains(request_id)
    }

    /// Add an observer for freshly computed responses.
    pub fn register_handler(&self, handler: impl RequestHandler + 'static) {
        self.handlers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Arc::new(handler));
    }

    /// Process one request. Never fails; errors come back as responses.
    pub async fn process(&self, request: &InferenceRequest) -> InferenceResponse {
        if !self.is_running() {
            metrics::counter!(telemetry::REQUESTS_TOTAL, "status" => "error").increment(1);
            return InferenceResponse::error(
                &request.request_id,
                HuginnError::NotRunning.to_string(),
            );
        }

        let key = fingerprint(request);
        if let Some(cached) = self.cache.get(&key) {
            debug!(request_id = %request.request_id, "cache hit");
            return cached;
        }
        debug!(request_id = %request.request_id, model = %request.model_name, "cache miss");

        let start = Instant::now();
        let response = match self.dispatch(request).await {
            Ok(response) => response,
            Err(e) => {
                if e.is_lifecycle() {
                    warn!(request_id = %request.request_id, error = %e, "request abandoned");
                }
                InferenceResponse::error(&request.request_id, e.to_string())
                    .with_processing_time(start.elapsed().as_secs_f64() * 1000.0)
            }
        };
        metrics::histogram!(telemetry::REQUEST_DURATION_SECONDS)
            .record(start.elapsed().as_secs_f64());

        let response = if response.is_success() {
            metrics::counter!(telemetry::REQUESTS_TOTAL, "status" => "ok").increment(1);
            metrics::counter!(telemetry::TOKENS_TOTAL).increment(response.tokens_generated);
            // A concurrent request with the same fingerprint may have cached
            // first; its response wins.
            self.cache.insert(key, response)
        } else {
            metrics::counter!(telemetry::REQUESTS_TOTAL, "status" => "error").increment(1);
            response
        };

        self.notify(request, &response);
        response
    }

    /// Spawn the engine call and wait for it under the timeout. The
    /// request's table entry lives exactly as long as this call, and the
    /// task is cancelled if the caller drops this future early.
    async fn dispatch(&self, request: &InferenceRequest) -> Result<InferenceResponse> {
        let token = self
            .root_token
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .child_token();
        let _guard = self.active.register(&request.request_id, token.clone());
        let cancel_on_drop = token.clone().drop_guard();

        let task = tokio::spawn(execute::execute(
            self.engine(),
            request.clone(),
            token.clone(),
        ));

        let outcome = tokio::time::timeout(self.config.request_timeout, task).await;
        cancel_on_drop.disarm();
        match outcome {
            Ok(Ok(response)) => Ok(response),
            Ok(Err(join_err)) => Err(HuginnError::engine(join_err)),
            Err(_) => {
                token.cancel();
                metrics::counter!(telemetry::TIMEOUTS_TOTAL).increment(1);
                Err(HuginnError::Timeout)
            }
        }
    }

    fn notify(&self, request: &InferenceRequest, response: &InferenceResponse) {
        let handlers = self
            .handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        for handler in handlers {
            let outcome =
                panic::catch_unwind(AssertUnwindSafe(|| handler.handle(request, response)));
            if outcome.is_err() {
                error!(request_id = %request.request_id, "request handler panicked");
            }
        }
    }

    /// Process every request concurrently. Responses come back in input
    /// order, one per request; a failure only affects its own slot.
    pub async fn process_batch(&self, requests: &[InferenceRequest]) -> Vec<InferenceResponse> {
        join_all(requests.iter().map(|request| self.process(request))).await
    }

    /// Snapshot of the service's current state.
    pub fn status(&self) -> ServiceStatus {
        ServiceStatus {
            running: self.is_running(),
            active_requests: self.active.len(),
            cached_responses: self.cache.len(),
            registered_handlers: self
                .handlers
                .read()
                .unwrap_or_else(PoisonError::into_inner)
                .len(),
            timestamp: Utc::now(),
        }
    }

    /// Drop all cached responses.
    pub fn clear_cache(&self) {
        self.cache.clear();
    }
}

impl Default for BackendService {
    fn default() -> Self {
        Self::new(ServiceConfig::default())
    }
}
