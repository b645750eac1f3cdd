//! Lifecycle manager for a [`BackendService`].
//!
//! A [`ServiceManager`] is an ordinary value: construct one, share it (it is
//! `Send + Sync`), and pass it to whatever needs the service. It holds at
//! most one live service at a time.
//!
//! - [`service`](ServiceManager::service) returns the current instance,
//!   creating a stopped one on first access.
//! - [`initialize`](ServiceManager::initialize) binds the engine and model
//!   manager and starts the instance.
//! - [`shutdown`](ServiceManager::shutdown) stops it, cancels in-flight work,
//!   and forgets it, so the next access starts from an empty cache.
//!
//! Handles obtained before a shutdown keep pointing at the stopped instance
//! and reject every request with "service not running".

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::debug;

use crate::config::ServiceConfig;
use crate::service::BackendService;
use crate::traits::{InferenceEngine, ModelManager};

pub struct ServiceManager {
    config: ServiceConfig,
    instance: Mutex<Option<Arc<BackendService>>>,
}

impl ServiceManager {
    /// Create a manager whose services use `config`.
    pub fn new(config: ServiceConfig) -> Self {
        Self {
            config,
            instance: Mutex::new(None),
        }
    }

    fn slot(&self) -> MutexGuard<'_, Option<Arc<BackendService>>> {
        self.instance.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The current service, created (stopped, no engine) if there is none.
    pub fn service(&self) -> Arc<BackendService> {
        self.slot()
            .get_or_insert_with(|| {
                debug!("creating backend service");
                Arc::new(BackendService::new(self.config.clone()))
            })
            .clone()
    }

    /// Whether a service instance currently exists.
    pub fn has_service(&self) -> bool {
        self.slot().is_some()
    }

    /// Bind `engine` and `model_manager` to the current service and start it.
    ///
    /// Calling this again replaces the bound engine and model manager; the
    /// cache and any in-flight requests are kept.
    pub fn initialize(
        &self,
        engine: Option<Arc<dyn InferenceEngine>>,
        model_manager: Option<Arc<dyn ModelManager>>,
    ) -> Arc<BackendService> {
        let service = self.service();
        service.set_engine(engine);
        service.set_model_manager(model_manager);
        service.initialize();
        service
    }

    /// Stop and discard the current service, if any.
    pub fn shutdown(&self) {
        let instance = self.slot().take();
        if let Some(service) = instance {
            service.shutdown();
        }
    }
}

impl Default for ServiceManager {
    fn default() -> Self {
        Self::new(ServiceConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_is_created_lazily_and_reused() {
        let manager = ServiceManager::default();
        assert!(!manager.has_service());

        let a = manager.service();
        let b = manager.service();
        assert!(Arc::ptr_eq(&a, &b));
        assert!(!a.is_running());
    }

    #[test]
    fn initialize_starts_the_service() {
        let manager = ServiceManager::default();
        let service = manager.initialize(None, None);
        assert!(service.is_running());
        assert!(Arc::ptr_eq(&service, &manager.service()));
    }

    #[test]
    fn shutdown_discards_the_instance() {
        let manager = ServiceManager::default();
        let old = manager.initialize(None, None);
        manager.shutdown();

        assert!(!old.is_running());
        assert!(!manager.has_service());

        let fresh = manager.service();
        assert!(!Arc::ptr_eq(&old, &fresh));
        assert!(!fresh.is_running());
    }

    #[test]
    fn shutdown_without_service_is_noop() {
        let manager = ServiceManager::default();
        manager.shutdown();
        assert!(!manager.has_service());
    }
}
