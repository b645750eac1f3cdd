use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Point-in-time snapshot of a [`BackendService`](crate::BackendService).
///
/// Counts are read one after another, so a snapshot taken while requests
/// are completing may mix before and after values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceStatus {
    pub running: bool,
    pub active_requests: usize,
    pub cached_responses: u64,
    pub registered_handlers: usize,
    pub timestamp: DateTime<Utc>,
}
