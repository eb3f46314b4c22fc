//! Application state for the HTTP server.

use std::sync::Arc;
use std::time::Instant;

use crate::db::repository::RealflowRepository;
use crate::services::UnmatchedPolicy;

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Repository instance for database operations
    pub repository: Arc<dyn RealflowRepository>,
    /// Policy used by `/api/realflow-jobs` when the request does not pick one
    pub unmatched_policy: UnmatchedPolicy,
    started_at: Instant,
}

impl AppState {
    /// Create a new application state with the given repository.
    pub fn new(repository: Arc<dyn RealflowRepository>) -> Self {
        Self {
            repository,
            unmatched_policy: UnmatchedPolicy::default(),
            started_at: Instant::now(),
        }
    }

    pub fn with_unmatched_policy(mut self, policy: UnmatchedPolicy) -> Self {
        self.unmatched_policy = policy;
        self
    }

    /// Seconds since the state was created.
    pub fn uptime_secs(&self) -> f64 {
        self.started_at.elapsed().as_secs_f64()
    }
}
