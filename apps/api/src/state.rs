use std::sync::Arc;

use crate::jobs::queue::JobQueue;
use crate::jobs::repository::JobRepository;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub jobs: Arc<dyn JobRepository>,
    /// Single-worker queue feeding the evaluation processor.
    pub queue: JobQueue,
}
