pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::evaluation::handlers::{self, MAX_UPLOAD_BYTES};
use crate::state::AppState;

/// Two full-size uploads plus multipart framing.
const MAX_SUBMISSION_BYTES: usize = 2 * MAX_UPLOAD_BYTES + 64 * 1024;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route(
            "/evaluate",
            post(handlers::handle_submit).layer(DefaultBodyLimit::max(MAX_SUBMISSION_BYTES)),
        )
        .route("/result/:id", get(handlers::handle_get_result))
        .with_state(state)
}
