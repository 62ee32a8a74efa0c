use axum::{extract::State, Json};
use chrono::Utc;
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /health
/// Returns liveness plus the evaluation queue's current depth.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "timestamp": Utc::now().to_rfc3339(),
        "queue": {
            "pending": state.queue.pending(),
            "busy": state.queue.is_busy()
        }
    }))
}
