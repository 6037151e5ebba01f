use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /health
/// Returns a simple status object with service version and the active
/// recommendation backend.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "career-assessment-api",
        "recommendation_backend": state.engine.enrichment_backend(),
        "storage": if state.config.redis_url.is_some() { "redis" } else { "memory" },
    }))
}
