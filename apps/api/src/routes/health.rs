use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /health
/// Returns a simple status object with service version and corpus size.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    let jobs = state.store.len().await;
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "jobmatch",
        "jobs": jobs,
        "matcher": state.config.matcher_backend.as_str(),
    }))
}
