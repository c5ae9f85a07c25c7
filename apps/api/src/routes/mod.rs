pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::jobs::handlers as jobs;
use crate::matching::handlers as matching;
use crate::state::AppState;

/// Slack on top of the upload limit for multipart framing and other fields.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes + MULTIPART_OVERHEAD_BYTES;

    Router::new()
        .route("/health", get(health::health_handler))
        // Match API
        .route("/api/v1/match", post(matching::handle_match))
        // Jobs API
        .route("/api/v1/jobs/search", get(jobs::handle_search))
        .route("/api/v1/jobs/titles", get(jobs::handle_titles))
        .route("/api/v1/jobs/salary", get(jobs::handle_salary))
        .route("/api/v1/jobs/:id", get(jobs::handle_get_job))
        .route("/api/v1/jobs/:id/copies", post(jobs::handle_append_copy))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}
