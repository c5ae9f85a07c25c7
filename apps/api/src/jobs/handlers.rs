//! Axum route handlers for the Jobs API.

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::jobs::lookup::{distinct_titles, filter_by_title, find_first_by_title, NO_JOB_MESSAGE};
use crate::jobs::salary::{average_salary, SalarySummary};
use crate::models::job::{JobEdits, JobPosting};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct TitleQuery {
    pub title: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SearchResponse {
    pub job: Option<JobPosting>,
    pub message: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TitlesResponse {
    pub titles: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct SalaryResponse {
    pub title_filter: Option<String>,
    #[serde(flatten)]
    pub summary: SalarySummary,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/jobs/search?title=
///
/// Returns the first posting whose title contains the query (case-insensitive).
pub async fn handle_search(
    State(state): State<AppState>,
    Query(params): Query<TitleQuery>,
) -> Result<Json<SearchResponse>, AppError> {
    let query = params
        .title
        .as_deref()
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .ok_or_else(|| AppError::Validation("title cannot be empty".to_string()))?;

    let postings = state.store.postings().await;
    let job = find_first_by_title(&postings, query).cloned();
    let message = job.is_none().then(|| NO_JOB_MESSAGE.to_string());

    Ok(Json(SearchResponse { job, message }))
}

/// GET /api/v1/jobs/titles
pub async fn handle_titles(State(state): State<AppState>) -> Json<TitlesResponse> {
    let postings = state.store.postings().await;
    Json(TitlesResponse {
        titles: distinct_titles(&postings),
    })
}

/// GET /api/v1/jobs/salary?title=
///
/// Average salary midpoint over postings whose title contains the query,
/// or over every posting when no query is given.
pub async fn handle_salary(
    State(state): State<AppState>,
    Query(params): Query<TitleQuery>,
) -> Json<SalaryResponse> {
    let postings = state.store.postings().await;
    let title_filter = params
        .title
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty());

    let summary = match title_filter.as_deref() {
        Some(query) => average_salary(filter_by_title(&postings, query)),
        None => average_salary(&postings),
    };

    Json(SalaryResponse {
        title_filter,
        summary,
    })
}

/// GET /api/v1/jobs/:id
pub async fn handle_get_job(
    State(state): State<AppState>,
    path: Result<Path<usize>, PathRejection>,
) -> Result<Json<JobPosting>, AppError> {
    let Path(id) = path?;
    state
        .store
        .posting(id)
        .await
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Job {id} not found")))
}

/// POST /api/v1/jobs/:id/copies
///
/// Appends a copy of posting `id` with the given fields replaced and persists
/// the jobs file. Append-only: the original row is never modified.
pub async fn handle_append_copy(
    State(state): State<AppState>,
    path: Result<Path<usize>, PathRejection>,
    body: Result<Json<JobEdits>, JsonRejection>,
) -> Result<(StatusCode, Json<JobPosting>), AppError> {
    let Path(id) = path?;
    let Json(edits) = body?;
    let posting = state.store.append_edited(id, &edits).await?;
    Ok((StatusCode::CREATED, Json(posting)))
}
