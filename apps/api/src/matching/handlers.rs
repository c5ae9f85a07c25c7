//! Axum route handlers for the Match API.

use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    Json,
};
use bytes::Bytes;
use tracing::{debug, info, warn};

use crate::errors::AppError;
use crate::matching::matcher::MatchReport;
use crate::resume::extract::{extract_text, ResumeFormat};
use crate::state::AppState;

const RESUME_FIELD: &str = "resume";

struct Upload {
    format: ResumeFormat,
    data: Bytes,
}

/// POST /api/v1/match
///
/// Multipart upload with a `resume` file field (PDF or TXT). Extracts the text,
/// matches it against every posting, and returns the match report.
pub async fn handle_match(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<MatchReport>, AppError> {
    let upload = read_resume_field(multipart?, state.config.max_upload_bytes).await?;
    debug!(
        "Received {:?} resume upload ({} bytes)",
        upload.format,
        upload.data.len()
    );

    // pdf-extract can panic on malformed input; a blocking task turns that into a JoinError.
    let format = upload.format;
    let resume = tokio::task::spawn_blocking(move || extract_text(&upload.data, format))
        .await
        .map_err(|e| AppError::Extraction(format!("Error reading PDF file: {e}")))??;

    debug!(
        "Extracted {} characters from {:?} resume",
        resume.text.len(),
        resume.format
    );

    let postings = state.store.postings().await;
    let report = state.matcher.match_resume(&resume.text, &postings).await?;

    info!(
        "Matched resume against {} postings: {} result(s) via {}",
        postings.len(),
        report.matches.len(),
        report.backend
    );
    Ok(Json(report))
}

async fn read_resume_field(mut multipart: Multipart, max_bytes: usize) -> Result<Upload, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {e}")))?
    {
        if field.name() != Some(RESUME_FIELD) {
            continue;
        }

        let format = ResumeFormat::detect(field.content_type(), field.file_name())?;
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Failed to read resume upload: {e}")))?;

        if data.len() > max_bytes {
            warn!("Rejected resume upload of {} bytes", data.len());
            return Err(AppError::Validation(format!(
                "Resume too large. Maximum size is {max_bytes} bytes"
            )));
        }

        return Ok(Upload { format, data });
    }

    Err(AppError::Validation(format!(
        "Missing '{RESUME_FIELD}' file field"
    )))
}
