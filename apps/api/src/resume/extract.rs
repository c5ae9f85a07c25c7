use std::path::Path;

use serde::Serialize;
use tracing::warn;

use crate::errors::AppError;

pub const NO_TEXT_MESSAGE: &str = "No text could be extracted from the uploaded resume.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResumeFormat {
    Pdf,
    PlainText,
}

impl ResumeFormat {
    /// Picks the format from the declared content type, falling back to the file extension.
    pub fn detect(content_type: Option<&str>, file_name: Option<&str>) -> Result<Self, AppError> {
        let mime = content_type
            .and_then(|ct| ct.split(';').next())
            .map(|ct| ct.trim().to_ascii_lowercase());
        match mime.as_deref() {
            Some("application/pdf") => return Ok(ResumeFormat::Pdf),
            Some("text/plain") => return Ok(ResumeFormat::PlainText),
            _ => {}
        }

        let extension = file_name
            .and_then(|name| Path::new(name).extension())
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);
        match extension.as_deref() {
            Some("pdf") => Ok(ResumeFormat::Pdf),
            Some("txt") => Ok(ResumeFormat::PlainText),
            _ => Err(AppError::Validation(
                "Unsupported resume file type. Only PDF and TXT files are accepted".to_string(),
            )),
        }
    }
}

/// Text pulled from one uploaded résumé. Lives for a single request.
#[derive(Debug, Clone)]
pub struct ResumeDocument {
    pub format: ResumeFormat,
    pub text: String,
}

/// Extracts résumé text. PDF pages are concatenated; plain text must be UTF-8.
pub fn extract_text(data: &[u8], format: ResumeFormat) -> Result<ResumeDocument, AppError> {
    let text = match format {
        ResumeFormat::Pdf => pdf_extract::extract_text_from_mem(data).map_err(|e| {
            warn!("PDF extraction failed: {e}");
            AppError::Extraction(format!("Error reading PDF file: {e}"))
        })?,
        ResumeFormat::PlainText => String::from_utf8(data.to_vec()).map_err(|e| {
            warn!("Resume text is not valid UTF-8: {e}");
            AppError::Extraction(format!("Error reading text file: {e}"))
        })?,
    };

    if text.trim().is_empty() {
        return Err(AppError::Extraction(NO_TEXT_MESSAGE.to_string()));
    }

    Ok(ResumeDocument { format, text })
}
