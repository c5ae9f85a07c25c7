use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::matching::matcher::MatcherBackend;

const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub jobs_csv_path: PathBuf,
    pub port: u16,
    pub rust_log: String,
    pub matcher_backend: MatcherBackend,
    pub max_upload_bytes: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup. `from_env` passes the process environment.
    pub fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        Ok(Config {
            jobs_csv_path: PathBuf::from(require_env(&var, "JOBS_CSV_PATH")?),
            port: var("PORT")
                .unwrap_or_else(|| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: var("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            matcher_backend: var("MATCHER_BACKEND")
                .unwrap_or_else(|| "tfidf".to_string())
                .parse::<MatcherBackend>()
                .context("MATCHER_BACKEND must be 'tfidf' or 'keyword'")?,
            max_upload_bytes: match var("MAX_UPLOAD_BYTES") {
                Some(raw) => raw
                    .parse::<usize>()
                    .ok()
                    .filter(|&n| n > 0)
                    .context("MAX_UPLOAD_BYTES must be a positive integer")?,
                None => DEFAULT_MAX_UPLOAD_BYTES,
            },
        })
    }

    /// Config pointing at a given jobs file with every other value defaulted.
    #[cfg(test)]
    pub fn for_jobs_file(path: impl Into<PathBuf>) -> Self {
        Config {
            jobs_csv_path: path.into(),
            port: 0,
            rust_log: "debug".to_string(),
            matcher_backend: MatcherBackend::Tfidf,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

fn require_env(var: impl Fn(&str) -> Option<String>, key: &str) -> Result<String> {
    var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}
