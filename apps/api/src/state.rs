use std::sync::Arc;

use crate::config::Config;
use crate::matching::matcher::ResumeMatcher;
use crate::store::JobStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Job corpus loaded at startup; appended to by the edit endpoint.
    pub store: Arc<JobStore>,
    /// Pluggable matcher. Default: TfidfMatcher. Swap via MATCHER_BACKEND.
    pub matcher: Arc<dyn ResumeMatcher>,
}
