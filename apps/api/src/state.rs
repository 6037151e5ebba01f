use std::sync::Arc;

use crate::assessment::engine::AssessmentEngine;
use crate::config::Config;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Owns every live session. Storage and the recommendation backend are
    /// chosen at startup from `Config`.
    pub engine: Arc<AssessmentEngine>,
    pub config: Config,
}
