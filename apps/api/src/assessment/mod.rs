// Career Assessment Engine
// Implements: question catalog, answer store & step sequencing, scoring, archetype
// matching, enrichment with fallback, result aggregation, persistence, sessions.
// All LLM calls go through llm_client; scoring and matching never leave the process.

pub mod aggregator;
pub mod answers;
pub mod archetypes;
pub mod catalog;
pub mod engine;
pub mod enrichment;
pub mod handlers;
pub mod models;
pub mod persistence;
pub mod prompts;
pub mod scoring;
pub mod session;

use thiserror::Error;
use uuid::Uuid;

/// Errors the engine reports to its callers. Enrichment failures and storage
/// corruption never appear here: they are resolved inside the engine.
#[derive(Debug, Error)]
pub enum AssessmentError {
    /// Out-of-range answer or unknown question id.
    #[error("{0}")]
    Validation(String),

    /// The requested transition is not legal in the session's current phase.
    #[error("{0}")]
    InvalidState(String),

    #[error("Assessment session {0} not found")]
    SessionNotFound(Uuid),

    #[error("Assessment session {0} has no result yet")]
    ResultNotReady(Uuid),

    /// The detached analysis task panicked or was cancelled.
    #[error("Analysis failed: {0}")]
    AnalysisFailed(String),
}
