//! Analysis pipeline error types

use crate::validate::ValidationError;
use spendsight_script::ScriptError;

/// Errors surfaced by the refinement and portfolio pipelines.
///
/// A failing script is assumed to fail deterministically, so pipelines never
/// retry; callers translate both variants into a degraded reply.
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("Script execution failed: {0}")]
    Script(#[from] ScriptError),

    #[error("Script output failed validation: {0}")]
    Validation(#[from] ValidationError),
}

/// Result type alias for analysis operations
pub type AnalysisResult<T> = Result<T, AnalysisError>;
