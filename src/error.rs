//! Error types for the research pipeline.

use crate::llm::LlmError;

/// The pipeline stage an LLM failure happened in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Turning the prompt into a search query.
    Query,
    /// Turning prompt and evidence into an answer.
    Synthesis,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Query => write!(f, "query generation"),
            Self::Synthesis => write!(f, "synthesis"),
        }
    }
}

/// Top-level error type for researchbot.
///
/// Provider and list-file failures never appear here: they are logged and
/// replaced by an empty result where they happen.
#[derive(Debug, thiserror::Error)]
pub enum ResearchError {
    /// Missing or invalid configuration. Fatal at startup.
    #[error("config error: {0}")]
    Config(String),

    /// A completion call failed or returned nothing.
    #[error("{stage} failed: {source}")]
    Llm {
        /// Stage that made the call.
        stage: Stage,
        /// Underlying client error.
        source: LlmError,
    },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ResearchError {
    /// Wrap an LLM error raised during `stage`.
    pub fn llm(stage: Stage, source: LlmError) -> Self {
        Self::Llm { stage, source }
    }

    /// The failed stage, if this is an LLM failure.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            Self::Llm { stage, .. } => Some(*stage),
            _ => None,
        }
    }
}

impl From<research_search::SearchError> for ResearchError {
    fn from(err: research_search::SearchError) -> Self {
        Self::Config(err.to_string())
    }
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, ResearchError>;
