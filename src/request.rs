//! Per-request research records.

use research_search::{Evidence, SourceKind};
use serde::{Deserialize, Serialize};

/// Everything produced while answering one prompt.
///
/// Created per call to [`Orchestrator::run_one`](crate::Orchestrator::run_one)
/// and handed to the caller; nothing is kept afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResearchRequest {
    /// The question as asked.
    pub prompt: String,
    /// Search query derived from the prompt.
    pub generated_query: String,
    /// Evidence used for synthesis, unique by link, in priority order.
    pub evidence: Vec<Evidence>,
    /// Extra context passed to synthesis, if any.
    pub manual_context: Option<String>,
    /// Kinds of source whose provider failed during collection.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failed_sources: Vec<SourceKind>,
    /// The synthesized answer.
    pub answer: String,
}

impl ResearchRequest {
    /// The user-facing summary of this request.
    pub fn report(&self) -> ResearchReport {
        ResearchReport {
            prompt: self.prompt.clone(),
            query: self.generated_query.clone(),
            answer: self.answer.clone(),
        }
    }
}

/// Output artifact for one prompt: what was asked, searched and answered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResearchReport {
    /// The question as asked.
    pub prompt: String,
    /// Search query derived from the prompt.
    pub query: String,
    /// The synthesized answer.
    pub answer: String,
}

impl std::fmt::Display for ResearchReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Prompt: {}", self.prompt)?;
        writeln!(f, "Query: {}", self.query)?;
        write!(f, "Answer:\n{}", self.answer)
    }
}
