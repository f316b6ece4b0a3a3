//! Answer synthesis from a prompt and collected evidence.
//!
//! The evidence becomes one block of `title: snippet` lines in collection
//! order. Zero evidence is allowed; the model is told so explicitly.

use std::sync::Arc;

use research_search::Evidence;

use crate::error::{ResearchError, Result, Stage};
use crate::llm::{CompletionClient, CompletionRequest, LlmError, Message};

/// System instruction for synthesis.
pub const SYNTHESIS_SYSTEM_PROMPT: &str = "You are a research assistant. \
Answer the user's question using the research provided. \
Prefer facts from the research over prior knowledge and say when the research does not cover something.";

/// Stands in for absent manual context.
pub const NO_CONTEXT_MARKER: &str = "No additional context provided.";

/// Stands in for an empty evidence block.
pub const NO_EVIDENCE_MARKER: &str = "No research results were found.";

/// Join evidence into `title: snippet` lines.
pub fn evidence_block(evidence: &[Evidence]) -> String {
    evidence
        .iter()
        .map(|e| format!("{}: {}", e.title, e.snippet))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Produces the final answer with one LLM call.
#[derive(Clone)]
pub struct SynthesisEngine {
    client: Arc<dyn CompletionClient>,
    model: String,
    max_tokens: u32,
    temperature: Option<f32>,
}

impl std::fmt::Debug for SynthesisEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SynthesisEngine")
            .field("client", &self.client.name())
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .finish()
    }
}

impl SynthesisEngine {
    /// Create an engine calling `model` through `client`.
    ///
    /// Defaults to a 1024-token budget and the provider's default temperature.
    pub fn new(client: Arc<dyn CompletionClient>, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
            max_tokens: 1024,
            temperature: None,
        }
    }

    /// Set the output token budget.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Set the sampling temperature.
    pub fn with_temperature(mut self, temperature: Option<f32>) -> Self {
        self.temperature = temperature;
        self
    }

    /// Build the completion request.
    pub fn request(
        &self,
        prompt: &str,
        evidence: &[Evidence],
        manual_context: Option<&str>,
    ) -> CompletionRequest {
        let context = manual_context
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or(NO_CONTEXT_MARKER);
        let research = if evidence.is_empty() {
            NO_EVIDENCE_MARKER.to_owned()
        } else {
            evidence_block(evidence)
        };

        let body = format!(
            "Using the following research, answer the question:\n{prompt}\n\n\
             Additional context:\n{context}\n\n\
             Research:\n{research}"
        );

        CompletionRequest::new(&self.model)
            .with_message(Message::system(SYNTHESIS_SYSTEM_PROMPT))
            .with_message(Message::user(body))
            .with_max_tokens(self.max_tokens)
            .with_optional_temperature(self.temperature)
    }

    /// Synthesize an answer.
    ///
    /// # Errors
    ///
    /// Returns [`ResearchError::Llm`] with [`Stage::Synthesis`] if the call
    /// fails or the answer is blank. No fallback answer is produced.
    pub async fn synthesize(
        &self,
        prompt: &str,
        evidence: &[Evidence],
        manual_context: Option<&str>,
    ) -> Result<String> {
        let request = self.request(prompt, evidence, manual_context);
        let text = self
            .client
            .complete(&request)
            .await
            .map_err(|e| ResearchError::llm(Stage::Synthesis, e))?;

        let answer = text.trim();
        if answer.is_empty() {
            return Err(ResearchError::llm(
                Stage::Synthesis,
                LlmError::EmptyCompletion("synthesis returned blank text".into()),
            ));
        }
        tracing::debug!(chars = answer.len(), "answer synthesized");
        Ok(answer.to_owned())
    }
}
