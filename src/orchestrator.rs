//! Per-prompt pipeline: query generation, evidence collection, synthesis.
//!
//! Each stage runs after the previous one finishes. A query or synthesis
//! failure fails the whole request; provider failures only shrink the
//! evidence.

use std::sync::Arc;

use research_search::EvidenceCollector;
use tracing::Instrument;
use uuid::Uuid;

use crate::config::ResearchConfig;
use crate::error::Result;
use crate::llm::CompletionClient;
use crate::query::QueryGenerator;
use crate::request::ResearchRequest;
use crate::synthesis::SynthesisEngine;

/// Result of one prompt in an isolated batch.
#[derive(Debug)]
pub struct BatchOutcome {
    /// The prompt this outcome belongs to.
    pub prompt: String,
    /// The finished request, or why it failed.
    pub result: Result<ResearchRequest>,
}

/// Sequences the three stages for one prompt or a list of prompts.
#[derive(Debug)]
pub struct Orchestrator {
    query: QueryGenerator,
    collector: EvidenceCollector,
    synthesis: SynthesisEngine,
    max_results: usize,
    manual_context: Option<String>,
}

impl Orchestrator {
    /// Assemble an orchestrator from its stages.
    ///
    /// Collects up to 5 evidence items per request with no manual context.
    pub fn new(query: QueryGenerator, collector: EvidenceCollector, synthesis: SynthesisEngine) -> Self {
        Self {
            query,
            collector,
            synthesis,
            max_results: 5,
            manual_context: None,
        }
    }

    /// Build the standard pipeline from configuration.
    ///
    /// `client` serves both LLM stages; `custom_sources` feeds the custom
    /// URL provider.
    pub fn from_config(
        config: &ResearchConfig,
        client: Arc<dyn CompletionClient>,
        custom_sources: Vec<String>,
    ) -> Self {
        let query = QueryGenerator::new(Arc::clone(&client), &config.llm.query_model)
            .with_max_tokens(config.llm.query_max_tokens)
            .with_attempts(config.llm.query_attempts);
        let synthesis = SynthesisEngine::new(client, &config.llm.research_model)
            .with_max_tokens(config.llm.synthesis_max_tokens)
            .with_temperature(config.llm.synthesis_temperature);
        let collector = EvidenceCollector::from_config(&config.search.options, custom_sources);

        Self::new(query, collector, synthesis)
            .with_max_results(config.search.max_results)
            .with_manual_context(config.manual_context.clone())
    }

    /// Set the evidence bound per request.
    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }

    /// Set the default manual context for synthesis.
    pub fn with_manual_context(mut self, manual_context: Option<String>) -> Self {
        self.manual_context = manual_context;
        self
    }

    /// Answer one prompt using the configured manual context.
    ///
    /// # Errors
    ///
    /// Returns [`ResearchError::Llm`](crate::ResearchError::Llm) if query
    /// generation or synthesis fails. No partial answer is returned.
    pub async fn run_one(&self, prompt: &str) -> Result<ResearchRequest> {
        self.run_one_with_context(prompt, self.manual_context.as_deref())
            .await
    }

    /// Answer one prompt with an explicit manual context.
    ///
    /// # Errors
    ///
    /// Same as [`run_one`](Self::run_one).
    pub async fn run_one_with_context(
        &self,
        prompt: &str,
        manual_context: Option<&str>,
    ) -> Result<ResearchRequest> {
        let span = tracing::info_span!("research", request_id = %Uuid::new_v4());
        self.pipeline(prompt, manual_context).instrument(span).await
    }

    async fn pipeline(&self, prompt: &str, manual_context: Option<&str>) -> Result<ResearchRequest> {
        tracing::info!("generating search query");
        let generated_query = self.query.generate(prompt).await?;

        tracing::info!(max_results = self.max_results, "collecting evidence");
        let collection = self
            .collector
            .collect_report(&generated_query, self.max_results)
            .await;
        let failed_sources = collection.failed_kinds();
        if !failed_sources.is_empty() {
            tracing::warn!(?failed_sources, "continuing with partial evidence");
        }

        tracing::info!(evidence = collection.evidence.len(), "synthesizing answer");
        let answer = self
            .synthesis
            .synthesize(prompt, &collection.evidence, manual_context)
            .await?;

        Ok(ResearchRequest {
            prompt: prompt.to_owned(),
            generated_query,
            evidence: collection.evidence,
            manual_context: manual_context.map(str::to_owned),
            failed_sources,
            answer,
        })
    }

    /// Answer each prompt in order, stopping at the first failure.
    ///
    /// # Errors
    ///
    /// Returns the first prompt's error; later prompts are not run.
    pub async fn run_batch(&self, prompts: &[String]) -> Result<Vec<ResearchRequest>> {
        let mut requests = Vec::with_capacity(prompts.len());
        for prompt in prompts {
            requests.push(self.run_one(prompt).await?);
        }
        Ok(requests)
    }

    /// Answer each prompt in order, recording failures instead of stopping.
    pub async fn run_batch_isolated(&self, prompts: &[String]) -> Vec<BatchOutcome> {
        let mut outcomes = Vec::with_capacity(prompts.len());
        for (index, prompt) in prompts.iter().enumerate() {
            let result = self.run_one(prompt).await;
            if let Err(err) = &result {
                tracing::warn!(index, error = %err, "prompt failed, continuing batch");
            }
            outcomes.push(BatchOutcome {
                prompt: prompt.clone(),
                result,
            });
        }
        outcomes
    }
}
