//! Search query generation.

use std::sync::Arc;

use crate::error::{ResearchError, Result, Stage};
use crate::llm::{CompletionClient, CompletionRequest, LlmError, Message};

/// System instruction for query generation.
pub const QUERY_SYSTEM_PROMPT: &str = "You are a search query optimization assistant. \
Rewrite the user's research question as one concise web search query. \
Reply with the query only, without quotes or explanation.";

/// Turns a research question into a search query with one LLM call.
///
/// Sampling is deterministic (temperature 0). The reply is trimmed and an
/// empty reply is a failure.
#[derive(Clone)]
pub struct QueryGenerator {
    client: Arc<dyn CompletionClient>,
    model: String,
    max_tokens: u32,
    attempts: u32,
}

impl std::fmt::Debug for QueryGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryGenerator")
            .field("client", &self.client.name())
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .field("attempts", &self.attempts)
            .finish()
    }
}

impl QueryGenerator {
    /// Create a generator calling `model` through `client`.
    ///
    /// Defaults to a 64-token budget and a single attempt.
    pub fn new(client: Arc<dyn CompletionClient>, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
            max_tokens: 64,
            attempts: 1,
        }
    }

    /// Set the output token budget.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Allow up to `attempts` calls when the failure is retryable.
    ///
    /// Values below 1 are treated as 1.
    pub fn with_attempts(mut self, attempts: u32) -> Self {
        self.attempts = attempts.max(1);
        self
    }

    /// Build the completion request for `prompt`.
    pub fn request(&self, prompt: &str) -> CompletionRequest {
        CompletionRequest::new(&self.model)
            .with_message(Message::system(QUERY_SYSTEM_PROMPT))
            .with_message(Message::user(format!(
                "Generate an optimized search query for the research question:\n{prompt}"
            )))
            .with_max_tokens(self.max_tokens)
            .with_temperature(0.0)
    }

    /// Generate a search query for `prompt`.
    ///
    /// # Errors
    ///
    /// Returns [`ResearchError::Llm`] with [`Stage::Query`] if every attempt
    /// fails or the final reply is blank.
    pub async fn generate(&self, prompt: &str) -> Result<String> {
        let request = self.request(prompt);
        let mut attempt = 1;
        loop {
            match self.attempt(&request).await {
                Ok(query) => {
                    tracing::trace!(%query, "search query generated");
                    return Ok(query);
                }
                Err(err) if err.is_retryable() && attempt < self.attempts => {
                    tracing::warn!(attempt, error = %err, "query generation failed, retrying");
                    attempt += 1;
                }
                Err(err) => return Err(ResearchError::llm(Stage::Query, err)),
            }
        }
    }

    async fn attempt(&self, request: &CompletionRequest) -> std::result::Result<String, LlmError> {
        let text = self.client.complete(request).await?;
        let query = text.trim();
        if query.is_empty() {
            return Err(LlmError::EmptyCompletion("query generation returned blank text".into()));
        }
        Ok(query.to_owned())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;
    use crate::llm::Role;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Replays scripted replies and records each request.
    struct Scripted {
        replies: Mutex<VecDeque<std::result::Result<String, LlmError>>>,
        seen: Mutex<Vec<CompletionRequest>>,
    }

    impl Scripted {
        fn new(replies: Vec<std::result::Result<String, LlmError>>) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies.into()),
                seen: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> usize {
            self.seen.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl CompletionClient for Scripted {
        async fn complete(&self, request: &CompletionRequest) -> std::result::Result<String, LlmError> {
            self.seen.lock().unwrap().push(request.clone());
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(LlmError::RequestError("no scripted reply".into())))
        }

        fn name(&self) -> &str {
            "scripted"
        }
    }

    #[tokio::test]
    async fn reply_is_trimmed() {
        let client = Scripted::new(vec![Ok("  rust async runtimes \n".into())]);
        let generator = QueryGenerator::new(client, "m");
        assert_eq!(generator.generate("q").await.unwrap(), "rust async runtimes");
    }

    #[tokio::test]
    async fn request_is_deterministic_and_bounded() {
        let client = Scripted::new(vec![Ok("query".into())]);
        let generator = QueryGenerator::new(client.clone(), "query-model").with_max_tokens(32);
        generator.generate("What changed in Rust 2024?").await.unwrap();

        let seen = client.seen.lock().unwrap();
        let request = &seen[0];
        assert_eq!(request.model, "query-model");
        assert_eq!(request.temperature, Some(0.0));
        assert_eq!(request.max_tokens, Some(32));
        assert_eq!(request.messages[0].role, Role::System);
        assert!(request.last_user_text().unwrap().ends_with("What changed in Rust 2024?"));
    }

    #[tokio::test]
    async fn blank_reply_is_query_failure() {
        let client = Scripted::new(vec![Ok("   ".into())]);
        let err = QueryGenerator::new(client, "m").generate("q").await.unwrap_err();
        assert_eq!(err.stage(), Some(Stage::Query));
    }

    #[tokio::test]
    async fn single_attempt_by_default() {
        let client = Scripted::new(vec![
            Err(LlmError::TimeoutError("slow".into())),
            Ok("never reached".into()),
        ]);
        let generator = QueryGenerator::new(client.clone(), "m");
        assert!(generator.generate("q").await.is_err());
        assert_eq!(client.calls(), 1);
    }

    #[tokio::test]
    async fn retries_retryable_failures() {
        let client = Scripted::new(vec![
            Ok("".into()),
            Err(LlmError::RequestError("rate limited".into())),
            Ok("third time".into()),
        ]);
        let generator = QueryGenerator::new(client.clone(), "m").with_attempts(3);
        assert_eq!(generator.generate("q").await.unwrap(), "third time");
        assert_eq!(client.calls(), 3);
    }

    #[tokio::test]
    async fn auth_failures_are_not_retried() {
        let client = Scripted::new(vec![
            Err(LlmError::AuthError("bad key".into())),
            Ok("never reached".into()),
        ]);
        let generator = QueryGenerator::new(client.clone(), "m").with_attempts(5);
        let err = generator.generate("q").await.unwrap_err();
        assert!(matches!(
            err,
            ResearchError::Llm {
                source: LlmError::AuthError(_),
                ..
            }
        ));
        assert_eq!(client.calls(), 1);
    }

    #[test]
    fn zero_attempts_means_one() {
        let client = Scripted::new(vec![]);
        let generator = QueryGenerator::new(client, "m").with_attempts(0);
        assert_eq!(generator.attempts, 1);
    }
}
