//! LLM completion clients.
//!
//! Query generation and synthesis both go through [`CompletionClient`], so
//! either stage can run against a test double instead of a real provider.

pub mod error;
pub mod message;
pub mod openai;

use async_trait::async_trait;

pub use error::LlmError;
pub use message::{CompletionRequest, Message, Role};
pub use openai::{OpenAiCompatClient, OpenAiCompatConfig};

/// A non-streaming chat completion backend.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Send `request` and return the completion text.
    ///
    /// # Errors
    ///
    /// Returns an [`LlmError`] if the call fails or the provider's response
    /// carries no completion.
    async fn complete(&self, request: &CompletionRequest) -> Result<String, LlmError>;

    /// Backend name used in logs.
    fn name(&self) -> &str;
}
