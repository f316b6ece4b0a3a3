//! OpenAI-compatible chat completions client.
//!
//! Works against any server implementing `POST /v1/chat/completions`:
//! OpenRouter (the default), OpenAI, Ollama, vLLM and similar. Requests are
//! non-streaming; the first choice's message content is the completion.
//!
//! # Examples
//!
//! ```rust,no_run
//! use researchbot::llm::{CompletionClient, CompletionRequest, Message};
//! use researchbot::llm::{OpenAiCompatClient, OpenAiCompatConfig};
//!
//! # async fn example() -> Result<(), researchbot::llm::LlmError> {
//! let client = OpenAiCompatClient::new(OpenAiCompatConfig::new("sk-or-..."))?;
//! let request = CompletionRequest::new("openai/gpt-oss-20b:free")
//!     .with_message(Message::user("Hello"));
//! let text = client.complete(&request).await?;
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use super::error::LlmError;
use super::message::CompletionRequest;
use super::CompletionClient;

/// Default base URL (OpenRouter's OpenAI-compatible API root).
pub const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api";

// ── Configuration ─────────────────────────────────────────────

/// Configuration for [`OpenAiCompatClient`].
#[derive(Clone)]
pub struct OpenAiCompatConfig {
    /// API key sent as a bearer token.
    pub api_key: String,
    /// Base URL; `/v1/chat/completions` is appended.
    pub base_url: String,
    /// Whole-request timeout.
    pub timeout: Duration,
    /// Application title reported to OpenRouter (`X-Title`).
    pub app_title: Option<String>,
}

impl std::fmt::Debug for OpenAiCompatConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiCompatConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("app_title", &self.app_title)
            .finish()
    }
}

impl OpenAiCompatConfig {
    /// Create a config with the given API key and default base URL.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.into(),
            timeout: Duration::from_secs(60),
            app_title: None,
        }
    }

    /// Set a custom base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the application title header.
    pub fn with_app_title(mut self, title: impl Into<String>) -> Self {
        self.app_title = Some(title.into());
        self
    }

    fn completions_url(&self) -> String {
        format!("{}/v1/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

// ── Request / Response ────────────────────────────────────────

/// Build the JSON request body for the Chat Completions API.
pub fn build_completions_request(request: &CompletionRequest) -> serde_json::Value {
    let mut body = serde_json::json!({
        "model": request.model,
        "messages": request.messages,
        "stream": false,
    });

    if let Some(obj) = body.as_object_mut() {
        if let Some(max_tokens) = request.max_tokens {
            obj.insert("max_tokens".into(), serde_json::json!(max_tokens));
        }
        if let Some(temp) = request.temperature {
            obj.insert("temperature".into(), serde_json::json!(temp));
        }
    }

    body
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(default)]
    message: String,
}

/// Extract the completion text from a successful response body.
///
/// Some gateways report upstream failures as a 200 with an `error` object,
/// so that is checked before the choices.
pub fn parse_completion(body: &str) -> Result<String, LlmError> {
    let response: ChatCompletionResponse = serde_json::from_str(body)
        .map_err(|e| LlmError::ProviderError(format!("invalid completion response: {e}")))?;

    if let Some(error) = response.error {
        return Err(LlmError::ProviderError(format!(
            "provider returned an error: {}",
            error.message
        )));
    }

    let content = response
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .unwrap_or_default();

    if content.trim().is_empty() {
        return Err(LlmError::EmptyCompletion(
            "completion response had no content".into(),
        ));
    }
    Ok(content)
}

/// Extract an error message from an error response body.
fn extract_error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.get("error")
                .and_then(|e| e.get("message"))
                .and_then(|m| m.as_str())
                .map(String::from)
        })
        .unwrap_or_else(|| body.to_string())
}

fn map_http_error(status: reqwest::StatusCode, body: &str) -> LlmError {
    let message = extract_error_message(body);
    match status.as_u16() {
        401 | 403 => LlmError::AuthError(format!("authentication failed: {message}")),
        429 => LlmError::RequestError(format!("rate limited: {message}")),
        _ => LlmError::ProviderError(format!("HTTP {}: {message}", status.as_u16())),
    }
}

// ── Client ────────────────────────────────────────────────────

/// Chat completions client for OpenAI-compatible servers.
#[derive(Debug, Clone)]
pub struct OpenAiCompatClient {
    config: OpenAiCompatConfig,
    client: reqwest::Client,
}

impl OpenAiCompatClient {
    /// Create a client.
    ///
    /// # Errors
    ///
    /// Returns [`LlmError::ConfigError`] if the API key is blank or the HTTP
    /// client cannot be built.
    pub fn new(config: OpenAiCompatConfig) -> Result<Self, LlmError> {
        if config.api_key.trim().is_empty() {
            return Err(LlmError::ConfigError("API key is empty".into()));
        }
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| LlmError::ConfigError(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { config, client })
    }

    /// The client configuration.
    pub fn config(&self) -> &OpenAiCompatConfig {
        &self.config
    }
}

#[async_trait]
impl CompletionClient for OpenAiCompatClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, LlmError> {
        let url = self.config.completions_url();
        let body = build_completions_request(request);

        let mut builder = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .header("Content-Type", "application/json");

        if let Some(title) = &self.config.app_title {
            builder = builder.header("X-Title", title);
        }

        tracing::debug!(model = %request.model, messages = request.messages.len(), "sending completion request");

        let response = builder.json(&body).send().await.map_err(|e| {
            if e.is_timeout() {
                LlmError::TimeoutError(format!("completion request timed out: {e}"))
            } else {
                LlmError::RequestError(format!("completion request failed: {e}"))
            }
        })?;

        let status = response.status();
        let text = response.text().await.map_err(|e| {
            if e.is_timeout() {
                LlmError::TimeoutError(format!("completion body timed out: {e}"))
            } else {
                LlmError::RequestError(format!("failed to read completion body: {e}"))
            }
        })?;

        if !status.is_success() {
            return Err(map_http_error(status, &text));
        }

        parse_completion(&text)
    }

    fn name(&self) -> &str {
        "openai-compat"
    }
}
