//! Configuration types for researchbot.
//!
//! Loaded from `~/.config/researchbot/config.toml` when present; every
//! section has defaults so an empty file (or none at all) works. The API key
//! is normally supplied through `OPENROUTER_API_KEY` rather than the file.

use std::path::{Path, PathBuf};
use std::time::Duration;

use research_search::SearchConfig;
use serde::{Deserialize, Serialize};

use crate::error::{ResearchError, Result};
use crate::llm::{OpenAiCompatClient, OpenAiCompatConfig};

/// Environment variable holding the LLM API key.
pub const API_KEY_ENV: &str = "OPENROUTER_API_KEY";

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResearchConfig {
    /// Extra context handed to every synthesis call.
    pub manual_context: Option<String>,
    /// Completion provider settings.
    pub llm: LlmConfig,
    /// Evidence collection settings.
    pub search: SearchSection,
    /// Line-delimited input files.
    pub lists: ListConfig,
}

/// Completion provider settings.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Base URL of an OpenAI-compatible API.
    pub api_url: String,
    /// API key. Overridden by `OPENROUTER_API_KEY` when that is set.
    pub api_key: String,
    /// Model used for query generation.
    pub query_model: String,
    /// Model used for synthesis.
    pub research_model: String,
    /// Output token budget for query generation.
    pub query_max_tokens: u32,
    /// Output token budget for synthesis.
    pub synthesis_max_tokens: u32,
    /// Synthesis temperature. Provider default when unset.
    pub synthesis_temperature: Option<f32>,
    /// Whole-request timeout in seconds.
    pub timeout_seconds: u64,
    /// Query generation attempts; failures are retried only when transient.
    pub query_attempts: u32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_url: crate::llm::openai::DEFAULT_BASE_URL.into(),
            api_key: String::new(),
            query_model: "openai/gpt-oss-20b:free".into(),
            research_model: "openai/gpt-oss-20b:free".into(),
            query_max_tokens: 64,
            synthesis_max_tokens: 1024,
            synthesis_temperature: None,
            timeout_seconds: 60,
            query_attempts: 1,
        }
    }
}

impl std::fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let key = if self.api_key.is_empty() { "<unset>" } else { "<redacted>" };
        f.debug_struct("LlmConfig")
            .field("api_url", &self.api_url)
            .field("api_key", &key)
            .field("query_model", &self.query_model)
            .field("research_model", &self.research_model)
            .field("query_max_tokens", &self.query_max_tokens)
            .field("synthesis_max_tokens", &self.synthesis_max_tokens)
            .field("synthesis_temperature", &self.synthesis_temperature)
            .field("timeout_seconds", &self.timeout_seconds)
            .field("query_attempts", &self.query_attempts)
            .finish()
    }
}

impl LlmConfig {
    /// Request timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

/// Evidence collection settings: the result bound plus provider options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSection {
    /// Maximum evidence items per request.
    pub max_results: usize,
    /// Provider and collector options.
    #[serde(flatten)]
    pub options: SearchConfig,
}

impl Default for SearchSection {
    fn default() -> Self {
        Self {
            max_results: 5,
            options: SearchConfig::default(),
        }
    }
}

/// Paths of the line-delimited input files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListConfig {
    /// Prompts run by automated mode, one per line.
    pub auto_prompts: PathBuf,
    /// Operator-supplied source URLs, one per line.
    pub custom_sources: PathBuf,
}

impl Default for ListConfig {
    fn default() -> Self {
        Self {
            auto_prompts: PathBuf::from("auto_prompts.txt"),
            custom_sources: PathBuf::from("custom_sources.txt"),
        }
    }
}

impl ResearchConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| ResearchError::Config(e.to_string()))
    }

    /// Save configuration to a TOML file, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or the config cannot be serialized.
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| ResearchError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Write a starter config of defaults to `path`.
    ///
    /// An existing file is left untouched unless `force` is set.
    ///
    /// # Errors
    ///
    /// Returns a config error if the file exists and `force` is false, or
    /// any error from [`save_to_file`](Self::save_to_file).
    pub fn init_file(path: &Path, force: bool) -> Result<()> {
        if path.exists() && !force {
            return Err(ResearchError::Config(format!(
                "{} already exists (use --force to overwrite)",
                path.display()
            )));
        }
        Self::default().save_to_file(path)
    }

    /// Returns the default config file path: `~/.config/researchbot/config.toml`.
    pub fn default_config_path() -> PathBuf {
        if let Some(config) = std::env::var_os("XDG_CONFIG_HOME") {
            PathBuf::from(config).join("researchbot").join("config.toml")
        } else if let Some(dir) = dirs::config_dir() {
            dir.join("researchbot").join("config.toml")
        } else {
            PathBuf::from("/tmp/researchbot-config/config.toml")
        }
    }

    /// Load from `path`, or from the default path if it exists, then apply
    /// environment overrides.
    ///
    /// An explicit `path` must exist; a missing default file means defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if a file that should be read cannot be read or parsed.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => {
                let default_path = Self::default_config_path();
                if default_path.exists() {
                    tracing::debug!(path = %default_path.display(), "loading config");
                    Self::from_file(&default_path)?
                } else {
                    Self::default()
                }
            }
        };
        config.apply_env();
        Ok(config)
    }

    /// Apply overrides from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_env_with(|name| std::env::var(name).ok());
    }

    /// Apply overrides using `lookup` to read variables.
    pub fn apply_env_with(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(key) = lookup(API_KEY_ENV).filter(|k| !k.trim().is_empty()) {
            self.llm.api_key = key.trim().to_owned();
        }
    }

    /// Validate before any request is processed.
    ///
    /// # Errors
    ///
    /// Returns [`ResearchError::Config`] if the API key is missing, a model
    /// or token budget is empty, or the search options are invalid.
    pub fn validate(&self) -> Result<()> {
        if self.llm.api_key.trim().is_empty() {
            return Err(ResearchError::Config(format!(
                "missing API key: set {API_KEY_ENV} or llm.api_key"
            )));
        }
        if self.llm.api_url.trim().is_empty() {
            return Err(ResearchError::Config("llm.api_url must not be empty".into()));
        }
        if self.llm.query_model.trim().is_empty() || self.llm.research_model.trim().is_empty() {
            return Err(ResearchError::Config("llm model names must not be empty".into()));
        }
        if self.llm.query_max_tokens == 0 || self.llm.synthesis_max_tokens == 0 {
            return Err(ResearchError::Config(
                "llm token budgets must be greater than 0".into(),
            ));
        }
        if self.llm.timeout_seconds == 0 {
            return Err(ResearchError::Config(
                "llm.timeout_seconds must be greater than 0".into(),
            ));
        }
        if self.llm.query_attempts == 0 {
            return Err(ResearchError::Config(
                "llm.query_attempts must be at least 1".into(),
            ));
        }
        self.search.options.validate()?;
        Ok(())
    }

    /// Build the completion client described by the `llm` section.
    ///
    /// # Errors
    ///
    /// Returns [`ResearchError::Config`] if the client cannot be created.
    pub fn completion_client(&self) -> Result<OpenAiCompatClient> {
        let config = OpenAiCompatConfig::new(&self.llm.api_key)
            .with_base_url(&self.llm.api_url)
            .with_timeout(self.llm.timeout())
            .with_app_title("researchbot");
        OpenAiCompatClient::new(config).map_err(|e| ResearchError::Config(e.to_string()))
    }
}
