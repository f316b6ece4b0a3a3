//! Line-delimited list inputs: automated-mode prompts and custom source URLs.
//!
//! A list that cannot be read is logged and treated as empty; it never
//! stops the program.

use std::path::Path;

use crate::config::ListConfig;

/// Prompts used by automated mode when the prompt list is empty.
pub const DEFAULT_AUTO_PROMPTS: &[&str] = &[
    "Latest trends in AI-generated art",
    "Recent research on quantum computing applications",
];

/// Split `content` into trimmed, non-empty lines.
pub fn parse_lines(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Read a line-delimited list from `path`.
///
/// Missing or unreadable files yield an empty list and a warning.
pub fn read_list(path: &Path) -> Vec<String> {
    match std::fs::read_to_string(path) {
        Ok(content) => {
            let lines = parse_lines(&content);
            tracing::debug!(path = %path.display(), entries = lines.len(), "list loaded");
            lines
        }
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::warn!(path = %path.display(), "list file not found, using empty list");
            Vec::new()
        }
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %err, "list file unreadable, using empty list");
            Vec::new()
        }
    }
}

/// Both list inputs, loaded together.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListInputs {
    /// Prompts for automated mode.
    pub auto_prompts: Vec<String>,
    /// Operator-supplied source URLs.
    pub custom_sources: Vec<String>,
}

impl ListInputs {
    /// Read both lists named in `config`.
    pub fn load(config: &ListConfig) -> Self {
        Self {
            auto_prompts: read_list(&config.auto_prompts),
            custom_sources: read_list(&config.custom_sources),
        }
    }

    /// Prompts for automated mode, falling back to [`DEFAULT_AUTO_PROMPTS`].
    pub fn prompts_or_default(&self) -> Vec<String> {
        if self.auto_prompts.is_empty() {
            DEFAULT_AUTO_PROMPTS.iter().map(|p| (*p).to_owned()).collect()
        } else {
            self.auto_prompts.clone()
        }
    }
}
