//! Search configuration with sensible defaults.
//!
//! [`SearchConfig`] controls timeouts, request headers, the post-collection
//! delay and whether providers are fetched concurrently.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::SearchError;

/// Configuration shared by the providers and the collector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Per-request timeout for search backends, in seconds.
    pub timeout_seconds: u64,
    /// Timeout for each direct fetch of an operator-supplied URL, in seconds.
    pub custom_fetch_timeout_seconds: u64,
    /// Whether to request safe search filtering from backends that support it.
    pub safe_search: bool,
    /// Custom User-Agent string. If `None`, rotates through a built-in list.
    pub user_agent: Option<String>,
    /// Delay applied once after every collection, in milliseconds.
    pub post_collection_delay_ms: u64,
    /// Fetch all providers at once instead of one after another.
    /// Merge order is the same either way.
    pub concurrent_providers: bool,
    /// Strip HTML boilerplate from fetched custom pages before use.
    pub extract_readable_text: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 8,
            custom_fetch_timeout_seconds: 5,
            safe_search: true,
            user_agent: None,
            post_collection_delay_ms: 1_000,
            concurrent_providers: false,
            extract_readable_text: false,
        }
    }
}

impl SearchConfig {
    /// Validates this configuration.
    ///
    /// Both timeouts must be greater than 0. A zero delay is allowed.
    pub fn validate(&self) -> Result<(), SearchError> {
        if self.timeout_seconds == 0 {
            return Err(SearchError::Config(
                "timeout_seconds must be greater than 0".into(),
            ));
        }
        if self.custom_fetch_timeout_seconds == 0 {
            return Err(SearchError::Config(
                "custom_fetch_timeout_seconds must be greater than 0".into(),
            ));
        }
        Ok(())
    }

    /// Search backend request timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    /// Direct URL fetch timeout.
    pub fn custom_fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.custom_fetch_timeout_seconds)
    }

    /// Post-collection delay.
    pub fn post_collection_delay(&self) -> Duration {
        Duration::from_millis(self.post_collection_delay_ms)
    }
}
