//! # research-search
//!
//! Evidence retrieval for researchbot.
//!
//! Gathers candidate records for a search query from three kinds of
//! provider, converts them into [`Evidence`], and merges them into one
//! ordered, deduplicated list.
//!
//! ## Design
//!
//! - Providers run in a fixed priority order: operator-supplied URLs, then
//!   web search, then news search
//! - The first copy of a link wins, so higher-priority sources shadow
//!   lower-priority duplicates
//! - A failing provider is logged and skipped; collection never errors
//! - A fixed delay follows every collection as a simple rate limit
//! - Search backends are scraped directly; no API keys are needed
//!
//! ## Security
//!
//! - Search queries are logged only at trace level
//! - No network listeners: this is a library, not a server

pub mod collector;
pub mod config;
pub mod content;
pub mod dedup;
pub mod error;
pub mod http;
pub mod normalize;
pub mod pacing;
pub mod provider;
pub mod providers;
pub mod types;
pub mod url_normalize;

pub use collector::{Collection, EvidenceCollector, ProviderOutcome, ProviderStats};
pub use config::SearchConfig;
pub use error::{Result, SearchError};
pub use pacing::PostCollectionDelay;
pub use provider::SourceProvider;
pub use providers::{CustomUrlProvider, NewsSearchProvider, WebSearchProvider};
pub use types::{Evidence, RawRecord, SourceKind};

/// Collect evidence for `query` with the standard providers.
///
/// Builds an [`EvidenceCollector`] from `config` with `custom_urls` as the
/// operator source list, then collects up to `max_results` items.
///
/// # Errors
///
/// Returns [`SearchError::Config`] if `config` is invalid. Provider
/// failures are not errors; they only reduce the evidence returned.
///
/// # Examples
///
/// ```no_run
/// # async fn example() -> research_search::Result<()> {
/// let config = research_search::SearchConfig::default();
/// let evidence = research_search::collect("rust async runtimes", &config, vec![], 5).await?;
/// for item in &evidence {
///     println!("{}: {}", item.title, item.link);
/// }
/// # Ok(())
/// # }
/// ```
pub async fn collect(
    query: &str,
    config: &SearchConfig,
    custom_urls: Vec<String>,
    max_results: usize,
) -> Result<Vec<Evidence>> {
    config.validate()?;
    Ok(EvidenceCollector::from_config(config, custom_urls)
        .collect(query, max_results)
        .await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn collect_validates_config() {
        let config = SearchConfig {
            timeout_seconds: 0,
            ..Default::default()
        };
        let result = collect("test", &config, vec![], 5).await;
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("timeout"));
    }

    #[tokio::test(start_paused = true)]
    async fn collect_zero_results_is_empty() {
        let config = SearchConfig::default();
        let evidence = collect("test", &config, vec![], 0).await.expect("valid config");
        assert!(evidence.is_empty());
    }
}
