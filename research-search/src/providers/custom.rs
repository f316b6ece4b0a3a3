//! Operator-supplied source URLs fetched directly.
//!
//! Each URL is fetched with a short timeout. The URL doubles as the record
//! title and the response body becomes the snippet. A URL that fails to
//! fetch is logged and skipped; it never fails the provider as a whole.

use async_trait::async_trait;

use crate::config::SearchConfig;
use crate::content::readable_text;
use crate::error::SearchError;
use crate::http::{self, FetchPurpose};
use crate::provider::SourceProvider;
use crate::types::{RawRecord, SourceKind};

/// Provider that fetches a fixed list of URLs.
#[derive(Debug, Clone)]
pub struct CustomUrlProvider {
    config: SearchConfig,
    urls: Vec<String>,
}

impl CustomUrlProvider {
    /// Create a provider for `urls`. Blank entries are dropped.
    pub fn new(config: SearchConfig, urls: Vec<String>) -> Self {
        let urls = urls
            .into_iter()
            .map(|u| u.trim().to_owned())
            .filter(|u| !u.is_empty())
            .collect();
        Self { config, urls }
    }

    /// The URLs this provider fetches, in order.
    pub fn urls(&self) -> &[String] {
        &self.urls
    }

    async fn fetch_one(&self, client: &reqwest::Client, url: &str) -> Result<String, SearchError> {
        let response = client
            .get(url)
            .send()
            .await
            .map_err(|e| SearchError::from_reqwest("source fetch failed", &e))?
            .error_for_status()
            .map_err(|e| SearchError::Http(format!("source HTTP error: {e}")))?;

        let body = response
            .text()
            .await
            .map_err(|e| SearchError::from_reqwest("source body read failed", &e))?;

        if self.config.extract_readable_text {
            Ok(readable_text(&body).unwrap_or_default())
        } else {
            Ok(body)
        }
    }
}

#[async_trait]
impl SourceProvider for CustomUrlProvider {
    async fn fetch(&self, _query: &str, limit: usize) -> Result<Vec<RawRecord>, SearchError> {
        if self.urls.is_empty() || limit == 0 {
            return Ok(Vec::new());
        }

        let client = http::build_client(&self.config, FetchPurpose::SourcePage)?;
        let mut records = Vec::new();

        for url in &self.urls {
            if records.len() >= limit {
                break;
            }
            match self.fetch_one(&client, url).await {
                Ok(body) => {
                    tracing::debug!(url = %url, bytes = body.len(), "custom source fetched");
                    records.push(RawRecord::new().with_url(url).with_title(url).with_body(body));
                }
                Err(err) => {
                    tracing::warn!(url = %url, error = %err, "custom source skipped");
                }
            }
        }

        Ok(records)
    }

    fn kind(&self) -> SourceKind {
        SourceKind::Custom
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_urls_are_dropped() {
        let provider = CustomUrlProvider::new(
            SearchConfig::default(),
            vec!["  https://a.com  ".into(), "".into(), "   ".into()],
        );
        assert_eq!(provider.urls(), ["https://a.com"]);
    }

    #[tokio::test]
    async fn no_urls_returns_empty_without_network() {
        let provider = CustomUrlProvider::new(SearchConfig::default(), vec![]);
        let records = provider.fetch("anything", 5).await.expect("should succeed");
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn unreachable_url_is_skipped() {
        let config = SearchConfig {
            custom_fetch_timeout_seconds: 1,
            ..Default::default()
        };
        // Port 9 (discard) on localhost is not expected to serve HTTP.
        let provider = CustomUrlProvider::new(config, vec!["http://127.0.0.1:9/".into()]);
        let records = provider.fetch("q", 5).await.expect("failures are swallowed");
        assert!(records.is_empty());
    }

    #[test]
    fn kind_is_custom() {
        let provider = CustomUrlProvider::new(SearchConfig::default(), vec![]);
        assert_eq!(provider.kind(), SourceKind::Custom);
    }
}
