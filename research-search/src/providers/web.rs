//! General web search via DuckDuckGo's HTML endpoint.
//!
//! Uses `https://html.duckduckgo.com/html/`, which needs no JavaScript and
//! no API key. Result links are wrapped in a DuckDuckGo redirect that is
//! unwrapped here so the evidence link points at the real page.

use async_trait::async_trait;
use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::config::SearchConfig;
use crate::error::SearchError;
use crate::http::{self, FetchPurpose};
use crate::provider::SourceProvider;
use crate::types::{RawRecord, SourceKind};

const DEFAULT_ENDPOINT: &str = "https://html.duckduckgo.com/html/";

/// Web search provider backed by DuckDuckGo.
#[derive(Debug, Clone)]
pub struct WebSearchProvider {
    config: SearchConfig,
    endpoint: String,
}

impl WebSearchProvider {
    /// Create a provider using the public DuckDuckGo endpoint.
    pub fn new(config: SearchConfig) -> Self {
        Self {
            config,
            endpoint: DEFAULT_ENDPOINT.to_owned(),
        }
    }

    /// Point the provider at a different endpoint (used by tests).
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

#[async_trait]
impl SourceProvider for WebSearchProvider {
    async fn fetch(&self, query: &str, limit: usize) -> Result<Vec<RawRecord>, SearchError> {
        tracing::trace!(query, "web search");

        let client = http::build_client(&self.config, FetchPurpose::SearchResults)?;

        let mut params = vec![("q", query)];
        if self.config.safe_search {
            params.push(("kp", "1"));
        }

        let response = client
            .post(&self.endpoint)
            .form(&params)
            .send()
            .await
            .map_err(|e| SearchError::from_reqwest("web search request failed", &e))?
            .error_for_status()
            .map_err(|e| SearchError::Http(format!("web search HTTP error: {e}")))?;

        let html = response
            .text()
            .await
            .map_err(|e| SearchError::from_reqwest("web search response read failed", &e))?;

        tracing::trace!(bytes = html.len(), "web search response received");

        parse_results_html(&html, limit)
    }

    fn kind(&self) -> SourceKind {
        SourceKind::Web
    }
}

/// Extract the target URL from DuckDuckGo's redirect wrapper.
///
/// Wrapped links look like `//duckduckgo.com/l/?uddg=https%3A%2F%2Fexample.com&rut=...`.
/// Direct links are returned unchanged.
fn unwrap_redirect(href: &str) -> Option<String> {
    let full_href = if href.starts_with("//") {
        format!("https:{href}")
    } else {
        href.to_owned()
    };

    let parsed = Url::parse(&full_href).ok()?;

    if parsed.host_str() == Some("duckduckgo.com") && parsed.path().starts_with("/l/") {
        parsed
            .query_pairs()
            .find(|(key, _)| key == "uddg")
            .map(|(_, value)| value.into_owned())
    } else {
        Some(full_href)
    }
}

fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .collect::<Vec<_>>()
        .join(" ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn selector(css: &str) -> Result<Selector, SearchError> {
    Selector::parse(css).map_err(|e| SearchError::Parse(format!("invalid selector {css}: {e:?}")))
}

/// Parse a DuckDuckGo HTML results page into raw records.
pub(crate) fn parse_results_html(html: &str, limit: usize) -> Result<Vec<RawRecord>, SearchError> {
    if html.contains("anomaly-modal") {
        return Err(SearchError::Unavailable(
            "web search returned a bot challenge".into(),
        ));
    }

    let document = Html::parse_document(html);
    let result_sel = selector(
        ".result.results_links.results_links_deep:not(.result--ad), .web-result:not(.result--ad)",
    )?;
    let title_sel = selector(".result__a")?;
    let snippet_sel = selector(".result__snippet")?;

    let mut records = Vec::new();

    for element in document.select(&result_sel) {
        if records.len() >= limit {
            break;
        }

        let Some(title_el) = element.select(&title_sel).next() else {
            continue;
        };
        let Some(url) = title_el.value().attr("href").and_then(unwrap_redirect) else {
            continue;
        };

        let mut record = RawRecord::new()
            .with_url(url)
            .with_text(element_text(element));

        let title = element_text(title_el);
        if !title.is_empty() {
            record = record.with_title(title);
        }
        if let Some(snippet) = element.select(&snippet_sel).next().map(element_text) {
            if !snippet.is_empty() {
                record = record.with_body(snippet);
            }
        }

        records.push(record);
    }

    tracing::debug!(count = records.len(), "web results parsed");
    Ok(records)
}
