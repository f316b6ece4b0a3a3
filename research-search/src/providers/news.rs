//! News search via Bing News result cards.
//!
//! Each card carries the article URL as a `url` attribute on the card
//! container and again as the `href` of its title anchor, which map onto the
//! primary and secondary link fields of a [`RawRecord`].

use async_trait::async_trait;
use scraper::{ElementRef, Html, Selector};

use crate::config::SearchConfig;
use crate::error::SearchError;
use crate::http::{self, FetchPurpose};
use crate::provider::SourceProvider;
use crate::types::{RawRecord, SourceKind};

const DEFAULT_ENDPOINT: &str = "https://www.bing.com/news/search";

/// News search provider backed by Bing News.
#[derive(Debug, Clone)]
pub struct NewsSearchProvider {
    config: SearchConfig,
    endpoint: String,
}

impl NewsSearchProvider {
    /// Create a provider using the public Bing News endpoint.
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
impl SourceProvider for NewsSearchProvider {
    async fn fetch(&self, query: &str, limit: usize) -> Result<Vec<RawRecord>, SearchError> {
        tracing::trace!(query, "news search");

        let client = http::build_client(&self.config, FetchPurpose::SearchResults)?;
        let safe_search = if self.config.safe_search { "Strict" } else { "Off" };

        let response = client
            .get(&self.endpoint)
            .query(&[
                ("q", query),
                ("setlang", "en"),
                ("safeSearch", safe_search),
            ])
            .send()
            .await
            .map_err(|e| SearchError::from_reqwest("news search request failed", &e))?
            .error_for_status()
            .map_err(|e| SearchError::Http(format!("news search HTTP error: {e}")))?;

        let html = response
            .text()
            .await
            .map_err(|e| SearchError::from_reqwest("news search response read failed", &e))?;

        tracing::trace!(bytes = html.len(), "news search response received");

        parse_news_html(&html, limit)
    }

    fn kind(&self) -> SourceKind {
        SourceKind::News
    }
}

fn collapsed_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
}

/// Parse a Bing News results page into raw records.
pub(crate) fn parse_news_html(html: &str, limit: usize) -> Result<Vec<RawRecord>, SearchError> {
    let document = Html::parse_document(html);

    let card_sel = Selector::parse("div.news-card")
        .map_err(|e| SearchError::Parse(format!("invalid card selector: {e:?}")))?;
    let title_sel = Selector::parse("a.title")
        .map_err(|e| SearchError::Parse(format!("invalid title selector: {e:?}")))?;
    let snippet_sel = Selector::parse("div.snippet")
        .map_err(|e| SearchError::Parse(format!("invalid snippet selector: {e:?}")))?;

    let mut records = Vec::new();

    for card in document.select(&card_sel) {
        if records.len() >= limit {
            break;
        }

        let title_el = card.select(&title_sel).next();
        let url = non_empty(card.value().attr("url"));
        let href = non_empty(title_el.and_then(|el| el.value().attr("href")));
        // Cards without a link cannot become evidence; don't spend the limit on them.
        if url.is_none() && href.is_none() {
            continue;
        }
        let snippet_el = card.select(&snippet_sel).next();

        let title = title_el
            .map(collapsed_text)
            .filter(|t| !t.is_empty())
            .or_else(|| non_empty(card.value().attr("data-title")));

        // The snippet's `title` attribute holds the untruncated summary.
        let body = snippet_el.and_then(|el| {
            non_empty(el.value().attr("title"))
                .or_else(|| Some(collapsed_text(el)).filter(|t| !t.is_empty()))
        });

        records.push(RawRecord {
            url,
            href,
            title,
            body,
            text: Some(collapsed_text(card)).filter(|t| !t.is_empty()),
        });
    }

    tracing::debug!(count = records.len(), "news results parsed");
    Ok(records)
}
