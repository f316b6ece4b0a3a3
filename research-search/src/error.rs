//! Error types for the research-search crate.
//!
//! A [`SearchError`] is what a single provider reports when its fetch fails.
//! The collector records it against the provider and moves on, so these
//! errors never abort a collection.

/// Errors that can occur while fetching raw records from a provider.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// An HTTP request to a search backend or source URL failed.
    #[error("HTTP error: {0}")]
    Http(String),

    /// A request did not complete within its timeout.
    #[error("timed out: {0}")]
    Timeout(String),

    /// Failed to parse a search backend's response.
    #[error("parse error: {0}")]
    Parse(String),

    /// Invalid search configuration.
    #[error("config error: {0}")]
    Config(String),

    /// The provider cannot serve requests (blocked, disabled, misconfigured backend).
    #[error("provider unavailable: {0}")]
    Unavailable(String),
}

impl SearchError {
    /// Classify a `reqwest` failure, keeping timeouts distinct from other HTTP errors.
    pub(crate) fn from_reqwest(context: &str, err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(format!("{context}: {err}"))
        } else {
            Self::Http(format!("{context}: {err}"))
        }
    }
}

/// Convenience type alias for research-search results.
pub type Result<T> = std::result::Result<T, SearchError>;
