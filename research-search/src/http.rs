//! HTTP clients for providers.
//!
//! Search result pages and operator URLs are fetched with different
//! timeouts and `Accept` headers; both send a browser User-Agent and
//! English `Accept-Language`.

use rand::seq::SliceRandom;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE};

use crate::config::SearchConfig;
use crate::error::SearchError;

/// Browser User-Agent strings; one is picked per client.
const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:133.0) Gecko/20100101 Firefox/133.0",
];

/// What a client will be used to fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchPurpose {
    /// A search backend's results page.
    SearchResults,
    /// An operator-supplied source URL, fetched with the short timeout.
    SourcePage,
}

impl FetchPurpose {
    fn accept(self) -> &'static str {
        match self {
            Self::SearchResults => "text/html",
            Self::SourcePage => "text/html,text/plain;q=0.9,*/*;q=0.8",
        }
    }
}

/// Build a client for `purpose`.
///
/// # Errors
///
/// Returns [`SearchError::Http`] if the client cannot be constructed.
pub fn build_client(config: &SearchConfig, purpose: FetchPurpose) -> Result<reqwest::Client, SearchError> {
    let timeout = match purpose {
        FetchPurpose::SearchResults => config.timeout(),
        FetchPurpose::SourcePage => config.custom_fetch_timeout(),
    };
    let user_agent = config
        .user_agent
        .clone()
        .unwrap_or_else(|| random_user_agent().to_owned());

    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static(purpose.accept()));
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));

    reqwest::Client::builder()
        .cookie_store(true)
        .timeout(timeout)
        .user_agent(user_agent)
        .default_headers(headers)
        .redirect(reqwest::redirect::Policy::limited(10))
        .build()
        .map_err(|e| SearchError::Http(format!("failed to build HTTP client: {e}")))
}

/// Pick a User-Agent from the built-in list.
pub fn random_user_agent() -> &'static str {
    USER_AGENTS
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(USER_AGENTS[0])
}
