//! Canonical link form used as the deduplication key.
//!
//! Two links that point at the same page (differing only in host case,
//! default port, trailing slash, fragment, tracking parameters or query
//! order) produce the same key. Links that are not absolute URLs, such as
//! bare identifiers from test doubles, are keyed by their trimmed text.

use url::Url;

/// Query parameters that never change the page being linked to.
const TRACKING_PARAMS: &[&str] = &[
    "utm_source",
    "utm_medium",
    "utm_campaign",
    "utm_term",
    "utm_content",
    "fbclid",
    "gclid",
    "msclkid",
    "ocid",
];

/// Compute the canonical dedup key for a link.
///
/// ```
/// use research_search::url_normalize::canonical_link;
///
/// assert_eq!(
///     canonical_link("https://News.Example.com:443/story/?b=2&a=1&utm_source=x#top"),
///     canonical_link("https://news.example.com/story?a=1&b=2"),
/// );
/// ```
pub fn canonical_link(link: &str) -> String {
    let trimmed = link.trim();
    let Ok(mut url) = Url::parse(trimmed) else {
        return trimmed.to_owned();
    };
    if url.cannot_be_a_base() {
        return trimmed.to_owned();
    }

    // Parsing already drops `:80` and `:443` for their own schemes.
    url.set_fragment(None);

    let mut params: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| !TRACKING_PARAMS.contains(&key.to_ascii_lowercase().as_str()))
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    params.sort();

    if params.is_empty() {
        url.set_query(None);
    } else {
        url.query_pairs_mut().clear().extend_pairs(params);
    }

    let path = url.path().to_owned();
    if path.len() > 1 && path.ends_with('/') {
        url.set_path(path.trim_end_matches('/'));
    }

    url.to_string()
}
