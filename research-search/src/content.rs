//! Readable text extraction for fetched HTML pages.
//!
//! Picks the main content container and collects its text, skipping
//! scripts, styles and page chrome.

use scraper::{Html, Selector};

/// Elements whose text never counts as page content.
const SKIPPED_ELEMENTS: &[&str] = &[
    "script", "style", "nav", "footer", "header", "aside", "noscript", "svg", "iframe", "form",
];

/// Containers tried in order when looking for the main content.
const CONTENT_SELECTORS: &[&str] = &["article", "main", "[role=\"main\"]", "body"];

/// Extract readable text from an HTML document.
///
/// Returns `None` if the document has no visible text.
pub fn readable_text(html: &str) -> Option<String> {
    let document = Html::parse_document(html);

    let root = CONTENT_SELECTORS
        .iter()
        .filter_map(|css| Selector::parse(css).ok())
        .find_map(|sel| document.select(&sel).next())
        .unwrap_or_else(|| document.root_element());

    let mut words: Vec<&str> = Vec::new();
    for node in root.descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        let skipped = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .is_some_and(|el| SKIPPED_ELEMENTS.contains(&el.name()))
        });
        if !skipped {
            words.extend(text.split_whitespace());
        }
    }

    if words.is_empty() {
        None
    } else {
        Some(words.join(" "))
    }
}
