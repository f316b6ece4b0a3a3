//! Core types for raw provider records and normalized evidence.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which kind of provider produced a piece of evidence.
///
/// The declaration order is the collection priority: operator-supplied
/// sources first, then general web search, then news.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Operator-supplied URLs fetched directly.
    Custom,
    /// General web search.
    Web,
    /// News search.
    News,
}

impl SourceKind {
    /// Returns the lower-case name of this source kind.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Custom => "custom",
            Self::Web => "web",
            Self::News => "news",
        }
    }

    /// Returns all source kinds in collection priority order.
    pub fn priority_order() -> &'static [SourceKind] {
        &[Self::Custom, Self::Web, Self::News]
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single normalized piece of retrieved information.
///
/// `link` is the uniqueness key within one collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evidence {
    /// Title of the source page (or a prefix of its text).
    pub title: String,
    /// Text used as synthesis context.
    pub snippet: String,
    /// Link to the source.
    pub link: String,
    /// Which provider kind produced this item.
    pub source_kind: SourceKind,
}

/// A record as returned by a provider, before normalization.
///
/// Every field is optional; providers fill in whatever their backend
/// exposes. [`crate::normalize::normalize`] applies the fallback rules.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRecord {
    /// Primary link field (e.g. the result URL).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Secondary link field (e.g. the anchor `href`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
    /// Explicit title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Explicit body / snippet.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    /// Generic text, used when title or body is missing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl RawRecord {
    /// Create an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the primary link.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Set the secondary link.
    pub fn with_href(mut self, href: impl Into<String>) -> Self {
        self.href = Some(href.into());
        self
    }

    /// Set the explicit title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the explicit body.
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Set the generic text field.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }
}
