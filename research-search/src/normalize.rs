//! Conversion of raw provider records into [`Evidence`].
//!
//! Normalization is total: missing fields fall back to a prefix of the
//! generic text field, then to a fixed placeholder. The only way a record
//! is rejected is when it carries no link at all.

use crate::types::{Evidence, RawRecord, SourceKind};

/// Characters of generic text used when a record has no title.
pub const TITLE_FALLBACK_CHARS: usize = 50;

/// Characters of generic text used when a record has no body.
pub const SNIPPET_FALLBACK_CHARS: usize = 150;

/// Title used when neither a title nor generic text is present.
pub const NO_TITLE: &str = "No title";

/// Snippet used when neither a body nor generic text is present.
pub const NO_SNIPPET: &str = "No snippet";

/// Normalize a raw record produced by a provider of the given kind.
///
/// Returns `None` if the record has neither a primary nor a secondary link.
/// Empty or whitespace-only fields count as absent.
pub fn normalize(record: &RawRecord, source_kind: SourceKind) -> Option<Evidence> {
    let link = present(&record.url).or_else(|| present(&record.href))?;
    let text = present(&record.text);

    let title = match present(&record.title) {
        Some(title) => title.to_owned(),
        None => text
            .map(|t| char_prefix(t, TITLE_FALLBACK_CHARS))
            .unwrap_or_else(|| NO_TITLE.to_owned()),
    };

    let snippet = match present(&record.body) {
        Some(body) => body.to_owned(),
        None => text
            .map(|t| char_prefix(t, SNIPPET_FALLBACK_CHARS))
            .unwrap_or_else(|| NO_SNIPPET.to_owned()),
    };

    Some(Evidence {
        title,
        snippet,
        link: link.to_owned(),
        source_kind,
    })
}

fn present(field: &Option<String>) -> Option<&str> {
    field.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// First `max_chars` characters of `text`, never splitting a code point.
fn char_prefix(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => text[..byte_idx].to_owned(),
        None => text.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_fields_are_used() {
        let record = RawRecord::new()
            .with_url("https://example.com/a")
            .with_title("Example")
            .with_body("An example page");
        let evidence = normalize(&record, SourceKind::Web).expect("has link");
        assert_eq!(evidence.link, "https://example.com/a");
        assert_eq!(evidence.title, "Example");
        assert_eq!(evidence.snippet, "An example page");
        assert_eq!(evidence.source_kind, SourceKind::Web);
    }

    #[test]
    fn primary_link_wins_over_secondary() {
        let record = RawRecord::new()
            .with_url("https://primary.com")
            .with_href("https://secondary.com");
        let evidence = normalize(&record, SourceKind::News).expect("has link");
        assert_eq!(evidence.link, "https://primary.com");
    }

    #[test]
    fn secondary_link_used_when_primary_missing() {
        let record = RawRecord::new().with_href("https://secondary.com");
        let evidence = normalize(&record, SourceKind::Web).expect("has link");
        assert_eq!(evidence.link, "https://secondary.com");
    }

    #[test]
    fn blank_primary_link_falls_through() {
        let record = RawRecord::new().with_url("   ").with_href("https://b.com");
        let evidence = normalize(&record, SourceKind::Web).expect("has link");
        assert_eq!(evidence.link, "https://b.com");
    }

    #[test]
    fn record_without_link_is_rejected() {
        let record = RawRecord::new().with_title("Orphan").with_body("no link");
        assert!(normalize(&record, SourceKind::Web).is_none());
    }

    #[test]
    fn long_text_is_truncated_for_title_and_snippet() {
        let text: String = (0..200).map(|i| char::from(b'a' + (i % 26) as u8)).collect();
        let record = RawRecord::new().with_url("https://t.com").with_text(&text);
        let evidence = normalize(&record, SourceKind::Web).expect("has link");
        assert_eq!(evidence.title, &text[..50]);
        assert_eq!(evidence.snippet, &text[..150]);
        assert_eq!(evidence.title.chars().count(), 50);
        assert_eq!(evidence.snippet.chars().count(), 150);
    }

    #[test]
    fn short_text_is_used_whole() {
        let record = RawRecord::new().with_url("https://t.com").with_text("short");
        let evidence = normalize(&record, SourceKind::Web).expect("has link");
        assert_eq!(evidence.title, "short");
        assert_eq!(evidence.snippet, "short");
    }

    #[test]
    fn placeholders_when_nothing_available() {
        let record = RawRecord::new().with_url("https://t.com");
        let evidence = normalize(&record, SourceKind::Custom).expect("has link");
        assert_eq!(evidence.title, NO_TITLE);
        assert_eq!(evidence.snippet, NO_SNIPPET);
    }

    #[test]
    fn multibyte_text_truncates_on_char_boundary() {
        let text = "é".repeat(80);
        let record = RawRecord::new().with_url("https://t.com").with_text(&text);
        let evidence = normalize(&record, SourceKind::Web).expect("has link");
        assert_eq!(evidence.title.chars().count(), 50);
        assert_eq!(evidence.snippet.chars().count(), 80);
    }

    #[test]
    fn explicit_body_is_not_truncated() {
        let body = "x".repeat(5_000);
        let record = RawRecord::new()
            .with_url("https://t.com")
            .with_title("https://t.com")
            .with_body(&body);
        let evidence = normalize(&record, SourceKind::Custom).expect("has link");
        assert_eq!(evidence.snippet.len(), 5_000);
    }
}
