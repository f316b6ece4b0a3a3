//! Trait definition for pluggable evidence providers.
//!
//! Web search, news search and operator-supplied URLs each implement
//! [`SourceProvider`]. The collector only sees this trait, so tests can
//! substitute in-memory doubles.

use async_trait::async_trait;

use crate::error::SearchError;
use crate::types::{RawRecord, SourceKind};

/// A source of raw research records.
///
/// Implementors handle their own request construction, HTTP transport and
/// response parsing. All implementations must be `Send + Sync` so the
/// collector can fetch providers concurrently.
#[async_trait]
pub trait SourceProvider: Send + Sync {
    /// Fetch up to `limit` raw records for `query`.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError`] if the backend request fails, the response
    /// cannot be parsed, or the backend is refusing requests.
    async fn fetch(&self, query: &str, limit: usize) -> Result<Vec<RawRecord>, SearchError>;

    /// Which kind of evidence this provider produces.
    fn kind(&self) -> SourceKind;

    /// Human-readable provider name used in logs.
    fn name(&self) -> &str {
        self.kind().name()
    }
}
