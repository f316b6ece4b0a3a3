//! First-seen-wins deduplication of evidence by canonical link.
//!
//! The collector feeds evidence in provider-priority order, so keeping the
//! first copy of a link means the higher-priority provider's copy survives.

use std::collections::HashSet;

use crate::types::Evidence;
use crate::url_normalize::canonical_link;

/// Ordered, deduplicated evidence accumulated during one collection.
#[derive(Debug, Default)]
pub struct EvidenceSet {
    seen: HashSet<String>,
    items: Vec<Evidence>,
}

impl EvidenceSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `evidence` unless an item with the same canonical link is
    /// already present. Returns `true` if it was appended.
    pub fn insert(&mut self, evidence: Evidence) -> bool {
        if self.seen.insert(canonical_link(&evidence.link)) {
            self.items.push(evidence);
            true
        } else {
            false
        }
    }

    /// Number of items accepted so far.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if nothing has been accepted.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Consume the set, returning at most `max` items in insertion order.
    pub fn into_truncated(self, max: usize) -> Vec<Evidence> {
        let mut items = self.items;
        items.truncate(max);
        items
    }
}
