//! Anchor resolution: finds where a suggestion's `target_text` sits in a document.
//!
//! Matching is exact and case-sensitive. Occurrences are counted including
//! overlapping ones, so an anchor like "aa" in "aaa" is ambiguous rather than
//! silently unique.

use std::ops::Range;

use serde::Serialize;

use crate::suggestions::model::{Suggestion, SuggestionStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnchorStatus {
    Unique,
    NotFound,
    Ambiguous,
}

/// Every byte range where an anchor occurs, in document order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnchorMatch {
    pub status: AnchorStatus,
    pub offsets: Vec<Range<usize>>,
}

impl AnchorMatch {
    fn from_offsets(offsets: Vec<Range<usize>>) -> Self {
        let status = match offsets.len() {
            0 => AnchorStatus::NotFound,
            1 => AnchorStatus::Unique,
            _ => AnchorStatus::Ambiguous,
        };
        Self { status, offsets }
    }

    /// The span a suggestion may safely edit.
    ///
    /// A unique anchor resolves on its own (or with `occurrence = 0`). An
    /// ambiguous anchor resolves only when the caller names the occurrence
    /// explicitly; it never falls back to the first match.
    pub fn span(&self, occurrence: Option<usize>) -> Option<Range<usize>> {
        match (self.status, occurrence) {
            (AnchorStatus::Unique, None | Some(0)) => self.offsets.first().cloned(),
            (AnchorStatus::Ambiguous, Some(index)) => self.offsets.get(index).cloned(),
            _ => None,
        }
    }

    /// Outcome to report when [`AnchorMatch::span`] yields nothing.
    pub fn failure_status(&self) -> SuggestionStatus {
        match self.status {
            AnchorStatus::Ambiguous => SuggestionStatus::Ambiguous {
                occurrences: self.offsets.len(),
            },
            AnchorStatus::Unique | AnchorStatus::NotFound => SuggestionStatus::NotFound,
        }
    }
}

/// Finds every occurrence of `needle` in `document`, overlapping ones included.
pub fn find_anchor(document: &str, needle: &str) -> AnchorMatch {
    let mut offsets = Vec::new();
    if needle.is_empty() {
        return AnchorMatch::from_offsets(offsets);
    }

    let mut from = 0;
    while let Some(pos) = document[from..].find(needle) {
        let start = from + pos;
        offsets.push(start..start + needle.len());
        // step one char so overlapping occurrences are still seen
        let step = document[start..].chars().next().map_or(1, char::len_utf8);
        from = start + step;
    }

    AnchorMatch::from_offsets(offsets)
}

/// Resolves a suggestion's anchor against the given document text.
pub fn resolve(document: &str, suggestion: &Suggestion) -> AnchorMatch {
    find_anchor(document, &suggestion.target_text)
}
