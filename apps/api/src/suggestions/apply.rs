//! Edit application: splices an ordered batch of suggestions into document text.
//!
//! Every suggestion is re-resolved against the text as it stands after the
//! previous edits, never against offsets computed up front. An anchor that an
//! earlier edit consumed or duplicated is reported and skipped; the rest of the
//! batch still applies.

use serde::Serialize;
use tracing::debug;

use crate::suggestions::anchor::resolve;
use crate::suggestions::model::{Suggestion, SuggestionKind, SuggestionStatus};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EditOutcome {
    pub id: String,
    #[serde(flatten)]
    pub status: SuggestionStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApplyResult {
    pub text: String,
    pub outcomes: Vec<EditOutcome>,
}

/// Applies one suggestion in place. The text is untouched unless the status is `Applied`.
pub fn apply_one(text: &mut String, suggestion: &Suggestion) -> SuggestionStatus {
    let anchor = resolve(text.as_str(), suggestion);
    let Some(span) = anchor.span(suggestion.occurrence) else {
        return anchor.failure_status();
    };

    match suggestion.kind {
        SuggestionKind::Replace => text.replace_range(span, &suggestion.replacement_text),
        SuggestionKind::InsertAfter => text.insert_str(span.end, &suggestion.replacement_text),
    }
    SuggestionStatus::Applied
}

/// Applies suggestions in input order. Earlier suggestions win overlaps.
pub fn apply(document: &str, suggestions: &[Suggestion]) -> ApplyResult {
    let mut text = document.to_string();
    let outcomes = suggestions
        .iter()
        .map(|suggestion| {
            let status = apply_one(&mut text, suggestion);
            debug!("Suggestion {} -> {}", suggestion.id, status.label());
            EditOutcome {
                id: suggestion.id.clone(),
                status,
            }
        })
        .collect();

    ApplyResult { text, outcomes }
}
