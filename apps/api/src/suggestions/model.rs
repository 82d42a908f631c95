//! Suggestion data model and the schema gate that turns raw generated records into
//! well-formed `Suggestion`s.

use std::collections::{BTreeSet, HashSet};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::warn;

// ────────────────────────────────────────────────────────────────────────────
// Data models
// ────────────────────────────────────────────────────────────────────────────

/// How a suggestion changes the document around its anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionKind {
    /// Remove `target_text` and put `replacement_text` in its place.
    Replace,
    /// Keep `target_text` and insert `replacement_text` right after it.
    InsertAfter,
}

impl SuggestionKind {
    fn from_wire(value: &str) -> Option<Self> {
        match value.trim() {
            "replace" => Some(Self::Replace),
            "insert_after" => Some(Self::InsertAfter),
            _ => None,
        }
    }
}

/// A single proposed edit, anchored by the exact text it targets.
///
/// Only constructed through [`parse_batch`] in production paths, so the
/// invariants below hold for every value flowing through the pipeline:
/// - `target_text` is non-empty
/// - `replacement_text` is non-empty for `InsertAfter`
/// - `keywords_used` is non-empty
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: SuggestionKind,
    pub target_text: String,
    pub replacement_text: String,
    #[serde(default)]
    pub description: String,
    pub keywords_used: BTreeSet<String>,
    /// Explicit 0-based occurrence to edit when the anchor appears more than once.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub occurrence: Option<usize>,
}

/// Per-suggestion resolution outcome reported back to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SuggestionStatus {
    Applied,
    NotFound,
    Ambiguous { occurrences: usize },
    Rejected { diagnostic: String },
    OverBudget,
}

impl SuggestionStatus {
    pub fn label(&self) -> &'static str {
        match self {
            SuggestionStatus::Applied => "applied",
            SuggestionStatus::NotFound => "not_found",
            SuggestionStatus::Ambiguous { .. } => "ambiguous",
            SuggestionStatus::Rejected { .. } => "rejected",
            SuggestionStatus::OverBudget => "over_budget",
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Schema gate
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("record is not a valid suggestion object: {0}")]
    Malformed(String),

    #[error("missing required field '{0}'")]
    MissingField(&'static str),

    #[error("unknown suggestion type '{0}' (expected 'replace' or 'insert_after')")]
    UnknownKind(String),

    #[error("target_text must not be empty")]
    EmptyTarget,

    #[error("insert_after suggestion has empty replacement_text")]
    EmptyInsertion,

    #[error("keywords_used must name at least one keyword")]
    NoKeywords,

    #[error("duplicate suggestion id '{0}' in batch")]
    DuplicateId(String),
}

/// A raw record that never made it into the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemaRejection {
    /// Position of the record in the generated batch.
    pub index: usize,
    pub id: Option<String>,
    pub error: String,
}

/// Wire shape of a generated record. Everything is optional so a single bad
/// record yields a precise `SchemaError` instead of failing the whole batch.
#[derive(Debug, Default, Deserialize)]
struct RawSuggestion {
    id: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
    target_text: Option<String>,
    replacement_text: Option<String>,
    description: Option<String>,
    keywords_used: Option<Vec<String>>,
    occurrence: Option<usize>,
}

impl TryFrom<RawSuggestion> for Suggestion {
    type Error = SchemaError;

    fn try_from(raw: RawSuggestion) -> Result<Self, Self::Error> {
        let id = raw
            .id
            .filter(|id| !id.trim().is_empty())
            .ok_or(SchemaError::MissingField("id"))?;
        let kind_raw = raw.kind.ok_or(SchemaError::MissingField("type"))?;
        let kind =
            SuggestionKind::from_wire(&kind_raw).ok_or(SchemaError::UnknownKind(kind_raw))?;
        let target_text = raw
            .target_text
            .ok_or(SchemaError::MissingField("target_text"))?;
        let replacement_text = raw
            .replacement_text
            .ok_or(SchemaError::MissingField("replacement_text"))?;
        let keywords_used: BTreeSet<String> = raw
            .keywords_used
            .ok_or(SchemaError::MissingField("keywords_used"))?
            .into_iter()
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .collect();

        let suggestion = Suggestion {
            id,
            kind,
            target_text,
            replacement_text,
            description: raw.description.unwrap_or_default(),
            keywords_used,
            occurrence: raw.occurrence,
        };
        suggestion.check_invariants()?;
        Ok(suggestion)
    }
}

impl Suggestion {
    /// Checks the data-model invariants that hold independently of markup content.
    pub fn check_invariants(&self) -> Result<(), SchemaError> {
        if self.target_text.is_empty() {
            return Err(SchemaError::EmptyTarget);
        }
        if self.kind == SuggestionKind::InsertAfter && self.replacement_text.is_empty() {
            return Err(SchemaError::EmptyInsertion);
        }
        if self.keywords_used.is_empty() {
            return Err(SchemaError::NoKeywords);
        }
        Ok(())
    }
}

/// Parses a generated batch record by record.
///
/// Malformed records are dropped and reported; the remaining records keep
/// their original relative order. Ids must be unique within the batch, so a
/// repeated id rejects the later record.
pub fn parse_batch(records: Vec<Value>) -> (Vec<Suggestion>, Vec<SchemaRejection>) {
    let mut suggestions = Vec::with_capacity(records.len());
    let mut rejections = Vec::new();
    let mut seen_ids = HashSet::new();

    for (index, record) in records.into_iter().enumerate() {
        let raw_id = record
            .get("id")
            .and_then(|v| v.as_str())
            .map(str::to_string);

        let parsed = serde_json::from_value::<RawSuggestion>(record)
            .map_err(|e| SchemaError::Malformed(e.to_string()))
            .and_then(Suggestion::try_from)
            .and_then(|s| {
                if seen_ids.insert(s.id.clone()) {
                    Ok(s)
                } else {
                    Err(SchemaError::DuplicateId(s.id))
                }
            });

        match parsed {
            Ok(suggestion) => suggestions.push(suggestion),
            Err(e) => {
                warn!("Dropping generated record #{index} (id={raw_id:?}): {e}");
                rejections.push(SchemaRejection {
                    index,
                    id: raw_id,
                    error: e.to_string(),
                });
            }
        }
    }

    (suggestions, rejections)
}

#[cfg(test)]
pub(crate) fn replace(id: &str, target: &str, replacement: &str, keywords: &[&str]) -> Suggestion {
    Suggestion {
        id: id.to_string(),
        kind: SuggestionKind::Replace,
        target_text: target.to_string(),
        replacement_text: replacement.to_string(),
        description: String::new(),
        keywords_used: keywords.iter().map(|k| k.to_string()).collect(),
        occurrence: None,
    }
}

#[cfg(test)]
pub(crate) fn insert_after(
    id: &str,
    target: &str,
    insertion: &str,
    keywords: &[&str],
) -> Suggestion {
    Suggestion {
        kind: SuggestionKind::InsertAfter,
        ..replace(id, target, insertion, keywords)
    }
}
