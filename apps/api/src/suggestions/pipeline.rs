//! Suggestion pipeline: orchestrates the gates from raw records to edited text.
//!
//! Flow: parse (schema) → filter_batch (syntax) → anchor gate (existence and
//! uniqueness in the submitted document) → cap (keyword budget) → apply.
//!
//! No single suggestion can fail the batch. Every record comes back either as a
//! `SuggestionReport` with a status or as a `SchemaRejection`.

use std::collections::HashMap;
use std::time::Duration;

use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::suggestions::anchor::resolve;
use crate::suggestions::apply::apply;
use crate::suggestions::budget::cap;
use crate::suggestions::filter::filter_batch;
use crate::suggestions::generation::{DocumentKind, GenerationService};
use crate::suggestions::model::{parse_batch, SchemaRejection, Suggestion, SuggestionStatus};
use crate::suggestions::syntax::Diagnostic;

// ────────────────────────────────────────────────────────────────────────────
// Report types
// ────────────────────────────────────────────────────────────────────────────

/// One suggestion with its final outcome and any markup diagnostics.
#[derive(Debug, Clone, Serialize)]
pub struct SuggestionReport {
    #[serde(flatten)]
    pub suggestion: Suggestion,
    pub outcome: SuggestionStatus,
    pub diagnostics: Vec<Diagnostic>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PipelineSummary {
    pub applied: usize,
    pub not_found: usize,
    pub ambiguous: usize,
    pub rejected: usize,
    pub over_budget: usize,
    pub malformed: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct PipelineReport {
    /// Document text after every applicable suggestion was spliced in.
    pub document_text: String,
    pub changed: bool,
    /// Well-formed suggestions, in generated order.
    pub suggestions: Vec<SuggestionReport>,
    pub schema_errors: Vec<SchemaRejection>,
    pub summary: PipelineSummary,
}

fn summarize(reports: &[SuggestionReport], malformed: usize) -> PipelineSummary {
    let mut summary = PipelineSummary {
        malformed,
        ..Default::default()
    };
    for report in reports {
        match report.outcome {
            SuggestionStatus::Applied => summary.applied += 1,
            SuggestionStatus::NotFound => summary.not_found += 1,
            SuggestionStatus::Ambiguous { .. } => summary.ambiguous += 1,
            SuggestionStatus::Rejected { .. } => summary.rejected += 1,
            SuggestionStatus::OverBudget => summary.over_budget += 1,
        }
    }
    summary
}

// ────────────────────────────────────────────────────────────────────────────
// Pipeline
// ────────────────────────────────────────────────────────────────────────────

/// Runs a raw batch through every gate and applies what survives.
///
/// Steps:
/// 1. parse_batch() drops malformed records
/// 2. filter_batch() rejects unbalanced markup
/// 3. anchors are resolved against `document_text`; missing or ambiguous
///    anchors are reported and go no further
/// 4. cap() enforces the keyword budget in batch order
/// 5. apply() re-resolves each anchor against the evolving text
pub fn run_pipeline(
    document_text: &str,
    records: Vec<Value>,
    max_per_keyword: usize,
) -> PipelineReport {
    let (parsed, schema_errors) = parse_batch(records);
    let order: Vec<Suggestion> = parsed.clone();

    let filtered = filter_batch(parsed);
    let mut diagnostics = filtered.warnings;
    let mut outcomes: HashMap<String, SuggestionStatus> = HashMap::new();

    for (suggestion, verdict) in filtered.rejected {
        let diagnostic = verdict
            .first_error()
            .map(|d| d.message.clone())
            .unwrap_or_default();
        outcomes.insert(
            suggestion.id.clone(),
            SuggestionStatus::Rejected { diagnostic },
        );
        diagnostics.insert(suggestion.id, verdict.diagnostics);
    }

    let mut anchored = Vec::with_capacity(filtered.accepted.len());
    for suggestion in filtered.accepted {
        let anchor = resolve(document_text, &suggestion);
        if anchor.span(suggestion.occurrence).is_some() {
            anchored.push(suggestion);
        } else {
            let status = anchor.failure_status();
            warn!(
                "Suggestion {} not applicable: {}",
                suggestion.id,
                status.label()
            );
            outcomes.insert(suggestion.id, status);
        }
    }

    let budgeted = cap(anchored, max_per_keyword);
    for suggestion in budgeted.dropped {
        outcomes.insert(suggestion.id, SuggestionStatus::OverBudget);
    }

    let applied = apply(document_text, &budgeted.kept);
    for outcome in applied.outcomes {
        outcomes.insert(outcome.id, outcome.status);
    }

    let suggestions: Vec<SuggestionReport> = order
        .into_iter()
        .map(|suggestion| {
            let outcome = outcomes
                .remove(&suggestion.id)
                .unwrap_or(SuggestionStatus::NotFound);
            let diagnostics = diagnostics.remove(&suggestion.id).unwrap_or_default();
            SuggestionReport {
                suggestion,
                outcome,
                diagnostics,
            }
        })
        .collect();

    let summary = summarize(&suggestions, schema_errors.len());
    info!(
        "Suggestion batch: {} applied, {} not found, {} ambiguous, {} rejected, {} over budget, {} malformed",
        summary.applied,
        summary.not_found,
        summary.ambiguous,
        summary.rejected,
        summary.over_budget,
        summary.malformed
    );

    PipelineReport {
        changed: applied.text != document_text,
        document_text: applied.text,
        suggestions,
        schema_errors,
        summary,
    }
}

/// Asks the generation service for a batch and runs it through the pipeline.
///
/// A failed or timed-out generation call is a single top-level error; nothing
/// inside the pipeline retries it.
pub async fn suggest_edits(
    service: &dyn GenerationService,
    document_text: &str,
    keywords: &[String],
    kind: DocumentKind,
    max_per_keyword: usize,
    timeout: Duration,
) -> Result<PipelineReport, AppError> {
    let records = tokio::time::timeout(
        timeout,
        service.generate_suggestions(document_text, keywords, kind),
    )
    .await
    .map_err(|_| AppError::Timeout(timeout.as_secs()))??;

    info!(
        "Generation service returned {} candidate suggestions for {} keywords",
        records.len(),
        keywords.len()
    );

    Ok(run_pipeline(document_text, records, max_per_keyword))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::suggestions::generation::stub::StubGenerator;
    use crate::suggestions::syntax::Severity;
    use serde_json::json;

    const RESUME: &str = r"\section{Skills}
\textbf{Languages}: Java, C++ \\
\textbf{Databases}: MySQL \\
\section{Experience}
\item Developed web applications at Acme
\item Maintained services at Acme";

    fn record(id: &str, kind: &str, target: &str, replacement: &str, keywords: &[&str]) -> Value {
        json!({
            "id": id,
            "type": kind,
            "target_text": target,
            "replacement_text": replacement,
            "description": "test edit",
            "keywords_used": keywords
        })
    }

    fn outcome_of<'a>(report: &'a PipelineReport, id: &str) -> &'a SuggestionStatus {
        &report
            .suggestions
            .iter()
            .find(|r| r.suggestion.id == id)
            .unwrap()
            .outcome
    }

    #[test]
    fn test_empty_batch_leaves_document_unchanged() {
        let report = run_pipeline(RESUME, vec![], 2);
        assert_eq!(report.document_text, RESUME);
        assert!(!report.changed);
        assert!(report.suggestions.is_empty());
    }

    #[test]
    fn test_unbalanced_and_valid_yield_one_rejection_one_edit() {
        let report = run_pipeline(
            RESUME,
            vec![
                record("bad", "replace", "Java, C++", r"Java, C++, \textbf{Python", &["Python"]),
                record("good", "replace", "MySQL", "MySQL, PostgreSQL", &["PostgreSQL"]),
            ],
            2,
        );
        assert!(matches!(
            outcome_of(&report, "bad"),
            SuggestionStatus::Rejected { diagnostic } if diagnostic.contains("Unbalanced braces")
        ));
        assert_eq!(outcome_of(&report, "good"), &SuggestionStatus::Applied);
        assert!(report.document_text.contains("MySQL, PostgreSQL"));
        assert!(!report.document_text.contains("Python"));
        assert_eq!(report.summary.applied, 1);
        assert_eq!(report.summary.rejected, 1);
    }

    #[test]
    fn test_warnings_reported_but_edit_applied() {
        let report = run_pipeline(
            RESUME,
            vec![record("amp", "replace", "MySQL", "MySQL & PostgreSQL", &["PostgreSQL"])],
            2,
        );
        let amp = &report.suggestions[0];
        assert_eq!(amp.outcome, SuggestionStatus::Applied);
        assert_eq!(amp.diagnostics.len(), 1);
        assert_eq!(amp.diagnostics[0].severity, Severity::Warning);
    }

    #[test]
    fn test_ambiguous_and_missing_anchors_reported() {
        let report = run_pipeline(
            RESUME,
            vec![
                record("dup", "replace", "at Acme", "at Acme Corp", &["brand"]),
                record("gone", "replace", "Fortran", "Rust", &["Rust"]),
            ],
            2,
        );
        assert_eq!(
            outcome_of(&report, "dup"),
            &SuggestionStatus::Ambiguous { occurrences: 2 }
        );
        assert_eq!(outcome_of(&report, "gone"), &SuggestionStatus::NotFound);
        assert!(!report.changed);
    }

    #[test]
    fn test_explicit_occurrence_applies_ambiguous_anchor() {
        let mut r = record("second", "replace", "at Acme", "at Acme Corp", &["brand"]);
        r["occurrence"] = json!(1);
        let report = run_pipeline(RESUME, vec![r], 2);
        assert_eq!(outcome_of(&report, "second"), &SuggestionStatus::Applied);
        assert!(report
            .document_text
            .ends_with(r"\item Maintained services at Acme Corp"));
    }

    #[test]
    fn test_keyword_budget_drops_third_suggestion() {
        let report = run_pipeline(
            RESUME,
            vec![
                record("p1", "replace", "Java, C++", "Java, C++, Python", &["Python"]),
                record("p2", "replace", "MySQL", "MySQL (via Python)", &["Python"]),
                record(
                    "p3",
                    "insert_after",
                    r"\item Developed web applications at Acme",
                    " using Python",
                    &["Python"],
                ),
            ],
            2,
        );
        assert_eq!(outcome_of(&report, "p1"), &SuggestionStatus::Applied);
        assert_eq!(outcome_of(&report, "p2"), &SuggestionStatus::Applied);
        assert_eq!(outcome_of(&report, "p3"), &SuggestionStatus::OverBudget);
        assert!(!report.document_text.contains("using Python"));
    }

    #[test]
    fn test_unapplicable_suggestions_do_not_spend_budget() {
        let report = run_pipeline(
            RESUME,
            vec![
                record("miss", "replace", "Fortran", "Python", &["Python"]),
                record("hit", "replace", "Java, C++", "Java, C++, Python", &["Python"]),
            ],
            1,
        );
        assert_eq!(outcome_of(&report, "hit"), &SuggestionStatus::Applied);
    }

    #[test]
    fn test_schema_errors_kept_separately_in_order() {
        let report = run_pipeline(
            RESUME,
            vec![
                json!({"id": "no_target", "type": "replace", "replacement_text": "x", "keywords_used": ["k"]}),
                record("ok", "replace", "MySQL", "MySQL, Redis", &["Redis"]),
            ],
            2,
        );
        assert_eq!(report.schema_errors.len(), 1);
        assert_eq!(report.schema_errors[0].id.as_deref(), Some("no_target"));
        assert_eq!(report.suggestions.len(), 1);
        assert_eq!(report.summary.malformed, 1);
    }

    #[test]
    fn test_report_order_follows_batch_order() {
        let report = run_pipeline(
            RESUME,
            vec![
                record("c", "replace", "Fortran", "x", &["k"]),
                record("a", "replace", "MySQL", "{", &["k"]),
                record("b", "replace", "Java", "Kotlin", &["k"]),
            ],
            2,
        );
        let ids: Vec<_> = report
            .suggestions
            .iter()
            .map(|r| r.suggestion.id.as_str())
            .collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
    }

    #[test]
    fn test_overlapping_suggestions_first_wins() {
        let report = run_pipeline(
            RESUME,
            vec![
                record("wide", "replace", r"\textbf{Databases}: MySQL", r"\textbf{Data}: PostgreSQL", &["PostgreSQL"]),
                record("narrow", "replace", "MySQL", "MariaDB", &["MariaDB"]),
            ],
            2,
        );
        assert_eq!(outcome_of(&report, "wide"), &SuggestionStatus::Applied);
        assert_eq!(outcome_of(&report, "narrow"), &SuggestionStatus::NotFound);
        assert!(report.document_text.contains(r"\textbf{Data}: PostgreSQL"));
    }

    #[test]
    fn test_report_serializes_flat() {
        let report = run_pipeline(
            RESUME,
            vec![record("ok", "replace", "MySQL", "MySQL, Redis", &["Redis"])],
            2,
        );
        let json = serde_json::to_value(&report).unwrap();
        let first = &json["suggestions"][0];
        assert_eq!(first["id"], "ok");
        assert_eq!(first["type"], "replace");
        assert_eq!(first["outcome"]["status"], "applied");
        assert_eq!(json["changed"], true);
    }

    #[tokio::test]
    async fn test_suggest_edits_runs_generated_batch() {
        let stub = StubGenerator {
            records: vec![record("ok", "replace", "MySQL", "MySQL, Redis", &["Redis"])],
            ..Default::default()
        };
        let keywords = vec!["Redis".to_string()];
        let report = suggest_edits(
            &stub,
            RESUME,
            &keywords,
            DocumentKind::Resume,
            2,
            Duration::from_secs(5),
        )
        .await
        .unwrap();
        assert_eq!(report.summary.applied, 1);
        assert_eq!(*stub.seen_keywords.lock().unwrap(), keywords);
    }

    #[tokio::test]
    async fn test_suggest_edits_generation_failure_is_top_level() {
        let stub = StubGenerator {
            fail: true,
            ..Default::default()
        };
        let result = suggest_edits(
            &stub,
            RESUME,
            &["Redis".to_string()],
            DocumentKind::Resume,
            2,
            Duration::from_secs(5),
        )
        .await;
        assert!(matches!(result, Err(AppError::Llm(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_suggest_edits_times_out() {
        let stub = StubGenerator {
            delay: Some(Duration::from_secs(300)),
            ..Default::default()
        };
        let result = suggest_edits(
            &stub,
            RESUME,
            &["Redis".to_string()],
            DocumentKind::CoverLetter,
            2,
            Duration::from_secs(120),
        )
        .await;
        assert!(matches!(result, Err(AppError::Timeout(120))));
    }
}
