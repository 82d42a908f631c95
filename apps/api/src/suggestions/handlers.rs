//! Axum route handlers for the Suggestions API.

use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::state::AppState;
use crate::suggestions::generation::{extract_keywords, normalize_keywords, DocumentKind};
use crate::suggestions::pipeline::{run_pipeline, suggest_edits, PipelineReport};

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct KeywordsRequest {
    pub job_posting: String,
}

#[derive(Debug, Serialize)]
pub struct KeywordsResponse {
    pub keywords: Vec<String>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct SuggestRequest {
    pub document_content: String,
    pub selected_keywords: Vec<String>,
    #[serde(default)]
    pub document_type: DocumentKind,
}

#[derive(Debug, Deserialize)]
pub struct ApplyRequest {
    pub document_content: String,
    /// Raw suggestion records; they go through the same schema gate as generated ones.
    pub suggestions: Vec<Value>,
}

#[derive(Debug, Serialize)]
pub struct SuggestionsResponse {
    pub batch_id: Uuid,
    #[serde(flatten)]
    pub report: PipelineReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_keywords: Option<Vec<String>>,
    pub timestamp: DateTime<Utc>,
}

fn require_document(document: &str) -> Result<(), AppError> {
    if document.trim().is_empty() {
        return Err(AppError::Validation(
            "document_content cannot be empty".to_string(),
        ));
    }
    Ok(())
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/keywords
///
/// Extracts requirement keywords from a job posting.
pub async fn handle_extract_keywords(
    State(state): State<AppState>,
    Json(request): Json<KeywordsRequest>,
) -> Result<Json<KeywordsResponse>, AppError> {
    if request.job_posting.trim().is_empty() {
        return Err(AppError::Validation(
            "job_posting cannot be empty".to_string(),
        ));
    }

    let keywords = extract_keywords(
        state.generator.as_ref(),
        &request.job_posting,
        state.config.max_keywords,
        state.config.generation_timeout,
    )
    .await?;

    Ok(Json(KeywordsResponse {
        keywords,
        timestamp: Utc::now(),
    }))
}

/// POST /api/v1/suggestions
///
/// Generates edit suggestions for the selected keywords and applies every one
/// that passes the syntax, anchor and budget gates.
pub async fn handle_suggest(
    State(state): State<AppState>,
    Json(request): Json<SuggestRequest>,
) -> Result<Json<SuggestionsResponse>, AppError> {
    require_document(&request.document_content)?;
    let keywords = normalize_keywords(request.selected_keywords, state.config.max_keywords);
    if keywords.is_empty() {
        return Err(AppError::Validation("No keywords selected".to_string()));
    }

    let batch_id = Uuid::new_v4();
    info!(
        "Batch {batch_id}: suggesting {:?} edits for {} keywords",
        request.document_type,
        keywords.len()
    );

    let report = suggest_edits(
        state.generator.as_ref(),
        &request.document_content,
        &keywords,
        request.document_type,
        state.config.max_suggestions_per_keyword,
        state.config.generation_timeout,
    )
    .await?;

    Ok(Json(SuggestionsResponse {
        batch_id,
        report,
        selected_keywords: Some(keywords),
        timestamp: Utc::now(),
    }))
}

/// POST /api/v1/suggestions/apply
///
/// Applies a caller-supplied batch (e.g. the subset a user accepted) without
/// calling the generation service.
pub async fn handle_apply(
    State(state): State<AppState>,
    Json(request): Json<ApplyRequest>,
) -> Result<Json<SuggestionsResponse>, AppError> {
    require_document(&request.document_content)?;

    let batch_id = Uuid::new_v4();
    info!(
        "Batch {batch_id}: applying {} caller-supplied suggestions",
        request.suggestions.len()
    );

    let report = run_pipeline(
        &request.document_content,
        request.suggestions,
        state.config.max_suggestions_per_keyword,
    );

    Ok(Json(SuggestionsResponse {
        batch_id,
        report,
        selected_keywords: None,
        timestamp: Utc::now(),
    }))
}
