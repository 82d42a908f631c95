//! Generation service: the seam between the suggestion core and the LLM.
//!
//! The core never calls the model itself. Handlers receive an
//! `Arc<dyn GenerationService>` from `AppState`; tests swap in stubs.

use std::collections::HashSet;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::errors::AppError;
use crate::llm_client::prompts::{JSON_ONLY_INSTRUCTION, LATEX_FORMATTING_RULES, TARGETING_RULES};
use crate::llm_client::{LlmClient, LlmError};
use crate::suggestions::prompts::{
    COVER_LETTER_EXAMPLES, COVER_LETTER_FOCUS, COVER_LETTER_SYSTEM, KEYWORD_PROMPT_TEMPLATE,
    KEYWORD_SYSTEM, RESUME_EXAMPLES, RESUME_FOCUS, RESUME_SYSTEM, SUGGESTION_PROMPT_TEMPLATE,
};

/// Which kind of document the suggestions are for. Selects the prompt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    #[default]
    Resume,
    #[serde(alias = "coverLetter")]
    CoverLetter,
}

impl DocumentKind {
    fn label(self) -> &'static str {
        match self {
            DocumentKind::Resume => "RESUME",
            DocumentKind::CoverLetter => "COVER LETTER",
        }
    }

    fn system_prompt(self) -> String {
        let role = match self {
            DocumentKind::Resume => RESUME_SYSTEM,
            DocumentKind::CoverLetter => COVER_LETTER_SYSTEM,
        };
        format!("{role} {JSON_ONLY_INSTRUCTION}")
    }
}

#[async_trait]
pub trait GenerationService: Send + Sync {
    /// Requirement keywords found in a job posting, most relevant first.
    async fn generate_keywords(
        &self,
        posting_text: &str,
        max_keywords: usize,
    ) -> Result<Vec<String>, LlmError>;

    /// Raw suggestion-shaped records. Not yet schema-checked.
    async fn generate_suggestions(
        &self,
        document_text: &str,
        keywords: &[String],
        kind: DocumentKind,
    ) -> Result<Vec<Value>, LlmError>;
}

/// Models sometimes wrap the array in an object.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SuggestionPayload {
    Batch(Vec<Value>),
    Wrapped { suggestions: Vec<Value> },
}

impl SuggestionPayload {
    fn into_records(self) -> Vec<Value> {
        match self {
            SuggestionPayload::Batch(records) => records,
            SuggestionPayload::Wrapped { suggestions } => suggestions,
        }
    }
}

pub fn build_keyword_prompt(posting_text: &str, max_keywords: usize) -> String {
    KEYWORD_PROMPT_TEMPLATE
        .replace("{max_keywords}", &max_keywords.to_string())
        .replace("{posting_text}", posting_text)
}

pub fn build_suggestion_prompt(
    document_text: &str,
    keywords: &[String],
    kind: DocumentKind,
) -> Result<String, LlmError> {
    let keywords_json = serde_json::to_string(keywords)?;
    let (focus, examples) = match kind {
        DocumentKind::Resume => (RESUME_FOCUS, RESUME_EXAMPLES),
        DocumentKind::CoverLetter => (COVER_LETTER_FOCUS, COVER_LETTER_EXAMPLES),
    };

    // The document goes in last so its content is never re-scanned for placeholders.
    Ok(SUGGESTION_PROMPT_TEMPLATE
        .replace("{document_label}", kind.label())
        .replace("{keywords_json}", &keywords_json)
        .replace("{formatting_rules}", LATEX_FORMATTING_RULES)
        .replace("{targeting_rules}", TARGETING_RULES)
        .replace("{focus}", focus)
        .replace("{examples}", examples)
        .replace("{document}", document_text))
}

#[async_trait]
impl GenerationService for LlmClient {
    async fn generate_keywords(
        &self,
        posting_text: &str,
        max_keywords: usize,
    ) -> Result<Vec<String>, LlmError> {
        let prompt = build_keyword_prompt(posting_text, max_keywords);
        let system = format!("{KEYWORD_SYSTEM} {JSON_ONLY_INSTRUCTION}");
        self.call_json::<Vec<String>>(&prompt, &system).await
    }

    async fn generate_suggestions(
        &self,
        document_text: &str,
        keywords: &[String],
        kind: DocumentKind,
    ) -> Result<Vec<Value>, LlmError> {
        let prompt = build_suggestion_prompt(document_text, keywords, kind)?;
        let payload: SuggestionPayload = self.call_json(&prompt, &kind.system_prompt()).await?;
        Ok(payload.into_records())
    }
}

/// Trims, drops blanks, de-duplicates case-insensitively (first spelling wins)
/// and caps the list.
pub fn normalize_keywords(raw: Vec<String>, max_keywords: usize) -> Vec<String> {
    let mut seen = HashSet::new();
    raw.into_iter()
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty() && seen.insert(k.to_lowercase()))
        .take(max_keywords)
        .collect()
}

/// Extracts keywords under a caller-imposed timeout.
pub async fn extract_keywords(
    service: &dyn GenerationService,
    posting_text: &str,
    max_keywords: usize,
    timeout: Duration,
) -> Result<Vec<String>, AppError> {
    let raw = tokio::time::timeout(timeout, service.generate_keywords(posting_text, max_keywords))
        .await
        .map_err(|_| AppError::Timeout(timeout.as_secs()))??;

    let keywords = normalize_keywords(raw, max_keywords);
    info!("Extracted {} keywords from job posting", keywords.len());
    Ok(keywords)
}
