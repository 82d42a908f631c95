use std::time::Duration;

use anyhow::{Context, Result};

use crate::suggestions::budget::DEFAULT_MAX_PER_KEYWORD;

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub anthropic_api_key: String,
    pub port: u16,
    pub rust_log: String,
    /// Keyword budget: accepted suggestions allowed per keyword.
    pub max_suggestions_per_keyword: usize,
    /// Upper bound on keywords extracted from a posting.
    pub max_keywords: usize,
    /// Caller-imposed timeout around each generation call.
    pub generation_timeout: Duration,
    pub render_timeout: Duration,
    pub latexmk_bin: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            anthropic_api_key: require_env("ANTHROPIC_API_KEY")?,
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            max_suggestions_per_keyword: parse_env(
                "MAX_SUGGESTIONS_PER_KEYWORD",
                DEFAULT_MAX_PER_KEYWORD,
            )?,
            max_keywords: parse_env("MAX_KEYWORDS", 10)?,
            generation_timeout: Duration::from_secs(parse_env("GENERATION_TIMEOUT_SECS", 120)?),
            render_timeout: Duration::from_secs(parse_env("RENDER_TIMEOUT_SECS", 30)?),
            latexmk_bin: std::env::var("LATEXMK_BIN").unwrap_or_else(|_| "latexmk".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid {}", std::any::type_name::<T>())),
        Err(_) => Ok(default),
    }
}
