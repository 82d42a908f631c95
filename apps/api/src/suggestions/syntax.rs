//! Markup integrity checks for a single suggestion.
//!
//! # Checks, in order
//! 1. Brace balance of `target_text` and `replacement_text` (Error, rejects)
//! 2. Unescaped reserved characters in `replacement_text` (Warning)
//! 3. Short commands outside the known set (Warning)
//! 4. `\item` not followed by whitespace (Warning)
//!
//! These are heuristic scans, not a LaTeX parser. Only brace imbalance breaks a
//! document outright on render, so it is the only check that rejects.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::suggestions::model::Suggestion;

/// Commands that are always accepted regardless of length.
const KNOWN_COMMANDS: &[&str] = &[
    "textbf",
    "textit",
    "emph",
    "item",
    "section",
    "subsection",
    "begin",
    "end",
    "newline",
    "linebreak",
];

/// Unknown commands at least this long are assumed to be custom macros.
const MIN_CUSTOM_COMMAND_LEN: usize = 3;

/// Reserved characters and their escaped forms.
const RESERVED_CHARS: &[(char, &str)] = &[
    ('&', r"\&"),
    ('%', r"\%"),
    ('$', r"\$"),
    ('#', r"\#"),
    ('_', r"\_"),
    ('^', r"\^"),
];

const ITEM_MARKER: &str = r"\item";

fn command_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\\([a-zA-Z]+)(\{[^}]*\})?").expect("command pattern is a valid regex")
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Verdict types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
}

impl Diagnostic {
    fn warning(message: String) -> Self {
        Self {
            severity: Severity::Warning,
            message,
        }
    }

    fn error(message: String) -> Self {
        Self {
            severity: Severity::Error,
            message,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationVerdict {
    pub accepted: bool,
    pub diagnostics: Vec<Diagnostic>,
}

impl ValidationVerdict {
    /// The first Error diagnostic, used as the rejection reason.
    pub fn first_error(&self) -> Option<&Diagnostic> {
        self.diagnostics
            .iter()
            .find(|d| d.severity == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Warning)
    }
}

/// Why a field failed the brace-balance scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BraceFault {
    /// A `}` at this byte offset closed nothing.
    UnmatchedClose { offset: usize },
    /// The text ended with this many `{` still open.
    Unclosed { depth: usize },
}

// ────────────────────────────────────────────────────────────────────────────
// Checks
// ────────────────────────────────────────────────────────────────────────────

/// Running-depth brace scan. Fails on the first unmatched `}`.
pub fn check_braces(text: &str) -> Result<(), BraceFault> {
    let mut depth: usize = 0;
    for (offset, c) in text.char_indices() {
        match c {
            '{' => depth += 1,
            '}' => {
                depth = depth
                    .checked_sub(1)
                    .ok_or(BraceFault::UnmatchedClose { offset })?;
            }
            _ => {}
        }
    }
    if depth == 0 {
        Ok(())
    } else {
        Err(BraceFault::Unclosed { depth })
    }
}

fn brace_diagnostic(field: &str, fault: BraceFault) -> Diagnostic {
    let detail = match fault {
        BraceFault::UnmatchedClose { offset } => format!("unmatched '}}' at byte {offset}"),
        BraceFault::Unclosed { depth } => format!("{depth} unclosed '{{'"),
    };
    Diagnostic::error(format!("Unbalanced braces in {field}: {detail}"))
}

fn check_escaping(text: &str, diagnostics: &mut Vec<Diagnostic>) {
    let mentions_url = text.contains("http") || text.contains("www");
    for &(c, escaped) in RESERVED_CHARS {
        if !text.contains(c) || text.contains(escaped) {
            continue;
        }
        // Ampersands are legitimate inside URLs.
        if c == '&' && mentions_url {
            continue;
        }
        diagnostics.push(Diagnostic::warning(format!(
            "Unescaped '{c}' in replacement_text (use {escaped})"
        )));
    }
}

fn check_commands(text: &str, diagnostics: &mut Vec<Diagnostic>) {
    let mut flagged: Vec<&str> = Vec::new();
    for caps in command_pattern().captures_iter(text) {
        let Some(name) = caps.get(1).map(|m| m.as_str()) else {
            continue;
        };
        if KNOWN_COMMANDS.contains(&name)
            || name.len() >= MIN_CUSTOM_COMMAND_LEN
            || flagged.contains(&name)
        {
            continue;
        }
        flagged.push(name);
        diagnostics.push(Diagnostic::warning(format!(
            "Potentially invalid command \\{name} in replacement_text"
        )));
    }
}

fn check_item_spacing(text: &str, diagnostics: &mut Vec<Diagnostic>) {
    let missing_space = text.match_indices(ITEM_MARKER).any(|(start, marker)| {
        match text[start + marker.len()..].chars().next() {
            // \itemsep, \itemize, ... are different commands
            Some(next) if next.is_ascii_alphabetic() => false,
            Some(next) => !next.is_whitespace(),
            None => true,
        }
    });
    if missing_space {
        diagnostics.push(Diagnostic::warning(
            r"\item should be followed by whitespace in replacement_text".to_string(),
        ));
    }
}

/// Validates the markup of a single suggestion. Pure and deterministic.
pub fn validate(suggestion: &Suggestion) -> ValidationVerdict {
    let mut diagnostics = Vec::new();

    let fields = [
        ("target_text", suggestion.target_text.as_str()),
        ("replacement_text", suggestion.replacement_text.as_str()),
    ];
    for (field, text) in fields {
        if let Err(fault) = check_braces(text) {
            diagnostics.push(brace_diagnostic(field, fault));
        }
    }
    if !diagnostics.is_empty() {
        return ValidationVerdict {
            accepted: false,
            diagnostics,
        };
    }

    let replacement = suggestion.replacement_text.as_str();
    check_escaping(replacement, &mut diagnostics);
    check_commands(replacement, &mut diagnostics);
    check_item_spacing(replacement, &mut diagnostics);

    ValidationVerdict {
        accepted: true,
        diagnostics,
    }
}
