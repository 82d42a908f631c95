//! Keyword budget: caps how many accepted suggestions may work the same keyword.
//!
//! Keywords are compared trimmed and case-insensitively, so "Python" and
//! "python" share one budget.

use std::collections::{BTreeSet, HashMap};

use tracing::debug;

use crate::suggestions::model::Suggestion;

/// Default number of suggestions allowed per keyword.
pub const DEFAULT_MAX_PER_KEYWORD: usize = 2;

#[derive(Debug, Clone, Default)]
pub struct BudgetOutcome {
    pub kept: Vec<Suggestion>,
    /// Suggestions whose every keyword was already at budget.
    pub dropped: Vec<Suggestion>,
}

fn budget_key(keyword: &str) -> String {
    keyword.trim().to_lowercase()
}

/// Keeps a suggestion if at least one of its keywords is still under budget.
///
/// A kept suggestion counts toward all of its keywords, including ones that
/// are already at or over budget. Earlier suggestions win when budgets are tight.
pub fn cap(accepted: Vec<Suggestion>, max_per_keyword: usize) -> BudgetOutcome {
    let mut counts: HashMap<String, usize> = HashMap::new();
    let mut outcome = BudgetOutcome::default();

    for suggestion in accepted {
        // "Python" and "python" in one suggestion spend a single unit
        let keys: BTreeSet<String> = suggestion
            .keywords_used
            .iter()
            .map(|k| budget_key(k))
            .collect();
        let under_budget = keys
            .iter()
            .any(|k| counts.get(k).copied().unwrap_or(0) < max_per_keyword);

        if under_budget {
            for key in keys {
                *counts.entry(key).or_insert(0) += 1;
            }
            outcome.kept.push(suggestion);
        } else {
            debug!(
                "Suggestion {} dropped: keywords {:?} already at budget {}",
                suggestion.id, suggestion.keywords_used, max_per_keyword
            );
            outcome.dropped.push(suggestion);
        }
    }

    outcome
}
