use std::collections::HashMap;

use tracing::{debug, warn};

use crate::suggestions::model::Suggestion;
use crate::suggestions::syntax::{validate, Diagnostic, ValidationVerdict};

/// A batch split by the syntax gate. Both sequences keep the original order.
#[derive(Debug, Clone, Default)]
pub struct FilteredBatch {
    pub accepted: Vec<Suggestion>,
    pub rejected: Vec<(Suggestion, ValidationVerdict)>,
    /// Advisory diagnostics for accepted suggestions, keyed by suggestion id.
    pub warnings: HashMap<String, Vec<Diagnostic>>,
}

/// Runs the syntax validator over every suggestion independently.
pub fn filter_batch(batch: Vec<Suggestion>) -> FilteredBatch {
    let mut filtered = FilteredBatch::default();

    for suggestion in batch {
        let verdict = validate(&suggestion);
        for diagnostic in &verdict.diagnostics {
            debug!(
                "Suggestion {} {:?}: {}",
                suggestion.id, diagnostic.severity, diagnostic.message
            );
        }

        if verdict.accepted {
            if verdict.warnings().next().is_some() {
                filtered
                    .warnings
                    .insert(suggestion.id.clone(), verdict.diagnostics);
            }
            filtered.accepted.push(suggestion);
        } else {
            warn!("Suggestion {} failed markup validation", suggestion.id);
            filtered.rejected.push((suggestion, verdict));
        }
    }

    debug!(
        "{} suggestions passed markup validation, {} rejected",
        filtered.accepted.len(),
        filtered.rejected.len()
    );
    filtered
}
