use serde::Deserialize;

use crate::model::{Dataset, MatchMode, Record};

/// Key lookup policy.
///
/// `ExactThenContains` falls back to substring containment in either
/// direction, first match in dataset order wins. That heuristic has a known
/// false-positive risk on short or generic labels; it is isolated here so it
/// can be swapped for a stricter similarity metric without touching the
/// merge flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStrategy {
    Exact,
    ExactThenContains,
}

impl Default for MatchStrategy {
    fn default() -> Self {
        Self::ExactThenContains
    }
}

/// Find the secondary record for a primary row.
///
/// Precedence: exact normalized-key equality, then (strategy permitting)
/// substring containment, then the reserved "TOTAL" record when the target
/// label is itself a grand-total row. `None` means the row is emitted with
/// blank secondary-side fields.
pub fn lookup<'a>(
    secondary: &'a Dataset,
    label: &str,
    key: &str,
    strategy: MatchStrategy,
) -> Option<(&'a Record, MatchMode)> {
    if let Some(record) = secondary.by_key(key) {
        return Some((record, MatchMode::Exact));
    }

    if strategy == MatchStrategy::ExactThenContains && !key.is_empty() {
        for record in secondary.iter() {
            if record.is_aggregate || record.key.is_empty() {
                continue;
            }
            if record.key.contains(key) || key.contains(&record.key) {
                return Some((record, MatchMode::Contains));
            }
        }
    }

    if label.to_uppercase().contains("GRAND TOTAL") {
        if let Some(total) = secondary.total_record() {
            return Some((total, MatchMode::TotalFallback));
        }
    }

    None
}
