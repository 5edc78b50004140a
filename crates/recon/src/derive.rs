use serde::Deserialize;

/// Formatting class for a derived change column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    /// Event counts: compact formatting, no forced decimal places.
    Count,
    /// Percentage rates: exactly two decimal places.
    Rate,
}

impl Default for ColumnKind {
    fn default() -> Self {
        Self::Count
    }
}

/// Lenient numeric parse for arithmetic: empty or unparseable input
/// contributes 0.0, never an error.
pub fn parse_stat(s: &str) -> f64 {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return 0.0;
    }
    trimmed.parse().unwrap_or(0.0)
}

/// Strict-enough rate parse: `None` for blank or non-numeric input.
/// `None` is the internal form of "no rate"; it is not comparable to 0.
pub fn parse_rate(s: &str) -> Option<f64> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse().ok()
}

pub fn format_value(value: f64, kind: ColumnKind) -> String {
    match kind {
        // f64 Display is shortest round-trip: 3.0 prints "3", 2.5 prints "2.5"
        ColumnKind::Count => format!("{value}"),
        ColumnKind::Rate => format!("{value:.2}"),
    }
}

/// Derived change column: fixed minus original.
///
/// Blank (`None`) unless BOTH raw strings are non-empty; within that, a
/// value that fails numeric parsing contributes 0.0 rather than aborting
/// the row.
pub fn change(fixed_raw: &str, original_raw: &str, kind: ColumnKind) -> Option<String> {
    if fixed_raw.is_empty() || original_raw.is_empty() {
        return None;
    }
    Some(format_value(parse_stat(fixed_raw) - parse_stat(original_raw), kind))
}
