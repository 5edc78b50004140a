use std::collections::HashMap;

use crate::config::AggregateConfig;
use crate::derive::{format_value, parse_stat, ColumnKind};
use crate::model::MergedRow;

/// Build the synthetic total row: sum the configured count columns across
/// all non-aggregate rows, then derive the configured rate from the summed
/// numerator and denominator. Division by a zero denominator yields 0, not
/// an error.
pub fn build_total_row(rows: &[MergedRow], config: &AggregateConfig) -> MergedRow {
    let mut sums: HashMap<&str, f64> = HashMap::new();

    for row in rows.iter().filter(|r| !r.is_aggregate) {
        for col in &config.sum {
            let value = row.values.get(col).map(String::as_str).unwrap_or("");
            *sums.entry(col.as_str()).or_insert(0.0) += parse_stat(value);
        }
    }

    let mut values = HashMap::new();
    for col in &config.sum {
        let total = sums.get(col.as_str()).copied().unwrap_or(0.0);
        values.insert(col.clone(), format_value(total, ColumnKind::Count));
    }

    let mut rate = None;
    if let Some(ref spec) = config.rate {
        let numerator = sums.get(spec.numerator.as_str()).copied().unwrap_or(0.0);
        let denominator = sums.get(spec.denominator.as_str()).copied().unwrap_or(0.0);
        let percent = if denominator == 0.0 {
            0.0
        } else {
            numerator / denominator * 100.0
        };
        values.insert(spec.output.clone(), format_value(percent, ColumnKind::Rate));
        rate = Some(percent);
    }

    MergedRow {
        label: config.label.clone(),
        values,
        rate,
        is_aggregate: true,
    }
}
