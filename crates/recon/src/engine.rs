use std::collections::HashMap;

use crate::aggregate::build_total_row;
use crate::config::{ReportConfig, SortOrder};
use crate::derive::{change, parse_rate};
use crate::error::ReportError;
use crate::matcher::lookup;
use crate::model::{
    is_aggregate_label, Dataset, MatchMode, MergeSummary, MergedRow, Record, ReportInput,
    ReportMeta, ReportResult,
};
use crate::normalize::CompiledRules;

/// Parse one role's CSV text into a Dataset.
///
/// The label column must exist in the header; rows with an empty label are
/// skipped. All header fields are retained in `raw_fields` so output
/// configs can reference any input column.
pub fn load_dataset(
    role: &str,
    csv_data: &str,
    label_column: &str,
    rules: &CompiledRules,
) -> Result<Dataset, ReportError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(csv_data.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| ReportError::Io(e.to_string()))?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let label_idx = headers
        .iter()
        .position(|h| h == label_column)
        .ok_or_else(|| ReportError::MissingColumn {
            role: role.into(),
            column: label_column.into(),
        })?;

    let mut dataset = Dataset::empty();

    for record in reader.records() {
        let record = record.map_err(|e| ReportError::Io(e.to_string()))?;
        let label = record.get(label_idx).unwrap_or("");
        if label.is_empty() {
            continue;
        }

        let mut raw_fields = HashMap::new();
        for (i, h) in headers.iter().enumerate() {
            if let Some(value) = record.get(i) {
                raw_fields.insert(h.clone(), value.to_string());
            }
        }

        dataset.push(Record {
            label: label.to_string(),
            key: rules.normalize(label),
            raw_fields,
            is_aggregate: is_aggregate_label(label),
        });
    }

    Ok(dataset)
}

/// Run the reconciliation. Merges the secondary dataset into the primary's
/// row order, derives change columns, appends the configured total row, and
/// applies the sort variant. Deterministic: identical inputs produce an
/// identical result.
pub fn run(config: &ReportConfig, input: &ReportInput) -> Result<ReportResult, ReportError> {
    let mut summary = MergeSummary {
        primary_rows: input.primary.len(),
        secondary_rows: input.secondary.len(),
        ..MergeSummary::default()
    };

    let mut rows = merge(config, input, &mut summary);

    if let Some(ref agg) = config.aggregate {
        rows.push(build_total_row(&rows, agg));
    }

    if config.output.sort == SortOrder::RateDesc {
        rank_rows(&mut rows);
    }

    Ok(ReportResult {
        meta: ReportMeta {
            config_name: config.name.clone(),
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            run_at: chrono::Utc::now().to_rfc3339(),
        },
        summary,
        headers: config.headers(),
        rows,
    })
}

fn merge(config: &ReportConfig, input: &ReportInput, summary: &mut MergeSummary) -> Vec<MergedRow> {
    let out = &config.output;
    let strategy = config.matching.strategy;
    let mut rows = Vec::with_capacity(input.primary.len());

    for record in input.primary.iter() {
        let mut values = HashMap::new();
        values.insert(out.label.clone(), record.label.clone());

        for carry in &out.carry {
            let value = record
                .raw_fields
                .get(&carry.source)
                .cloned()
                .unwrap_or_default();
            values.insert(carry.name.clone(), value);
        }

        let hit = lookup(&input.secondary, &record.label, &record.key, strategy);
        match hit {
            Some((_, MatchMode::Exact)) => summary.matched_exact += 1,
            Some((_, MatchMode::Contains)) => summary.matched_contains += 1,
            Some((_, MatchMode::TotalFallback)) => summary.matched_total += 1,
            None => summary.unmatched += 1,
        }

        for pull in &out.pull {
            let value = hit
                .and_then(|(other, _)| other.raw_fields.get(&pull.source))
                .cloned()
                .unwrap_or_default();
            values.insert(pull.name.clone(), value);
        }

        for cmp in &out.compare {
            let original = record
                .raw_fields
                .get(&cmp.source)
                .cloned()
                .unwrap_or_default();
            let fixed = hit
                .and_then(|(other, _)| other.raw_fields.get(&cmp.source))
                .cloned()
                .unwrap_or_default();
            let delta = change(&fixed, &original, cmp.kind).unwrap_or_default();

            values.insert(cmp.original.clone(), original);
            values.insert(cmp.fixed.clone(), fixed);
            values.insert(cmp.change.clone(), delta);
        }

        let rate = out
            .sort_by
            .as_ref()
            .and_then(|col| values.get(col))
            .and_then(|v| parse_rate(v));

        rows.push(MergedRow {
            label: record.label.clone(),
            values,
            rate,
            is_aggregate: record.is_aggregate,
        });
    }

    rows
}

/// Rank variant ordering: rows with a rate sort descending (label as a
/// deterministic tiebreak), rateless rows sort alphabetically after them,
/// aggregate rows go last in their original order.
fn rank_rows(rows: &mut Vec<MergedRow>) {
    let mut rated = Vec::new();
    let mut rateless = Vec::new();
    let mut aggregates = Vec::new();

    for row in rows.drain(..) {
        if row.is_aggregate {
            aggregates.push(row);
        } else if row.rate.is_some() {
            rated.push(row);
        } else {
            rateless.push(row);
        }
    }

    rated.sort_by(|a, b| {
        b.rate
            .partial_cmp(&a.rate)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.label.cmp(&b.label))
    });
    rateless.sort_by(|a, b| a.label.cmp(&b.label));

    rows.extend(rated);
    rows.extend(rateless);
    rows.extend(aggregates);
}
