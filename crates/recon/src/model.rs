use std::collections::HashMap;

use serde::Serialize;

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// A single labeled row loaded from one of the role CSVs.
#[derive(Debug, Clone)]
pub struct Record {
    /// Raw human-entered label, preserved for display.
    pub label: String,
    /// Normalized lookup key. Never shown in output.
    pub key: String,
    pub raw_fields: HashMap<String, String>,
    /// True for the reserved "GRAND TOTAL" / "TOTAL" row.
    pub is_aggregate: bool,
}

/// Labels like "GRAND TOTAL" or a bare "TOTAL" mark the reserved aggregate
/// row, which is excluded from normal matching.
pub fn is_aggregate_label(label: &str) -> bool {
    let upper = label.to_uppercase();
    upper.contains("GRAND TOTAL") || upper.trim() == "TOTAL"
}

/// An ordered sequence of records plus a normalized-key index.
///
/// Last write wins on key collision; aggregate rows are kept in order but
/// never indexed.
#[derive(Debug, Default)]
pub struct Dataset {
    records: Vec<Record>,
    index: HashMap<String, usize>,
}

impl Dataset {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: Record) {
        if !record.is_aggregate && !record.key.is_empty() {
            self.index.insert(record.key.clone(), self.records.len());
        }
        self.records.push(record);
    }

    pub fn by_key(&self, key: &str) -> Option<&Record> {
        self.index.get(key).map(|&i| &self.records[i])
    }

    /// The reserved aggregate record, if the dataset has one.
    pub fn total_record(&self) -> Option<&Record> {
        self.records.iter().find(|r| r.is_aggregate)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Record> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Pre-loaded datasets for one engine run.
pub struct ReportInput {
    pub primary: Dataset,
    pub secondary: Dataset,
}

// ---------------------------------------------------------------------------
// Matching
// ---------------------------------------------------------------------------

/// How a primary row found its secondary counterpart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    Exact,
    Contains,
    TotalFallback,
}

impl MatchMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Exact => "exact",
            Self::Contains => "contains",
            Self::TotalFallback => "total_fallback",
        }
    }
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// One merged output row.
///
/// `rate` is the internal sort key for the rank variant: `None` means "no
/// rate available" and is distinguishable from a real 0% rate. It only ever
/// becomes a blank cell at serialization, never a sentinel value.
#[derive(Debug, Clone, Serialize)]
pub struct MergedRow {
    pub label: String,
    pub values: HashMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rate: Option<f64>,
    pub is_aggregate: bool,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct MergeSummary {
    pub primary_rows: usize,
    pub secondary_rows: usize,
    pub matched_exact: usize,
    pub matched_contains: usize,
    pub matched_total: usize,
    pub unmatched: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportMeta {
    pub config_name: String,
    pub engine_version: String,
    pub run_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportResult {
    pub meta: ReportMeta,
    pub summary: MergeSummary,
    /// Fixed, explicit output column order. Unmapped input columns are dropped.
    pub headers: Vec<String>,
    pub rows: Vec<MergedRow>,
}
