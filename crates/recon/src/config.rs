use std::collections::HashSet;

use serde::Deserialize;

use crate::derive::ColumnKind;
use crate::error::ReportError;
use crate::matcher::MatchStrategy;
use crate::normalize::NormalizeRule;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct ReportConfig {
    pub name: String,
    pub primary: RoleConfig,
    pub secondary: RoleConfig,
    #[serde(default)]
    pub normalize: Vec<NormalizeRule>,
    #[serde(default, rename = "match")]
    pub matching: MatchConfig,
    pub output: OutputConfig,
    #[serde(default)]
    pub aggregate: Option<AggregateConfig>,
}

// ---------------------------------------------------------------------------
// Roles
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct RoleConfig {
    pub file: String,
    /// Header name of the label (join key) column.
    pub label: String,
    /// A missing file is fatal for required roles; optional roles load as
    /// an empty dataset instead.
    #[serde(default = "default_required")]
    pub required: bool,
}

fn default_required() -> bool {
    true
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct MatchConfig {
    #[serde(default)]
    pub strategy: MatchStrategy,
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct OutputConfig {
    pub file: String,
    /// Header name for the label column (always first).
    pub label: String,
    #[serde(default)]
    pub sort: SortOrder,
    /// Output column whose value drives `rate_desc` ordering.
    #[serde(default)]
    pub sort_by: Option<String>,
    #[serde(default)]
    pub carry: Vec<CarryColumn>,
    #[serde(default)]
    pub pull: Vec<PullColumn>,
    #[serde(default)]
    pub compare: Vec<CompareColumn>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    /// Keep the primary dataset's row order.
    Preserve,
    /// Rate descending, rateless rows alphabetical, aggregate row last.
    RateDesc,
}

impl Default for SortOrder {
    fn default() -> Self {
        Self::Preserve
    }
}

/// Column copied through from the primary row.
#[derive(Debug, Clone, Deserialize)]
pub struct CarryColumn {
    pub source: String,
    pub name: String,
}

/// Column copied from the matched secondary row (blank when unmatched).
#[derive(Debug, Clone, Deserialize)]
pub struct PullColumn {
    pub source: String,
    pub name: String,
}

/// Original / fixed / change triple. `source` is the input column name on
/// both sides; `kind` selects the change formatting.
#[derive(Debug, Clone, Deserialize)]
pub struct CompareColumn {
    pub source: String,
    pub original: String,
    pub fixed: String,
    pub change: String,
    #[serde(default)]
    pub kind: ColumnKind,
}

// ---------------------------------------------------------------------------
// Aggregate
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct AggregateConfig {
    /// Label of the synthetic total row, e.g. "GRAND TOTAL".
    pub label: String,
    /// Output columns summed across all non-aggregate rows.
    #[serde(default)]
    pub sum: Vec<String>,
    #[serde(default)]
    pub rate: Option<RateSpec>,
}

/// Derived percentage for the total row: numerator / denominator * 100,
/// 0 when the denominator sums to 0.
#[derive(Debug, Clone, Deserialize)]
pub struct RateSpec {
    pub numerator: String,
    pub denominator: String,
    pub output: String,
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl ReportConfig {
    pub fn from_toml(input: &str) -> Result<Self, ReportError> {
        let config: ReportConfig =
            toml::from_str(input).map_err(|e| ReportError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Output header row: label first, then carry, pull, and compare
    /// columns in declaration order.
    pub fn headers(&self) -> Vec<String> {
        let out = &self.output;
        let mut headers = Vec::with_capacity(
            1 + out.carry.len() + out.pull.len() + out.compare.len() * 3,
        );
        headers.push(out.label.clone());
        headers.extend(out.carry.iter().map(|c| c.name.clone()));
        headers.extend(out.pull.iter().map(|c| c.name.clone()));
        for cmp in &out.compare {
            headers.push(cmp.original.clone());
            headers.push(cmp.fixed.clone());
            headers.push(cmp.change.clone());
        }
        headers
    }

    pub fn validate(&self) -> Result<(), ReportError> {
        if self.primary.label.is_empty() || self.secondary.label.is_empty() {
            return Err(ReportError::ConfigValidation(
                "role label column must not be empty".into(),
            ));
        }

        let out = &self.output;
        if out.carry.is_empty() && out.pull.is_empty() && out.compare.is_empty() {
            return Err(ReportError::ConfigValidation(
                "output must declare at least one carry, pull, or compare column".into(),
            ));
        }

        let headers = self.headers();
        let mut seen = HashSet::new();
        for h in &headers {
            if !seen.insert(h) {
                return Err(ReportError::ConfigValidation(format!(
                    "duplicate output column '{h}'"
                )));
            }
        }

        let known = |col: &str| headers.iter().any(|h| h == col);

        match (out.sort, &out.sort_by) {
            (SortOrder::RateDesc, None) => {
                return Err(ReportError::ConfigValidation(
                    "sort = \"rate_desc\" requires sort_by".into(),
                ));
            }
            (_, Some(col)) if !known(col) => {
                return Err(ReportError::ConfigValidation(format!(
                    "sort_by references unknown output column '{col}'"
                )));
            }
            _ => {}
        }

        if let Some(ref agg) = self.aggregate {
            if agg.label.is_empty() {
                return Err(ReportError::ConfigValidation(
                    "aggregate label must not be empty".into(),
                ));
            }
            for col in &agg.sum {
                if !known(col) {
                    return Err(ReportError::ConfigValidation(format!(
                        "aggregate sums unknown output column '{col}'"
                    )));
                }
            }
            if let Some(ref rate) = agg.rate {
                for col in [&rate.numerator, &rate.denominator, &rate.output] {
                    if !known(col) {
                        return Err(ReportError::ConfigValidation(format!(
                            "aggregate rate references unknown output column '{col}'"
                        )));
                    }
                }
            }
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
