use regex::Regex;
use serde::Deserialize;

use crate::error::ReportError;

/// One declarative label-rewriting rule.
///
/// Suffix lists differ between report generations ("- Linux", "- Auditd",
/// "/job", ...), so the rules are configuration rather than code. Plain
/// substring replacement by default; set `regex = true` for a pattern.
#[derive(Debug, Clone, Deserialize)]
pub struct NormalizeRule {
    pub pattern: String,
    #[serde(default)]
    pub replace: String,
    #[serde(default)]
    pub regex: bool,
}

#[derive(Debug)]
enum Compiled {
    Literal { pattern: String, replace: String },
    Pattern { re: Regex, replace: String },
}

/// Ordered, pre-compiled normalization pipeline.
#[derive(Debug)]
pub struct CompiledRules {
    rules: Vec<Compiled>,
}

impl CompiledRules {
    pub fn compile(rules: &[NormalizeRule]) -> Result<Self, ReportError> {
        let mut compiled = Vec::with_capacity(rules.len());
        for rule in rules {
            if rule.regex {
                let re = Regex::new(&rule.pattern).map_err(|e| {
                    ReportError::ConfigValidation(format!(
                        "bad normalize pattern {:?}: {e}",
                        rule.pattern
                    ))
                })?;
                compiled.push(Compiled::Pattern { re, replace: rule.replace.clone() });
            } else {
                compiled.push(Compiled::Literal {
                    pattern: rule.pattern.to_lowercase(),
                    replace: rule.replace.clone(),
                });
            }
        }
        Ok(Self { rules: compiled })
    }

    /// Derive the lookup key for a raw label.
    ///
    /// Fixed transform order: lowercase, apply each rule in sequence, then
    /// collapse whitespace and underscore runs to single spaces and trim.
    pub fn normalize(&self, raw: &str) -> String {
        let mut label = raw.to_lowercase();
        for rule in &self.rules {
            match rule {
                Compiled::Literal { pattern, replace } => {
                    label = label.replace(pattern.as_str(), replace);
                }
                Compiled::Pattern { re, replace } => {
                    label = re.replace_all(&label, replace.as_str()).into_owned();
                }
            }
        }
        label
            .split(|c: char| c.is_whitespace() || c == '_')
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}
