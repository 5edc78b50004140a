//! `rulemerge run` / `rulemerge validate`: config-driven report merge.

use std::path::{Path, PathBuf};

use rulemerge_recon::{
    load_dataset, run, CompiledRules, Dataset, ReportConfig, ReportError, ReportInput,
    ReportResult,
};

use crate::exit_codes::{
    EXIT_REPORT_INVALID_CONFIG, EXIT_REPORT_MISSING_COLUMN, EXIT_REPORT_RUNTIME,
};
use crate::util::read_file_as_utf8;
use crate::CliError;

fn report_err(code: u8, msg: impl Into<String>) -> CliError {
    CliError { code, message: msg.into(), hint: None }
}

fn engine_err(err: ReportError) -> CliError {
    let code = match err {
        ReportError::ConfigParse(_) | ReportError::ConfigValidation(_) => {
            EXIT_REPORT_INVALID_CONFIG
        }
        ReportError::MissingColumn { .. } => EXIT_REPORT_MISSING_COLUMN,
        ReportError::Io(_) => EXIT_REPORT_RUNTIME,
    };
    report_err(code, err.to_string())
}

/// Load one role's CSV, honoring the required/optional contract: a missing
/// optional file is an empty dataset, a missing required file is fatal.
fn load_role(
    role: &str,
    base_dir: &Path,
    config: &rulemerge_recon::config::RoleConfig,
    rules: &CompiledRules,
) -> Result<Dataset, CliError> {
    let path = base_dir.join(&config.file);
    if !path.exists() {
        if config.required {
            return Err(report_err(
                EXIT_REPORT_RUNTIME,
                format!("{role} input not found: {}", path.display()),
            )
            .with_hint("file paths are resolved relative to the config file"));
        }
        eprintln!("{role} input missing, continuing with no data: {}", path.display());
        return Ok(Dataset::empty());
    }

    let csv_data = read_file_as_utf8(&path)
        .map_err(|e| report_err(EXIT_REPORT_RUNTIME, format!("cannot read {}: {e}", path.display())))?;
    load_dataset(role, &csv_data, &config.label, rules).map_err(engine_err)
}

pub fn cmd_run(
    config_path: PathBuf,
    json_output: bool,
    output_override: Option<PathBuf>,
) -> Result<(), CliError> {
    let config_str = std::fs::read_to_string(&config_path)
        .map_err(|e| report_err(EXIT_REPORT_RUNTIME, format!("cannot read config: {e}")))?;
    let config = ReportConfig::from_toml(&config_str).map_err(engine_err)?;

    let rules = CompiledRules::compile(&config.normalize).map_err(engine_err)?;

    // File paths resolve relative to the config file's directory
    let base_dir = config_path.parent().unwrap_or_else(|| Path::new("."));

    let input = ReportInput {
        primary: load_role("primary", base_dir, &config.primary, &rules)?,
        secondary: load_role("secondary", base_dir, &config.secondary, &rules)?,
    };

    let result = run(&config, &input).map_err(engine_err)?;

    let out_path = output_override.unwrap_or_else(|| base_dir.join(&config.output.file));
    let csv_text = render_csv(&result)
        .map_err(|e| report_err(EXIT_REPORT_RUNTIME, format!("CSV serialization error: {e}")))?;
    std::fs::write(&out_path, &csv_text).map_err(|e| {
        report_err(EXIT_REPORT_RUNTIME, format!("cannot write {}: {e}", out_path.display()))
    })?;

    if json_output {
        let json_str = serde_json::to_string_pretty(&result).map_err(|e| {
            report_err(EXIT_REPORT_RUNTIME, format!("JSON serialization error: {e}"))
        })?;
        println!("{json_str}");
    }

    // Human summary to stderr, stdout stays clean for --json
    let s = &result.summary;
    eprintln!("wrote {} ({} rows)", out_path.display(), result.rows.len());
    eprintln!(
        "matched {} of {} rows: {} exact, {} contains, {} total-fallback, {} unmatched",
        s.matched_exact + s.matched_contains + s.matched_total,
        s.primary_rows,
        s.matched_exact,
        s.matched_contains,
        s.matched_total,
        s.unmatched,
    );

    Ok(())
}

pub fn cmd_validate(config_path: PathBuf) -> Result<(), CliError> {
    let config_str = std::fs::read_to_string(&config_path)
        .map_err(|e| report_err(EXIT_REPORT_RUNTIME, format!("cannot read config: {e}")))?;

    match ReportConfig::from_toml(&config_str) {
        Ok(config) => {
            eprintln!(
                "valid: '{}' with {} normalize rule(s), {} output column(s)",
                config.name,
                config.normalize.len(),
                config.headers().len(),
            );
            Ok(())
        }
        Err(e) => Err(engine_err(e)),
    }
}

/// Serialize the merged report: header plus all rows in one pass.
///
/// Absent rates surface here as blank cells; the `Option` never leaks a
/// sentinel into the table.
pub fn render_csv(result: &ReportResult) -> Result<String, String> {
    let mut writer = csv::WriterBuilder::new().from_writer(Vec::new());
    writer
        .write_record(&result.headers)
        .map_err(|e| e.to_string())?;

    for row in &result.rows {
        let record: Vec<&str> = result
            .headers
            .iter()
            .map(|h| row.values.get(h).map(String::as_str).unwrap_or(""))
            .collect();
        writer.write_record(&record).map_err(|e| e.to_string())?;
    }

    let bytes = writer.into_inner().map_err(|e| e.to_string())?;
    String::from_utf8(bytes).map_err(|e| e.to_string())
}
