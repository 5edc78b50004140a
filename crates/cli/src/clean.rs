//! `rulemerge clean`: line-oriented text cleanup.
//!
//! Strips a leading "N. " numbering prefix and one enclosing backtick pair
//! from each line, preserving indentation and each line's original ending.

use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;

use crate::exit_codes::EXIT_CLEAN_IO;
use crate::util::read_file_as_utf8;
use crate::CliError;

/// Matches: optional indent + "33. " + rest of line.
fn num_prefix_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\s*)(\d+)\.\s*(.*)$").expect("static regex"))
}

/// Clean one line, keeping its own line ending (`\n`, `\r\n`, or none).
pub fn clean_line(line: &str) -> String {
    let (core, ending) = split_line_ending(line);

    let (indent, rest) = match num_prefix_re().captures(core) {
        Some(caps) => (
            caps.get(1).map_or("", |m| m.as_str()),
            caps.get(3).map_or("", |m| m.as_str()),
        ),
        None => ("", core),
    };

    // Unwrap one backtick pair only when it encloses the whole line
    let stripped = rest.trim();
    let cleaned = if stripped.len() >= 2 && stripped.starts_with('`') && stripped.ends_with('`') {
        let inner = stripped[1..stripped.len() - 1].trim();
        format!("{indent}{inner}")
    } else {
        format!("{indent}{rest}")
    };

    format!("{cleaned}{ending}")
}

fn split_line_ending(line: &str) -> (&str, &str) {
    if let Some(core) = line.strip_suffix("\r\n") {
        (core, "\r\n")
    } else if let Some(core) = line.strip_suffix('\n') {
        (core, "\n")
    } else {
        (line, "")
    }
}

fn clean_io(msg: impl Into<String>) -> CliError {
    CliError { code: EXIT_CLEAN_IO, message: msg.into(), hint: None }
}

pub fn cmd_clean(input: &Path, output: &Path) -> Result<(), CliError> {
    let raw = read_file_as_utf8(input)
        .map_err(|e| clean_io(format!("cannot read {}: {e}", input.display())))?;

    let lines: Vec<&str> = raw.split_inclusive('\n').collect();
    let cleaned: String = lines.iter().map(|l| clean_line(l)).collect();

    std::fs::write(output, &cleaned)
        .map_err(|e| clean_io(format!("cannot write {}: {e}", output.display())))?;

    eprintln!(
        "read  {} ({} lines, {} chars)",
        input.display(),
        lines.len(),
        raw.chars().count()
    );
    eprintln!(
        "wrote {} ({} lines, {} chars)",
        output.display(),
        lines.len(),
        cleaned.chars().count()
    );

    if raw.trim().is_empty() {
        eprintln!("warning: input file is empty");
    } else if cleaned.trim().is_empty() {
        eprintln!("warning: output became blank, first input lines:");
        for (i, line) in lines.iter().take(5).enumerate() {
            eprintln!("{:02}: {}", i + 1, line.trim_end());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_number_prefix() {
        assert_eq!(clean_line("33. ls -la\n"), "ls -la\n");
        assert_eq!(clean_line("1. single\n"), "single\n");
        assert_eq!(clean_line("no prefix\n"), "no prefix\n");
    }

    #[test]
    fn keeps_indent_before_prefix() {
        assert_eq!(clean_line("   12. indented\n"), "   indented\n");
    }

    #[test]
    fn unwraps_one_backtick_pair() {
        assert_eq!(clean_line("3. `cat /etc/passwd`\n"), "cat /etc/passwd\n");
        assert_eq!(clean_line("`whoami`\n"), "whoami\n");
        // Nested pair: only the outer one goes
        assert_eq!(clean_line("``double``\n"), "`double`\n");
    }

    #[test]
    fn lone_backtick_untouched() {
        assert_eq!(clean_line("`\n"), "`\n");
        assert_eq!(clean_line("a ` b\n"), "a ` b\n");
    }

    #[test]
    fn preserves_line_ending_style() {
        assert_eq!(clean_line("2. cmd\r\n"), "cmd\r\n");
        assert_eq!(clean_line("2. cmd"), "cmd");
        assert_eq!(clean_line("\r\n"), "\r\n");
    }

    #[test]
    fn prefix_must_start_the_line() {
        assert_eq!(clean_line("10.\n"), "\n");
        assert_eq!(clean_line("not 1. a prefix\n"), "not 1. a prefix\n");
    }
}
