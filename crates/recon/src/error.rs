use std::fmt;

#[derive(Debug)]
pub enum ReportError {
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Config validation error (bad column reference, empty output, etc.).
    ConfigValidation(String),
    /// Missing required column in input data.
    MissingColumn { role: String, column: String },
    /// IO error (CSV record read, etc.).
    Io(String),
}

impl fmt::Display for ReportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
            Self::MissingColumn { role, column } => {
                write!(f, "{role} input: missing column '{column}'")
            }
            Self::Io(msg) => write!(f, "IO error: {msg}"),
        }
    }
}

impl std::error::Error for ReportError {}
