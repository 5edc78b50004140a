// rulemerge CLI - merge and compare rule-statistics CSV reports

mod clean;
mod exit_codes;
mod report;
mod util;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use exit_codes::EXIT_SUCCESS;

#[derive(Parser)]
#[command(name = "rulemerge")]
#[command(about = "Merge and compare rule-statistics CSV reports")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a report merge from a TOML config file
    #[command(after_help = "\
Examples:
  rulemerge run report.toml
  rulemerge run report.toml --json
  rulemerge run report.toml --output combined.csv")]
    Run {
        /// Path to the report config file
        config: PathBuf,

        /// Print the full result as JSON to stdout
        #[arg(long)]
        json: bool,

        /// Write the merged CSV here instead of the config's output path
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Validate a report config without running
    #[command(after_help = "\
Examples:
  rulemerge validate report.toml")]
    Validate {
        /// Path to the report config file
        config: PathBuf,
    },

    /// Strip numbered-list prefixes and enclosing backticks from a text file
    #[command(after_help = "\
Examples:
  rulemerge clean commands.txt commands_clean.txt")]
    Clean {
        /// Input text file
        input: PathBuf,

        /// Output text file
        output: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run { config, json, output } => report::cmd_run(config, json, output),
        Commands::Validate { config } => report::cmd_validate(config),
        Commands::Clean { input, output } => clean::cmd_clean(&input, &output),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}
