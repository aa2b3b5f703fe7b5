// fieldaudit CLI - route-log / roster reconciliation

mod audit;
mod exit_codes;
mod report;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use exit_codes::{EXIT_SUCCESS, EXIT_USAGE};

#[derive(Parser)]
#[command(name = "fieldaudit")]
#[command(about = "Reconcile field-visit route logs against coverage rosters")]
#[command(version)]
struct Cli {
    /// Log debug detail (skipped rows, header mapping) to stderr
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Normalize one CSV upload and print the canonical records
    #[command(after_help = "\
Examples:
  fieldaudit normalize route-w44.csv --kind route
  fieldaudit normalize missing-w44.csv --kind roster --json")]
    Normalize {
        /// CSV file to normalize
        file: PathBuf,

        /// Record kind: route or roster
        #[arg(long, short = 'k')]
        kind: String,

        /// Split cells with a CSV reader so quoted fields may contain commas
        #[arg(long)]
        quote_aware: bool,

        /// Print records as JSON to stdout
        #[arg(long)]
        json: bool,
    },

    /// Reconcile route and roster files without a config
    #[command(after_help = "\
Examples:
  fieldaudit reconcile --route route-w44.csv --roster missing-w44.csv
  fieldaudit reconcile --route a.csv --route b.csv --roster missing.csv --json")]
    Reconcile {
        /// Route-log CSV (repeatable, appended in order)
        #[arg(long)]
        route: Vec<PathBuf>,

        /// Roster CSV (repeatable, appended in order)
        #[arg(long)]
        roster: Vec<PathBuf>,

        /// Output JSON to stdout instead of human summary
        #[arg(long)]
        json: bool,

        /// Write JSON output to file
        #[arg(long)]
        output: Option<PathBuf>,

        /// Exit non-zero when any fraud alert is raised
        #[arg(long)]
        fail_on_alerts: bool,
    },

    /// Run an audit from a TOML config file
    #[command(after_help = "\
Examples:
  fieldaudit run week44.audit.toml
  fieldaudit run week44.audit.toml --json
  fieldaudit run week44.audit.toml --output report.json --fail-on-alerts")]
    Run {
        /// Path to the .audit.toml config file
        config: PathBuf,

        /// Output JSON to stdout instead of human summary
        #[arg(long)]
        json: bool,

        /// Write JSON output to file (overrides [output].json)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Exit non-zero when any fraud alert is raised
        #[arg(long)]
        fail_on_alerts: bool,
    },

    /// Validate an audit config without running
    Validate {
        /// Path to the .audit.toml config file
        config: PathBuf,
    },
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    // Fails only if a subscriber is already installed.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Normalize { file, kind, quote_aware, json } => {
            audit::cmd_normalize(file, &kind, quote_aware, json)
        }
        Commands::Reconcile { route, roster, json, output, fail_on_alerts } => {
            audit::cmd_reconcile(route, roster, json, output, fail_on_alerts)
        }
        Commands::Run { config, json, output, fail_on_alerts } => {
            audit::cmd_run(config, json, output, fail_on_alerts)
        }
        Commands::Validate { config } => audit::cmd_validate(config),
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
    pub fn new(code: u8, msg: impl Into<String>) -> Self {
        Self { code, message: msg.into(), hint: None }
    }

    pub fn args(msg: impl Into<String>) -> Self {
        Self::new(EXIT_USAGE, msg)
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}
