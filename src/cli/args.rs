//! CLI argument definitions using clap.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};

use crate::core::scheduler::RetrievalJob;
use crate::error::Result;

/// Sunny Portal scraper - download SMA energy data.
#[derive(Parser, Debug)]
#[command(name = "sunny-scrape")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    // === Global flags ===
    /// Config file (JSON, or TOML with a .toml extension)
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value = "human", global = true)]
    pub format: OutputFormat,

    /// Shorthand for --format json
    #[arg(long, global = true)]
    pub json: bool,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Log level
    #[arg(long, value_name = "LEVEL", global = true)]
    pub log_level: Option<String>,

    /// Emit JSONL logs to stderr
    #[arg(long, global = true)]
    pub json_output: bool,

    /// Verbose output (sets log level to info unless --log-level is given)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

impl Cli {
    /// Resolve the effective output format.
    #[must_use]
    pub fn effective_format(&self) -> OutputFormat {
        if self.json {
            OutputFormat::Json
        } else {
            self.format
        }
    }

    /// Name of the command being run, for output envelopes.
    #[must_use]
    pub fn command_name(&self) -> &'static str {
        match self.command {
            None | Some(Commands::Current) => "current",
            Some(Commands::History(_)) => "history",
        }
    }
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show live power values from the dashboard (default command)
    Current,

    /// Download per-day energy CSV exports
    History(HistoryArgs),
}

/// Arguments for the `history` command.
#[derive(Parser, Debug)]
pub struct HistoryArgs {
    /// Day to download (YYYY-MM-DD); defaults to today
    #[arg(short, long, value_name = "DATE", conflicts_with = "full_year")]
    pub day: Option<NaiveDate>,

    /// Download every day of YEAR
    #[arg(short, long, value_name = "YEAR")]
    pub full_year: Option<i32>,

    /// Directory the CSV files are written to
    #[arg(short, long, value_name = "DIR", default_value = ".")]
    pub out_dir: PathBuf,

    /// Log in again after this many days
    #[arg(long, value_name = "N")]
    pub renewal_threshold: Option<u32>,
}

impl HistoryArgs {
    /// The days these arguments select.
    ///
    /// # Errors
    ///
    /// Returns `InvalidRange` for a year chrono cannot represent.
    pub fn job(&self) -> Result<RetrievalJob> {
        match (self.day, self.full_year) {
            (_, Some(year)) => RetrievalJob::full_year(year),
            (Some(day), None) => Ok(RetrievalJob::single_day(day)),
            (None, None) => Ok(RetrievalJob::today()),
        }
    }
}

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output
    #[default]
    Human,
    /// JSON output
    Json,
}
