//! Diagnostic logging to stderr or a file.
//!
//! Logs never go to stdout, which is reserved for command output. Level and
//! format come from `--log-level`/`--json-output`/`--verbose`, then from
//! `SUNNY_LOG`, `SUNNY_LOG_FORMAT` and `SUNNY_LOG_FILE`. `RUST_LOG`, when set,
//! replaces the computed filter entirely.

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::str::FromStr;

use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::fmt::writer::BoxMakeWriter;

use crate::util::env::non_empty_var;

const LOG_LEVEL_ENV: &str = "SUNNY_LOG";
const LOG_FORMAT_ENV: &str = "SUNNY_LOG_FORMAT";
const LOG_FILE_ENV: &str = "SUNNY_LOG_FILE";

/// Log line layout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Multi-field lines without timestamps.
    #[default]
    Human,
    /// One JSON object per event.
    Json,
    /// Single terse line with target.
    Compact,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "human" | "pretty" => Ok(Self::Human),
            "json" | "jsonl" => Ok(Self::Json),
            "compact" => Ok(Self::Compact),
            other => Err(format!("unknown log format: {other}")),
        }
    }
}

/// Minimum level of `sunny_scrape` events that are written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    #[default]
    Warn,
    Error,
}

impl LogLevel {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "trace" => Ok(Self::Trace),
            "debug" | "verbose" => Ok(Self::Debug),
            "info" => Ok(Self::Info),
            "warn" | "warning" => Ok(Self::Warn),
            "error" => Ok(Self::Error),
            other => Err(format!("unknown log level: {other}")),
        }
    }
}

/// The `SUNNY_LOG*` variables as read from the process environment.
#[derive(Debug, Clone, Default)]
pub struct LogEnv {
    pub level: Option<String>,
    pub format: Option<String>,
    pub file: Option<PathBuf>,
}

impl LogEnv {
    #[must_use]
    pub fn read() -> Self {
        Self {
            level: non_empty_var(LOG_LEVEL_ENV),
            format: non_empty_var(LOG_FORMAT_ENV),
            file: non_empty_var(LOG_FILE_ENV).map(PathBuf::from),
        }
    }
}

/// Effective logging settings.
#[derive(Debug, Clone, Default)]
pub struct LogSettings {
    pub level: LogLevel,
    pub format: LogFormat,
    pub file: Option<PathBuf>,
}

impl LogSettings {
    /// Merge CLI flags over the process environment.
    #[must_use]
    pub fn resolve(log_level: Option<&str>, json_output: bool, verbose: bool) -> Self {
        Self::merge(log_level, json_output, verbose, LogEnv::read())
    }

    /// `--verbose` raises the default to `info`; an explicit level, from the
    /// flag or `SUNNY_LOG`, always wins. Unparseable values are ignored.
    #[must_use]
    pub fn merge(log_level: Option<&str>, json_output: bool, verbose: bool, env: LogEnv) -> Self {
        let explicit = log_level
            .and_then(|s| s.parse().ok())
            .or_else(|| env.level.as_deref().and_then(|s| s.parse().ok()));
        let level = explicit.unwrap_or(if verbose {
            LogLevel::Info
        } else {
            LogLevel::default()
        });

        let format = if json_output {
            LogFormat::Json
        } else {
            env.format
                .as_deref()
                .and_then(|s| s.parse().ok())
                .unwrap_or_default()
        };

        Self {
            level,
            format,
            file: env.file,
        }
    }

    fn filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(format!("sunny_scrape={}", self.level.as_str())))
    }

    /// Log file if one is configured and can be opened, else stderr.
    fn writer(&self) -> BoxMakeWriter {
        let file = self
            .file
            .as_ref()
            .and_then(|path| OpenOptions::new().create(true).append(true).open(path).ok());
        match file {
            Some(file) => BoxMakeWriter::new(file),
            None => BoxMakeWriter::new(std::io::stderr),
        }
    }
}

/// Install the global subscriber. Later calls are ignored.
pub fn init(settings: &LogSettings) {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(settings.filter())
        .with_writer(settings.writer());

    // try_init fails only when a subscriber is already installed.
    let _ = match settings.format {
        LogFormat::Json => builder
            .json()
            .with_span_events(FmtSpan::CLOSE)
            .try_init(),
        LogFormat::Compact => builder.compact().with_target(true).try_init(),
        LogFormat::Human => builder.with_target(false).without_time().try_init(),
    };
}
