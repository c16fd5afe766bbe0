//! Test progress logging.
//!
//! Prints one line per event to stderr so that `cargo test -- --nocapture`
//! shows where a slow or failing test spent its time.
//!
//! # Environment Variables
//!
//! - `TEST_LOG_LEVEL` - trace, debug, info, warn, error (default: info)
//! - `TEST_LOG_JSON` - "1" or "true" for one JSON object per line
#![allow(dead_code)]

use std::env;
use std::fmt::Display;
use std::sync::Mutex;
use std::time::Instant;

use chrono::Utc;
use serde::Serialize;

use super::log_capture::TestLogCapture;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "trace" => Some(Self::Trace),
            "debug" => Some(Self::Debug),
            "info" => Some(Self::Info),
            "warn" | "warning" => Some(Self::Warn),
            "error" => Some(Self::Error),
            _ => None,
        }
    }
}

impl Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Trace => "TRACE",
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warn => "WARN",
            Self::Error => "ERROR",
        };
        f.write_str(s)
    }
}

#[derive(Serialize)]
struct LogEntry<'a> {
    timestamp: String,
    level: LogLevel,
    test: &'a str,
    phase: &'a str,
    message: &'a str,
    elapsed_ms: u64,
}

fn min_level() -> LogLevel {
    env::var("TEST_LOG_LEVEL")
        .ok()
        .and_then(|v| LogLevel::parse(&v))
        .unwrap_or(LogLevel::Info)
}

fn json_mode() -> bool {
    env::var("TEST_LOG_JSON").is_ok_and(|v| v == "1" || v.eq_ignore_ascii_case("true"))
}

/// Per-test logger with phase tracking.
pub struct TestLogger {
    test_name: String,
    start_time: Instant,
    current_phase: Mutex<String>,
}

impl TestLogger {
    #[must_use]
    pub fn new(test_name: &str) -> Self {
        let logger = Self {
            test_name: test_name.to_string(),
            start_time: Instant::now(),
            current_phase: Mutex::new("init".to_string()),
        };
        logger.log(LogLevel::Info, "Test starting");
        logger
    }

    /// Create logger with capture for assertions.
    pub fn with_capture(test_name: &str) -> (Self, TestLogCapture) {
        let capture = TestLogCapture::start();
        let logger = Self::new(test_name);
        (logger, capture)
    }

    /// Set the current test phase ("setup", "execute", "verify").
    pub fn phase(&self, phase: &str) {
        if let Ok(mut current) = self.current_phase.lock() {
            *current = phase.to_string();
        }
        self.log(LogLevel::Debug, &format!("Phase: {phase}"));
    }

    pub fn debug(&self, message: &str) {
        self.log(LogLevel::Debug, message);
    }

    pub fn info(&self, message: &str) {
        self.log(LogLevel::Info, message);
    }

    /// Log a command line about to be run (for e2e tests).
    pub fn command(&self, args: &[&str]) {
        self.debug(&format!("$ sunny-scrape {}", args.join(" ")));
    }

    #[allow(clippy::cast_possible_truncation)]
    pub fn finish_ok(&self) {
        let duration_ms = self.start_time.elapsed().as_millis() as u64;
        self.log(LogLevel::Info, &format!("Test passed (duration: {duration_ms}ms)"));
    }

    #[allow(clippy::cast_possible_truncation)]
    fn log(&self, level: LogLevel, message: &str) {
        if level < min_level() {
            return;
        }
        let phase = self
            .current_phase
            .lock()
            .map(|p| p.clone())
            .unwrap_or_default();
        let elapsed_ms = self.start_time.elapsed().as_millis() as u64;

        if json_mode() {
            let entry = LogEntry {
                timestamp: Utc::now().to_rfc3339(),
                level,
                test: &self.test_name,
                phase: &phase,
                message,
                elapsed_ms,
            };
            if let Ok(line) = serde_json::to_string(&entry) {
                eprintln!("{line}");
            }
        } else {
            eprintln!(
                "[{level:<5}] [{}] [{phase}] {message} (+{elapsed_ms}ms)",
                self.test_name
            );
        }
    }
}
