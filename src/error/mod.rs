//! Error types for sunny-scrape.
//!
//! Uses `thiserror` for structured error types that map to exit codes.
//!
//! ## Error Taxonomy
//!
//! Errors are categorized into six main categories:
//! - **Authentication**: The login handshake failed at a known stage
//! - **Network**: Connection or timeout failures before any HTTP status arrived
//! - **Configuration**: Config file parsing, validation, or missing values
//! - **Portal**: The portal answered, but not with what the protocol expects
//! - **Output**: Writing a retrieved day to disk failed
//! - **Internal**: Unexpected errors, bugs, or unclassified issues
//!
//! Each error has a stable error code (e.g., `SUNNY-A001`) for programmatic handling.

pub mod suggestions;

use std::path::PathBuf;

use chrono::NaiveDate;
use thiserror::Error;

pub use suggestions::FixSuggestion;

// =============================================================================
// Error Categories
// =============================================================================

/// High-level error categories for classification and routing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Login handshake failures.
    Authentication,
    /// Transport failures (timeout, DNS, connection refused).
    Network,
    /// Configuration issues (parse errors, invalid values, missing files).
    Configuration,
    /// Unexpected portal responses.
    Portal,
    /// Output file failures.
    Output,
    /// Internal errors (bugs, unexpected state, unclassified).
    Internal,
}

impl ErrorCategory {
    /// Returns a human-readable description of the category.
    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::Authentication => "Authentication error",
            Self::Network => "Network error",
            Self::Configuration => "Configuration error",
            Self::Portal => "Portal error",
            Self::Output => "Output error",
            Self::Internal => "Internal error",
        }
    }

    /// Returns a short code prefix for this category.
    #[must_use]
    pub const fn code_prefix(&self) -> &'static str {
        match self {
            Self::Authentication => "A",
            Self::Network => "N",
            Self::Configuration => "C",
            Self::Portal => "P",
            Self::Output => "O",
            Self::Internal => "X",
        }
    }
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.description())
    }
}

// =============================================================================
// Authentication stages
// =============================================================================

/// The step of the login handshake that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthStage {
    /// Fetching the login entry page returned a non-success status.
    Fetch,
    /// The login form or its `action` attribute is missing from the page.
    FormNotFound,
    /// Submitting credentials produced no redirect.
    Rejected,
    /// Posting the callback parameters back did not return 200.
    Finalize,
}

impl AuthStage {
    /// Stable lowercase name, used in logs and JSON output.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Fetch => "fetch",
            Self::FormNotFound => "form_not_found",
            Self::Rejected => "rejected",
            Self::Finalize => "finalize",
        }
    }
}

impl std::fmt::Display for AuthStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Exit Codes
// =============================================================================

/// Process exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExitCode {
    /// Success
    Success = 0,
    /// Unexpected failure
    GeneralError = 1,
    /// Login handshake failed
    AuthenticationFailed = 2,
    /// Config or usage error
    ConfigError = 3,
    /// Timeout
    Timeout = 4,
    /// A portal request returned a non-success status
    RequestFailed = 5,
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code as Self
    }
}

/// Main error type for sunny-scrape operations.
#[derive(Error, Debug)]
pub enum SunnyError {
    // ==========================================================================
    // Authentication errors (Category: Authentication)
    // ==========================================================================
    /// The login handshake failed.
    #[error("login failed at stage '{stage}'{}", status_suffix(.status))]
    Authentication {
        stage: AuthStage,
        status: Option<u16>,
    },

    // ==========================================================================
    // Network errors (Category: Network)
    // ==========================================================================
    /// Request timed out.
    #[error("request to {url} timed out after {seconds}s")]
    Timeout { url: String, seconds: u64 },

    /// Transport-level failure (DNS, refused connection, TLS, ...).
    #[error("network error for {url}: {message}")]
    Network { url: String, message: String },

    /// A redirect chain did not terminate.
    #[error("too many redirects starting at {url}")]
    TooManyRedirects { url: String },

    // ==========================================================================
    // Portal errors (Category: Portal)
    // ==========================================================================
    /// A portal request returned a non-success status or bounced to the login page.
    #[error("request to {url} failed with status {status}{}", login_suffix(.login_redirect))]
    RequestFailure {
        url: String,
        status: u16,
        login_redirect: bool,
    },

    /// A chart window or job whose start lies after its end.
    #[error("invalid range: {start} is after {end}")]
    InvalidRange { start: String, end: String },

    // ==========================================================================
    // Configuration errors (Category: Configuration)
    // ==========================================================================
    /// Configuration file not found at expected path.
    #[error("config file not found: {path}")]
    ConfigNotFound { path: String },

    /// Error parsing configuration file.
    #[error("config parse error at {path}: {message}")]
    ConfigParse {
        path: String,
        line: Option<usize>,
        message: String,
    },

    /// Invalid value in configuration.
    #[error("invalid config value for '{key}': {message}")]
    ConfigInvalid { key: String, message: String },

    // ==========================================================================
    // Output errors (Category: Output)
    // ==========================================================================
    /// Writing a day's data failed.
    #[error("could not write {}: {source}", .path.display())]
    OutputWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ==========================================================================
    // Batch context
    // ==========================================================================
    /// A batch aborted while retrieving the given day.
    #[error("could not get data for {day}: {source}")]
    DayFailed {
        day: NaiveDate,
        #[source]
        source: Box<SunnyError>,
    },

    // ==========================================================================
    // I/O errors (Category: Internal)
    // ==========================================================================
    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" (HTTP {s})")).unwrap_or_default()
}

const fn login_suffix(login_redirect: &bool) -> &'static str {
    if *login_redirect {
        " (redirected to login)"
    } else {
        ""
    }
}

/// Result type alias for sunny-scrape operations.
pub type Result<T> = std::result::Result<T, SunnyError>;

impl SunnyError {
    /// Shorthand for an authentication failure without an HTTP status.
    #[must_use]
    pub const fn auth(stage: AuthStage) -> Self {
        Self::Authentication {
            stage,
            status: None,
        }
    }

    /// Attach the day a batch was working on.
    #[must_use]
    pub fn on_day(self, day: NaiveDate) -> Self {
        match self {
            already @ Self::DayFailed { .. } => already,
            other => Self::DayFailed {
                day,
                source: Box::new(other),
            },
        }
    }

    /// The innermost error, with any day context peeled off.
    #[must_use]
    pub fn root(&self) -> &Self {
        match self {
            Self::DayFailed { source, .. } => source.root(),
            other => other,
        }
    }

    /// The day a batch failed on, if this error carries one.
    #[must_use]
    pub const fn day(&self) -> Option<NaiveDate> {
        match self {
            Self::DayFailed { day, .. } => Some(*day),
            _ => None,
        }
    }

    /// The login stage, if this is an authentication failure.
    #[must_use]
    pub fn auth_stage(&self) -> Option<AuthStage> {
        match self.root() {
            Self::Authentication { stage, .. } => Some(*stage),
            _ => None,
        }
    }

    /// Whether the portal bounced a protocol request back to its login page.
    #[must_use]
    pub fn is_session_expired(&self) -> bool {
        matches!(
            self.root(),
            Self::RequestFailure {
                login_redirect: true,
                ..
            }
        )
    }

    /// Map error to process exit code.
    #[must_use]
    pub fn exit_code(&self) -> ExitCode {
        match self.root() {
            Self::Authentication { .. } => ExitCode::AuthenticationFailed,

            Self::ConfigNotFound { .. }
            | Self::ConfigParse { .. }
            | Self::ConfigInvalid { .. }
            | Self::InvalidRange { .. } => ExitCode::ConfigError,

            Self::Timeout { .. } => ExitCode::Timeout,

            Self::RequestFailure { .. } => ExitCode::RequestFailed,

            Self::Network { .. }
            | Self::TooManyRedirects { .. }
            | Self::OutputWrite { .. }
            | Self::DayFailed { .. }
            | Self::Io(_)
            | Self::Json(_) => ExitCode::GeneralError,
        }
    }

    /// Returns the error category for classification and routing.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self.root() {
            Self::Authentication { .. } => ErrorCategory::Authentication,

            Self::Timeout { .. } | Self::Network { .. } | Self::TooManyRedirects { .. } => {
                ErrorCategory::Network
            }

            Self::ConfigNotFound { .. }
            | Self::ConfigParse { .. }
            | Self::ConfigInvalid { .. }
            | Self::InvalidRange { .. } => ErrorCategory::Configuration,

            Self::RequestFailure { .. } => ErrorCategory::Portal,

            Self::OutputWrite { .. } => ErrorCategory::Output,

            Self::DayFailed { .. } | Self::Io(_) | Self::Json(_) => ErrorCategory::Internal,
        }
    }

    /// Returns a stable error code for programmatic handling.
    ///
    /// Format: `SUNNY-{category}{number}`.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self.root() {
            Self::Authentication { stage, .. } => match stage {
                AuthStage::Fetch => "SUNNY-A001",
                AuthStage::FormNotFound => "SUNNY-A002",
                AuthStage::Rejected => "SUNNY-A003",
                AuthStage::Finalize => "SUNNY-A004",
            },

            Self::Timeout { .. } => "SUNNY-N001",
            Self::TooManyRedirects { .. } => "SUNNY-N002",
            Self::Network { .. } => "SUNNY-N099",

            Self::ConfigNotFound { .. } => "SUNNY-C001",
            Self::ConfigParse { .. } => "SUNNY-C002",
            Self::ConfigInvalid { .. } => "SUNNY-C003",
            Self::InvalidRange { .. } => "SUNNY-C010",

            Self::RequestFailure {
                login_redirect: true,
                ..
            } => "SUNNY-P002",
            Self::RequestFailure { .. } => "SUNNY-P001",

            Self::OutputWrite { .. } => "SUNNY-O001",

            Self::Io(_) => "SUNNY-X001",
            Self::Json(_) => "SUNNY-X002",
            Self::DayFailed { .. } => "SUNNY-X099",
        }
    }

    /// Returns whether a later attempt could plausibly succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self.root() {
            Self::Timeout { .. } | Self::Network { .. } => true,
            Self::RequestFailure {
                status,
                login_redirect,
                ..
            } => *login_redirect || *status >= 500,
            _ => false,
        }
    }

    /// Returns actionable fix suggestions for this error.
    #[must_use]
    pub fn fix_suggestions(&self) -> Vec<FixSuggestion> {
        match self.root() {
            Self::Authentication { stage, status } => {
                suggestions::authentication_suggestions(*stage, *status)
            }
            Self::Timeout { seconds, .. } => suggestions::timeout_suggestions(*seconds),
            Self::Network { url, .. } | Self::TooManyRedirects { url } => {
                suggestions::network_suggestions(url)
            }
            Self::RequestFailure {
                status,
                login_redirect,
                ..
            } => suggestions::request_failure_suggestions(*status, *login_redirect),
            Self::ConfigNotFound { path } => suggestions::config_not_found_suggestions(path),
            Self::ConfigParse { path, line, .. } => {
                suggestions::config_parse_suggestions(path, *line)
            }
            Self::ConfigInvalid { key, .. } => suggestions::config_invalid_suggestions(key),
            Self::OutputWrite { path, .. } => suggestions::output_write_suggestions(path),
            Self::InvalidRange { .. }
            | Self::DayFailed { .. }
            | Self::Io(_)
            | Self::Json(_) => Vec::new(),
        }
    }
}
