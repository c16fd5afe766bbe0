//! Fix suggestion database for sunny-scrape errors.
//!
//! Provides actionable fix suggestions mapped to specific error types,
//! including commands, context explanations, and prevention tips.

use std::path::Path;

use crate::error::AuthStage;

// =============================================================================
// Fix Suggestion Types
// =============================================================================

/// A fix suggestion for an error.
#[derive(Debug, Clone)]
pub struct FixSuggestion {
    /// Commands to run, copy-paste ready.
    pub commands: Vec<String>,

    /// Explanation of why this error occurred.
    pub context: String,

    /// Tips to prevent this error in the future.
    pub prevention: Option<String>,
}

impl FixSuggestion {
    /// Creates a new fix suggestion with required fields.
    #[must_use]
    pub fn new(commands: Vec<String>, context: impl Into<String>) -> Self {
        Self {
            commands,
            context: context.into(),
            prevention: None,
        }
    }

    /// Builder: adds prevention tips.
    #[must_use]
    pub fn with_prevention(mut self, prevention: impl Into<String>) -> Self {
        self.prevention = Some(prevention.into());
        self
    }
}

// =============================================================================
// Authentication
// =============================================================================

#[must_use]
pub fn authentication_suggestions(stage: AuthStage, status: Option<u16>) -> Vec<FixSuggestion> {
    match stage {
        AuthStage::Fetch => vec![FixSuggestion::new(
            vec!["sunny-scrape --verbose current".to_string()],
            format!(
                "The login page could not be loaded{}.",
                status.map(|s| format!(" (HTTP {s})")).unwrap_or_default()
            ),
        )
        .with_prevention("Check that the identity provider URL in your config is reachable.")],
        AuthStage::FormNotFound => vec![FixSuggestion::new(
            vec![],
            "The login page no longer contains a form named 'loginForm'. \
             The portal probably changed its markup.",
        )],
        AuthStage::Rejected => vec![FixSuggestion::new(
            vec!["sunny-scrape --config <path> current".to_string()],
            "The portal did not redirect after the credentials were submitted. \
             The username or password is most likely wrong.",
        )
        .with_prevention("Log in once in a browser to confirm the account is not locked.")],
        AuthStage::Finalize => vec![FixSuggestion::new(
            vec![],
            format!(
                "The portal refused to finalize the login{}. Retrying usually helps.",
                status.map(|s| format!(" (HTTP {s})")).unwrap_or_default()
            ),
        )],
    }
}

// =============================================================================
// Network
// =============================================================================

#[must_use]
pub fn timeout_suggestions(seconds: u64) -> Vec<FixSuggestion> {
    vec![FixSuggestion::new(
        vec![format!("SUNNY_TIMEOUT={} sunny-scrape ...", seconds * 2)],
        format!("The portal did not answer within {seconds}s."),
    )]
}

#[must_use]
pub fn network_suggestions(url: &str) -> Vec<FixSuggestion> {
    vec![FixSuggestion::new(
        vec![format!("curl -I {url}")],
        "The portal could not be reached.",
    )]
}

// =============================================================================
// Portal
// =============================================================================

#[must_use]
pub fn request_failure_suggestions(status: u16, login_redirect: bool) -> Vec<FixSuggestion> {
    if login_redirect {
        return vec![FixSuggestion::new(
            vec!["sunny-scrape history --renewal-threshold 10 ...".to_string()],
            "The portal sent the request back to the login page: the session expired.",
        )
        .with_prevention("Use a lower renewal threshold for long batches.")];
    }

    if status >= 500 {
        vec![FixSuggestion::new(
            vec![],
            format!("The portal returned HTTP {status}. This is usually transient."),
        )]
    } else {
        vec![FixSuggestion::new(
            vec![],
            format!("The portal rejected the request with HTTP {status}."),
        )]
    }
}

// =============================================================================
// Configuration
// =============================================================================

#[must_use]
pub fn config_not_found_suggestions(path: &str) -> Vec<FixSuggestion> {
    vec![FixSuggestion::new(
        vec![format!(
            "echo '{{\"username\": \"...\", \"password\": \"...\"}}' > {path}"
        )],
        "No config file with portal credentials was found.",
    )
    .with_prevention("Alternatively set SUNNY_USERNAME and SUNNY_PASSWORD.")]
}

#[must_use]
pub fn config_parse_suggestions(path: &str, line: Option<usize>) -> Vec<FixSuggestion> {
    let location = line.map_or_else(String::new, |l| format!(" near line {l}"));
    vec![FixSuggestion::new(
        vec![],
        format!("The config file {path} could not be parsed{location}."),
    )]
}

#[must_use]
pub fn config_invalid_suggestions(key: &str) -> Vec<FixSuggestion> {
    vec![FixSuggestion::new(
        vec![],
        format!("Fix the value of '{key}' in the config file or environment."),
    )]
}

// =============================================================================
// Output
// =============================================================================

#[must_use]
pub fn output_write_suggestions(path: &Path) -> Vec<FixSuggestion> {
    vec![FixSuggestion::new(
        vec![format!("ls -ld {}", path.parent().unwrap_or(path).display())],
        "The output file could not be written. Days before this one were kept.",
    )]
}
