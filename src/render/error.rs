//! Error rendering.
//!
//! Human mode prints the message with its code, the day and login stage when
//! known, and fix suggestions. JSON mode prints a structured object for
//! scripts.

use colored::Colorize;

use crate::cli::args::OutputFormat;
use crate::error::{FixSuggestion, SunnyError};

// =============================================================================
// Public API
// =============================================================================

/// Render an error for stderr.
#[must_use]
pub fn render_error(
    error: &SunnyError,
    format: OutputFormat,
    no_color: bool,
    pretty: bool,
) -> String {
    match format {
        OutputFormat::Json => render_error_json(error, pretty),
        OutputFormat::Human if no_color => render_simple(error),
        OutputFormat::Human => render_colored(error),
    }
}

/// Render error as structured JSON for machine consumption.
#[must_use]
pub fn render_error_json(error: &SunnyError, pretty: bool) -> String {
    let error_json = ErrorJson::from_error(error);
    let rendered = if pretty {
        serde_json::to_string_pretty(&error_json)
    } else {
        serde_json::to_string(&error_json)
    };
    rendered.unwrap_or_else(|_| render_simple(error))
}

// =============================================================================
// Terminal Rendering
// =============================================================================

fn render_colored(error: &SunnyError) -> String {
    let suggestions = error.fix_suggestions();
    let mut lines = Vec::new();

    lines.push(format!(
        "{} {} {}",
        format!("{}:", error.category()).red().bold(),
        error.to_string().red(),
        format!("[{}]", error.error_code()).dimmed()
    ));

    for (label, value) in context_lines(error) {
        lines.push(format!("  {} {value}", format!("{label}:").dimmed()));
    }

    if !suggestions.is_empty() {
        lines.push(String::new());
        lines.push("How to fix:".bold().to_string());
        for line in suggestion_lines(&suggestions) {
            lines.push(format!("  {}", line.cyan()));
        }
    }

    if let Some(context) = suggestions.first().map(|s| s.context.as_str()) {
        lines.push(String::new());
        lines.push("Why this happened:".yellow().to_string());
        lines.push(format!("  {context}"));
    }

    if let Some(prevention) = suggestions.first().and_then(|s| s.prevention.as_deref()) {
        lines.push(String::new());
        lines.push("Prevention:".green().to_string());
        lines.push(format!("  {prevention}"));
    }

    lines.join("\n")
}

/// Render error as simple text (no ANSI codes).
fn render_simple(error: &SunnyError) -> String {
    let suggestions = error.fix_suggestions();

    let mut lines = vec![format!("Error [{}]: {}", error.error_code(), error)];
    for (label, value) in context_lines(error) {
        lines.push(format!("  {label}: {value}"));
    }

    // First runnable suggestion, skipping comments
    if let Some(cmd) = suggestions
        .iter()
        .flat_map(|s| s.commands.iter())
        .find(|cmd| !cmd.starts_with('#'))
    {
        lines.push(format!("Fix: {cmd}"));
    }

    lines.join("\n")
}

fn context_lines(error: &SunnyError) -> Vec<(&'static str, String)> {
    let mut lines = Vec::new();
    if let Some(day) = error.day() {
        lines.push(("Day", day.to_string()));
    }
    if let Some(stage) = error.auth_stage() {
        lines.push(("Login stage", stage.to_string()));
    }
    if error.is_session_expired() {
        lines.push(("Session", "expired (redirected to login)".to_string()));
    }
    lines
}

fn suggestion_lines(suggestions: &[FixSuggestion]) -> Vec<String> {
    suggestions
        .iter()
        .flat_map(|s| s.commands.iter().cloned())
        .collect()
}

// =============================================================================
// JSON Rendering
// =============================================================================

/// JSON representation of an error for machine consumption.
#[derive(serde::Serialize)]
struct ErrorJson {
    error_code: String,
    category: String,
    message: String,
    is_retryable: bool,
    exit_code: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    day: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    auth_stage: Option<String>,
    suggestions: Vec<SuggestionJson>,
}

#[derive(serde::Serialize)]
struct SuggestionJson {
    commands: Vec<String>,
    context: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    prevention: Option<String>,
}

impl ErrorJson {
    fn from_error(error: &SunnyError) -> Self {
        Self {
            error_code: error.error_code().to_string(),
            category: error.category().to_string(),
            message: error.to_string(),
            is_retryable: error.is_retryable(),
            exit_code: error.exit_code().into(),
            day: error.day().map(|d| d.to_string()),
            auth_stage: error.auth_stage().map(|s| s.as_str().to_string()),
            suggestions: error
                .fix_suggestions()
                .into_iter()
                .map(|s| SuggestionJson {
                    commands: s.commands,
                    context: s.context,
                    prevention: s.prevention,
                })
                .collect(),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
