//! Output rendering for human and robot modes.

pub mod error;
pub mod human;
pub mod robot;

use crate::cli::args::OutputFormat;
use crate::core::models::{CurrentPayload, HistoryPayload};
use crate::error::Result;

/// Render the dashboard reading.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn render_current(
    payload: &CurrentPayload,
    format: OutputFormat,
    pretty: bool,
    no_color: bool,
) -> Result<String> {
    match format {
        OutputFormat::Human => Ok(human::render_current(payload, no_color)),
        OutputFormat::Json => robot::render_current_json(payload, pretty),
    }
}

/// Render a history run, including partial ones.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn render_history(
    payload: &HistoryPayload,
    errors: Vec<String>,
    format: OutputFormat,
    pretty: bool,
    no_color: bool,
) -> Result<String> {
    match format {
        OutputFormat::Human => Ok(human::render_history(payload, no_color)),
        OutputFormat::Json => robot::render_history_json(payload, errors, pretty),
    }
}
