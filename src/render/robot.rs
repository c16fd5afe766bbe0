//! Robot-mode output (JSON).
//!
//! Every document is a [`RobotOutput`] envelope so that scripts can rely on a
//! single shape across commands.

use serde::Serialize;

use crate::core::models::{CurrentPayload, HistoryPayload, RobotOutput};
use crate::error::Result;

/// Render any serializable value as JSON.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn render_json<T: Serialize>(output: &T, pretty: bool) -> Result<String> {
    if pretty {
        Ok(serde_json::to_string_pretty(output)?)
    } else {
        Ok(serde_json::to_string(output)?)
    }
}

/// Render the dashboard reading.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn render_current_json(payload: &CurrentPayload, pretty: bool) -> Result<String> {
    render_json(&RobotOutput::new("current", payload), pretty)
}

/// Render a history run; `errors` is non-empty for a partial run.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn render_history_json(
    payload: &HistoryPayload,
    errors: Vec<String>,
    pretty: bool,
) -> Result<String> {
    render_json(&RobotOutput::with_errors("history", payload, errors), pretty)
}
