//! Human-readable output.

use colored::{ColoredString, Colorize};

use crate::core::models::{CurrentPayload, HistoryPayload};
use crate::util::format_watts;

/// Apply `style` unless colors are off.
fn paint(text: &str, no_color: bool, style: impl FnOnce(&str) -> ColoredString) -> String {
    if no_color {
        text.to_string()
    } else {
        style(text).to_string()
    }
}

/// Render the live dashboard values.
#[must_use]
pub fn render_current(payload: &CurrentPayload, no_color: bool) -> String {
    let (Some(pv), Some(total), Some(grid)) = (
        payload.pv_watts,
        payload.total_consumption_watts,
        payload.grid_consumption_watts,
    ) else {
        return paint("No live data available", no_color, |s| s.yellow());
    };

    let rows = [
        ("PV generation    ", pv),
        ("Total consumption", total),
        ("Grid consumption ", grid),
    ];

    let mut lines = vec![paint("Current energy data", no_color, |s| s.bold())];
    for (label, watts) in rows {
        let value = format_watts(watts);
        lines.push(format!(
            "{label}: {}",
            paint(&value, no_color, |s| s.cyan())
        ));
    }
    lines.join("\n")
}

/// Render the outcome of a history download.
#[must_use]
pub fn render_history(payload: &HistoryPayload, no_color: bool) -> String {
    let mut lines = Vec::with_capacity(payload.days.len() + 2);

    if payload.from == payload.to {
        lines.push(format!("Energy data for {}", payload.from));
    } else {
        lines.push(format!(
            "Energy data from {} to {}",
            payload.from, payload.to
        ));
    }

    for artifact in &payload.days {
        lines.push(format!(
            "  {} {}",
            paint(&artifact.day.to_string(), no_color, |s| s.green()),
            artifact.path.display()
        ));
    }

    let summary = format!(
        "{} day(s) written, {} session renewal(s)",
        payload.days.len(),
        payload.renewals
    );
    if payload.complete {
        lines.push(paint(&summary, no_color, |s| s.bold()));
    } else {
        let stopped = payload
            .failed_day
            .map_or_else(String::new, |day| format!("; stopped at {day}"));
        lines.push(paint(&format!("{summary}{stopped}"), no_color, |s| s.red()));
    }

    lines.join("\n")
}
