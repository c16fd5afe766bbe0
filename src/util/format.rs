//! Number formatting utilities.

/// Format a power reading in watts, dropping a zero fraction.
#[must_use]
pub fn format_watts(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{value:.0}W")
    } else {
        format!("{value:.1}W")
    }
}
