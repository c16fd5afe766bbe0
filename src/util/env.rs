//! Environment lookups shared by config, logging and rendering.

use std::io::IsTerminal;

/// Read a non-empty, trimmed environment variable.
#[must_use]
pub fn non_empty_var(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// True for `1`, `true`, `yes` or `on`, case-insensitively.
#[must_use]
pub fn env_flag(key: &str) -> bool {
    non_empty_var(key).is_some_and(|value| is_truthy(&value))
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

/// Whether stdout output should be colored.
///
/// Off with `--no-color`, when `NO_COLOR` is set (any value), for `TERM=dumb`
/// and when stdout is not a terminal.
#[must_use]
pub fn should_use_color(no_color_flag: bool) -> bool {
    color_allowed(
        no_color_flag,
        std::env::var_os("NO_COLOR").is_some(),
        std::env::var("TERM").ok().as_deref(),
    ) && std::io::stdout().is_terminal()
}

fn color_allowed(no_color_flag: bool, no_color_env: bool, term: Option<&str>) -> bool {
    !no_color_flag && !no_color_env && term != Some("dumb")
}
