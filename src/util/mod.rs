//! Utility functions.

pub mod env;
pub mod format;
pub mod time;

pub use format::format_watts;
pub use time::{REPORTING_TZ, local_midnight, today};
