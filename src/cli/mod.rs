//! CLI argument parsing and command dispatch.

pub mod args;
pub mod current;
pub mod history;

pub use args::{Cli, Commands, HistoryArgs, OutputFormat};
