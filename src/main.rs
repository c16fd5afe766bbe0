//! sunny-scrape - SMA Sunny Portal scraper
//!
//! CLI entry point.

#![forbid(unsafe_code)]
#![warn(clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

use clap::Parser;
use std::process::ExitCode;

use sunny_scrape::cli::{Cli, Commands};
use sunny_scrape::core::logging::{self, LogSettings};

// One session is used by one task at a time; no worker threads needed.
#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    logging::init(&LogSettings::resolve(
        cli.log_level.as_deref(),
        cli.json_output,
        cli.verbose,
    ));

    let format = cli.effective_format();
    let no_color = !sunny_scrape::util::env::should_use_color(cli.no_color);
    let pretty = cli.pretty;

    match run(&cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(code = e.error_code(), "{e}");
            let error_output =
                sunny_scrape::render::error::render_error(&e, format, no_color, pretty);
            eprintln!("{error_output}");
            ExitCode::from(e.exit_code() as u8)
        }
    }
}

async fn run(cli: &Cli) -> sunny_scrape::Result<()> {
    match &cli.command {
        // Default to the current command
        None | Some(Commands::Current) => sunny_scrape::cli::current::execute(cli).await,
        Some(Commands::History(args)) => sunny_scrape::cli::history::execute(cli, args).await,
    }
}
