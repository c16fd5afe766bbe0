//! `history` command: per-day CSV downloads.

use crate::cli::args::{Cli, HistoryArgs};
use crate::core::models::HistoryPayload;
use crate::core::protocol::PortalProtocolDriver;
use crate::core::scheduler::BatchRetrievalScheduler;
use crate::core::session::AuthSession;
use crate::error::Result;
use crate::render;
use crate::storage::{CsvDirectorySink, ResolvedConfig};
use crate::util::env::should_use_color;

/// Execute the history command.
///
/// Days written before a failure stay on disk and are listed in the output;
/// the failure is then returned so the process exits non-zero.
///
/// # Errors
///
/// Returns configuration and output directory errors before any request,
/// a login error if the first login fails, and otherwise the error of the
/// day the batch stopped on.
pub async fn execute(cli: &Cli, args: &HistoryArgs) -> Result<()> {
    let job = args.job()?;
    let config = ResolvedConfig::resolve(cli, args.renewal_threshold)?;
    let no_color = config.no_color || !should_use_color(cli.no_color);
    let mut sink = CsvDirectorySink::create(&args.out_dir)?;

    let auth = AuthSession::new(config.endpoints.clone(), config.timeout);
    let session = auth.login(&config.credentials).await?;

    let driver = PortalProtocolDriver::new(config.endpoints.clone());
    let scheduler =
        BatchRetrievalScheduler::new(&auth, &config.credentials, &driver, config.renewal_policy);
    let outcome = scheduler.run(&job, session, &mut sink).await;

    let payload = HistoryPayload::from_outcome(&job, &outcome);
    let errors = outcome
        .failure
        .iter()
        .map(|failure| failure.error.to_string())
        .collect();
    let output =
        render::render_history(&payload, errors, config.format, config.pretty, no_color)?;
    println!("{output}");

    outcome.into_result().map(|_| ())
}
