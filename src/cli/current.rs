//! `current` command: live dashboard values.

use crate::cli::args::Cli;
use crate::core::dashboard::DashboardReader;
use crate::core::models::CurrentPayload;
use crate::core::session::AuthSession;
use crate::error::Result;
use crate::render;
use crate::storage::ResolvedConfig;
use crate::util::env::should_use_color;

/// Execute the current command.
///
/// # Errors
///
/// Returns configuration, login and dashboard request errors. A dashboard
/// without live data is rendered, not an error.
pub async fn execute(cli: &Cli) -> Result<()> {
    let config = ResolvedConfig::resolve(cli, None)?;
    let no_color = config.no_color || !should_use_color(cli.no_color);

    let auth = AuthSession::new(config.endpoints.clone(), config.timeout);
    let session = auth.login(&config.credentials).await?;

    let reading = DashboardReader::new(config.endpoints.clone())
        .read(&session)
        .await?;
    tracing::debug!(?reading, "Dashboard read");

    let payload = CurrentPayload::from(&reading);
    let output = render::render_current(&payload, config.format, config.pretty, no_color)?;
    println!("{output}");
    Ok(())
}
