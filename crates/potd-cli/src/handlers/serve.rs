//! Serve command handler.

use anyhow::Result;
use tracing::info;

use crate::commands::ServeArgs;

/// Run the HTTP server and the scheduler until Ctrl-C.
pub async fn execute(args: &ServeArgs) -> Result<()> {
    let config = args.server_config();
    info!(
        port = config.port,
        cron = %config.scraper.cron,
        scrape_on_start = config.scraper.scrape_on_start,
        summaries = config.gemini.is_configured(),
        "Starting potd server"
    );
    potd_axum::start_server(config).await
}
