//! Scrape command handler.

use anyhow::Result;
use potd_core::ScrapeOutcome;

use crate::commands::ServiceArgs;

/// Scrape today's picture once and report what happened.
pub async fn execute(args: &ServiceArgs) -> Result<()> {
    let ctx = potd_axum::bootstrap(&args.server_config()).await?;

    match ctx.scraper.scrape().await? {
        ScrapeOutcome::Skipped { date } => {
            println!("Picture for {date} is already stored");
        }
        ScrapeOutcome::Saved {
            date,
            image_url,
            reused,
        } => {
            println!("Stored picture for {date}");
            println!("  image: {image_url}");
            if reused {
                println!("  (image and summary reused from an earlier day)");
            }
        }
    }
    Ok(())
}
