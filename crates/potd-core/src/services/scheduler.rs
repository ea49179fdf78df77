//! Cron-driven scrape scheduler.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Local, TimeZone};
use cron::Schedule;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use super::fault_tolerance::GuardedScraper;
use super::scraper::ScrapeOutcome;
use crate::settings::{ScraperSettings, SettingsError};

/// Runs the guarded scrape on a cron schedule until cancelled.
pub struct ScrapeScheduler {
    scraper: Arc<GuardedScraper>,
    schedule: Schedule,
    scrape_on_start: bool,
}

impl ScrapeScheduler {
    pub fn new(
        scraper: Arc<GuardedScraper>,
        settings: &ScraperSettings,
    ) -> Result<Self, SettingsError> {
        Ok(Self {
            scraper,
            schedule: settings.schedule()?,
            scrape_on_start: settings.scrape_on_start,
        })
    }

    /// Spawn the scheduler loop onto the current runtime.
    pub fn spawn(self, cancel: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(self.run(cancel))
    }

    pub async fn run(self, cancel: CancellationToken) {
        info!(schedule = %self.schedule, "Scrape scheduler started");

        if self.scrape_on_start {
            tokio::select! {
                () = cancel.cancelled() => return,
                () = self.tick() => {}
            }
        }

        loop {
            let Some(delay) = delay_until_next(&self.schedule, &Local::now()) else {
                info!("Schedule has no upcoming fire times, stopping");
                return;
            };
            debug!(delay_secs = delay.as_secs(), "Sleeping until next scrape");

            tokio::select! {
                () = cancel.cancelled() => break,
                () = tokio::time::sleep(delay) => self.tick().await,
            }
        }
        info!("Scrape scheduler stopped");
    }

    async fn tick(&self) {
        match self.scraper.scrape().await {
            Ok(ScrapeOutcome::Skipped { date }) => {
                info!(%date, "Scheduled scrape skipped, picture already stored");
            }
            Ok(ScrapeOutcome::Saved { date, reused, .. }) => {
                info!(%date, reused, "Scheduled scrape stored picture");
            }
            Err(e) => error!(error = %e, "Scheduled scrape failed"),
        }
    }
}

/// Time from `now` until the schedule next fires.
pub(crate) fn delay_until_next<Z: TimeZone>(
    schedule: &Schedule,
    now: &DateTime<Z>,
) -> Option<Duration> {
    let next = schedule.after(now).next()?;
    Some((next - now.clone()).to_std().unwrap_or(Duration::ZERO))
}
