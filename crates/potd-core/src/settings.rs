//! Scraper settings and validation.
//!
//! These are pure domain types; adapters fill them from CLI arguments and
//! environment variables.

use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

/// Top of every hour (`sec min hour day-of-month month day-of-week`).
pub const DEFAULT_SCRAPE_CRON: &str = "0 0 * * * *";

/// Errors from settings validation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SettingsError {
    #[error("Invalid cron expression '{expression}': {reason}")]
    InvalidCron { expression: String, reason: String },

    #[error("Invalid fault tolerance setting: {0}")]
    InvalidFaultTolerance(String),
}

/// Retry, circuit breaker and rate limit parameters for the scrape job.
#[derive(Debug, Clone, PartialEq)]
pub struct FaultToleranceSettings {
    pub retry_enabled: bool,
    /// Retries after the first attempt.
    pub max_retries: u32,
    pub retry_delay: Duration,

    pub circuit_breaker_enabled: bool,
    /// Number of recent attempts the failure ratio is computed over.
    pub request_volume_threshold: usize,
    pub failure_ratio: f64,
    /// How long the breaker stays open before letting a trial call through.
    pub circuit_open_delay: Duration,

    pub rate_limit_enabled: bool,
    pub rate_limit_permits: u32,
    pub rate_limit_window: Duration,
}

impl Default for FaultToleranceSettings {
    fn default() -> Self {
        Self {
            retry_enabled: true,
            max_retries: 3,
            retry_delay: Duration::from_secs(10),
            circuit_breaker_enabled: true,
            request_volume_threshold: 4,
            failure_ratio: 0.5,
            circuit_open_delay: Duration::from_secs(60 * 60),
            rate_limit_enabled: true,
            rate_limit_permits: 1,
            rate_limit_window: Duration::from_secs(10 * 60),
        }
    }
}

impl FaultToleranceSettings {
    /// All policies switched off (used by tests and one-shot CLI scrapes).
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            retry_enabled: false,
            circuit_breaker_enabled: false,
            rate_limit_enabled: false,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.circuit_breaker_enabled {
            if self.request_volume_threshold == 0 {
                return Err(SettingsError::InvalidFaultTolerance(
                    "request volume threshold must be at least 1".to_string(),
                ));
            }
            if !(self.failure_ratio > 0.0 && self.failure_ratio <= 1.0) {
                return Err(SettingsError::InvalidFaultTolerance(format!(
                    "failure ratio must be in (0, 1], got {}",
                    self.failure_ratio
                )));
            }
        }
        if self.rate_limit_enabled
            && (self.rate_limit_permits == 0 || self.rate_limit_window.is_zero())
        {
            return Err(SettingsError::InvalidFaultTolerance(
                "rate limit needs at least one permit and a non-zero window".to_string(),
            ));
        }
        Ok(())
    }
}

/// Settings for the scheduled scrape.
#[derive(Debug, Clone, PartialEq)]
pub struct ScraperSettings {
    /// Six-field cron expression driving the scheduler.
    pub cron: String,
    /// Run one scrape as soon as the scheduler starts.
    pub scrape_on_start: bool,
    pub fault_tolerance: FaultToleranceSettings,
}

impl Default for ScraperSettings {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl ScraperSettings {
    #[must_use]
    pub fn with_defaults() -> Self {
        Self {
            cron: DEFAULT_SCRAPE_CRON.to_string(),
            scrape_on_start: false,
            fault_tolerance: FaultToleranceSettings::default(),
        }
    }

    /// Parse the cron expression.
    pub fn schedule(&self) -> Result<cron::Schedule, SettingsError> {
        cron::Schedule::from_str(&self.cron).map_err(|e| SettingsError::InvalidCron {
            expression: self.cron.clone(),
            reason: e.to_string(),
        })
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        self.schedule()?;
        self.fault_tolerance.validate()
    }
}
