//! Subcommands and their arguments.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::builder::BoolishValueParser;
use clap::{ArgAction, Args, Subcommand};
use potd_core::DEFAULT_SCRAPE_CRON;
use potd_gemini::DEFAULT_MODEL;
use potd_wiki::DEFAULT_MAIN_PAGE_URL;

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP API and the scrape scheduler
    Serve(ServeArgs),
    /// Scrape today's featured picture once
    Scrape(ServiceArgs),
    /// Print a stored picture
    Show(ShowArgs),
    /// Print the resolved data directory and database file
    Paths,
}

/// Options shared by every command that talks to the database or Wikipedia.
#[derive(Args, Debug, Clone)]
pub struct ServiceArgs {
    /// `SQLite` database file
    #[arg(long, env = "POTD_DATABASE")]
    pub database: Option<PathBuf>,

    /// Page holding the featured picture box
    #[arg(long, env = "POTD_WIKIPEDIA_URL", default_value = DEFAULT_MAIN_PAGE_URL)]
    pub wikipedia_url: String,

    /// User agent for Wikipedia requests
    #[arg(long, env = "POTD_USER_AGENT")]
    pub user_agent: Option<String>,

    /// Gemini API key; summaries are skipped without one
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    pub gemini_api_key: Option<String>,

    #[arg(long, env = "GEMINI_MODEL", default_value = DEFAULT_MODEL)]
    pub gemini_model: String,

    /// Retry, circuit breaker and rate limit around scrapes (on/off)
    #[arg(
        long,
        env = "POTD_FAULT_TOLERANCE",
        default_value = "on",
        action = ArgAction::Set,
        value_parser = BoolishValueParser::new()
    )]
    pub fault_tolerance: bool,

    /// Entries kept per response cache
    #[arg(long, env = "POTD_CACHE_CAPACITY", default_value_t = 256)]
    pub cache_capacity: u64,

    /// Dither noise amplitude (0 disables noise)
    #[arg(long, env = "POTD_DITHER_NOISE", default_value_t = 5.0)]
    pub dither_noise: f32,
}

#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    /// Port for the HTTP server
    #[arg(long, short = 'p', env = "POTD_PORT", default_value_t = 8080)]
    pub port: u16,

    /// Cron expression (with seconds) for scheduled scrapes
    #[arg(long, env = "POTD_SCRAPE_CRON", default_value = DEFAULT_SCRAPE_CRON)]
    pub cron: String,

    /// Scrape once right after startup
    #[arg(
        long,
        env = "POTD_SCRAPE_ON_START",
        default_value = "false",
        action = ArgAction::Set,
        num_args = 0..=1,
        default_missing_value = "true",
        value_parser = BoolishValueParser::new()
    )]
    pub scrape_on_start: bool,

    /// Allowed CORS origins; all origins when empty
    #[arg(long = "allow-origin", value_delimiter = ',', env = "POTD_ALLOWED_ORIGINS")]
    pub allowed_origins: Vec<String>,

    #[command(flatten)]
    pub service: ServiceArgs,
}

#[derive(Args, Debug, Clone)]
pub struct ShowArgs {
    /// Date to show (YYYY-MM-DD); today or the latest picture by default
    #[arg(long)]
    pub date: Option<NaiveDate>,

    /// Print the JSON served by the API
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub service: ServiceArgs,
}
