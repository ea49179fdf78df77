//! Main CLI parser and top-level argument handling.

use clap::Parser;

use crate::commands::Commands;

/// Wikipedia picture of the day service.
#[derive(Parser)]
#[command(name = "potd")]
#[command(about = "Scrape and serve the Wikipedia picture of the day")]
#[command(version)]
pub struct Cli {
    /// Enable verbose/debug output
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// Log filter used when `RUST_LOG` is unset.
    pub const fn default_log_filter(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }
}
