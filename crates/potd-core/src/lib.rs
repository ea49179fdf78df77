#![doc = include_str!("../README.md")]
#![deny(unused_crate_dependencies)]

pub mod domain;
pub mod metrics;
pub mod paths;
pub mod ports;
pub mod services;
pub mod settings;

// Re-export commonly used types for convenience
pub use domain::{
    DESCRIPTION_UNAVAILABLE, ExtractionError, FeaturedPicture, ImageSize, ImageVariant,
    NewPicture, Picture, PictureDto, TRMNL_HEIGHT, TRMNL_WIDTH, parse_featured_picture,
};
pub use metrics::Metrics;
pub use paths::{PathError, data_root, database_path};
pub use ports::{
    CacheInvalidator, CoreError, FetchError, ImageProcessingError, ImageProcessorPort,
    NoopSummarizer, PictureRepository, RepositoryError, SummarizerError, SummarizerPort,
    WikipediaPort,
};
pub use services::{
    FaultTolerance, GuardedScraper, PictureService, ScrapeError, ScrapeOutcome, ScrapeScheduler,
    ScraperDeps, ScraperService,
};
pub use settings::{
    DEFAULT_SCRAPE_CRON, FaultToleranceSettings, ScraperSettings, SettingsError,
};

// Silence unused dev-dependency warnings
#[cfg(test)]
use serde_json as _;
#[cfg(test)]
use tokio_test as _;
