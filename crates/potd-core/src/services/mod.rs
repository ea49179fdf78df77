//! Core services - the application's business logic layer.
//!
//! Services orchestrate between ports and domain logic. They don't know
//! about concrete implementations.

mod fault_tolerance;
mod pictures;
mod scheduler;
mod scraper;

#[cfg(test)]
pub(crate) mod testing;

pub use fault_tolerance::{CircuitBreaker, FaultTolerance, GuardedScraper, RateLimiter, RetryPolicy};
pub use pictures::PictureService;
pub use scheduler::ScrapeScheduler;
pub use scraper::{ScrapeError, ScrapeOutcome, ScraperDeps, ScraperService};
