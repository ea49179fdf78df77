//! Command handlers.

pub mod paths;
pub mod scrape;
pub mod serve;
pub mod show;
