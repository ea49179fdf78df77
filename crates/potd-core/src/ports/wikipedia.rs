//! Wikipedia port definition.
//!
//! Fetching the main page and downloading the featured image are the only
//! outbound calls the scraper makes to Wikipedia.

use async_trait::async_trait;
use thiserror::Error;

/// Errors from Wikipedia HTTP operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    /// The server answered with a non-success status.
    #[error("Request to {url} failed with status {status}")]
    Status { status: u16, url: String },

    /// Connection, TLS or timeout failure.
    #[error("Network error: {message}")]
    Network { message: String },

    /// The response body could not be read or was unusable.
    #[error("Invalid response: {message}")]
    InvalidResponse { message: String },

    /// Misconfigured client (e.g. invalid base URL).
    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

impl FetchError {
    /// Whether retrying the same request may succeed.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        match self {
            Self::Status { status, .. } => *status >= 500 || *status == 429,
            Self::Network { .. } => true,
            Self::InvalidResponse { .. } | Self::Configuration { .. } => false,
        }
    }
}

/// Port for talking to Wikipedia.
#[async_trait]
pub trait WikipediaPort: Send + Sync {
    /// Fetch the HTML of the configured main page.
    async fn fetch_main_page(&self) -> Result<String, FetchError>;

    /// Download the raw bytes behind `url`.
    async fn download_image(&self, url: &str) -> Result<Vec<u8>, FetchError>;
}
