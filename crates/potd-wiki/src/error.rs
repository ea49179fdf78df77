//! Internal error types for Wikipedia operations.
//!
//! These errors are internal to `potd-wiki` and are mapped to
//! [`FetchError`] at the port boundary.

use potd_core::FetchError;
use thiserror::Error;

/// Result type alias for Wikipedia operations.
pub type WikiResult<T> = Result<T, WikiError>;

/// Errors related to Wikipedia HTTP operations.
#[derive(Debug, Error)]
pub enum WikiError {
    /// Request failed with an HTTP error status.
    #[error("Wikipedia request failed with status {status}: {url}")]
    RequestFailed {
        /// HTTP status code
        status: u16,
        /// The URL that was requested
        url: String,
    },

    /// The response body was unusable.
    #[error("Invalid response from Wikipedia: {message}")]
    InvalidResponse {
        /// Description of what was invalid
        message: String,
    },

    /// Network or HTTP client error.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The client was given settings it cannot use.
    #[error("Invalid Wikipedia client configuration: {0}")]
    Configuration(String),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl From<WikiError> for FetchError {
    fn from(err: WikiError) -> Self {
        match err {
            WikiError::RequestFailed { status, url } => Self::Status { status, url },
            WikiError::InvalidResponse { message } => Self::InvalidResponse { message },
            WikiError::Configuration(message) => Self::Configuration { message },
            WikiError::Network(e) if e.is_builder() => Self::Configuration {
                message: e.to_string(),
            },
            WikiError::Network(e) => Self::Network {
                message: e.to_string(),
            },
            WikiError::InvalidUrl(e) => Self::Configuration {
                message: e.to_string(),
            },
        }
    }
}
