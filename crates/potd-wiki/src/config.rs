//! Public configuration for the Wikipedia client.

use std::time::Duration;

/// English Wikipedia main page.
pub const DEFAULT_MAIN_PAGE_URL: &str = "https://en.wikipedia.org/wiki/Main_Page";

/// User agent sent when none is configured.
pub const DEFAULT_USER_AGENT: &str = concat!(
    "potd/",
    env!("CARGO_PKG_VERSION"),
    " (https://github.com/sf13/potd)"
);

/// Configuration for the Wikipedia client.
///
/// # Example
///
/// ```
/// use potd_wiki::WikiClientConfig;
/// use std::time::Duration;
///
/// let config = WikiClientConfig::new()
///     .with_timeout(Duration::from_secs(60))
///     .with_user_agent("my-app/1.0 (me@example.org)");
/// ```
#[derive(Debug, Clone)]
pub struct WikiClientConfig {
    /// Page holding the featured picture box
    pub(crate) main_page_url: String,
    /// User agent string for HTTP requests
    pub(crate) user_agent: String,
    /// Request timeout
    pub(crate) timeout: Duration,
    /// Maximum number of retry attempts for transient errors
    pub(crate) max_retries: u8,
    /// Base delay for exponential backoff
    pub(crate) retry_base_delay: Duration,
}

impl Default for WikiClientConfig {
    fn default() -> Self {
        Self {
            main_page_url: DEFAULT_MAIN_PAGE_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: Duration::from_secs(30),
            max_retries: 3,
            retry_base_delay: Duration::from_millis(500),
        }
    }
}

impl WikiClientConfig {
    /// Create a new configuration with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn main_page_url(&self) -> &str {
        &self.main_page_url
    }

    /// Set the main page URL.
    #[must_use]
    pub fn with_main_page_url(mut self, url: impl Into<String>) -> Self {
        self.main_page_url = url.into();
        self
    }

    /// Set the user agent string for HTTP requests.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set the request timeout.
    ///
    /// Defaults to 30 seconds.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the maximum number of retry attempts for transient errors.
    ///
    /// Defaults to 3 retries.
    #[must_use]
    pub const fn with_max_retries(mut self, retries: u8) -> Self {
        self.max_retries = retries;
        self
    }

    /// Set the base delay for exponential backoff retries.
    ///
    /// Defaults to 500ms.
    #[must_use]
    pub const fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_base_delay = delay;
        self
    }
}
