//! HTTP backend abstraction for Wikipedia requests.
//!
//! The production implementation uses reqwest with automatic retry for
//! transient errors; tests swap in a fake backend.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use url::Url;

use crate::config::WikiClientConfig;
use crate::error::{WikiError, WikiResult};

/// Trait for HTTP backends that fetch raw bodies.
///
/// This is an implementation detail - external code should use the
/// `WikipediaPort` trait.
#[async_trait]
pub trait HttpBackend: Send + Sync {
    /// GET `url` and return the response body.
    async fn get_bytes(&self, url: &Url) -> WikiResult<Vec<u8>>;
}

/// Production HTTP backend using reqwest with retry logic.
///
/// Implements exponential backoff for server errors (5xx), throttling (429)
/// and network errors.
pub struct ReqwestBackend {
    client: reqwest::Client,
    max_retries: u8,
    retry_base_delay: Duration,
}

impl ReqwestBackend {
    /// Create a new reqwest backend with the given configuration.
    pub fn new(config: &WikiClientConfig) -> WikiResult<Self> {
        let mut headers = HeaderMap::new();
        let agent = HeaderValue::from_str(&config.user_agent)
            .map_err(|e| WikiError::Configuration(format!("invalid user agent: {e}")))?;
        headers.insert(USER_AGENT, agent);

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            max_retries: config.max_retries,
            retry_base_delay: config.retry_base_delay,
        })
    }

    /// Fetch a URL with automatic retry for transient errors.
    async fn fetch_with_retry(&self, url: &Url) -> WikiResult<reqwest::Response> {
        let mut attempt: u8 = 0;
        loop {
            if attempt > 0 {
                let delay = self.retry_base_delay * 2u32.pow(u32::from(attempt) - 1);
                tracing::debug!(%url, attempt, delay_ms = delay.as_millis() as u64, "Retrying request");
                tokio::time::sleep(delay).await;
            }
            let retries_left = attempt < self.max_retries;
            attempt = attempt.saturating_add(1);

            match self.client.get(url.as_str()).send().await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        return Ok(response);
                    }

                    let transient = status.is_server_error() || status.as_u16() == 429;
                    if transient && retries_left {
                        tracing::warn!(%url, status = status.as_u16(), "Transient HTTP error");
                        continue;
                    }

                    // 4xx errors or final attempt - fail immediately
                    return Err(WikiError::RequestFailed {
                        status: status.as_u16(),
                        url: url.to_string(),
                    });
                }
                Err(e) => {
                    if retries_left && !e.is_builder() {
                        tracing::warn!(%url, error = %e, "Network error");
                        continue;
                    }
                    return Err(e.into());
                }
            }
        }
    }
}

#[async_trait]
impl HttpBackend for ReqwestBackend {
    async fn get_bytes(&self, url: &Url) -> WikiResult<Vec<u8>> {
        let response = self.fetch_with_retry(url).await?;
        let body = response.bytes().await?;
        Ok(body.to_vec())
    }
}

// ============================================================================
// Fake Backend for Testing
// ============================================================================


#[cfg(test)]
mod tests {
    use super::*;
    use potd_core::FetchError;

    #[test]
    fn test_reqwest_backend_builds_with_defaults() {
        assert!(ReqwestBackend::new(&WikiClientConfig::new()).is_ok());
    }

    #[test]
    fn test_reqwest_backend_rejects_bad_user_agent() {
        let config = WikiClientConfig::new().with_user_agent("bad\nagent");
        let err = ReqwestBackend::new(&config).err().unwrap();
        assert!(matches!(err, WikiError::Configuration(_)));

        let err = FetchError::from(err);
        assert!(matches!(err, FetchError::Configuration { .. }));
        assert!(!err.is_transient());
    }
}
