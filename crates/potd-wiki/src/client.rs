//! Wikipedia client implementing `WikipediaPort`.

use async_trait::async_trait;
use potd_core::{FetchError, Metrics, WikipediaPort};
use url::Url;

use crate::config::WikiClientConfig;
use crate::error::{WikiError, WikiResult};
use crate::http::{HttpBackend, ReqwestBackend};

/// Default client using the reqwest HTTP backend.
pub type DefaultWikipediaClient = WikipediaClient<ReqwestBackend>;

/// Client for the Wikipedia main page and upload server.
///
/// Generic over the HTTP backend so tests can inject canned responses.
pub struct WikipediaClient<B: HttpBackend> {
    backend: B,
    main_page_url: Url,
    metrics: Option<Metrics>,
}

impl DefaultWikipediaClient {
    /// Create a client from `config`, recording download sizes into `metrics`.
    pub fn new(config: &WikiClientConfig, metrics: Option<Metrics>) -> WikiResult<Self> {
        let backend = ReqwestBackend::new(config)?;
        Self::with_backend(config, backend, metrics)
    }
}

impl<B: HttpBackend> WikipediaClient<B> {
    /// Create a client with a custom backend.
    pub fn with_backend(
        config: &WikiClientConfig,
        backend: B,
        metrics: Option<Metrics>,
    ) -> WikiResult<Self> {
        Ok(Self {
            backend,
            main_page_url: Url::parse(&config.main_page_url)?,
            metrics,
        })
    }

    pub const fn main_page_url(&self) -> &Url {
        &self.main_page_url
    }
}

#[async_trait]
impl<B: HttpBackend> WikipediaPort for WikipediaClient<B> {
    async fn fetch_main_page(&self) -> Result<String, FetchError> {
        tracing::info!(url = %self.main_page_url, "Fetching Wikipedia main page");
        let body = self.backend.get_bytes(&self.main_page_url).await?;
        String::from_utf8(body).map_err(|e| {
            WikiError::InvalidResponse {
                message: format!("main page is not UTF-8: {e}"),
            }
            .into()
        })
    }

    async fn download_image(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let url = Url::parse(url).map_err(WikiError::from)?;
        tracing::info!(%url, "Downloading image");
        let bytes = self.backend.get_bytes(&url).await?;

        if let Some(metrics) = &self.metrics {
            metrics.image_download_size.observe(bytes.len() as f64);
        }
        tracing::info!(%url, size = bytes.len(), "Downloaded image");
        Ok(bytes)
    }
}
