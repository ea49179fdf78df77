//! Summarizer port definition.
//!
//! A generative model turns the long featured-picture description into a
//! one-sentence summary.

use async_trait::async_trait;
use thiserror::Error;

/// Errors from summarization.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SummarizerError {
    /// No credentials were configured for the model provider.
    #[error("Summarizer is not configured")]
    NotConfigured,

    /// The provider rejected or failed the request.
    #[error("Summarizer API error: {0}")]
    Api(String),

    /// The provider answered without any text.
    #[error("Summarizer returned an empty response")]
    EmptyResponse,
}

/// Port for producing short summaries.
#[async_trait]
pub trait SummarizerPort: Send + Sync {
    /// Shorten `text` into a sentence of roughly twelve words.
    async fn summarize(&self, text: &str) -> Result<String, SummarizerError>;
}

/// Summarizer used when no provider is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSummarizer;

#[async_trait]
impl SummarizerPort for NoopSummarizer {
    async fn summarize(&self, _text: &str) -> Result<String, SummarizerError> {
        Err(SummarizerError::NotConfigured)
    }
}
