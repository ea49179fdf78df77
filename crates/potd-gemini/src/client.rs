//! Gemini summarizer implementing `SummarizerPort`.

use async_trait::async_trait;
use potd_core::{SummarizerError, SummarizerPort};

use crate::config::GeminiConfig;
use crate::models::{Content, GenerateContentRequest, GenerateContentResponse};
use crate::prompt::{SYSTEM_MESSAGE, user_message};

/// Summarizer calling the Gemini `generateContent` endpoint.
pub struct GeminiSummarizer {
    config: GeminiConfig,
    client: reqwest::Client,
}

impl GeminiSummarizer {
    pub fn new(config: GeminiConfig) -> Result<Self, SummarizerError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| SummarizerError::Api(e.to_string()))?;
        Ok(Self { config, client })
    }

    pub fn is_configured(&self) -> bool {
        self.config.is_configured()
    }

    fn build_request(text: &str) -> GenerateContentRequest {
        GenerateContentRequest {
            system_instruction: Content::text(None, SYSTEM_MESSAGE),
            contents: vec![Content::text(Some("user"), user_message(text))],
        }
    }
}

#[async_trait]
impl SummarizerPort for GeminiSummarizer {
    async fn summarize(&self, text: &str) -> Result<String, SummarizerError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or(SummarizerError::NotConfigured)?;

        let resp = self
            .client
            .post(self.config.endpoint())
            .header("x-goog-api-key", api_key)
            .json(&Self::build_request(text))
            .send()
            .await
            .map_err(|e| SummarizerError::Api(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(SummarizerError::Api(format!("Gemini API error ({status}): {body}")));
        }

        let api_resp: GenerateContentResponse = resp
            .json()
            .await
            .map_err(|e| SummarizerError::Api(e.to_string()))?;

        if let Some(usage) = &api_resp.usage_metadata {
            tracing::debug!(
                model = %self.config.model,
                input_tokens = usage.prompt_token_count,
                output_tokens = usage.candidates_token_count,
                "Gemini token usage"
            );
        }

        let summary = api_resp.first_text();
        if summary.is_empty() {
            return Err(SummarizerError::EmptyResponse);
        }
        Ok(summary)
    }
}
