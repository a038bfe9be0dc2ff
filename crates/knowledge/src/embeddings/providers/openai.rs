//! OpenAI-compatible embedding provider (`POST {base}/embeddings`).

use crate::embeddings::provider::{check_dimensions, EmbeddingProvider};
use async_trait::async_trait;
use jobs_core::{AppError, AppResult};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

const DEFAULT_OPENAI_URL: &str = "https://api.openai.com/v1";
const REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct OpenAiProvider {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
    dimensions: usize,
}

#[derive(Debug, Deserialize)]
struct EmbeddingApiResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
    #[serde(default)]
    index: usize,
}

impl OpenAiProvider {
    pub fn new(
        base_url: Option<&str>,
        api_key: &str,
        model: &str,
        dimensions: usize,
    ) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| {
                AppError::Config(format!("Failed to create HTTP client for OpenAI: {}", e))
            })?;

        Ok(Self {
            client,
            base_url: base_url
                .unwrap_or(DEFAULT_OPENAI_URL)
                .trim_end_matches('/')
                .to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
            dimensions,
        })
    }

    fn request_body(&self, texts: &[String]) -> serde_json::Value {
        serde_json::json!({
            "model": self.model,
            "input": texts,
            "encoding_format": "float",
        })
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAiProvider {
    fn provider_name(&self) -> &str {
        "openai"
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let url = format!("{}/embeddings", self.base_url);

        debug!(
            model = %self.model,
            count = texts.len(),
            "Sending embedding request"
        );

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&self.request_body(texts))
            .send()
            .await
            .map_err(|e| AppError::Retrieval(format!("Failed to send embedding request: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(AppError::Retrieval(format!(
                "Embedding API error ({}): {}",
                status, error_body
            )));
        }

        let mut api_resp: EmbeddingApiResponse = response.json().await.map_err(|e| {
            AppError::Retrieval(format!("Failed to parse embedding response: {}", e))
        })?;

        api_resp.data.sort_by_key(|d| d.index);
        let embeddings: Vec<Vec<f32>> = api_resp.data.into_iter().map(|d| d.embedding).collect();

        if embeddings.len() != texts.len() {
            return Err(AppError::Retrieval(format!(
                "Embedding API returned {} vectors for {} inputs",
                embeddings.len(),
                texts.len()
            )));
        }

        check_dimensions("OpenAI", self.dimensions, &embeddings)?;
        Ok(embeddings)
    }
}
