//! Embedding provider trait and factory.

use jobs_core::config::EmbeddingConfig;
use jobs_core::{AppError, AppResult};
use std::sync::Arc;

use super::providers::{MockProvider, OllamaProvider, OpenAiProvider};

/// Trait for embedding providers.
#[async_trait::async_trait]
pub trait EmbeddingProvider: Send + Sync + std::fmt::Debug {
    /// Get provider name (e.g., "mock", "openai", "ollama")
    fn provider_name(&self) -> &str;

    /// Get model identifier
    fn model_name(&self) -> &str;

    /// Get embedding dimensions
    fn dimensions(&self) -> usize;

    /// Generate embeddings for multiple texts in a batch.
    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>>;

    /// Generate embedding for a single text (convenience method).
    async fn embed(&self, text: &str) -> AppResult<Vec<f32>> {
        let mut results = self.embed_batch(&[text.to_string()]).await?;
        results
            .pop()
            .ok_or_else(|| AppError::Retrieval("No embedding returned".to_string()))
    }
}

/// Create an embedding provider based on configuration.
///
/// The provider is built once at startup and shared by every corpus
/// retriever.
pub fn create_provider(
    config: &EmbeddingConfig,
    api_key: Option<&str>,
) -> AppResult<Arc<dyn EmbeddingProvider>> {
    match config.provider.as_str() {
        "mock" => Ok(Arc::new(MockProvider::new(config.dimensions))),

        "openai" => {
            let api_key = api_key.ok_or_else(|| {
                AppError::Config(format!(
                    "OpenAI embeddings require an API key (set {})",
                    config.api_key_env.as_deref().unwrap_or("OPENAI_API_KEY")
                ))
            })?;
            let provider = OpenAiProvider::new(
                config.endpoint.as_deref(),
                api_key,
                &config.model,
                config.dimensions,
            )?;
            Ok(Arc::new(provider))
        }

        "ollama" => {
            let provider =
                OllamaProvider::new(config.endpoint.as_deref(), &config.model, config.dimensions)?;
            Ok(Arc::new(provider))
        }

        _ => Err(AppError::Config(format!(
            "Unknown embedding provider: '{}'. Supported providers: openai, ollama, mock",
            config.provider
        ))),
    }
}

/// Check that a provider returned vectors of the configured size.
pub(crate) fn check_dimensions(
    provider: &str,
    expected: usize,
    embeddings: &[Vec<f32>],
) -> AppResult<()> {
    if let Some(bad) = embeddings.iter().find(|e| e.len() != expected) {
        return Err(AppError::Retrieval(format!(
            "{} returned {} dimensional embedding, expected {}",
            provider,
            bad.len(),
            expected
        )));
    }
    Ok(())
}
