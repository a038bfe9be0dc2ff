//! LLM provider factory.
//!
//! This module provides a factory for creating LLM clients based on
//! application configuration. It handles provider resolution and secret
//! injection. Clients are built once at startup and shared.

use crate::client::LlmClient;
use crate::providers::{GeminiClient, OllamaClient};
use crate::types::ProviderType;
use jobs_core::config::{AppConfig, ProviderConfig};
use jobs_core::{AppError, AppResult};
use std::sync::Arc;

/// Create an LLM client based on the provider name.
///
/// # Arguments
/// * `provider` - Provider identifier ("gemini", "ollama")
/// * `endpoint` - Optional custom endpoint URL
/// * `api_key` - Optional API key (for providers that require it)
///
/// # Errors
/// Returns error if the provider is unknown or a required secret is missing.
pub fn create_client(
    provider: &str,
    endpoint: Option<&str>,
    api_key: Option<&str>,
) -> Result<Arc<dyn LlmClient>, String> {
    match ProviderType::parse(provider) {
        Some(ProviderType::Ollama) => {
            let base_url = endpoint.unwrap_or("http://localhost:11434");
            Ok(Arc::new(OllamaClient::with_base_url(base_url)))
        }
        Some(ProviderType::Gemini) => {
            let api_key = api_key.ok_or_else(|| "Gemini provider requires API key".to_string())?;
            let client = match endpoint {
                Some(endpoint) => GeminiClient::with_base_url(endpoint, api_key),
                None => GeminiClient::new(api_key),
            }
            .map_err(|e| e.to_string())?;
            Ok(Arc::new(client))
        }
        None => Err(format!("Unknown provider: {}", provider)),
    }
}

/// Create the LLM client for the active provider of an application config.
pub fn client_from_config(config: &AppConfig) -> AppResult<Arc<dyn LlmClient>> {
    let provider_config = config.get_provider_config(&config.provider);

    if let Some(ProviderConfig::Ollama {
        endpoint,
        timeout: Some(timeout),
        ..
    }) = provider_config
    {
        let client = OllamaClient::with_timeout(endpoint.as_str(), *timeout)?;
        return Ok(Arc::new(client));
    }

    let endpoint = provider_config.and_then(|pc| pc.endpoint());
    let api_key = config.resolve_api_key(&config.provider);

    create_client(&config.provider, endpoint, api_key.as_deref()).map_err(AppError::Config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_ollama_client() {
        let client = create_client("ollama", None, None);
        assert!(client.is_ok());
    }

    #[test]
    fn test_create_ollama_with_custom_endpoint() {
        let client = create_client("ollama", Some("http://localhost:8080"), None).unwrap();
        assert_eq!(client.provider_name(), "ollama");
    }

    #[test]
    fn test_gemini_requires_api_key() {
        match create_client("gemini", None, None) {
            Err(err) => assert!(err.contains("Gemini provider requires API key")),
            Ok(_) => panic!("Expected error for Gemini without API key"),
        }
    }

    #[test]
    fn test_create_gemini_client() {
        let client = create_client("gemini", None, Some("test-key")).unwrap();
        assert_eq!(client.provider_name(), "gemini");
    }

    #[test]
    fn test_unknown_provider() {
        match create_client("unknown", None, None) {
            Err(err) => assert!(err.contains("Unknown provider")),
            Ok(_) => panic!("Expected error for unknown provider"),
        }
    }

    #[test]
    fn test_client_from_config_ollama() {
        let config =
            AppConfig::default().with_overrides(Some("ollama".to_string()), None, None, false, false);
        let client = client_from_config(&config).unwrap();
        assert_eq!(client.provider_name(), "ollama");
    }
}
