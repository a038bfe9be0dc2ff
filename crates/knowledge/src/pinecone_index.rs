//! Pinecone vector index client.
//!
//! Queries a serverless index over its data-plane REST API
//! (`POST {host}/query`). Each corpus has its own index host.

use crate::types::Metadata;
use crate::vector_index::{VectorIndex, VectorMatch};
use async_trait::async_trait;
use jobs_core::{AppError, AppResult};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Client for one Pinecone index.
#[derive(Debug, Clone)]
pub struct PineconeIndex {
    name: String,
    client: Client,
    host: String,
    api_key: String,
    namespace: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryRequest<'a> {
    vector: &'a [f32],
    top_k: usize,
    include_metadata: bool,
    include_values: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    namespace: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    matches: Vec<QueryMatch>,
}

#[derive(Debug, Deserialize)]
struct QueryMatch {
    id: String,
    #[serde(default)]
    score: f32,
    #[serde(default)]
    metadata: Option<Metadata>,
}

impl PineconeIndex {
    /// Create a client for the index served at `host`.
    ///
    /// `host` may omit the scheme, as shown in the Pinecone console.
    pub fn new(
        name: impl Into<String>,
        host: &str,
        api_key: impl Into<String>,
        namespace: Option<String>,
    ) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| {
                AppError::Config(format!("Failed to create HTTP client for Pinecone: {}", e))
            })?;

        Ok(Self {
            name: name.into(),
            client,
            host: normalize_host(host),
            api_key: api_key.into(),
            namespace: namespace.filter(|ns| !ns.is_empty()),
        })
    }
}

fn normalize_host(host: &str) -> String {
    let host = host.trim().trim_end_matches('/');
    if host.starts_with("http://") || host.starts_with("https://") {
        host.to_string()
    } else {
        format!("https://{}", host)
    }
}

#[async_trait]
impl VectorIndex for PineconeIndex {
    fn name(&self) -> &str {
        &self.name
    }

    async fn query(&self, vector: &[f32], top_k: usize) -> AppResult<Vec<VectorMatch>> {
        let url = format!("{}/query", self.host);
        let request = QueryRequest {
            vector,
            top_k,
            include_metadata: true,
            include_values: false,
            namespace: self.namespace.as_deref(),
        };

        tracing::debug!(index = %self.name, top_k, "Querying Pinecone index");

        let response = self
            .client
            .post(&url)
            .header("Api-Key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                AppError::Retrieval(format!("Failed to query index '{}': {}", self.name, e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Retrieval(format!(
                "Index '{}' returned {}: {}",
                self.name, status, body
            )));
        }

        let body: QueryResponse = response.json().await.map_err(|e| {
            AppError::Retrieval(format!(
                "Failed to parse response from index '{}': {}",
                self.name, e
            ))
        })?;

        Ok(body
            .matches
            .into_iter()
            .map(|m| VectorMatch {
                id: m.id,
                score: m.score,
                metadata: m.metadata.unwrap_or_default(),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_host() {
        assert_eq!(
            normalize_host("policy-chatbot-abc123.svc.pinecone.io"),
            "https://policy-chatbot-abc123.svc.pinecone.io"
        );
        assert_eq!(normalize_host("http://localhost:5080/"), "http://localhost:5080");
    }

    #[test]
    fn test_query_request_serialization() {
        let vector = [0.1f32, 0.2];
        let request = QueryRequest {
            vector: &vector,
            top_k: 3,
            include_metadata: true,
            include_values: false,
            namespace: None,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["topK"], 3);
        assert_eq!(json["includeMetadata"], true);
        assert_eq!(json["includeValues"], false);
        assert!(json.get("namespace").is_none());
    }

    #[test]
    fn test_query_response_parsing() {
        let body = r#"{
            "matches": [
                {"id": "job-1", "score": 0.82, "metadata": {"title": "데이터 분석가", "context_text": "본문"}},
                {"id": "job-2", "score": 0.71}
            ],
            "namespace": ""
        }"#;
        let parsed: QueryResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.matches.len(), 2);
        assert_eq!(parsed.matches[0].id, "job-1");
        assert!(parsed.matches[1].metadata.is_none());
    }

    #[test]
    fn test_empty_namespace_dropped() {
        let index = PineconeIndex::new("jobs", "host", "key", Some(String::new())).unwrap();
        assert_eq!(index.namespace, None);
        assert_eq!(index.name(), "jobs");
    }
}
