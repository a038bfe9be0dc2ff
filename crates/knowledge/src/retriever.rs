//! Retrievers: query text in, ranked documents out.

use crate::embeddings::EmbeddingProvider;
use crate::types::RetrievedDocument;
use crate::vector_index::{VectorIndex, VectorMatch};
use jobs_core::{AppError, AppResult};
use serde_json::Value;
use std::sync::Arc;

/// A source of ranked documents for a query.
#[async_trait::async_trait]
pub trait Retriever: Send + Sync {
    /// Retriever name, used in logs and error messages.
    fn name(&self) -> &str;

    /// Return documents for `query`, best first.
    ///
    /// Deterministic for identical corpus state.
    async fn retrieve(&self, query: &str) -> AppResult<Vec<RetrievedDocument>>;
}

/// Retriever over one corpus: embed the query, then ask the vector index.
pub struct VectorStoreRetriever {
    name: String,
    embedder: Arc<dyn EmbeddingProvider>,
    index: Arc<dyn VectorIndex>,
    text_key: String,
    k: usize,
    expected_keys: Vec<String>,
}

impl VectorStoreRetriever {
    pub fn new(
        name: impl Into<String>,
        embedder: Arc<dyn EmbeddingProvider>,
        index: Arc<dyn VectorIndex>,
        text_key: impl Into<String>,
        k: usize,
    ) -> Self {
        Self {
            name: name.into(),
            embedder,
            index,
            text_key: text_key.into(),
            k,
            expected_keys: Vec::new(),
        }
    }

    /// Metadata keys documents of this corpus are expected to carry.
    pub fn with_expected_keys(mut self, keys: Vec<String>) -> Self {
        self.expected_keys = keys;
        self
    }

    /// Turn an index match into a document.
    ///
    /// The primary text field moves out of the metadata into `content`.
    /// Matches without it are skipped.
    fn to_document(&self, vector_match: VectorMatch) -> Option<RetrievedDocument> {
        let VectorMatch {
            id, mut metadata, ..
        } = vector_match;

        let content = match metadata.remove(&self.text_key) {
            Some(Value::String(s)) => s,
            Some(Value::Null) | None => {
                tracing::warn!(
                    corpus = %self.name,
                    id = %id,
                    "Match has no '{}' field, skipping",
                    self.text_key
                );
                return None;
            }
            Some(other) => other.to_string(),
        };

        let missing: Vec<&str> = self
            .expected_keys
            .iter()
            .filter(|key| !metadata.contains_key(key.as_str()))
            .map(String::as_str)
            .collect();
        if !missing.is_empty() {
            tracing::debug!(
                corpus = %self.name,
                id = %id,
                "Document is missing expected metadata keys: {:?}",
                missing
            );
        }

        Some(RetrievedDocument { content, metadata })
    }
}

#[async_trait::async_trait]
impl Retriever for VectorStoreRetriever {
    fn name(&self) -> &str {
        &self.name
    }

    async fn retrieve(&self, query: &str) -> AppResult<Vec<RetrievedDocument>> {
        let vector = self.embedder.embed(query).await.map_err(|e| match e {
            AppError::Retrieval(msg) => {
                AppError::Retrieval(format!("corpus '{}': {}", self.name, msg))
            }
            other => AppError::Retrieval(format!("corpus '{}': {}", self.name, other)),
        })?;

        let matches = self.index.query(&vector, self.k).await?;

        tracing::debug!(
            corpus = %self.name,
            index = %self.index.name(),
            "Retrieved {} matches",
            matches.len()
        );

        Ok(matches
            .into_iter()
            .take(self.k)
            .filter_map(|m| self.to_document(m))
            .collect())
    }
}
