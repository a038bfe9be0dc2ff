//! Vector index abstraction for corpus queries.
//!
//! Defines a trait for provider-agnostic nearest-neighbour lookup. Indexes
//! are read-only here: records are written by an external pipeline.

use crate::types::Metadata;
use jobs_core::AppResult;
use serde::{Deserialize, Serialize};

/// One match returned by a vector query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorMatch {
    /// Record identifier inside the index
    pub id: String,

    /// Similarity score, higher is closer
    pub score: f32,

    /// Stored metadata, including the primary text field
    #[serde(default)]
    pub metadata: Metadata,
}

/// Trait for vector index backends.
#[async_trait::async_trait]
pub trait VectorIndex: Send + Sync {
    /// Index name, used in logs.
    fn name(&self) -> &str;

    /// Return at most `top_k` matches for `vector`, best first.
    async fn query(&self, vector: &[f32], top_k: usize) -> AppResult<Vec<VectorMatch>>;
}
