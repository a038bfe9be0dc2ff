//! Weighted reciprocal rank fusion over several retrievers.

use crate::retriever::Retriever;
use crate::types::{RankedResults, RetrievedDocument};
use futures::future::try_join_all;
use jobs_core::{AppError, AppResult};
use std::collections::HashMap;
use std::sync::Arc;

/// Default rank offset `C` in `w / (rank + 1 + C)`.
pub const DEFAULT_RRF_CONSTANT: f64 = 60.0;

/// A retriever with its fusion weight.
#[derive(Clone)]
pub struct WeightedSource {
    pub retriever: Arc<dyn Retriever>,
    pub weight: f64,
}

impl WeightedSource {
    pub fn new(retriever: Arc<dyn Retriever>, weight: f64) -> Self {
        Self { retriever, weight }
    }
}

/// Queries every source concurrently and fuses the rankings.
pub struct WeightedEnsembleRetriever {
    sources: Vec<WeightedSource>,
    rrf_constant: f64,
    id_key: Option<String>,
}

impl WeightedEnsembleRetriever {
    pub fn new(sources: Vec<WeightedSource>) -> Self {
        Self {
            sources,
            rrf_constant: DEFAULT_RRF_CONSTANT,
            id_key: None,
        }
    }

    pub fn with_rrf_constant(mut self, rrf_constant: f64) -> Self {
        self.rrf_constant = rrf_constant;
        self
    }

    /// Identify documents by this metadata key instead of by content.
    pub fn with_id_key(mut self, id_key: Option<String>) -> Self {
        self.id_key = id_key;
        self
    }

    /// Run every source on `query` concurrently.
    ///
    /// Results come back in source order regardless of completion order.
    /// The first failure fails the whole call.
    pub async fn retrieve_all(&self, query: &str) -> AppResult<Vec<RankedResults>> {
        let calls = self.sources.iter().map(|source| async move {
            let name = source.retriever.name();
            let documents = source.retriever.retrieve(query).await.map_err(|e| {
                tracing::warn!(retriever = %name, error = %e, "Retriever failed");
                match e {
                    AppError::Retrieval(msg) => AppError::Retrieval(msg),
                    other => AppError::Retrieval(format!("{}: {}", name, other)),
                }
            })?;

            tracing::debug!(retriever = %name, "Retrieved {} documents", documents.len());

            Ok::<_, AppError>(RankedResults {
                source: name.to_string(),
                weight: source.weight,
                documents,
            })
        });

        try_join_all(calls).await
    }
}

#[async_trait::async_trait]
impl Retriever for WeightedEnsembleRetriever {
    fn name(&self) -> &str {
        "ensemble"
    }

    async fn retrieve(&self, query: &str) -> AppResult<Vec<RetrievedDocument>> {
        let ranked = self.retrieve_all(query).await?;
        Ok(fuse(&ranked, self.rrf_constant, self.id_key.as_deref()))
    }
}

/// Fuse ranked result sets with weighted reciprocal rank fusion.
///
/// A document at 0-based rank `r` in a set of weight `w` scores
/// `w / (r + 1 + c)`. Documents with the same identity sum their scores and
/// keep the first-seen copy. Output is sorted by score, descending; ties
/// keep first-seen order (set order, then rank).
pub fn fuse(sets: &[RankedResults], c: f64, id_key: Option<&str>) -> Vec<RetrievedDocument> {
    let mut fused: Vec<(RetrievedDocument, f64)> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();

    for set in sets {
        for (rank, doc) in set.documents.iter().enumerate() {
            let score = set.weight / (rank as f64 + 1.0 + c);
            let key = identity(doc, id_key);

            match positions.get(&key) {
                Some(&pos) => fused[pos].1 += score,
                None => {
                    positions.insert(key, fused.len());
                    fused.push((doc.clone(), score));
                }
            }
        }
    }

    fused.sort_by(|a, b| b.1.total_cmp(&a.1));
    fused.into_iter().map(|(doc, _)| doc).collect()
}

fn identity(doc: &RetrievedDocument, id_key: Option<&str>) -> String {
    id_key
        .and_then(|key| doc.meta_text(key))
        .map(|id| format!("id:{}", id))
        .unwrap_or_else(|| format!("content:{}", doc.content))
}
