//! In-memory vector index loaded from a JSONL export.
//!
//! Each line holds one pre-embedded record:
//!
//! ```json
//! {"id": "policy-1", "values": [0.1, 0.2], "metadata": {"policy_name": "...", "embedding_text": "..."}}
//! ```
//!
//! Used for local runs without a hosted index and as a test backend.

use crate::types::Metadata;
use crate::vector_index::{VectorIndex, VectorMatch};
use jobs_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::io::{BufRead, BufReader};
use std::path::Path;

/// A stored record with its embedding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryRecord {
    pub id: String,
    pub values: Vec<f32>,
    #[serde(default)]
    pub metadata: Metadata,
}

/// Brute-force cosine similarity index.
#[derive(Debug, Clone)]
pub struct InMemoryIndex {
    name: String,
    records: Vec<MemoryRecord>,
}

impl InMemoryIndex {
    pub fn new(name: impl Into<String>, records: Vec<MemoryRecord>) -> Self {
        Self {
            name: name.into(),
            records,
        }
    }

    /// Load records from a JSONL file. Blank lines are skipped.
    pub fn from_jsonl(name: impl Into<String>, path: &Path) -> AppResult<Self> {
        let name = name.into();
        let file = std::fs::File::open(path).map_err(|e| {
            AppError::Config(format!(
                "Failed to open data file for corpus '{}' at {:?}: {}",
                name, path, e
            ))
        })?;

        let mut records = Vec::new();
        for (line_no, line) in BufReader::new(file).lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let record: MemoryRecord = serde_json::from_str(&line).map_err(|e| {
                AppError::Serialization(format!("{:?} line {}: {}", path, line_no + 1, e))
            })?;
            records.push(record);
        }

        tracing::info!("Loaded {} records into index '{}'", records.len(), name);

        Ok(Self::new(name, records))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}

#[async_trait::async_trait]
impl VectorIndex for InMemoryIndex {
    fn name(&self) -> &str {
        &self.name
    }

    async fn query(&self, vector: &[f32], top_k: usize) -> AppResult<Vec<VectorMatch>> {
        if let Some(record) = self.records.iter().find(|r| r.values.len() != vector.len()) {
            return Err(AppError::Retrieval(format!(
                "Index '{}': record '{}' has {} dimensions, query has {}",
                self.name,
                record.id,
                record.values.len(),
                vector.len()
            )));
        }

        let mut scored: Vec<(f32, &MemoryRecord)> = self
            .records
            .iter()
            .map(|r| (cosine_similarity(vector, &r.values), r))
            .collect();

        // Stable sort keeps file order among equal scores
        scored.sort_by(|a, b| b.0.total_cmp(&a.0));

        Ok(scored
            .into_iter()
            .take(top_k)
            .map(|(score, r)| VectorMatch {
                id: r.id.clone(),
                score,
                metadata: r.metadata.clone(),
            })
            .collect())
    }
}
