//! Mock embedding provider using character trigrams.

use crate::embeddings::provider::EmbeddingProvider;
use jobs_core::AppResult;
use std::collections::HashMap;

/// Mock provider for tests and offline runs.
///
/// Generates deterministic embeddings from character trigrams and whole
/// words. Not semantically accurate, but texts sharing words (Korean or
/// otherwise) land close to each other, which is enough to exercise the
/// in-memory index end to end.
#[derive(Debug)]
pub struct MockProvider {
    dimensions: usize,
}

impl MockProvider {
    /// Create a new mock provider with specified dimensions.
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions: dimensions.max(1),
        }
    }

    fn bucket(&self, token: &str, seed: u64) -> usize {
        let hash = token
            .bytes()
            .fold(seed, |acc, b| acc.wrapping_mul(37).wrapping_add(b as u64));
        (hash as usize) % self.dimensions
    }

    fn generate_mock_embedding(&self, text: &str) -> Vec<f32> {
        let mut embedding = vec![0.0; self.dimensions];

        let lower = text.to_lowercase();
        let mut word_freq: HashMap<&str, u32> = HashMap::new();
        for word in lower.split_whitespace() {
            *word_freq.entry(word).or_insert(0) += 1;
        }

        for (word, freq) in &word_freq {
            let chars: Vec<char> = word.chars().collect();

            // Trigrams over the padded word so short Korean words still
            // contribute sub-word features
            let padded: Vec<char> = std::iter::once(' ')
                .chain(chars.iter().copied())
                .chain(std::iter::once(' '))
                .collect();
            for window in padded.windows(3) {
                let trigram: String = window.iter().collect();
                let idx = self.bucket(&trigram, 7);
                embedding[idx] += (*freq as f32).sqrt();
            }

            let idx = self.bucket(word, 11);
            embedding[idx] += *freq as f32;
        }

        // Normalize to unit vector
        let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut embedding {
                *v /= norm;
            }
        }

        embedding
    }
}

#[async_trait::async_trait]
impl EmbeddingProvider for MockProvider {
    fn provider_name(&self) -> &str {
        "mock"
    }

    fn model_name(&self) -> &str {
        "trigram-v1"
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        Ok(texts
            .iter()
            .map(|text| self.generate_mock_embedding(text))
            .collect())
    }
}
