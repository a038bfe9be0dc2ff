//! Retrieval and answering for the Jobs assistant.
//!
//! Queries the policy and job-posting corpora, fuses their rankings and
//! turns the result into a grounded model answer.

pub mod embeddings;
pub mod memory_index;
pub mod pinecone_index;
pub mod rag;
pub mod retriever;
pub mod types;
pub mod vector_index;

#[cfg(test)]
mod tests;

// Re-export commonly used types
pub use rag::{Answer, RagPipeline, APOLOGY};
pub use retriever::{Retriever, VectorStoreRetriever};
pub use types::{Metadata, RankedResults, RetrievedDocument};
pub use vector_index::{VectorIndex, VectorMatch};

use embeddings::EmbeddingProvider;
use jobs_core::config::{AppConfig, CorpusConfig};
use jobs_core::{AppError, AppResult};
use memory_index::InMemoryIndex;
use pinecone_index::PineconeIndex;
use rag::{WeightedEnsembleRetriever, WeightedSource};
use std::sync::Arc;

/// Build the query embedder from configuration.
pub fn embedder_from_config(config: &AppConfig) -> AppResult<Arc<dyn EmbeddingProvider>> {
    let api_key = config.resolve_embedding_api_key();
    embeddings::create_provider(&config.embedding, api_key.as_deref())
}

/// Open the vector index backing one corpus.
pub fn index_from_config(
    config: &AppConfig,
    corpus: &CorpusConfig,
) -> AppResult<Arc<dyn VectorIndex>> {
    match corpus.provider.as_str() {
        "pinecone" => {
            let host = corpus.resolve_host().ok_or_else(|| {
                AppError::Config(format!(
                    "No index host for corpus '{}' (set host or {})",
                    corpus.name,
                    corpus.host_env.as_deref().unwrap_or("hostEnv")
                ))
            })?;
            let key_var = corpus.api_key_var();
            let api_key = std::env::var(key_var).map_err(|_| {
                AppError::Config(format!(
                    "API key for corpus '{}' not found in environment variable: {}",
                    corpus.name, key_var
                ))
            })?;

            let index = PineconeIndex::new(&corpus.name, &host, api_key, corpus.namespace.clone())?;
            Ok(Arc::new(index))
        }
        "memory" => {
            let path = corpus.data_path.as_ref().ok_or_else(|| {
                AppError::Config(format!("Corpus '{}' needs a dataPath", corpus.name))
            })?;
            let path = if path.is_relative() {
                config.workspace.join(path)
            } else {
                path.clone()
            };
            Ok(Arc::new(InMemoryIndex::from_jsonl(&corpus.name, &path)?))
        }
        other => Err(AppError::Config(format!(
            "Corpus '{}' has unknown provider '{}'",
            corpus.name, other
        ))),
    }
}

/// Build the fused retriever over every configured corpus.
pub fn retriever_from_config(
    config: &AppConfig,
    embedder: Arc<dyn EmbeddingProvider>,
) -> AppResult<WeightedEnsembleRetriever> {
    config.validate_corpora()?;

    let mut sources = Vec::with_capacity(config.corpora.len());
    for corpus in &config.corpora {
        let index = index_from_config(config, corpus)?;
        let retriever = VectorStoreRetriever::new(
            &corpus.name,
            Arc::clone(&embedder),
            index,
            &corpus.text_key,
            corpus.k,
        )
        .with_expected_keys(corpus.metadata_keys.clone());

        tracing::info!(
            corpus = %corpus.name,
            provider = %corpus.provider,
            k = corpus.k,
            weight = corpus.weight,
            "Registered corpus"
        );

        sources.push(WeightedSource::new(Arc::new(retriever), corpus.weight));
    }

    Ok(WeightedEnsembleRetriever::new(sources)
        .with_rrf_constant(config.retrieval.rrf_constant)
        .with_id_key(config.retrieval.id_key.clone()))
}

/// Build the full answering pipeline from configuration.
///
/// All collaborators (embedder, indexes, model client, prompt) are created
/// here once and shared by every request.
pub fn pipeline_from_config(config: &AppConfig) -> AppResult<RagPipeline> {
    let embedder = embedder_from_config(config)?;
    let retriever = retriever_from_config(config, embedder)?;
    let llm = jobs_llm::client_from_config(config)?;
    let prompt = jobs_prompt::load_prompt(&config.workspace, &config.prompt_id)?;

    tracing::info!(
        provider = %config.provider,
        model = %config.model,
        prompt = %prompt.id,
        "Answering pipeline ready"
    );

    let mut pipeline = RagPipeline::new(Arc::new(retriever), llm, prompt, &config.model)
        .with_temperature(config.temperature);
    if let Some(max_tokens) = config.llm.max_tokens {
        pipeline = pipeline.with_max_tokens(max_tokens);
    }
    Ok(pipeline)
}
