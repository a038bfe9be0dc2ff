//! Building retrievers from configuration.

use crate::embeddings::{EmbeddingProvider, MockProvider};
use crate::memory_index::MemoryRecord;
use crate::retriever::Retriever;
use crate::types::Metadata;
use crate::{embedder_from_config, index_from_config, retriever_from_config};
use jobs_core::config::{AppConfig, CorpusConfig, EmbeddingConfig};
use jobs_core::AppError;
use serde_json::json;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

const DIMS: usize = 128;

async fn write_corpus(
    dir: &Path,
    file: &str,
    text_key: &str,
    records: &[(&str, &str, &str, &str)],
) -> PathBuf {
    let embedder = MockProvider::new(DIMS);
    let mut lines = Vec::new();

    for (id, title_key, title, text) in records {
        let mut metadata = Metadata::new();
        metadata.insert(title_key.to_string(), json!(title));
        metadata.insert(text_key.to_string(), json!(text));
        let record = MemoryRecord {
            id: id.to_string(),
            values: embedder.embed(text).await.unwrap(),
            metadata,
        };
        lines.push(serde_json::to_string(&record).unwrap());
    }

    let path = dir.join(file);
    std::fs::write(&path, lines.join("\n")).unwrap();
    path
}

fn memory_corpus(name: &str, path: &str, text_key: &str, weight: f64) -> CorpusConfig {
    CorpusConfig {
        name: name.to_string(),
        provider: "memory".to_string(),
        host: None,
        host_env: None,
        api_key_env: None,
        namespace: None,
        data_path: Some(PathBuf::from(path)),
        text_key: text_key.to_string(),
        k: 3,
        weight,
        metadata_keys: vec![],
    }
}

fn mock_config(workspace: &Path, corpora: Vec<CorpusConfig>) -> AppConfig {
    AppConfig {
        workspace: workspace.to_path_buf(),
        embedding: EmbeddingConfig {
            provider: "mock".to_string(),
            model: "trigram-v1".to_string(),
            dimensions: DIMS,
            endpoint: None,
            api_key_env: None,
        },
        corpora,
        ..AppConfig::default()
    }
}

#[tokio::test]
async fn test_memory_corpora_from_config() {
    let temp_dir = TempDir::new().unwrap();
    write_corpus(
        temp_dir.path(),
        "policies.jsonl",
        "embedding_text",
        &[
            ("p1", "policy_name", "청년 월세 지원", "광주 청년 월세 지원 정책"),
            ("p2", "policy_name", "창업 지원", "서울 창업 보육 센터 입주"),
        ],
    )
    .await;
    write_corpus(
        temp_dir.path(),
        "jobs.jsonl",
        "context_text",
        &[("j1", "title", "데이터 분석 인턴", "광주 데이터 분석 인턴 채용")],
    )
    .await;

    let config = mock_config(
        temp_dir.path(),
        vec![
            memory_corpus("policy", "policies.jsonl", "embedding_text", 0.5),
            memory_corpus("job", "jobs.jsonl", "context_text", 0.5),
        ],
    );

    let embedder = embedder_from_config(&config).unwrap();
    let retriever = retriever_from_config(&config, embedder).unwrap();

    let docs = retriever.retrieve("광주 청년 월세").await.unwrap();
    assert_eq!(docs.len(), 3);
    assert_eq!(docs[0].meta_text("policy_name").as_deref(), Some("청년 월세 지원"));
    assert!(docs.iter().all(|d| !d.has_key("embedding_text") && !d.has_key("context_text")));
}

#[tokio::test]
async fn test_invalid_weights_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let config = mock_config(
        temp_dir.path(),
        vec![
            memory_corpus("policy", "policies.jsonl", "embedding_text", 0.7),
            memory_corpus("job", "jobs.jsonl", "context_text", 0.7),
        ],
    );

    let embedder: Arc<dyn EmbeddingProvider> = Arc::new(MockProvider::new(DIMS));
    let result = retriever_from_config(&config, embedder);
    assert!(matches!(result, Err(AppError::Config(_))));
}

#[test]
fn test_missing_data_file() {
    let temp_dir = TempDir::new().unwrap();
    let corpus = memory_corpus("policy", "absent.jsonl", "embedding_text", 1.0);
    let config = mock_config(temp_dir.path(), vec![corpus.clone()]);

    assert!(matches!(
        index_from_config(&config, &corpus),
        Err(AppError::Config(_))
    ));
}

#[test]
fn test_pinecone_without_host() {
    let temp_dir = TempDir::new().unwrap();
    let corpus = CorpusConfig {
        provider: "pinecone".to_string(),
        host: None,
        host_env: Some("JOBS_TEST_UNSET_PINECONE_HOST".to_string()),
        data_path: None,
        ..memory_corpus("policy", "", "embedding_text", 1.0)
    };
    let config = mock_config(temp_dir.path(), vec![corpus.clone()]);

    let err = index_from_config(&config, &corpus).err().unwrap();
    assert!(err.to_string().contains("JOBS_TEST_UNSET_PINECONE_HOST"));
}
