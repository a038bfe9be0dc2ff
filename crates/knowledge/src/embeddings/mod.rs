//! Query embedding.
//!
//! Corpus records are embedded by an external pipeline; at request time only
//! the search query is vectorized, with the same model the corpora were
//! built with.

pub mod provider;
pub mod providers;

pub use provider::{create_provider, EmbeddingProvider};
pub use providers::{MockProvider, OllamaProvider, OpenAiProvider};
