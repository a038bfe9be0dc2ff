//! RAG (Retrieval-Augmented Generation) answering system.
//!
//! Provides query augmentation, weighted fusion of several corpora, context
//! formatting and answer extraction, orchestrated by [`RagPipeline`].

pub mod answer;
pub mod ask;
pub mod augment;
pub mod ensemble;
pub mod format;

pub use answer::{Answer, AnswerExtractor, NO_SOURCE};
pub use ask::{RagPipeline, APOLOGY};
pub use augment::{QueryAugmenter, DEFAULT_TRIGGERS};
pub use ensemble::{fuse, WeightedEnsembleRetriever, WeightedSource, DEFAULT_RRF_CONSTANT};
pub use format::{ContextFormatter, FieldLabel, UNTITLED};
