//! Final answer and source label extraction.

use crate::types::RetrievedDocument;
use jobs_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// Source label used when the top document has no usable title.
pub const NO_SOURCE: &str = "출처 없음";

/// Answer returned to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    pub answer: String,
    pub source: Option<String>,
}

impl Answer {
    pub fn new(answer: impl Into<String>, source: Option<String>) -> Self {
        Self {
            answer: answer.into(),
            source,
        }
    }
}

/// Pairs the model output with a source label from the top fused document.
#[derive(Debug, Clone)]
pub struct AnswerExtractor {
    source_keys: Vec<String>,
}

impl Default for AnswerExtractor {
    fn default() -> Self {
        Self::new(vec!["title".to_string(), "policy_name".to_string()])
    }
}

impl AnswerExtractor {
    pub fn new(source_keys: Vec<String>) -> Self {
        Self { source_keys }
    }

    /// Label for the best-ranked document, or [`NO_SOURCE`].
    pub fn source_label(&self, documents: &[RetrievedDocument]) -> String {
        documents
            .first()
            .and_then(|doc| doc.first_meta_text(&self.source_keys))
            .unwrap_or_else(|| NO_SOURCE.to_string())
    }

    /// Build the answer from raw model output.
    ///
    /// The text is trimmed; an empty result is a model failure.
    pub fn extract(&self, model_output: &str, documents: &[RetrievedDocument]) -> AppResult<Answer> {
        let answer = model_output.trim();
        if answer.is_empty() {
            return Err(AppError::Llm("Model returned an empty answer".to_string()));
        }

        Ok(Answer::new(answer, Some(self.source_label(documents))))
    }
}
