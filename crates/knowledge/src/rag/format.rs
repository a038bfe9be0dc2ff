//! Rendering of fused documents into the prompt's context section.

use crate::types::RetrievedDocument;

/// Title used when no title key resolves.
pub const UNTITLED: &str = "제목 없음";

/// A secondary metadata field and the label it is rendered with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldLabel {
    pub key: String,
    pub label: String,
}

impl FieldLabel {
    pub fn new(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
        }
    }
}

/// Maps heterogeneous document metadata onto uniform text blocks.
///
/// Each block looks like:
///
/// ```text
/// --- [문서 1: 청년 월세 지원] ---
/// 내용: ...
/// 마감일: 2025-12-31
/// ```
///
/// Secondary lines appear only for fields that are present and non-empty.
#[derive(Debug, Clone)]
pub struct ContextFormatter {
    title_keys: Vec<String>,
    fields: Vec<FieldLabel>,
}

impl Default for ContextFormatter {
    fn default() -> Self {
        Self {
            title_keys: vec!["title".to_string(), "policy_name".to_string()],
            fields: vec![
                FieldLabel::new("apply_end_date", "마감일"),
                FieldLabel::new("apply_method", "신청방법"),
                FieldLabel::new("apply_link", "링크"),
                FieldLabel::new("job_category", "분야"),
                FieldLabel::new("target_audience", "대상"),
            ],
        }
    }
}

impl ContextFormatter {
    pub fn new(title_keys: Vec<String>, fields: Vec<FieldLabel>) -> Self {
        Self { title_keys, fields }
    }

    /// Title keys in probe order.
    pub fn title_keys(&self) -> &[String] {
        &self.title_keys
    }

    /// Render all documents, numbered from 1, separated by a blank line.
    ///
    /// An empty slice renders as an empty string.
    pub fn format(&self, documents: &[RetrievedDocument]) -> String {
        documents
            .iter()
            .enumerate()
            .map(|(i, doc)| self.format_document(i + 1, doc))
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    fn format_document(&self, position: usize, doc: &RetrievedDocument) -> String {
        let title = doc
            .first_meta_text(&self.title_keys)
            .unwrap_or_else(|| UNTITLED.to_string());

        let mut block = format!(
            "--- [문서 {}: {}] ---\n내용: {}\n",
            position, title, doc.content
        );

        for field in &self.fields {
            if let Some(value) = doc.meta_text(&field.key) {
                block.push_str(&format!("{}: {}\n", field.label, value));
            }
        }

        block
    }
}
