//! Core types for retrieved documents.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Open key/value metadata attached to a document.
pub type Metadata = serde_json::Map<String, Value>;

/// A document returned by a corpus query.
///
/// Metadata keys differ between corpora; callers probe them with
/// [`RetrievedDocument::meta_text`] instead of assuming a schema.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RetrievedDocument {
    /// Primary text of the record
    pub content: String,

    /// Remaining metadata fields
    #[serde(default)]
    pub metadata: Metadata,
}

impl RetrievedDocument {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            metadata: Metadata::new(),
        }
    }

    /// Add a metadata field (builder style).
    pub fn with_meta(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Whether the metadata carries `key` at all, even with an empty value.
    pub fn has_key(&self, key: &str) -> bool {
        self.metadata.contains_key(key)
    }

    /// Render a metadata field as text.
    ///
    /// Returns `None` when the key is absent, null, or renders to an empty
    /// or whitespace-only string.
    pub fn meta_text(&self, key: &str) -> Option<String> {
        self.metadata.get(key).and_then(render_value)
    }

    /// First non-empty field among `keys`, probed in order.
    pub fn first_meta_text<S: AsRef<str>>(&self, keys: &[S]) -> Option<String> {
        keys.iter().find_map(|key| self.meta_text(key.as_ref()))
    }
}

/// Documents returned by one retriever, in rank order, with the retriever's
/// fusion weight.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedResults {
    /// Retriever name
    pub source: String,

    /// Fusion weight of the retriever
    pub weight: f64,

    /// Documents, best first
    pub documents: Vec<RetrievedDocument>,
}

fn render_value(value: &Value) -> Option<String> {
    let text = match value {
        Value::Null => return None,
        Value::String(s) => s.trim().to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(items) => items
            .iter()
            .filter_map(render_value)
            .collect::<Vec<_>>()
            .join(", "),
        Value::Object(_) => value.to_string(),
    };

    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}
