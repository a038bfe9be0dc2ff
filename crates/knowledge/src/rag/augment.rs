//! Search query augmentation with profile keywords.

use jobs_prompt::UserProfile;

/// Tokens that mark a question as being about the asker themself
/// ("나", "내"), their eligibility ("조건") or a request for suggestions
/// ("추천").
pub const DEFAULT_TRIGGERS: [&str; 4] = ["나", "내", "조건", "추천"];

/// Appends the asker's known profile values to self-referential queries so
/// the vector search can match on age and region.
#[derive(Debug, Clone)]
pub struct QueryAugmenter {
    triggers: Vec<String>,
}

impl Default for QueryAugmenter {
    fn default() -> Self {
        Self::new(DEFAULT_TRIGGERS.iter().map(|t| t.to_string()).collect())
    }
}

impl QueryAugmenter {
    pub fn new(triggers: Vec<String>) -> Self {
        Self { triggers }
    }

    /// Whether `question` contains any trigger as a substring.
    pub fn is_triggered(&self, question: &str) -> bool {
        self.triggers
            .iter()
            .any(|t| !t.is_empty() && question.contains(t.as_str()))
    }

    /// Build the search query for `question`.
    ///
    /// Returns the question unchanged unless it is triggered and the profile
    /// has at least one known value; otherwise appends the values
    /// (age, then region) separated by spaces.
    pub fn augment(&self, question: &str, profile: &UserProfile) -> String {
        let values = profile.known_values();
        if values.is_empty() || !self.is_triggered(question) {
            return question.to_string();
        }

        format!("{} {}", question, values.join(" "))
    }
}
