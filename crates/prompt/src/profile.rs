//! User profile sent along with each question.

use serde::{Deserialize, Deserializer, Serialize};

/// Value the front end uses for a field the user never filled in.
pub const UNKNOWN_SENTINEL: &str = "알 수 없음";

/// Shown when profile fields were sent but none of them is known.
pub const NO_PROFILE_INFO: &str = "(사용자 정보 없음)";

/// Shown when no profile was sent at all (anonymous visitor).
pub const ANONYMOUS_PROFILE: &str = "(로그인하지 않은 사용자 또는 정보 없음)";

/// Age and region of the asking user.
///
/// Both fields are optional and may carry [`UNKNOWN_SENTINEL`], which is
/// treated exactly like an absent value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default, deserialize_with = "lenient_string")]
    pub age: Option<String>,

    #[serde(default, deserialize_with = "lenient_string")]
    pub region: Option<String>,
}

impl UserProfile {
    pub fn new(age: Option<&str>, region: Option<&str>) -> Self {
        Self {
            age: age.map(str::to_string),
            region: region.map(str::to_string),
        }
    }

    /// True when neither field was sent.
    pub fn is_empty(&self) -> bool {
        sent(&self.age).is_none() && sent(&self.region).is_none()
    }

    /// Known age, excluding the sentinel.
    pub fn known_age(&self) -> Option<&str> {
        known(&self.age)
    }

    /// Known region, excluding the sentinel.
    pub fn known_region(&self) -> Option<&str> {
        known(&self.region)
    }

    /// Known field values in fixed order (age, region).
    pub fn known_values(&self) -> Vec<&str> {
        self.known_age()
            .into_iter()
            .chain(self.known_region())
            .collect()
    }

    /// Render the profile section of the prompt.
    pub fn render_block(&self) -> String {
        if self.is_empty() {
            return ANONYMOUS_PROFILE.to_string();
        }

        let mut lines = Vec::new();
        if let Some(age) = self.known_age() {
            lines.push(format!("- 나이: {}", age));
        }
        if let Some(region) = self.known_region() {
            lines.push(format!("- 거주지: {}", region));
        }

        if lines.is_empty() {
            NO_PROFILE_INFO.to_string()
        } else {
            lines.join("\n")
        }
    }
}

fn sent(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn known(value: &Option<String>) -> Option<&str> {
    sent(value).filter(|v| *v != UNKNOWN_SENTINEL)
}

/// Accept strings, numbers and null for profile fields.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}
