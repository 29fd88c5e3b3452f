//! Profile views shown after sign-in.

use serde::{Deserialize, Serialize};

/// Placeholder for profile fields the provider did not return.
pub const NOT_SPECIFIED: &str = "Not specified";

/// Profile data fetched from a provider, ready for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "provider")]
pub enum Profile {
    #[serde(rename = "vk")]
    Vk(VkProfile),
    #[serde(rename = "github")]
    GitHub(GitHubProfile),
}

/// A labelled value of a profile.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileField {
    pub label: String,
    pub value: String,
}

impl ProfileField {
    /// Build a field, substituting `NOT_SPECIFIED` for an absent or empty value.
    pub fn new(label: &str, value: Option<String>) -> Self {
        Self {
            label: label.to_string(),
            value: value
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| NOT_SPECIFIED.to_string()),
        }
    }
}

/// VK profile: the display name plus an ordered list of extended fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VkProfile {
    pub user_name: String,
    pub fields: Vec<ProfileField>,
}

impl VkProfile {
    /// Look up a field value by its label.
    pub fn field(&self, label: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.label == label)
            .map(|f| f.value.as_str())
    }
}

/// GitHub user-info payload. `login` and `id` are always present; everything else GitHub
/// returns is passed through as is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GitHubProfile {
    pub login: String,
    pub id: u64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub html_url: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}
