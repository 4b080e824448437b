use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A successfully captured page, stored as `<key>.json` in the success namespace
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuccessArtifact {
    pub url: String,
    /// Full rendered page content. Older caches call this field `html`.
    #[serde(alias = "html")]
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub captured_at: Option<DateTime<Utc>>,
}

impl SuccessArtifact {
    /// Artifact stamped with the current time
    #[must_use]
    pub fn captured_now(url: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            content: content.into(),
            captured_at: Some(Utc::now()),
        }
    }

    /// Artifact without a capture timestamp
    #[must_use]
    pub fn new(url: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            content: content.into(),
            captured_at: None,
        }
    }
}
