//! Challenge page detection
//!
//! A plain substring heuristic over the rendered page, not a structural parse.
//! Both failure modes are accepted:
//! - false negatives: a challenge page without any known marker is saved as a success
//! - false positives: a genuine page that mentions a marker (e.g. an article about
//!   CAPTCHAs) is quarantined in the error namespace
//!
//! Callers that need something smarter implement [`BlockDetector`] themselves.

use log::debug;

use crate::utils::constants::{DEFAULT_BLOCK_MARKERS, DEFAULT_BLOCK_PHRASES};

/// Classification of already-fetched page content
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockVerdict {
    /// Genuine content
    Success,
    /// Anti-automation interstitial; `marker` is the text that matched
    Blocked { marker: String },
}

impl BlockVerdict {
    #[must_use]
    pub fn is_blocked(&self) -> bool {
        matches!(self, Self::Blocked { .. })
    }
}

/// Pluggable page classifier
pub trait BlockDetector: Send + Sync {
    fn classify(&self, content: &str) -> BlockVerdict;
}

/// Marker-based detector
///
/// `markers` match case-insensitively, `phrases` match exactly.
#[derive(Debug, Clone)]
pub struct MarkerBlockDetector {
    markers: Vec<String>,
    phrases: Vec<String>,
}

impl MarkerBlockDetector {
    #[must_use]
    pub fn new(markers: Vec<String>, phrases: Vec<String>) -> Self {
        Self {
            markers: markers
                .into_iter()
                .filter(|m| !m.is_empty())
                .map(|m| m.to_lowercase())
                .collect(),
            phrases: phrases.into_iter().filter(|p| !p.is_empty()).collect(),
        }
    }
}

impl Default for MarkerBlockDetector {
    fn default() -> Self {
        Self::new(
            DEFAULT_BLOCK_MARKERS.iter().map(ToString::to_string).collect(),
            DEFAULT_BLOCK_PHRASES.iter().map(ToString::to_string).collect(),
        )
    }
}

impl BlockDetector for MarkerBlockDetector {
    fn classify(&self, content: &str) -> BlockVerdict {
        if !self.markers.is_empty() {
            let lowered = content.to_lowercase();
            if let Some(marker) = self.markers.iter().find(|m| lowered.contains(m.as_str())) {
                debug!("Block marker {marker:?} found");
                return BlockVerdict::Blocked {
                    marker: marker.clone(),
                };
            }
        }

        if let Some(phrase) = self.phrases.iter().find(|p| content.contains(p.as_str())) {
            debug!("Block phrase {phrase:?} found");
            return BlockVerdict::Blocked {
                marker: phrase.clone(),
            };
        }

        BlockVerdict::Success
    }
}
