//! Core types for fetch jobs and their outcomes.

use serde::{Deserialize, Serialize};

use crate::error::FetchError;

/// One row of input: the cache key and the page to fetch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    pub key: String,
    pub url: String,
}

impl Job {
    #[must_use]
    pub fn new(key: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            url: url.into(),
        }
    }
}

/// Result of the retry loop for one job, before persistence
#[derive(Debug)]
pub enum FetchOutcome {
    /// Genuine page content
    Success { content: String },
    /// A challenge page; never retried
    Blocked { content: String, marker: String },
    /// Every attempt failed at the transport level
    Failed { last_error: anyhow::Error, attempts: u32 },
}

impl FetchOutcome {
    /// Text stored in the error namespace for non-success outcomes
    #[must_use]
    pub fn error_blob(&self) -> Option<String> {
        match self {
            Self::Success { .. } => None,
            Self::Blocked { content, .. } => Some(content.clone()),
            Self::Failed { last_error, .. } => Some(format!("Exception: {last_error:#}")),
        }
    }

    /// The per-job error this outcome stands for
    #[must_use]
    pub fn error(&self) -> Option<FetchError> {
        match self {
            Self::Success { .. } => None,
            Self::Blocked { marker, .. } => Some(FetchError::Blocked {
                marker: marker.clone(),
            }),
            Self::Failed { last_error, .. } => {
                Some(FetchError::Transport(format!("{last_error:#}")))
            }
        }
    }

    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Success { .. } => "saved",
            Self::Blocked { .. } => "blocked",
            Self::Failed { .. } => "failed",
        }
    }
}

/// How a job was resolved once persisted
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobResolution {
    /// Already in the success namespace; no attempt was made
    Skipped,
    /// Saved to the success namespace
    Saved,
    /// Saved to the error namespace as a challenge page
    Blocked { marker: String },
    /// Saved to the error namespace after exhausting retries
    Failed { attempts: u32, error: String },
    /// The key normalizes to empty, so nothing was written and no counter moved
    NotPersisted { outcome: &'static str },
}

impl JobResolution {
    #[must_use]
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Blocked { .. } | Self::Failed { .. })
    }

    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Skipped => "skipped",
            Self::Saved => "saved",
            Self::Blocked { .. } => "blocked",
            Self::Failed { .. } => "failed",
            Self::NotPersisted { .. } => "not_persisted",
        }
    }
}

/// A resolved job, as reported back to the scheduler
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobReport {
    pub job: Job,
    pub resolution: JobResolution,
}
