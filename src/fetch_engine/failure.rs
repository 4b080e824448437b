//! Transport failure classification
//!
//! Every transport failure is retried; the kind only drives reporting and
//! scales the optional retry backoff.

use std::fmt;

/// Categorizes failed fetch attempts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Timeout, DNS, connection refused or reset
    Network,
    /// Tab crash, CDP error, target closed
    Browser,
    /// HTTP 429 or similar; backs off longest
    RateLimited,
    Unknown,
}

impl FailureKind {
    /// Classify an error based on its message chain
    #[must_use]
    pub fn classify(error: &anyhow::Error) -> Self {
        let msg = format!("{error:#}").to_lowercase();

        if msg.contains("429") || msg.contains("too many requests") || msg.contains("rate limit") {
            return Self::RateLimited;
        }

        if msg.contains("timeout")
            || msg.contains("timed out")
            || msg.contains("connection refused")
            || msg.contains("connection reset")
            || msg.contains("net::err_")
            || msg.contains("dns")
            || msg.contains("network")
            || msg.contains("unreachable")
        {
            return Self::Network;
        }

        if msg.contains("browser")
            || msg.contains("chrome")
            || msg.contains("cdp")
            || msg.contains("target")
            || msg.contains("session")
            || msg.contains("page")
        {
            return Self::Browser;
        }

        Self::Unknown
    }

    /// Base delay multiplier for this failure kind
    #[must_use]
    pub const fn delay_multiplier(&self) -> f64 {
        match self {
            Self::Network | Self::Unknown => 1.0,
            Self::Browser => 1.5,
            Self::RateLimited => 3.0,
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Network => "network",
            Self::Browser => "browser",
            Self::RateLimited => "rate-limited",
            Self::Unknown => "unknown",
        })
    }
}
