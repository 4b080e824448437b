//! Error types for batch fetch operations
//!
//! Per-job failures (`Transport`, `Blocked`) are terminal for that job only and
//! end up persisted as error artifacts. `Persistence` failures are logged by the
//! cache and never reach the scheduler. `CircuitBreakTripped` is the only
//! run-level error.

use std::path::PathBuf;

/// Result type alias for batch fetch operations
pub type FetchResult<T> = Result<T, FetchError>;

/// Error types for batch fetch operations
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// Navigation, readiness wait or content extraction failed
    #[error("Transport error: {0}")]
    Transport(String),

    /// A challenge or interstitial page was served instead of the target content
    #[error("Blocked response: matched marker {marker:?}")]
    Blocked { marker: String },

    /// Reading or writing a cache artifact failed
    #[error("Persistence error at {}: {source}", path.display())]
    Persistence {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The run-level error budget was exhausted
    #[error("Circuit breaker tripped: {errors} errors reached threshold {threshold}")]
    CircuitBreakTripped { errors: u64, threshold: u64 },

    /// The input job list could not be loaded
    #[error("Input error: {0}")]
    Input(String),

    /// Browser launch or session setup failed
    #[error("Browser error: {0}")]
    Browser(String),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<anyhow::Error> for FetchError {
    fn from(err: anyhow::Error) -> Self {
        // {:#} keeps the context chain
        Self::Browser(format!("{err:#}"))
    }
}
