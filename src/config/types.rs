//! Core configuration types for batch fetching
//!
//! This module contains the main `FetchConfig` struct. Use
//! [`FetchConfig::builder`] to create one.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration struct for a batch fetch run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Headless two-column `key,url` CSV
    pub(crate) input_path: PathBuf,

    /// Subdirectory label for both cache namespaces.
    ///
    /// Derived from the input file name unless set explicitly.
    pub(crate) run_label: String,

    pub(crate) cache_root: PathBuf,
    pub(crate) error_cache_root: PathBuf,

    /// Number of browser tabs, and therefore the batch size
    ///
    /// Default: 10
    pub(crate) pool_width: usize,

    /// Retries after the first attempt for transport failures
    ///
    /// Default: 2 (3 attempts)
    pub(crate) max_retries: u32,

    /// Timeout in seconds for `page.goto()` operations
    ///
    /// Default: 15 seconds
    pub(crate) navigation_timeout_secs: u64,

    /// Timeout in seconds for the readiness wait after navigation
    ///
    /// Default: 30 seconds
    pub(crate) readiness_timeout_secs: u64,

    /// Fixed dwell in milliseconds after readiness
    ///
    /// Default: 5000
    pub(crate) settle_delay_ms: u64,

    /// Base delay in milliseconds between attempts; 0 retries immediately
    pub(crate) retry_backoff_ms: u64,

    /// Halt the run once this many error artifacts have been written
    ///
    /// `None` (the default) disables the circuit breaker.
    pub(crate) circuit_breaker_threshold: Option<u64>,

    /// Challenge markers matched case-insensitively
    pub(crate) block_markers: Vec<String>,

    /// Interstitial phrases matched exactly
    pub(crate) block_phrases: Vec<String>,

    /// Abort image, font and stylesheet requests
    ///
    /// Default: true
    pub(crate) block_heavy_resources: bool,

    pub(crate) headless: bool,

    /// Persistent browser profile, reused across runs
    pub(crate) user_data_dir: PathBuf,

    pub(crate) user_agent: String,

    /// JSON file with `{server, username?, password?}`
    pub(crate) proxy_credentials_path: Option<PathBuf>,
}
