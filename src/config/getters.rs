//! Getter methods for `FetchConfig`
//!
//! Plain accessors plus the derived engine settings (retry policy, breaker,
//! detector, resource filter).

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use super::types::FetchConfig;
use crate::browser_session::resource_filter::{ResourcePredicate, allow_all, should_allow};
use crate::fetch_engine::{BlockDetector, CircuitBreaker, MarkerBlockDetector, RetryPolicy};

impl FetchConfig {
    #[must_use]
    pub fn input_path(&self) -> &Path {
        &self.input_path
    }

    #[must_use]
    pub fn run_label(&self) -> &str {
        &self.run_label
    }

    #[must_use]
    pub fn cache_root(&self) -> &Path {
        &self.cache_root
    }

    #[must_use]
    pub fn error_cache_root(&self) -> &Path {
        &self.error_cache_root
    }

    #[must_use]
    pub fn pool_width(&self) -> usize {
        self.pool_width
    }

    #[must_use]
    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    #[must_use]
    pub fn navigation_timeout_secs(&self) -> u64 {
        self.navigation_timeout_secs
    }

    #[must_use]
    pub fn readiness_timeout_secs(&self) -> u64 {
        self.readiness_timeout_secs
    }

    #[must_use]
    pub fn settle_delay_ms(&self) -> u64 {
        self.settle_delay_ms
    }

    #[must_use]
    pub fn retry_backoff_ms(&self) -> u64 {
        self.retry_backoff_ms
    }

    #[must_use]
    pub fn circuit_breaker_threshold(&self) -> Option<u64> {
        self.circuit_breaker_threshold
    }

    #[must_use]
    pub fn block_markers(&self) -> &[String] {
        &self.block_markers
    }

    #[must_use]
    pub fn block_phrases(&self) -> &[String] {
        &self.block_phrases
    }

    #[must_use]
    pub fn block_heavy_resources(&self) -> bool {
        self.block_heavy_resources
    }

    #[must_use]
    pub fn headless(&self) -> bool {
        self.headless
    }

    #[must_use]
    pub fn user_data_dir(&self) -> &PathBuf {
        &self.user_data_dir
    }

    #[must_use]
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    #[must_use]
    pub fn proxy_credentials_path(&self) -> Option<&Path> {
        self.proxy_credentials_path.as_deref()
    }

    #[must_use]
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.max_retries,
            navigation_timeout: Duration::from_secs(self.navigation_timeout_secs),
            readiness_timeout: Duration::from_secs(self.readiness_timeout_secs),
            settle_delay: Duration::from_millis(self.settle_delay_ms),
            backoff: Duration::from_millis(self.retry_backoff_ms),
        }
    }

    #[must_use]
    pub fn circuit_breaker(&self) -> Option<CircuitBreaker> {
        self.circuit_breaker_threshold.map(CircuitBreaker::new)
    }

    #[must_use]
    pub fn block_detector(&self) -> Arc<dyn BlockDetector> {
        Arc::new(MarkerBlockDetector::new(
            self.block_markers.clone(),
            self.block_phrases.clone(),
        ))
    }

    #[must_use]
    pub fn resource_filter(&self) -> ResourcePredicate {
        if self.block_heavy_resources {
            should_allow
        } else {
            allow_all
        }
    }
}
