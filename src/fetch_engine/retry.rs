//! Bounded per-job retry loop
//!
//! A job gets `max_retries + 1` attempts. Only transport failures (navigation,
//! readiness, extraction) are retried; a block page is a terminal
//! classification and returns immediately.

use anyhow::Result;
use log::{debug, warn};
use std::time::Duration;

use super::block_detector::{BlockDetector, BlockVerdict};
use super::failure::FailureKind;
use super::job::{FetchOutcome, Job};
use super::page_timeout::with_page_timeout;
use super::progress::ProgressReporter;
use super::session::PageSession;
use crate::utils::constants::{
    DEFAULT_MAX_RETRIES, DEFAULT_NAVIGATION_TIMEOUT_SECS, DEFAULT_READINESS_TIMEOUT_SECS,
    DEFAULT_SETTLE_DELAY_MS,
};

/// Timing and retry parameters for a single job
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: u32,
    pub navigation_timeout: Duration,
    pub readiness_timeout: Duration,
    /// Dwell after readiness for dynamic content
    pub settle_delay: Duration,
    /// Delay before retry `n` is `backoff * n * kind multiplier`; zero disables it
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            navigation_timeout: Duration::from_secs(DEFAULT_NAVIGATION_TIMEOUT_SECS),
            readiness_timeout: Duration::from_secs(DEFAULT_READINESS_TIMEOUT_SECS),
            settle_delay: Duration::from_millis(DEFAULT_SETTLE_DELAY_MS),
            backoff: Duration::ZERO,
        }
    }
}

impl RetryPolicy {
    /// Total attempts this policy allows
    #[must_use]
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Fetch `job.url` through `session`, retrying transport failures
    pub async fn attempt_fetch<S: PageSession>(
        &self,
        session: &S,
        job: &Job,
        detector: &dyn BlockDetector,
        progress: &dyn ProgressReporter,
    ) -> FetchOutcome {
        let mut last_failure: Option<(anyhow::Error, FailureKind)> = None;

        for attempt in 0..=self.max_retries {
            if let Some((_, kind)) = &last_failure {
                let delay = self.backoff_for(attempt, *kind);
                if !delay.is_zero() {
                    debug!("Backing off {delay:?} before attempt {} for {}", attempt + 1, job.url);
                    tokio::time::sleep(delay).await;
                }
            }

            match self.fetch_once(session, &job.url).await {
                Ok(content) => {
                    return match detector.classify(&content) {
                        BlockVerdict::Blocked { marker } => FetchOutcome::Blocked { content, marker },
                        BlockVerdict::Success => FetchOutcome::Success { content },
                    };
                }
                Err(e) => {
                    let kind = FailureKind::classify(&e);
                    let message = format!("{e:#}");
                    warn!("[ERROR] {} attempt {}: {message}", job.url, attempt + 1);
                    progress.report_attempt_failed(&job.key, attempt + 1, kind, &message);
                    last_failure = Some((e, kind));
                }
            }
        }

        let last_error = match last_failure {
            Some((e, _)) => e,
            None => anyhow::anyhow!("no fetch attempt was made for {}", job.url),
        };
        FetchOutcome::Failed {
            last_error,
            attempts: self.max_attempts(),
        }
    }

    /// One navigate, wait, settle, extract cycle
    async fn fetch_once<S: PageSession>(&self, session: &S, url: &str) -> Result<String> {
        with_page_timeout(session.navigate(url), self.navigation_timeout, "Page navigation").await?;
        with_page_timeout(session.wait_until_ready(), self.readiness_timeout, "Page load").await?;

        if !self.settle_delay.is_zero() {
            tokio::time::sleep(self.settle_delay).await;
        }

        session.content().await
    }

    fn backoff_for(&self, attempt: u32, kind: FailureKind) -> Duration {
        if self.backoff.is_zero() {
            return Duration::ZERO;
        }
        self.backoff.mul_f64(f64::from(attempt) * kind.delay_multiplier())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_scales_with_attempt_and_kind() {
        let policy = RetryPolicy {
            backoff: Duration::from_millis(100),
            ..RetryPolicy::default()
        };
        assert_eq!(policy.backoff_for(1, FailureKind::Network), Duration::from_millis(100));
        assert_eq!(policy.backoff_for(2, FailureKind::RateLimited), Duration::from_millis(600));
        assert_eq!(RetryPolicy::default().backoff_for(2, FailureKind::Browser), Duration::ZERO);
    }

    #[test]
    fn test_default_allows_three_attempts() {
        assert_eq!(RetryPolicy::default().max_attempts(), 3);
    }
}
