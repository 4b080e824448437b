//! Run-level circuit breaker
//!
//! When a site starts serving challenge pages, every remaining job would burn
//! an attempt and produce another error artifact. The breaker watches the
//! cache's error counter and opens once it reaches the threshold; the
//! scheduler then stops issuing batches. It never interrupts jobs in flight.

use log::{debug, warn};

use crate::cache_store::RunCounters;
use crate::error::FetchError;

/// Circuit breaker states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    /// Below threshold, dispatch continues
    Closed,
    /// Threshold reached, no further batches
    Open,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CircuitBreaker {
    failure_threshold: u64,
}

impl CircuitBreaker {
    /// Open once `failure_threshold` errors have been recorded
    #[must_use]
    pub fn new(failure_threshold: u64) -> Self {
        Self { failure_threshold }
    }

    #[must_use]
    pub fn failure_threshold(&self) -> u64 {
        self.failure_threshold
    }

    #[must_use]
    pub fn state(&self, counters: &RunCounters) -> CircuitState {
        if counters.errors() >= self.failure_threshold {
            CircuitState::Open
        } else {
            CircuitState::Closed
        }
    }

    /// Check whether dispatch may continue
    ///
    /// # Errors
    /// Returns `FetchError::CircuitBreakTripped` once the threshold is reached.
    pub fn check(&self, counters: &RunCounters) -> Result<(), FetchError> {
        let errors = counters.errors();
        match self.state(counters) {
            CircuitState::Closed => {
                debug!("Circuit breaker closed ({errors}/{})", self.failure_threshold);
                Ok(())
            }
            CircuitState::Open => {
                warn!(
                    "Circuit breaker OPEN after {errors} errors (threshold {})",
                    self.failure_threshold
                );
                Err(FetchError::CircuitBreakTripped {
                    errors,
                    threshold: self.failure_threshold,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opens_at_threshold() {
        let breaker = CircuitBreaker::new(2);
        let counters = RunCounters::new();
        assert!(breaker.check(&counters).is_ok());

        counters.increment_errors();
        assert_eq!(breaker.state(&counters), CircuitState::Closed);

        counters.increment_errors();
        assert_eq!(breaker.state(&counters), CircuitState::Open);
        assert!(matches!(
            breaker.check(&counters),
            Err(FetchError::CircuitBreakTripped {
                errors: 2,
                threshold: 2
            })
        ));
    }

    #[test]
    fn test_successes_do_not_count() {
        let breaker = CircuitBreaker::new(1);
        let counters = RunCounters::new();
        for _ in 0..10 {
            counters.increment_successes();
        }
        assert_eq!(breaker.state(&counters), CircuitState::Closed);
    }
}
