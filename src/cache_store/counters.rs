use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Success and error counts for one cache store, shared by all of its clones.
///
/// All counters use `Ordering::SeqCst` so a snapshot taken at a batch barrier
/// sees every increment made by that batch's workers.
#[derive(Debug, Clone, Default)]
pub struct RunCounters {
    successes: Arc<AtomicU64>,
    errors: Arc<AtomicU64>,
}

impl RunCounters {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the new success count
    pub fn increment_successes(&self) -> u64 {
        self.successes.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Returns the new error count
    pub fn increment_errors(&self) -> u64 {
        self.errors.fetch_add(1, Ordering::SeqCst) + 1
    }

    #[must_use]
    pub fn successes(&self) -> u64 {
        self.successes.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn errors(&self) -> u64 {
        self.errors.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn snapshot(&self) -> CounterSnapshot {
        CounterSnapshot {
            successes: self.successes(),
            errors: self.errors(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CounterSnapshot {
    pub successes: u64,
    pub errors: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_counts() {
        let counters = RunCounters::new();
        let clone = counters.clone();
        assert_eq!(clone.increment_errors(), 1);
        assert_eq!(counters.increment_errors(), 2);
        counters.increment_successes();
        assert_eq!(
            clone.snapshot(),
            CounterSnapshot {
                successes: 1,
                errors: 2
            }
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_increments_are_not_lost() {
        let counters = RunCounters::new();
        let mut handles = Vec::new();
        for _ in 0..8 {
            let counters = counters.clone();
            handles.push(tokio::spawn(async move {
                for _ in 0..1000 {
                    counters.increment_successes();
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }
        assert_eq!(counters.successes(), 8000);
    }
}
