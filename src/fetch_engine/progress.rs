//! Progress reporting abstraction for batch fetch runs
//!
//! The scheduler and workers never print. They report lifecycle events with
//! the job key, the outcome and the run counters to a `ProgressReporter`,
//! which decides where those go.

use tracing::{error, info, warn};

use super::failure::FailureKind;
use super::job::{JobReport, JobResolution};
use super::scheduler::RunSummary;
use crate::cache_store::CounterSnapshot;
use crate::error::FetchError;

/// Trait for reporting fetch progress at key lifecycle events
///
/// Implementations must be cheap: they are called from worker tasks while a
/// batch is in flight.
pub trait ProgressReporter: Send + Sync {
    /// The job list is loaded and dispatch is about to begin
    fn report_run_started(&self, total_jobs: usize, pool_width: usize);

    /// A batch of `size` jobs is being dispatched
    fn report_batch_started(&self, batch: usize, size: usize);

    /// One fetch attempt failed at the transport level
    fn report_attempt_failed(&self, key: &str, attempt: u32, kind: FailureKind, error: &str);

    /// A job reached its terminal state
    fn report_resolved(&self, report: &JobReport, counters: CounterSnapshot);

    /// Every job of the batch has been resolved
    fn report_batch_completed(&self, batch: usize, counters: CounterSnapshot);

    /// The circuit breaker stopped the run
    fn report_halted(&self, reason: &FetchError, counters: CounterSnapshot);

    /// The scheduler reached a terminal state
    fn report_completed(&self, summary: &RunSummary);
}

/// Progress reporter that does nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpProgress;

impl ProgressReporter for NoOpProgress {
    #[inline(always)]
    fn report_run_started(&self, _total_jobs: usize, _pool_width: usize) {}

    #[inline(always)]
    fn report_batch_started(&self, _batch: usize, _size: usize) {}

    #[inline(always)]
    fn report_attempt_failed(&self, _key: &str, _attempt: u32, _kind: FailureKind, _error: &str) {}

    #[inline(always)]
    fn report_resolved(&self, _report: &JobReport, _counters: CounterSnapshot) {}

    #[inline(always)]
    fn report_batch_completed(&self, _batch: usize, _counters: CounterSnapshot) {}

    #[inline(always)]
    fn report_halted(&self, _reason: &FetchError, _counters: CounterSnapshot) {}

    #[inline(always)]
    fn report_completed(&self, _summary: &RunSummary) {}
}

/// Progress reporter that emits structured `tracing` events
#[derive(Debug, Clone, Copy, Default)]
pub struct LogProgress;

impl ProgressReporter for LogProgress {
    fn report_run_started(&self, total_jobs: usize, pool_width: usize) {
        info!(
            total_jobs,
            pool_width,
            "Starting concurrent fetch: {pool_width} tabs for {total_jobs} URLs"
        );
    }

    fn report_batch_started(&self, batch: usize, size: usize) {
        info!(batch, size, "Dispatching batch");
    }

    fn report_attempt_failed(&self, key: &str, attempt: u32, kind: FailureKind, error: &str) {
        warn!(key, attempt, kind = %kind, error, "Fetch attempt failed");
    }

    fn report_resolved(&self, report: &JobReport, counters: CounterSnapshot) {
        let key = report.job.key.as_str();
        let outcome = report.resolution.label();
        match &report.resolution {
            JobResolution::Skipped => info!(key, outcome, "Already cached"),
            JobResolution::Saved => info!(
                key,
                outcome,
                successes = counters.successes,
                errors = counters.errors,
                "Saved"
            ),
            JobResolution::Blocked { marker } => warn!(
                key,
                outcome,
                marker = marker.as_str(),
                successes = counters.successes,
                errors = counters.errors,
                "Blocked page quarantined"
            ),
            JobResolution::Failed { attempts, error } => warn!(
                key,
                outcome,
                attempts,
                error = error.as_str(),
                successes = counters.successes,
                errors = counters.errors,
                "Fetch failed"
            ),
            JobResolution::NotPersisted { outcome: fetched } => warn!(
                key,
                outcome,
                fetched = *fetched,
                "Key normalizes to empty; nothing persisted"
            ),
        }
    }

    fn report_batch_completed(&self, batch: usize, counters: CounterSnapshot) {
        info!(
            batch,
            successes = counters.successes,
            errors = counters.errors,
            "Batch completed"
        );
    }

    fn report_halted(&self, reason: &FetchError, counters: CounterSnapshot) {
        error!(
            successes = counters.successes,
            errors = counters.errors,
            "Stopping for manual check: {reason}"
        );
    }

    fn report_completed(&self, summary: &RunSummary) {
        info!(
            state = ?summary.state,
            batches = summary.batches,
            saved = summary.saved,
            skipped = summary.skipped,
            blocked = summary.blocked,
            failed = summary.failed,
            not_persisted = summary.not_persisted,
            successes = summary.counters.successes,
            errors = summary.counters.errors,
            "Run finished"
        );
    }
}
