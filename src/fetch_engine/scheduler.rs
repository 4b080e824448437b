//! Batch-barrier scheduling over a fixed worker pool
//!
//! The job list is cut into consecutive batches of `pool_width` jobs. Each job
//! of a batch runs on its own task, paired with a distinct worker, and the
//! scheduler waits for the whole batch to be resolved and persisted before it
//! forms the next one. At most `pool_width` fetches are ever in flight, and a
//! slow job stalls its batch.
//!
//! ```text
//! Idle -> Dispatching -> AwaitingBatch -> Dispatching -> ... -> Done
//!                                      \-> Halted (circuit breaker)
//! ```

use futures::future::join_all;
use log::{debug, error, info};
use std::future::Future;
use std::sync::Arc;

use super::circuit_breaker::CircuitBreaker;
use super::job::{Job, JobReport, JobResolution};
use super::progress::ProgressReporter;
use super::session::PageSession;
use super::worker::FetchWorker;
use crate::cache_store::{CacheStore, CounterSnapshot};
use crate::error::{FetchError, FetchResult};

/// Anything that can resolve a job; implemented by [`FetchWorker`]
pub trait JobRunner: Send + Sync + 'static {
    fn run(&self, job: Job) -> impl Future<Output = JobReport> + Send;
}

impl<S: PageSession> JobRunner for FetchWorker<S> {
    fn run(&self, job: Job) -> impl Future<Output = JobReport> + Send {
        self.process(job)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Idle,
    Dispatching,
    AwaitingBatch,
    Done,
    Halted,
}

/// Final tally of a run
#[derive(Debug)]
pub struct RunSummary {
    /// `Done` or `Halted`
    pub state: SchedulerState,
    pub total_jobs: usize,
    /// Jobs handed to a worker (including skipped ones)
    pub dispatched: usize,
    pub batches: usize,
    pub skipped: usize,
    pub saved: usize,
    pub blocked: usize,
    pub failed: usize,
    /// Jobs fetched under a key that normalizes to empty
    pub not_persisted: usize,
    /// Cache counters at the end of the run, or at the halt
    pub counters: CounterSnapshot,
    pub halt_reason: Option<FetchError>,
}

impl RunSummary {
    fn new(total_jobs: usize) -> Self {
        Self {
            state: SchedulerState::Idle,
            total_jobs,
            dispatched: 0,
            batches: 0,
            skipped: 0,
            saved: 0,
            blocked: 0,
            failed: 0,
            not_persisted: 0,
            counters: CounterSnapshot::default(),
            halt_reason: None,
        }
    }

    fn tally(&mut self, resolution: &JobResolution) {
        match resolution {
            JobResolution::Skipped => self.skipped += 1,
            JobResolution::Saved => self.saved += 1,
            JobResolution::Blocked { .. } => self.blocked += 1,
            JobResolution::Failed { .. } => self.failed += 1,
            JobResolution::NotPersisted { .. } => self.not_persisted += 1,
        }
    }

    #[must_use]
    pub fn is_halted(&self) -> bool {
        self.state == SchedulerState::Halted
    }
}

pub struct BatchScheduler<W: JobRunner> {
    workers: Vec<Arc<W>>,
    cache: CacheStore,
    circuit_breaker: Option<CircuitBreaker>,
    progress: Arc<dyn ProgressReporter>,
    state: SchedulerState,
}

impl<W: JobRunner> BatchScheduler<W> {
    /// Create a scheduler whose pool width is `workers.len()`
    ///
    /// # Errors
    /// Returns `FetchError::Config` if `workers` is empty.
    pub fn new(
        workers: Vec<W>,
        cache: CacheStore,
        progress: Arc<dyn ProgressReporter>,
    ) -> FetchResult<Self> {
        if workers.is_empty() {
            return Err(FetchError::Config(
                "worker pool must contain at least one worker".to_string(),
            ));
        }

        Ok(Self {
            workers: workers.into_iter().map(Arc::new).collect(),
            cache,
            circuit_breaker: None,
            progress,
            state: SchedulerState::Idle,
        })
    }

    /// Halt the run once the cache's error counter reaches the breaker threshold
    #[must_use]
    pub fn with_circuit_breaker(mut self, circuit_breaker: Option<CircuitBreaker>) -> Self {
        self.circuit_breaker = circuit_breaker;
        self
    }

    #[must_use]
    pub fn pool_width(&self) -> usize {
        self.workers.len()
    }

    #[must_use]
    pub fn state(&self) -> SchedulerState {
        self.state
    }

    /// Drive every job in `jobs` through the pool, one batch at a time
    pub async fn run(&mut self, jobs: &[Job]) -> RunSummary {
        let width = self.pool_width();
        let mut summary = RunSummary::new(jobs.len());
        let mut cursor = 0;

        self.state = SchedulerState::Idle;
        self.progress.report_run_started(jobs.len(), width);

        while cursor < jobs.len() {
            if let Some(breaker) = &self.circuit_breaker
                && let Err(reason) = breaker.check(self.cache.counters())
            {
                let counters = self.cache.counters().snapshot();
                info!(
                    "Halting with {} of {} jobs undispatched",
                    jobs.len() - cursor,
                    jobs.len()
                );
                self.progress.report_halted(&reason, counters);
                self.state = SchedulerState::Halted;
                summary.halt_reason = Some(reason);
                break;
            }

            let end = (cursor + width).min(jobs.len());
            let batch = &jobs[cursor..end];
            let batch_index = summary.batches;

            self.state = SchedulerState::Dispatching;
            self.progress.report_batch_started(batch_index, batch.len());
            debug!("Dispatching batch {batch_index}: jobs {cursor}..{end}");

            let tasks: Vec<_> = self
                .workers
                .iter()
                .zip(batch.iter().cloned())
                .map(|(worker, job)| {
                    let worker = Arc::clone(worker);
                    let task_job = job.clone();
                    (job, tokio::spawn(async move { worker.run(task_job).await }))
                })
                .collect();

            self.state = SchedulerState::AwaitingBatch;
            let (batch_jobs, handles): (Vec<_>, Vec<_>) = tasks.into_iter().unzip();

            // Barrier: every job of this batch is resolved before the next batch forms
            let results = join_all(handles).await;

            for (job, result) in batch_jobs.into_iter().zip(results) {
                let report = match result {
                    Ok(report) => report,
                    Err(e) => self.resolve_crashed(job, &e),
                };
                summary.tally(&report.resolution);
            }

            summary.dispatched += batch.len();
            summary.batches += 1;
            cursor = end;

            self.progress
                .report_batch_completed(batch_index, self.cache.counters().snapshot());
        }

        if self.state != SchedulerState::Halted {
            self.state = SchedulerState::Done;
        }
        summary.state = self.state;
        summary.counters = self.cache.counters().snapshot();
        self.progress.report_completed(&summary);
        summary
    }

    /// A worker task panicked or was cancelled; the job still ends terminal
    fn resolve_crashed(&self, job: Job, e: &tokio::task::JoinError) -> JobReport {
        error!("Fetch task for {:?} failed: {e}", job.key);
        let description = format!("fetch task failed: {e}");
        self.cache
            .save_error(&job.key, &format!("Exception: {description}"));

        let report = JobReport {
            job,
            resolution: JobResolution::Failed {
                attempts: 0,
                error: description,
            },
        };
        self.progress
            .report_resolved(&report, self.cache.counters().snapshot());
        report
    }

    /// Take the workers back once the run is over
    ///
    /// Workers still referenced elsewhere are dropped with a warning.
    #[must_use]
    pub fn into_workers(self) -> Vec<W> {
        self.workers
            .into_iter()
            .filter_map(|worker| match Arc::try_unwrap(worker) {
                Ok(worker) => Some(worker),
                Err(arc) => {
                    log::warn!(
                        "Worker still has {} strong references, cleanup will happen on drop",
                        Arc::strong_count(&arc)
                    );
                    None
                }
            })
            .collect()
    }
}
