//! Single job processing
//!
//! A `FetchWorker` owns one browser tab for the whole run and handles the
//! complete lifecycle of a job:
//! 1. Skip if the key is already in the success namespace
//! 2. Retry loop: navigate, wait, settle, extract, classify
//! 3. Persist the outcome to the success or error namespace
//! 4. Report the resolution

use log::{info, warn};
use std::sync::Arc;

use super::block_detector::BlockDetector;
use super::job::{FetchOutcome, Job, JobReport, JobResolution};
use super::progress::ProgressReporter;
use super::retry::RetryPolicy;
use super::session::PageSession;
use crate::cache_store::{CacheStore, NormalizedKey, SuccessArtifact};

pub struct FetchWorker<S: PageSession> {
    id: usize,
    session: S,
    cache: CacheStore,
    detector: Arc<dyn BlockDetector>,
    retry: RetryPolicy,
    progress: Arc<dyn ProgressReporter>,
}

impl<S: PageSession> FetchWorker<S> {
    #[must_use]
    pub fn new(
        id: usize,
        session: S,
        cache: CacheStore,
        detector: Arc<dyn BlockDetector>,
        retry: RetryPolicy,
        progress: Arc<dyn ProgressReporter>,
    ) -> Self {
        Self {
            id,
            session,
            cache,
            detector,
            retry,
            progress,
        }
    }

    /// Give the tab back, e.g. to close it at the end of the run
    #[must_use]
    pub fn into_session(self) -> S {
        self.session
    }

    /// Resolve one job end to end
    pub async fn process(&self, job: Job) -> JobReport {
        if self.cache.exists(&job.key) {
            info!("[SKIP] Already cached: {}", job.key);
            return self.resolve(job, JobResolution::Skipped);
        }

        info!("[worker {}] Fetching {:?} => {}", self.id, job.key, job.url);

        let outcome = self
            .retry
            .attempt_fetch(&self.session, &job, self.detector.as_ref(), self.progress.as_ref())
            .await;

        let resolution = self.persist(&job, outcome);
        self.resolve(job, resolution)
    }

    fn persist(&self, job: &Job, outcome: FetchOutcome) -> JobResolution {
        if let Some(err) = outcome.error() {
            warn!("[worker {}] {:?}: {err}", self.id, job.key);
        }

        // Nothing can be stored under an empty file name
        if NormalizedKey::new(&job.key).is_empty() {
            warn!(
                "[worker {}] Key {:?} normalizes to empty; {} outcome not persisted",
                self.id,
                job.key,
                outcome.label()
            );
            return JobResolution::NotPersisted {
                outcome: outcome.label(),
            };
        }

        if let Some(blob) = outcome.error_blob() {
            self.cache.save_error(&job.key, &blob);
        }

        match outcome {
            FetchOutcome::Success { content } => {
                self.cache
                    .save(&job.key, &SuccessArtifact::captured_now(job.url.clone(), content));
                JobResolution::Saved
            }
            FetchOutcome::Blocked { marker, .. } => JobResolution::Blocked { marker },
            FetchOutcome::Failed {
                last_error,
                attempts,
            } => JobResolution::Failed {
                attempts,
                error: format!("{last_error:#}"),
            },
        }
    }

    fn resolve(&self, job: Job, resolution: JobResolution) -> JobReport {
        let report = JobReport { job, resolution };
        self.progress
            .report_resolved(&report, self.cache.counters().snapshot());
        report
    }
}
