pub mod browser_session;
pub mod browser_setup;
pub mod cache_store;
pub mod config;
pub mod error;
pub mod export;
pub mod fetch_engine;
pub mod input;
pub mod utils;

pub use browser_setup::{BrowserSettings, download_managed_browser, launch_browser};
pub use cache_store::{CacheStore, CounterSnapshot, NormalizedKey, RunCounters, SuccessArtifact, normalize_key};
pub use config::{FetchConfig, FetchConfigBuilder, apply_env_overrides};
pub use error::{FetchError, FetchResult};
pub use fetch_engine::{
    BatchScheduler, BlockDetector, BlockVerdict, CircuitBreaker, FetchOutcome, FetchWorker, Job,
    JobReport, JobResolution, JobRunner, LogProgress, MarkerBlockDetector, NoOpProgress,
    PageSession, ProgressReporter, RetryPolicy, RunSummary, SchedulerState, fetch_all,
};
pub use input::{load_jobs, run_label_from_path};

/// Fetch every job in `config`'s input file with structured log reporting
///
/// # Errors
/// See [`fetch_engine::fetch_all`].
pub async fn run(config: FetchConfig) -> FetchResult<RunSummary> {
    fetch_all(&config, std::sync::Arc::new(LogProgress)).await
}
