//! Batched fetch engine
//!
//! This module contains the worker, retry, classification and scheduling
//! logic that drives a fixed pool of browser tabs across a job list.

pub mod block_detector;
pub mod circuit_breaker;
pub mod execution;
pub mod failure;
pub mod job;
pub mod page_timeout;
pub mod progress;
pub mod retry;
pub mod scheduler;
pub mod session;
pub mod worker;

pub use block_detector::{BlockDetector, BlockVerdict, MarkerBlockDetector};
pub use circuit_breaker::{CircuitBreaker, CircuitState};
pub use execution::fetch_all;
pub use failure::FailureKind;
pub use job::{FetchOutcome, Job, JobReport, JobResolution};
pub use page_timeout::with_page_timeout;
pub use progress::{LogProgress, NoOpProgress, ProgressReporter};
pub use retry::RetryPolicy;
pub use scheduler::{BatchScheduler, JobRunner, RunSummary, SchedulerState};
pub use session::PageSession;
pub use worker::FetchWorker;
