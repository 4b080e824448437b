//! Run-to-completion entry point
//!
//! Wires the configuration into a browser, a pool of tabs and the batch
//! scheduler, then tears everything down again.

use std::sync::Arc;

use log::{info, warn};

use super::block_detector::BlockDetector;
use super::progress::ProgressReporter;
use super::scheduler::{BatchScheduler, RunSummary};
use super::worker::FetchWorker;
use crate::browser_session::{ChromiumSession, CleanupResult, ProxyCredentials, shutdown_browser};
use crate::browser_setup::{BrowserSettings, launch_browser};
use crate::cache_store::CacheStore;
use crate::config::FetchConfig;
use crate::error::{FetchError, FetchResult};
use crate::input::load_jobs;

/// Fetch every job in the configured input file
///
/// A run halted by the circuit breaker still returns `Ok`; inspect
/// [`RunSummary::is_halted`].
///
/// # Errors
/// Fails before any job is dispatched if the input cannot be read, the
/// cache directories cannot be created, or the browser cannot be started.
pub async fn fetch_all(
    config: &FetchConfig,
    progress: Arc<dyn ProgressReporter>,
) -> FetchResult<RunSummary> {
    fetch_all_with_detector(config, config.block_detector(), progress).await
}

/// Like [`fetch_all`], with a caller-supplied block detector
///
/// # Errors
/// See [`fetch_all`].
pub async fn fetch_all_with_detector(
    config: &FetchConfig,
    detector: Arc<dyn BlockDetector>,
    progress: Arc<dyn ProgressReporter>,
) -> FetchResult<RunSummary> {
    let jobs = load_jobs(config.input_path())?;
    info!(
        "Loaded {} jobs from {} (run label {:?})",
        jobs.len(),
        config.input_path().display(),
        config.run_label()
    );

    let cache = CacheStore::new(
        config.cache_root(),
        config.error_cache_root(),
        config.run_label(),
    )?;

    let proxy = match config.proxy_credentials_path() {
        Some(path) => Some(
            ProxyCredentials::load(path).map_err(|e| FetchError::Config(format!("{e:#}")))?,
        ),
        None => None,
    };

    let settings = BrowserSettings {
        headless: config.headless(),
        user_data_dir: config.user_data_dir().clone(),
        user_agent: config.user_agent().to_string(),
        proxy_server: proxy.as_ref().map(|p| p.server.clone()),
    };
    let (browser, handler) = launch_browser(&settings).await?;

    let mut workers: Vec<FetchWorker<ChromiumSession>> = Vec::with_capacity(config.pool_width());
    for id in 0..config.pool_width() {
        let opened =
            ChromiumSession::open(&browser, config.resource_filter(), proxy.as_ref()).await;
        let session = match opened {
            Ok(session) => session,
            Err(e) => {
                for worker in workers {
                    worker.into_session().close().await;
                }
                shutdown_browser(browser, handler).await;
                return Err(FetchError::Browser(format!("Failed to open tab {id}: {e:#}")));
            }
        };
        workers.push(FetchWorker::new(
            id,
            session,
            cache.clone(),
            Arc::clone(&detector),
            config.retry_policy(),
            Arc::clone(&progress),
        ));
    }

    let mut scheduler = BatchScheduler::new(workers, cache, progress)?
        .with_circuit_breaker(config.circuit_breaker());
    let summary = scheduler.run(&jobs).await;

    for worker in scheduler.into_workers() {
        worker.into_session().close().await;
    }
    if let CleanupResult::PartialFailure(errors) = shutdown_browser(browser, handler).await {
        warn!("Browser shutdown incomplete: {}", errors.join("; "));
    }

    Ok(summary)
}
