//! Test doubles for driving the fetch engine without a browser

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use anyhow::Result;
use kodegen_tools_batchfetch::{
    CacheStore, FetchWorker, Job, JobReport, JobResolution, JobRunner, MarkerBlockDetector,
    NoOpProgress, PageSession, RetryPolicy,
};
use tempfile::TempDir;

/// What a scripted URL serves
#[derive(Debug, Clone)]
pub enum ScriptedPage {
    Content(String),
    NavigationError(String),
    /// Navigation fails `failures` times, then the page serves `content`
    FailThen { failures: usize, content: String },
    /// Navigation never completes
    Hang,
}

/// URL-to-page table shared by every session built from it
///
/// Unknown URLs fail navigation like an unresolvable host.
#[derive(Clone, Default)]
pub struct PageScript {
    pages: Arc<HashMap<String, ScriptedPage>>,
    navigations: Arc<Mutex<Vec<String>>>,
}

#[allow(dead_code)]
impl PageScript {
    pub fn new(pages: impl IntoIterator<Item = (&'static str, ScriptedPage)>) -> Self {
        Self {
            pages: Arc::new(
                pages
                    .into_iter()
                    .map(|(url, page)| (url.to_string(), page))
                    .collect(),
            ),
            navigations: Arc::default(),
        }
    }

    pub fn session(&self) -> ScriptedSession {
        ScriptedSession {
            script: self.clone(),
            current: Mutex::new(None),
        }
    }

    /// Every navigation made so far, in order
    pub fn navigations(&self) -> Vec<String> {
        self.navigations.lock().unwrap().clone()
    }

    pub fn navigations_to(&self, url: &str) -> usize {
        self.navigations().iter().filter(|u| *u == url).count()
    }
}

pub struct ScriptedSession {
    script: PageScript,
    current: Mutex<Option<String>>,
}

impl PageSession for ScriptedSession {
    fn navigate(&self, url: &str) -> impl Future<Output = Result<()>> + Send {
        let url = url.to_string();
        async move {
            let attempt = {
                let mut navigations = self.script.navigations.lock().unwrap();
                navigations.push(url.clone());
                navigations.iter().filter(|u| **u == url).count()
            };
            match self.script.pages.get(&url) {
                Some(ScriptedPage::FailThen { failures, .. }) if attempt <= *failures => Err(
                    anyhow::anyhow!("net::ERR_CONNECTION_RESET at {url} (attempt {attempt})"),
                ),
                Some(ScriptedPage::Content(_) | ScriptedPage::FailThen { .. }) => {
                    *self.current.lock().unwrap() = Some(url);
                    Ok(())
                }
                Some(ScriptedPage::NavigationError(message)) => Err(anyhow::anyhow!("{message}")),
                Some(ScriptedPage::Hang) => std::future::pending::<Result<()>>().await,
                None => Err(anyhow::anyhow!("net::ERR_NAME_NOT_RESOLVED at {url}")),
            }
        }
    }

    fn wait_until_ready(&self) -> impl Future<Output = Result<()>> + Send {
        async { Ok(()) }
    }

    fn content(&self) -> impl Future<Output = Result<String>> + Send {
        async move {
            let current = self.current.lock().unwrap().clone();
            match current.and_then(|url| self.script.pages.get(&url).cloned()) {
                Some(
                    ScriptedPage::Content(content) | ScriptedPage::FailThen { content, .. },
                ) => Ok(content),
                _ => Err(anyhow::anyhow!("no document loaded")),
            }
        }
    }
}

/// Retry policy with no waiting anywhere
#[allow(dead_code)]
pub fn fast_policy(max_retries: u32) -> RetryPolicy {
    RetryPolicy {
        max_retries,
        navigation_timeout: Duration::from_secs(5),
        readiness_timeout: Duration::from_secs(5),
        settle_delay: Duration::ZERO,
        backoff: Duration::ZERO,
    }
}

/// Retry policy that gives up on navigation after `navigation_timeout`
#[allow(dead_code)]
pub fn impatient_policy(max_retries: u32, navigation_timeout: Duration) -> RetryPolicy {
    RetryPolicy {
        navigation_timeout,
        ..fast_policy(max_retries)
    }
}

/// Cache store sandboxed in a temp dir
#[allow(dead_code)]
pub fn temp_cache(label: &str) -> (TempDir, CacheStore) {
    let dir = TempDir::new().unwrap();
    let cache = CacheStore::new(dir.path().join("cache"), dir.path().join("error_cache"), label)
        .unwrap();
    (dir, cache)
}

/// `width` workers over scripted sessions sharing one cache
#[allow(dead_code)]
pub fn scripted_workers(
    script: &PageScript,
    cache: &CacheStore,
    width: usize,
    max_retries: u32,
) -> Vec<FetchWorker<ScriptedSession>> {
    scripted_workers_with_policy(script, cache, width, fast_policy(max_retries))
}

/// Like [`scripted_workers`], with an explicit retry policy
#[allow(dead_code)]
pub fn scripted_workers_with_policy(
    script: &PageScript,
    cache: &CacheStore,
    width: usize,
    policy: RetryPolicy,
) -> Vec<FetchWorker<ScriptedSession>> {
    (0..width)
        .map(|id| {
            FetchWorker::new(
                id,
                script.session(),
                cache.clone(),
                Arc::new(MarkerBlockDetector::default()),
                policy.clone(),
                Arc::new(NoOpProgress),
            )
        })
        .collect()
}

/// When one job ran on a [`TimedRunner`]
#[derive(Debug, Clone)]
pub struct Span {
    pub key: String,
    pub started: Instant,
    pub finished: Instant,
}

/// Fake runner that sleeps per job and records timing and concurrency
///
/// Keys starting with `fail` are saved to the error namespace, everything
/// else to the success namespace.
#[allow(dead_code)]
pub struct TimedRunner {
    cache: CacheStore,
    delay: fn(&Job) -> Duration,
    spans: Arc<Mutex<Vec<Span>>>,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
}

#[allow(dead_code)]
#[derive(Clone, Default)]
pub struct RunnerProbe {
    pub spans: Arc<Mutex<Vec<Span>>>,
    pub in_flight: Arc<AtomicUsize>,
    pub max_in_flight: Arc<AtomicUsize>,
}

#[allow(dead_code)]
impl RunnerProbe {
    pub fn runner(&self, cache: &CacheStore, delay: fn(&Job) -> Duration) -> TimedRunner {
        TimedRunner {
            cache: cache.clone(),
            delay,
            spans: Arc::clone(&self.spans),
            in_flight: Arc::clone(&self.in_flight),
            max_in_flight: Arc::clone(&self.max_in_flight),
        }
    }

    pub fn span(&self, key: &str) -> Span {
        self.spans
            .lock()
            .unwrap()
            .iter()
            .find(|s| s.key == key)
            .cloned()
            .unwrap_or_else(|| panic!("job {key} never ran"))
    }

    pub fn run_count(&self) -> usize {
        self.spans.lock().unwrap().len()
    }
}

impl JobRunner for TimedRunner {
    fn run(&self, job: Job) -> impl Future<Output = JobReport> + Send {
        async move {
            let started = Instant::now();
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);

            tokio::time::sleep((self.delay)(&job)).await;

            let resolution = if job.key.starts_with("fail") {
                self.cache.save_error(&job.key, "Exception: scripted failure");
                JobResolution::Failed {
                    attempts: 1,
                    error: "scripted failure".to_string(),
                }
            } else {
                self.cache.save(
                    &job.key,
                    &kodegen_tools_batchfetch::SuccessArtifact::new(job.url.clone(), "<p>ok</p>"),
                );
                JobResolution::Saved
            };

            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            self.spans.lock().unwrap().push(Span {
                key: job.key.clone(),
                started,
                finished: Instant::now(),
            });
            JobReport { job, resolution }
        }
    }
}
