//! Type-safe builder for `FetchConfig` using the typestate pattern
//!
//! `build()` only exists once an input path has been supplied.

use std::marker::PhantomData;
use std::path::PathBuf;

use super::types::FetchConfig;
use crate::error::{FetchError, FetchResult};
use crate::input::run_label_from_path;
use crate::utils::constants::{
    CACHE_ROOT, CHROME_USER_AGENT, DEFAULT_BLOCK_MARKERS, DEFAULT_BLOCK_PHRASES,
    DEFAULT_MAX_RETRIES, DEFAULT_NAVIGATION_TIMEOUT_SECS, DEFAULT_POOL_WIDTH,
    DEFAULT_READINESS_TIMEOUT_SECS, DEFAULT_SETTLE_DELAY_MS, DEFAULT_USER_DATA_DIR,
    ERROR_CACHE_ROOT,
};

// Type states for the builder
pub struct WithInputPath;

pub struct FetchConfigBuilder<State = ()> {
    pub(crate) input_path: Option<PathBuf>,
    pub(crate) run_label: Option<String>,
    pub(crate) cache_root: PathBuf,
    pub(crate) error_cache_root: PathBuf,
    pub(crate) pool_width: usize,
    pub(crate) max_retries: u32,
    pub(crate) navigation_timeout_secs: u64,
    pub(crate) readiness_timeout_secs: u64,
    pub(crate) settle_delay_ms: u64,
    pub(crate) retry_backoff_ms: u64,
    pub(crate) circuit_breaker_threshold: Option<u64>,
    pub(crate) block_markers: Vec<String>,
    pub(crate) block_phrases: Vec<String>,
    pub(crate) block_heavy_resources: bool,
    pub(crate) headless: bool,
    pub(crate) user_data_dir: PathBuf,
    pub(crate) user_agent: String,
    pub(crate) proxy_credentials_path: Option<PathBuf>,
    pub(crate) _phantom: PhantomData<State>,
}

impl Default for FetchConfigBuilder<()> {
    fn default() -> Self {
        Self {
            input_path: None,
            run_label: None,
            cache_root: PathBuf::from(CACHE_ROOT),
            error_cache_root: PathBuf::from(ERROR_CACHE_ROOT),
            pool_width: DEFAULT_POOL_WIDTH,
            max_retries: DEFAULT_MAX_RETRIES,
            navigation_timeout_secs: DEFAULT_NAVIGATION_TIMEOUT_SECS,
            readiness_timeout_secs: DEFAULT_READINESS_TIMEOUT_SECS,
            settle_delay_ms: DEFAULT_SETTLE_DELAY_MS,
            retry_backoff_ms: 0,
            circuit_breaker_threshold: None,
            block_markers: DEFAULT_BLOCK_MARKERS.iter().map(ToString::to_string).collect(),
            block_phrases: DEFAULT_BLOCK_PHRASES.iter().map(ToString::to_string).collect(),
            block_heavy_resources: true,
            headless: true,
            user_data_dir: PathBuf::from(DEFAULT_USER_DATA_DIR),
            user_agent: CHROME_USER_AGENT.to_string(),
            proxy_credentials_path: None,
            _phantom: PhantomData,
        }
    }
}

impl FetchConfig {
    /// Create a builder for configuring a `FetchConfig` with a fluent interface
    #[must_use]
    pub fn builder() -> FetchConfigBuilder<()> {
        FetchConfigBuilder::default()
    }
}

impl FetchConfigBuilder<()> {
    pub fn input_path(self, path: impl Into<PathBuf>) -> FetchConfigBuilder<WithInputPath> {
        FetchConfigBuilder {
            input_path: Some(path.into()),
            run_label: self.run_label,
            cache_root: self.cache_root,
            error_cache_root: self.error_cache_root,
            pool_width: self.pool_width,
            max_retries: self.max_retries,
            navigation_timeout_secs: self.navigation_timeout_secs,
            readiness_timeout_secs: self.readiness_timeout_secs,
            settle_delay_ms: self.settle_delay_ms,
            retry_backoff_ms: self.retry_backoff_ms,
            circuit_breaker_threshold: self.circuit_breaker_threshold,
            block_markers: self.block_markers,
            block_phrases: self.block_phrases,
            block_heavy_resources: self.block_heavy_resources,
            headless: self.headless,
            user_data_dir: self.user_data_dir,
            user_agent: self.user_agent,
            proxy_credentials_path: self.proxy_credentials_path,
            _phantom: PhantomData,
        }
    }
}

// Build method only available when the input path is set
impl FetchConfigBuilder<WithInputPath> {
    /// Validate and build the configuration
    ///
    /// # Errors
    /// Returns `FetchError::Config` for a zero pool width, a zero circuit
    /// breaker threshold, or an empty run label.
    pub fn build(self) -> FetchResult<FetchConfig> {
        let input_path = self
            .input_path
            .ok_or_else(|| FetchError::Config("input_path is required".to_string()))?;

        if self.pool_width == 0 {
            return Err(FetchError::Config("pool_width must be at least 1".to_string()));
        }

        if self.circuit_breaker_threshold == Some(0) {
            return Err(FetchError::Config(
                "circuit_breaker_threshold must be at least 1".to_string(),
            ));
        }

        let run_label = self
            .run_label
            .unwrap_or_else(|| run_label_from_path(&input_path));
        if run_label.trim().is_empty() {
            return Err(FetchError::Config(format!(
                "cannot derive a run label from {}",
                input_path.display()
            )));
        }

        Ok(FetchConfig {
            input_path,
            run_label,
            cache_root: self.cache_root,
            error_cache_root: self.error_cache_root,
            pool_width: self.pool_width,
            max_retries: self.max_retries,
            navigation_timeout_secs: self.navigation_timeout_secs,
            readiness_timeout_secs: self.readiness_timeout_secs,
            settle_delay_ms: self.settle_delay_ms,
            retry_backoff_ms: self.retry_backoff_ms,
            circuit_breaker_threshold: self.circuit_breaker_threshold,
            block_markers: self.block_markers,
            block_phrases: self.block_phrases,
            block_heavy_resources: self.block_heavy_resources,
            headless: self.headless,
            user_data_dir: self.user_data_dir,
            user_agent: self.user_agent,
            proxy_credentials_path: self.proxy_credentials_path,
        })
    }
}

// Builder methods available at any state
impl<State> FetchConfigBuilder<State> {
    /// Override the run label derived from the input file name
    #[must_use]
    pub fn run_label(mut self, label: impl Into<String>) -> Self {
        self.run_label = Some(label.into());
        self
    }

    #[must_use]
    pub fn cache_root(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cache_root = dir.into();
        self
    }

    #[must_use]
    pub fn error_cache_root(mut self, dir: impl Into<PathBuf>) -> Self {
        self.error_cache_root = dir.into();
        self
    }

    /// Set the number of concurrent tabs (and the batch size)
    #[must_use]
    pub fn pool_width(mut self, width: usize) -> Self {
        self.pool_width = width;
        self
    }

    /// Set retries after the first attempt
    ///
    /// Set to 0 to make every transport failure terminal.
    #[must_use]
    pub fn max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    #[must_use]
    pub fn navigation_timeout_secs(mut self, secs: u64) -> Self {
        self.navigation_timeout_secs = secs;
        self
    }

    #[must_use]
    pub fn readiness_timeout_secs(mut self, secs: u64) -> Self {
        self.readiness_timeout_secs = secs;
        self
    }

    #[must_use]
    pub fn settle_delay_ms(mut self, ms: u64) -> Self {
        self.settle_delay_ms = ms;
        self
    }

    #[must_use]
    pub fn retry_backoff_ms(mut self, ms: u64) -> Self {
        self.retry_backoff_ms = ms;
        self
    }

    /// Halt the run once `threshold` errors have been recorded
    ///
    /// # Example
    /// ```rust
    /// # use kodegen_tools_batchfetch::config::FetchConfig;
    /// # fn main() -> Result<(), kodegen_tools_batchfetch::FetchError> {
    /// let config = FetchConfig::builder()
    ///     .input_path("start_urls_181_200.csv")
    ///     .circuit_breaker_threshold(Some(5))
    ///     .build()?;
    /// assert_eq!(config.circuit_breaker_threshold(), Some(5));
    /// # Ok(())
    /// # }
    /// ```
    #[must_use]
    pub fn circuit_breaker_threshold(mut self, threshold: Option<u64>) -> Self {
        self.circuit_breaker_threshold = threshold;
        self
    }

    #[must_use]
    pub fn block_markers(mut self, markers: Vec<String>) -> Self {
        self.block_markers = markers;
        self
    }

    #[must_use]
    pub fn block_phrases(mut self, phrases: Vec<String>) -> Self {
        self.block_phrases = phrases;
        self
    }

    #[must_use]
    pub fn block_heavy_resources(mut self, block: bool) -> Self {
        self.block_heavy_resources = block;
        self
    }

    #[must_use]
    pub fn headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    #[must_use]
    pub fn user_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.user_data_dir = dir.into();
        self
    }

    #[must_use]
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    #[must_use]
    pub fn proxy_credentials_path(mut self, path: Option<PathBuf>) -> Self {
        self.proxy_credentials_path = path;
        self
    }
}
