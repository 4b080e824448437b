//! Shared configuration constants for batchfetch
//!
//! Default values used by the config builder, the cache and the fetch engine.

/// Default worker pool width: 10 concurrent browser tabs
///
/// Each worker owns one tab for the whole run, so this is also the batch size
/// and the upper bound on concurrent navigations.
pub const DEFAULT_POOL_WIDTH: usize = 10;

/// Default retries after the first attempt (3 attempts total)
pub const DEFAULT_MAX_RETRIES: u32 = 2;

/// Timeout for a single `page.goto()` call
pub const DEFAULT_NAVIGATION_TIMEOUT_SECS: u64 = 15;

/// Timeout for the document readiness wait that follows navigation
pub const DEFAULT_READINESS_TIMEOUT_SECS: u64 = 30;

/// Dwell time after readiness so late scripts can finish rendering
///
/// This is a heuristic, not an event-complete guarantee.
pub const DEFAULT_SETTLE_DELAY_MS: u64 = 5_000;

/// Error count at which the deployment variant halts the run
pub const DEFAULT_CIRCUIT_BREAKER_THRESHOLD: u64 = 5;

/// Root directory of the success namespace
pub const CACHE_ROOT: &str = "cache";

/// Root directory of the error namespace
pub const ERROR_CACHE_ROOT: &str = "error_cache";

/// Persistent browser profile directory
pub const DEFAULT_USER_DATA_DIR: &str = "user-data-dir";

/// Prefix stripped from input file names when deriving the run label
pub const INPUT_FILE_PREFIX: &str = "start_urls_";

/// Challenge markers matched case-insensitively
pub const DEFAULT_BLOCK_MARKERS: &[&str] = &["captcha"];

/// Interstitial phrases matched exactly
pub const DEFAULT_BLOCK_PHRASES: &[&str] = &["Enable JavaScript and cookies to continue"];

/// Default desktop Chrome user agent for worker tabs
pub const CHROME_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/132.0.6834.160 Safari/537.36";

/// Desktop viewport applied to every worker tab
pub const VIEWPORT_WIDTH: i64 = 1920;
pub const VIEWPORT_HEIGHT: i64 = 1008;
