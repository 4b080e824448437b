//! Environment overrides for the run-to-completion binary
//!
//! The binary takes no flags. Tuning knobs come from `BATCHFETCH_*`
//! variables, applied on top of the builder defaults.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use super::builder::FetchConfigBuilder;
use crate::error::{FetchError, FetchResult};

pub const ENV_POOL_WIDTH: &str = "BATCHFETCH_POOL_WIDTH";
pub const ENV_MAX_RETRIES: &str = "BATCHFETCH_MAX_RETRIES";
pub const ENV_MAX_ERRORS: &str = "BATCHFETCH_MAX_ERRORS";
pub const ENV_SETTLE_MS: &str = "BATCHFETCH_SETTLE_MS";
pub const ENV_HEADLESS: &str = "BATCHFETCH_HEADLESS";
pub const ENV_PROXY_FILE: &str = "BATCHFETCH_PROXY_FILE";
pub const ENV_CACHE_DIR: &str = "BATCHFETCH_CACHE_DIR";
pub const ENV_ERROR_CACHE_DIR: &str = "BATCHFETCH_ERROR_CACHE_DIR";

/// Proxy credentials picked up from the working directory when present
pub const DEFAULT_PROXY_FILE: &str = "proxy_cred.json";

/// Apply `BATCHFETCH_*` variables from the process environment
///
/// # Errors
/// Returns `FetchError::Config` if a variable is set to an unparseable value.
pub fn apply_env_overrides<State>(
    builder: FetchConfigBuilder<State>,
) -> FetchResult<FetchConfigBuilder<State>> {
    apply_overrides_from(builder, |name| std::env::var(name).ok())
}

/// Apply overrides from an arbitrary variable lookup
///
/// # Errors
/// Returns `FetchError::Config` if a variable is set to an unparseable value.
pub fn apply_overrides_from<State, F>(
    mut builder: FetchConfigBuilder<State>,
    lookup: F,
) -> FetchResult<FetchConfigBuilder<State>>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(width) = parse_var::<usize>(&lookup, ENV_POOL_WIDTH)? {
        builder = builder.pool_width(width);
    }
    if let Some(retries) = parse_var::<u32>(&lookup, ENV_MAX_RETRIES)? {
        builder = builder.max_retries(retries);
    }
    if let Some(max_errors) = parse_var::<u64>(&lookup, ENV_MAX_ERRORS)? {
        // 0 turns the breaker off
        builder = builder.circuit_breaker_threshold((max_errors > 0).then_some(max_errors));
    }
    if let Some(ms) = parse_var::<u64>(&lookup, ENV_SETTLE_MS)? {
        builder = builder.settle_delay_ms(ms);
    }
    if let Some(headless) = parse_var::<bool>(&lookup, ENV_HEADLESS)? {
        builder = builder.headless(headless);
    }
    if let Some(dir) = lookup(ENV_CACHE_DIR) {
        builder = builder.cache_root(dir);
    }
    if let Some(dir) = lookup(ENV_ERROR_CACHE_DIR) {
        builder = builder.error_cache_root(dir);
    }

    let proxy_file = match lookup(ENV_PROXY_FILE) {
        Some(path) if path.is_empty() => None,
        Some(path) => Some(PathBuf::from(path)),
        None => Path::new(DEFAULT_PROXY_FILE)
            .is_file()
            .then(|| PathBuf::from(DEFAULT_PROXY_FILE)),
    };
    builder = builder.proxy_credentials_path(proxy_file);

    Ok(builder)
}

fn parse_var<T>(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> FetchResult<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let Some(raw) = lookup(name) else {
        return Ok(None);
    };
    raw.trim()
        .parse::<T>()
        .map(Some)
        .map_err(|e| FetchError::Config(format!("{name}={raw:?}: {e}")))
}
