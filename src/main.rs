// Batch page fetcher
//
// Fetches every `key,url` row of the input CSV through a fixed pool of
// browser tabs. Re-running with the same input resumes from the cache.
//
// Usage: kodegen-batchfetch [start_urls_<label>.csv]

use anyhow::{Context, Result};
use kodegen_tools_batchfetch::utils::DEFAULT_CIRCUIT_BREAKER_THRESHOLD;
use kodegen_tools_batchfetch::{FetchConfig, LogProgress, apply_env_overrides, fetch_all};
use std::sync::Arc;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

const DEFAULT_INPUT: &str = "start_urls.csv";

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();

    let input = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_INPUT.to_string());

    // The binary runs with the breaker on; BATCHFETCH_MAX_ERRORS=0 turns it off
    let defaults = FetchConfig::builder()
        .circuit_breaker_threshold(Some(DEFAULT_CIRCUIT_BREAKER_THRESHOLD))
        .input_path(&input);
    let builder = apply_env_overrides(defaults)
        .context("Invalid environment override")?;
    let config = builder.build().context("Invalid configuration")?;

    tracing::info!(
        input = %config.input_path().display(),
        run_label = config.run_label(),
        pool_width = config.pool_width(),
        "Starting batch fetch"
    );

    let summary = fetch_all(&config, Arc::new(LogProgress))
        .await
        .context("Batch fetch failed")?;

    if let Some(reason) = summary.halt_reason {
        return Err(anyhow::Error::new(reason).context("Run halted before completion"));
    }
    Ok(())
}
