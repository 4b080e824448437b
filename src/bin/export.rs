// Export captured pages of one run to CSV
//
// Reads the same input CSV the fetcher consumed, looks every key up in the
// success cache and writes feed_, errors_ and missing_<label>.csv into the
// working directory.
//
// Usage: kodegen-batchfetch-export [start_urls_<label>.csv]

use anyhow::{Context, Result};
use kodegen_tools_batchfetch::export::{ExportSettings, export_run, write_report};
use kodegen_tools_batchfetch::{CacheStore, FetchConfig, apply_env_overrides, load_jobs};
use std::path::Path;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

const DEFAULT_INPUT: &str = "start_urls.csv";

fn main() -> Result<()> {
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

    let config = apply_env_overrides(FetchConfig::builder().input_path(&input))
        .context("Invalid environment override")?
        .build()
        .context("Invalid configuration")?;

    let jobs = load_jobs(config.input_path()).context("Failed to load input")?;
    let cache = CacheStore::new(
        config.cache_root(),
        config.error_cache_root(),
        config.run_label(),
    )
    .context("Failed to open cache")?;

    let report = export_run(&jobs, &cache, &ExportSettings::default());
    let quarantined = report
        .errors
        .iter()
        .chain(&report.missing)
        .filter(|job| cache.error_exists(&job.key))
        .count();

    let paths = write_report(&report, Path::new("."), config.run_label())
        .context("Failed to write report")?;

    tracing::info!(
        records = report.records.len(),
        errors = report.errors.len(),
        missing = report.missing.len(),
        quarantined,
        feed = %paths.feed.display(),
        "Export complete"
    );
    Ok(())
}
