//! Job list loading
//!
//! The input is a headerless two-column CSV, `key,url`, one job per row.
//! It is read in full before scheduling begins.

use log::{debug, warn};
use std::path::Path;

use crate::error::{FetchError, FetchResult};
use crate::fetch_engine::Job;
use crate::utils::constants::INPUT_FILE_PREFIX;

/// Load every row of `path` as a [`Job`], preserving file order
///
/// Missing cells become empty strings. Rows with an empty key are still
/// returned; the cache refuses to persist them.
///
/// # Errors
/// Returns `FetchError::Input` if the file cannot be opened or a row is not valid CSV.
pub fn load_jobs(path: impl AsRef<Path>) -> FetchResult<Vec<Job>> {
    let path = path.as_ref();
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::None)
        .from_path(path)
        .map_err(|e| FetchError::Input(format!("Failed to open {}: {e}", path.display())))?;

    let mut jobs = Vec::new();
    for (line, record) in reader.records().enumerate() {
        let record = record
            .map_err(|e| FetchError::Input(format!("{}:{}: {e}", path.display(), line + 1)))?;

        let key = record.get(0).unwrap_or_default();
        let url = record.get(1).unwrap_or_default();
        if url.is_empty() {
            warn!("Row {} of {} has no URL", line + 1, path.display());
        }
        jobs.push(Job::new(key, url));
    }

    debug!("Loaded {} jobs from {}", jobs.len(), path.display());
    Ok(jobs)
}

/// Derive the run label from the input file name
///
/// `start_urls_181_200.csv` becomes `181_200`. Runs over differently named
/// inputs therefore never share cache directories.
#[must_use]
pub fn run_label_from_path(path: impl AsRef<Path>) -> String {
    let name = path
        .as_ref()
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let without_prefix = name.replace(INPUT_FILE_PREFIX, "");
    without_prefix
        .split(".csv")
        .next()
        .unwrap_or_default()
        .to_string()
}
