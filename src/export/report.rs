//! Feed, error and missing-key reports for one run
//!
//! Every input row lands in exactly one of three buckets: parsed records,
//! cached-but-unparseable rows, or rows with nothing in the success cache.

use std::fs::File;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use serde_json::Value;

use super::records::{ExportSettings, Record, extract_records};
use crate::cache_store::CacheStore;
use crate::error::{FetchError, FetchResult};
use crate::fetch_engine::Job;

/// Pass-through column carrying the job key
pub const QUERY_FIELD: &str = "Query";
/// Pass-through column carrying the job URL
pub const URL_FIELD: &str = "Url";

/// Partitioned export of one run
#[derive(Debug, Default)]
pub struct ExportReport {
    pub records: Vec<Record>,
    /// Cached rows whose payload could not be parsed
    pub errors: Vec<Job>,
    /// Rows with no success artifact
    pub missing: Vec<Job>,
}

/// Files written by [`write_report`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportPaths {
    pub feed: PathBuf,
    pub errors: PathBuf,
    pub missing: PathBuf,
}

/// Partition `jobs` against the success cache
#[must_use]
pub fn export_run(jobs: &[Job], cache: &CacheStore, settings: &ExportSettings) -> ExportReport {
    let mut report = ExportReport::default();

    for job in jobs {
        if !cache.exists(&job.key) {
            debug!("No cached data for key {:?}", job.key);
            report.missing.push(job.clone());
            continue;
        }

        let parsed = cache
            .get(&job.key)
            .ok_or_else(|| "artifact unreadable".to_string())
            .and_then(|artifact| {
                extract_records(&artifact, settings).map_err(|e| e.to_string())
            });

        match parsed {
            Ok(records) => {
                report.records.extend(records.into_iter().map(|mut record| {
                    record.insert(QUERY_FIELD.to_string(), Value::String(job.key.clone()));
                    record.insert(URL_FIELD.to_string(), Value::String(job.url.clone()));
                    record
                }));
            }
            Err(e) => {
                warn!("Unparseable artifact for key {:?}: {e}", job.key);
                report.errors.push(job.clone());
            }
        }
    }

    info!(
        "Exported {} records, {} errors, {} missing",
        report.records.len(),
        report.errors.len(),
        report.missing.len()
    );
    report
}

/// Write `feed_<label>.csv`, `errors_<label>.csv` and `missing_<label>.csv` into `dir`
///
/// The feed has a header row with the union of record fields in first-seen
/// order. The error and missing files are headerless `key,url` rows.
///
/// # Errors
/// Returns `FetchError::Persistence` if a file cannot be written.
pub fn write_report(report: &ExportReport, dir: &Path, label: &str) -> FetchResult<ReportPaths> {
    let paths = ReportPaths {
        feed: dir.join(format!("feed_{label}.csv")),
        errors: dir.join(format!("errors_{label}.csv")),
        missing: dir.join(format!("missing_{label}.csv")),
    };

    write_feed(&report.records, &paths.feed)?;
    write_jobs(&report.errors, &paths.errors)?;
    write_jobs(&report.missing, &paths.missing)?;

    Ok(paths)
}

fn write_feed(records: &[Record], path: &Path) -> FetchResult<()> {
    let mut columns: Vec<&str> = Vec::new();
    for record in records {
        for field in record.keys() {
            if !columns.contains(&field.as_str()) {
                columns.push(field);
            }
        }
    }

    let mut writer = csv_writer(path)?;
    if !columns.is_empty() {
        writer
            .write_record(&columns)
            .map_err(|e| persistence(path, e))?;
    }
    for record in records {
        let row: Vec<String> = columns
            .iter()
            .map(|column| record.get(*column).map(cell).unwrap_or_default())
            .collect();
        writer.write_record(&row).map_err(|e| persistence(path, e))?;
    }
    writer.flush().map_err(|e| persistence(path, e.into()))
}

fn write_jobs(jobs: &[Job], path: &Path) -> FetchResult<()> {
    let mut writer = csv_writer(path)?;
    for job in jobs {
        writer
            .write_record([job.key.as_str(), job.url.as_str()])
            .map_err(|e| persistence(path, e))?;
    }
    writer.flush().map_err(|e| persistence(path, e.into()))
}

fn csv_writer(path: &Path) -> FetchResult<csv::Writer<File>> {
    csv::WriterBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .map_err(|e| persistence(path, e))
}

fn persistence(path: &Path, e: csv::Error) -> FetchError {
    FetchError::Persistence {
        path: path.to_path_buf(),
        source: e.into(),
    }
}

/// Strings are written bare, nulls as empty cells, everything else as JSON
fn cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
