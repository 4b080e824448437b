//! Downstream export of captured pages to CSV reports

pub mod records;
pub mod report;

pub use records::{ExportSettings, Record, RecordError, extract_records};
pub use report::{ExportReport, QUERY_FIELD, ReportPaths, URL_FIELD, export_run, write_report};
