//! Structured payload extraction from captured pages
//!
//! The target pages render their data as a JSON document inside a
//! `<pre>` block. Extraction takes the text after the last opening marker
//! and before the next closing marker, parses it and returns the array
//! under the records field.

use serde_json::{Map, Value};

use crate::cache_store::SuccessArtifact;

/// One exported row
pub type Record = Map<String, Value>;

/// Where the payload sits inside captured content
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSettings {
    pub open_marker: String,
    pub close_marker: String,
    /// Field of the payload object holding the record array
    pub records_field: String,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            open_marker: "<pre>".to_string(),
            close_marker: "</pre>".to_string(),
            records_field: "ADDRLIST".to_string(),
        }
    }
}

/// Why a cached artifact produced no records
#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error("payload is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("payload has no {0:?} array")]
    MissingField(String),

    #[error("record {index} is not an object")]
    NotAnObject { index: usize },
}

/// Parse the records out of a success artifact
///
/// # Errors
/// Returns [`RecordError`] if the delimited text is not JSON, lacks the
/// records array, or holds anything other than objects in it.
pub fn extract_records(
    artifact: &SuccessArtifact,
    settings: &ExportSettings,
) -> Result<Vec<Record>, RecordError> {
    let payload = delimited_payload(&artifact.content, settings);
    let mut document: Value = serde_json::from_str(payload)?;

    let Some(Value::Array(items)) = document
        .as_object_mut()
        .and_then(|object| object.remove(&settings.records_field))
    else {
        return Err(RecordError::MissingField(settings.records_field.clone()));
    };

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| match item {
            Value::Object(record) => Ok(record),
            _ => Err(RecordError::NotAnObject { index }),
        })
        .collect()
}

fn delimited_payload<'a>(content: &'a str, settings: &ExportSettings) -> &'a str {
    let after_open = content
        .rfind(&settings.open_marker)
        .map_or(content, |at| &content[at + settings.open_marker.len()..]);
    after_open
        .find(&settings.close_marker)
        .map_or(after_open, |at| &after_open[..at])
}
