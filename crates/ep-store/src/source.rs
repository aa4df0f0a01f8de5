//! Input collaborator: read and parse the raw event batch.

use std::path::Path;

use serde_json::Value;
use tracing::debug;

use ep_common::{Error, Result};

/// Load the raw batch: a JSON file whose top level is a list of records.
///
/// Failure here is fatal to the run and carries the path. Per-record
/// malformation is the extractor's concern, not ours — anything inside
/// the array comes back untouched.
pub fn load_records(path: &Path) -> Result<Vec<Value>> {
    let text = std::fs::read_to_string(path).map_err(|cause| Error::SourceRead {
        path: path.display().to_string(),
        cause,
    })?;

    let parsed: Value = serde_json::from_str(&text).map_err(|cause| Error::SourceParse {
        path: path.display().to_string(),
        cause,
    })?;

    match parsed {
        Value::Array(records) => {
            debug!(count = records.len(), path = %path.display(), "raw batch loaded");
            Ok(records)
        }
        other => Err(Error::SourceShape {
            path: path.display().to_string(),
            detail: format!("expected a top-level array, got {}", json_kind(&other)),
        }),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
