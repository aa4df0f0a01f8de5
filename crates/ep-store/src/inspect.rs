//! Inspection collaborator: read persisted artifacts and render them.
//!
//! Reads each Parquet artifact back from the output directory and renders
//! the lot either as human-readable tables or as one JSON document. A
//! schema-version mismatch in an artifact's metadata is surfaced as a
//! warning, not a failure.

use std::fs::File;
use std::path::Path;

use arrow::record_batch::RecordBatch;
use arrow::util::pretty::pretty_format_batches;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::format::KeyValue;
use serde_json::Value;
use tracing::warn;

use ep_common::{schema as versioning, Error, OutputFormat, Result};
use ep_config::PARQUET_ARTIFACTS;

/// Render every artifact under `output_dir` in the requested format.
pub fn render_artifacts(output_dir: &Path, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => render_text(output_dir),
        OutputFormat::Json => render_json(output_dir),
    }
}

fn render_text(output_dir: &Path) -> Result<String> {
    let mut out = String::new();
    for name in PARQUET_ARTIFACTS {
        let batches = read_artifact(&output_dir.join(name))?;
        let table = pretty_format_batches(&batches)
            .map_err(|e| Error::Storage(format!("failed to render {name}: {e}")))?;
        out.push_str(&format!("{name}\n{table}\n\n"));
    }
    Ok(out.trim_end().to_string())
}

fn render_json(output_dir: &Path) -> Result<String> {
    let mut doc = serde_json::Map::new();
    for name in PARQUET_ARTIFACTS {
        let batches = read_artifact(&output_dir.join(name))?;
        doc.insert(artifact_key(name), batches_to_json(name, &batches)?);
    }
    Ok(serde_json::to_string_pretty(&Value::Object(doc))?)
}

/// JSON key for an artifact: the file name without its extension.
fn artifact_key(name: &str) -> String {
    name.trim_end_matches(".parquet").to_string()
}

fn batches_to_json(name: &str, batches: &[RecordBatch]) -> Result<Value> {
    let refs: Vec<&RecordBatch> = batches.iter().collect();
    let mut writer = arrow::json::ArrayWriter::new(Vec::new());
    writer
        .write_batches(&refs)
        .map_err(|e| Error::Storage(format!("failed to encode {name}: {e}")))?;
    writer
        .finish()
        .map_err(|e| Error::Storage(format!("failed to encode {name}: {e}")))?;

    let bytes = writer.into_inner();
    if bytes.is_empty() {
        // The array writer emits nothing at all for zero rows.
        return Ok(Value::Array(Vec::new()));
    }
    Ok(serde_json::from_slice(&bytes)?)
}

fn read_artifact(path: &Path) -> Result<Vec<RecordBatch>> {
    if !path.exists() {
        return Err(Error::MissingArtifact {
            path: path.display().to_string(),
        });
    }
    let file = File::open(path)?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .map_err(|e| Error::Storage(format!("failed to open {}: {e}", path.display())))?;

    check_schema_version(path, builder.metadata().file_metadata().key_value_metadata());

    let reader = builder
        .build()
        .map_err(|e| Error::Storage(format!("failed to open {}: {e}", path.display())))?;
    reader
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| Error::Storage(format!("failed to read {}: {e}", path.display())))
}

fn check_schema_version(path: &Path, metadata: Option<&Vec<KeyValue>>) {
    let version = metadata
        .and_then(|kvs| kvs.iter().find(|kv| kv.key == "schema_version"))
        .and_then(|kv| kv.value.as_deref());
    match version {
        Some(v) if versioning::is_compatible(v) => {}
        Some(v) => warn!(
            path = %path.display(),
            version = v,
            "artifact written under an incompatible schema version"
        ),
        None => warn!(path = %path.display(), "artifact carries no schema version"),
    }
}
