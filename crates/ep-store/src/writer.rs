//! Parquet encoding and persistence for run artifacts.
//!
//! Every table is encoded to memory first; files are only written once all
//! four tables have encoded successfully, so a failed run leaves no partial
//! artifact set behind.

use std::fs;
use std::io::Cursor;
use std::path::Path;
use std::sync::Arc;

use arrow::array::{
    ArrayRef, Date32Array, Float64Array, StringArray, TimestampMillisecondArray, UInt64Array,
};
use arrow::datatypes::Schema;
use arrow::record_batch::RecordBatch;
use chrono::{Datelike, NaiveDate};
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;
use parquet::format::KeyValue;
use tracing::{debug, info};

use ep_common::{
    ActiveUserSummary, CleanedTable, DailyEventCount, Error, MetaKind, MostActiveUser, Result,
    RunId, ARTIFACT_SCHEMA_VERSION,
};
use ep_config::{
    CLEANED_EVENTS_FILE, DAILY_EVENT_COUNTS_FILE, MOST_ACTIVE_USER_FILE, TOTAL_ACTIVE_USERS_FILE,
};

use crate::schema;

/// Days from CE day 1 to the Unix epoch; Arrow `Date32` counts from the epoch.
const UNIX_EPOCH_FROM_CE: i32 = 719_163;

pub(crate) fn date32_days(date: NaiveDate) -> i32 {
    date.num_days_from_ce() - UNIX_EPOCH_FROM_CE
}

/// In-memory Parquet bytes for the four artifacts of one run.
pub struct RunArtifacts {
    pub cleaned_events: Vec<u8>,
    pub daily_event_counts: Vec<u8>,
    pub total_active_users: Vec<u8>,
    pub most_active_user: Vec<u8>,
}

impl RunArtifacts {
    /// Encode all four tables. Nothing touches the filesystem here.
    pub fn encode(
        table: &CleanedTable,
        daily_counts: &[DailyEventCount],
        active_users: &ActiveUserSummary,
        most_active: Option<&MostActiveUser>,
        run_id: &RunId,
    ) -> Result<Self> {
        let artifacts = RunArtifacts {
            cleaned_events: encode_cleaned_events(table, run_id)?,
            daily_event_counts: encode_daily_counts(daily_counts, run_id)?,
            total_active_users: encode_active_users(active_users, run_id)?,
            most_active_user: encode_most_active(most_active, run_id)?,
        };
        debug!(%run_id, "artifacts encoded");
        Ok(artifacts)
    }

    /// Write every artifact under `output_dir`, creating it if needed.
    pub fn persist(&self, output_dir: &Path) -> Result<()> {
        fs::create_dir_all(output_dir)?;
        let files = [
            (CLEANED_EVENTS_FILE, &self.cleaned_events),
            (DAILY_EVENT_COUNTS_FILE, &self.daily_event_counts),
            (TOTAL_ACTIVE_USERS_FILE, &self.total_active_users),
            (MOST_ACTIVE_USER_FILE, &self.most_active_user),
        ];
        for (name, bytes) in files {
            fs::write(output_dir.join(name), bytes)?;
        }
        info!(dir = %output_dir.display(), "artifacts persisted");
        Ok(())
    }
}

// ── Per-table encoders ──────────────────────────────────────────────────

fn encode_cleaned_events(table: &CleanedTable, run_id: &RunId) -> Result<Vec<u8>> {
    let schema = schema::cleaned_events_schema(&table.columns);

    let mut arrays: Vec<ArrayRef> = Vec::with_capacity(3 + table.columns.len());
    arrays.push(Arc::new(StringArray::from(
        table
            .rows
            .iter()
            .map(|r| r.user_id.as_str())
            .collect::<Vec<_>>(),
    )));
    arrays.push(Arc::new(StringArray::from(
        table
            .rows
            .iter()
            .map(|r| r.event_type.as_str())
            .collect::<Vec<_>>(),
    )));
    arrays.push(Arc::new(
        TimestampMillisecondArray::from(
            table
                .rows
                .iter()
                .map(|r| r.timestamp.timestamp_millis())
                .collect::<Vec<_>>(),
        )
        .with_timezone("UTC"),
    ));

    for (position, column) in table.columns.iter().enumerate() {
        let array: ArrayRef = match column.kind {
            MetaKind::Number => Arc::new(Float64Array::from(
                table
                    .rows
                    .iter()
                    .map(|r| r.metadata[position].as_number())
                    .collect::<Vec<_>>(),
            )),
            MetaKind::Text => Arc::new(StringArray::from(
                table
                    .rows
                    .iter()
                    .map(|r| r.metadata[position].as_text())
                    .collect::<Vec<_>>(),
            )),
        };
        arrays.push(array);
    }

    let batch = RecordBatch::try_new(schema.clone(), arrays)
        .map_err(|e| Error::Storage(format!("record batch build failed: {e}")))?;
    encode_single_batch(schema, &batch, run_id)
}

fn encode_daily_counts(rows: &[DailyEventCount], run_id: &RunId) -> Result<Vec<u8>> {
    let schema = schema::daily_event_counts_schema();

    let event_dates = Date32Array::from(
        rows.iter()
            .map(|r| date32_days(r.event_date))
            .collect::<Vec<_>>(),
    );
    let event_types = StringArray::from(
        rows.iter()
            .map(|r| r.event_type.as_str())
            .collect::<Vec<_>>(),
    );
    let event_counts = UInt64Array::from(rows.iter().map(|r| r.event_count).collect::<Vec<_>>());

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(event_dates),
            Arc::new(event_types),
            Arc::new(event_counts),
        ],
    )
    .map_err(|e| Error::Storage(format!("record batch build failed: {e}")))?;
    encode_single_batch(schema, &batch, run_id)
}

fn encode_active_users(summary: &ActiveUserSummary, run_id: &RunId) -> Result<Vec<u8>> {
    let schema = schema::total_active_users_schema();
    let counts = UInt64Array::from(vec![summary.total_active_users]);

    let batch = RecordBatch::try_new(schema.clone(), vec![Arc::new(counts)])
        .map_err(|e| Error::Storage(format!("record batch build failed: {e}")))?;
    encode_single_batch(schema, &batch, run_id)
}

fn encode_most_active(row: Option<&MostActiveUser>, run_id: &RunId) -> Result<Vec<u8>> {
    let schema = schema::most_active_user_schema();

    let user_ids = StringArray::from(
        row.iter()
            .map(|r| r.user_id.as_str())
            .collect::<Vec<_>>(),
    );
    let event_counts = UInt64Array::from(row.iter().map(|r| r.event_count).collect::<Vec<_>>());

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![Arc::new(user_ids), Arc::new(event_counts)],
    )
    .map_err(|e| Error::Storage(format!("record batch build failed: {e}")))?;
    encode_single_batch(schema, &batch, run_id)
}

// ── Parquet plumbing ────────────────────────────────────────────────────

fn writer_properties(run_id: &RunId) -> WriterProperties {
    let metadata = vec![
        KeyValue {
            key: "created_by".to_string(),
            value: Some("eventpress".to_string()),
        },
        KeyValue {
            key: "run_id".to_string(),
            value: Some(run_id.to_string()),
        },
        KeyValue {
            key: "schema_version".to_string(),
            value: Some(ARTIFACT_SCHEMA_VERSION.to_string()),
        },
    ];
    WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .set_key_value_metadata(Some(metadata))
        .build()
}

fn encode_single_batch(schema: Arc<Schema>, batch: &RecordBatch, run_id: &RunId) -> Result<Vec<u8>> {
    let mut cursor = Cursor::new(Vec::<u8>::new());
    let props = writer_properties(run_id);
    let mut writer = ArrowWriter::try_new(&mut cursor, schema, Some(props))
        .map_err(|e| Error::Storage(format!("parquet writer init failed: {e}")))?;
    writer
        .write(batch)
        .map_err(|e| Error::Storage(format!("parquet write failed: {e}")))?;
    writer
        .close()
        .map_err(|e| Error::Storage(format!("parquet close failed: {e}")))?;
    Ok(cursor.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use chrono::Utc;
    use ep_common::{CleanedRow, MetaColumn, MetaValue};

    fn sample_table() -> CleanedTable {
        CleanedTable {
            columns: vec![MetaColumn::new("screen"), MetaColumn::new("amount")],
            rows: vec![
                CleanedRow {
                    user_id: "u1".to_string(),
                    event_type: "click".to_string(),
                    timestamp: Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap(),
                    metadata: vec![MetaValue::Text("home".to_string()), MetaValue::Null],
                },
                CleanedRow {
                    user_id: "u2".to_string(),
                    event_type: "purchase".to_string(),
                    timestamp: Utc.with_ymd_and_hms(2024, 1, 1, 11, 0, 0).unwrap(),
                    metadata: vec![MetaValue::Null, MetaValue::Number(10.5)],
                },
            ],
        }
    }

    #[test]
    fn date32_epoch_is_zero() {
        let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap();
        assert_eq!(date32_days(epoch), 0);
        let next_day = NaiveDate::from_ymd_opt(1970, 1, 2).unwrap();
        assert_eq!(date32_days(next_day), 1);
    }

    #[test]
    fn encode_produces_parquet_magic() {
        let run_id = RunId::new();
        let artifacts = RunArtifacts::encode(
            &sample_table(),
            &[],
            &ActiveUserSummary {
                total_active_users: 2,
            },
            None,
            &run_id,
        )
        .unwrap();
        for bytes in [
            &artifacts.cleaned_events,
            &artifacts.daily_event_counts,
            &artifacts.total_active_users,
            &artifacts.most_active_user,
        ] {
            assert_eq!(&bytes[..4], b"PAR1");
        }
    }

    #[test]
    fn encode_accepts_the_empty_run() {
        let run_id = RunId::new();
        let artifacts = RunArtifacts::encode(
            &CleanedTable::empty(),
            &[],
            &ActiveUserSummary {
                total_active_users: 0,
            },
            None,
            &run_id,
        )
        .unwrap();
        assert!(!artifacts.cleaned_events.is_empty());
    }

    #[test]
    fn persist_writes_all_four_files() {
        let dir = tempfile::tempdir().unwrap();
        let run_id = RunId::new();
        let artifacts = RunArtifacts::encode(
            &sample_table(),
            &[DailyEventCount {
                event_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                event_type: "click".to_string(),
                event_count: 1,
            }],
            &ActiveUserSummary {
                total_active_users: 2,
            },
            Some(&MostActiveUser {
                user_id: "u1".to_string(),
                event_count: 1,
            }),
            &run_id,
        )
        .unwrap();

        artifacts.persist(dir.path()).unwrap();
        for name in ep_config::PARQUET_ARTIFACTS {
            assert!(dir.path().join(name).exists(), "missing {name}");
        }
    }

    #[test]
    fn persist_creates_missing_output_dir() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a/b/out");
        let run_id = RunId::new();
        let artifacts = RunArtifacts::encode(
            &CleanedTable::empty(),
            &[],
            &ActiveUserSummary {
                total_active_users: 0,
            },
            None,
            &run_id,
        )
        .unwrap();
        artifacts.persist(&nested).unwrap();
        assert!(nested.join(CLEANED_EVENTS_FILE).exists());
    }
}
