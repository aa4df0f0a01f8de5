//! The batch pipeline: extract → normalize → aggregate.
//!
//! `run_batch` is a pure function of its input; every run builds fresh
//! structures and nothing survives between runs except what the caller
//! chooses to persist.

use serde_json::Value;
use tracing::info;

use ep_common::{
    ActiveUserSummary, CleanedTable, DailyEventCount, MostActiveUser, Rejection, Result,
};

use crate::{aggregate, extract, normalize};

/// Everything one batch run produces, ready for persistence.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchOutput {
    pub table: CleanedTable,
    pub rejections: Vec<Rejection>,
    pub daily_counts: Vec<DailyEventCount>,
    pub active_users: ActiveUserSummary,
    pub most_active: Option<MostActiveUser>,
}

/// Run the full pipeline over one raw batch.
///
/// Per-record problems land in `rejections`; the only fatal condition at
/// this level is an unparsable timestamp on a record that passed
/// extraction.
pub fn run_batch(records: Vec<Value>) -> Result<BatchOutput> {
    let total = records.len();
    let extraction = extract::validate_records(records);
    info!(
        total,
        valid = extraction.valid.len(),
        rejected = extraction.rejected.len(),
        "extraction finished"
    );

    let table = normalize::normalize(&extraction.valid)?;

    let daily_counts = aggregate::daily_event_counts(&table);
    let active_users = aggregate::total_active_users(&table);
    let most_active = aggregate::most_active_user(&table);
    info!(
        rows = table.len(),
        daily_groups = daily_counts.len(),
        active_users = active_users.total_active_users,
        "aggregation finished"
    );

    Ok(BatchOutput {
        table,
        rejections: extraction.rejected,
        daily_counts,
        active_users,
        most_active,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_batch() -> Vec<Value> {
        vec![
            json!({
                "user_id": "u1",
                "event_type": "click",
                "timestamp": "2024-01-01T10:00:00Z",
                "metadata": {"screen": "home"},
            }),
            json!({
                "user_id": "u1",
                "event_type": "click",
                "timestamp": "2024-01-01T11:00:00Z",
            }),
            json!({
                "event_type": "click",
                "timestamp": "2024-01-01T12:00:00Z",
            }),
        ]
    }

    #[test]
    fn sample_batch_end_to_end() {
        let output = run_batch(sample_batch()).unwrap();

        assert_eq!(output.table.len(), 2);
        assert_eq!(output.rejections.len(), 1);
        assert_eq!(
            output.rejections[0].reason.to_string(),
            "missing user_id"
        );

        assert_eq!(output.daily_counts.len(), 1);
        let daily = &output.daily_counts[0];
        assert_eq!(daily.event_type, "click");
        assert_eq!(daily.event_date.to_string(), "2024-01-01");
        assert_eq!(daily.event_count, 2);

        assert_eq!(output.active_users.total_active_users, 1);

        let top = output.most_active.unwrap();
        assert_eq!(top.user_id, "u1");
        assert_eq!(top.event_count, 2);

        let screen = output.table.column_index("screen").unwrap();
        assert_eq!(output.table.columns[screen].name(), "metadata_screen");
        assert_eq!(output.table.rows[0].metadata[screen].as_text(), Some("home"));
        assert!(output.table.rows[1].metadata[screen].is_null());
    }

    #[test]
    fn empty_batch_end_to_end() {
        let output = run_batch(Vec::new()).unwrap();
        assert!(output.table.is_empty());
        assert_eq!(
            output.table.column_names(),
            vec!["user_id", "event_type", "timestamp"]
        );
        assert!(output.rejections.is_empty());
        assert!(output.daily_counts.is_empty());
        assert_eq!(output.active_users.total_active_users, 0);
        assert!(output.most_active.is_none());
    }

    #[test]
    fn rerun_on_same_input_is_value_identical() {
        let first = run_batch(sample_batch()).unwrap();
        let second = run_batch(sample_batch()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn unparsable_timestamp_aborts_the_run() {
        let records = vec![json!({
            "user_id": "u1",
            "event_type": "click",
            "timestamp": "yesterday",
        })];
        let err = run_batch(records).unwrap_err();
        assert_eq!(err.code(), 30);
    }
}
