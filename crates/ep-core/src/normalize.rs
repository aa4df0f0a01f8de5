//! Schema normalization and flattening.
//!
//! The metadata column set is computed up front as an explicit pass over
//! the whole batch (union of keys, first-seen order), so every row is built
//! against one fixed schema.
//!
//! Two coercion policies live here as named functions so each can be
//! tested in isolation:
//! - [`parse_utc_timestamp`] is STRICT — an unparsable timestamp fails the
//!   run, carrying the row index and the offending text.
//! - [`coerce_numeric`] is LENIENT — an uncoercible amount becomes a null
//!   cell and the run continues.

use std::collections::HashSet;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde_json::Value;
use tracing::debug;

use ep_common::{
    CleanedRow, CleanedTable, Error, MetaColumn, MetaKind, MetaValue, Result, ValidEvent,
};

/// Flatten valid events into the cleaned table.
///
/// Empty input produces the empty table: zero rows, lead columns only.
pub fn normalize(events: &[ValidEvent]) -> Result<CleanedTable> {
    let columns = metadata_columns(events);

    let mut rows = Vec::with_capacity(events.len());
    for (row, event) in events.iter().enumerate() {
        let timestamp =
            parse_utc_timestamp(&event.timestamp_text).ok_or_else(|| Error::InvalidTimestamp {
                row,
                value: event.timestamp_text.clone(),
            })?;
        let metadata = columns
            .iter()
            .map(|column| cell_for(column, event))
            .collect();
        rows.push(CleanedRow {
            user_id: event.user_id.clone(),
            event_type: event.event_type.clone(),
            timestamp,
            metadata,
        });
    }

    debug!(
        rows = rows.len(),
        metadata_columns = columns.len(),
        "batch normalized"
    );
    Ok(CleanedTable { columns, rows })
}

/// Union of metadata keys across the batch, in first-seen order.
fn metadata_columns(events: &[ValidEvent]) -> Vec<MetaColumn> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut columns = Vec::new();
    for event in events {
        for key in event.metadata.keys() {
            if seen.insert(key.as_str()) {
                columns.push(MetaColumn::new(key.clone()));
            }
        }
    }
    columns
}

fn cell_for(column: &MetaColumn, event: &ValidEvent) -> MetaValue {
    let Some(value) = event.metadata.get(&column.key) else {
        return MetaValue::Null;
    };
    match column.kind {
        MetaKind::Number => coerce_numeric(value)
            .map(MetaValue::Number)
            .unwrap_or(MetaValue::Null),
        MetaKind::Text => scalar_text(value)
            .map(MetaValue::Text)
            .unwrap_or(MetaValue::Null),
    }
}

/// Strict timestamp policy.
///
/// Accepts ISO-8601 date-times: RFC 3339 with `Z` or a numeric offset
/// (converted to UTC), or a naive `YYYY-MM-DDTHH:MM:SS[.frac]` assumed to
/// already be UTC. Anything else is `None`.
pub fn parse_utc_timestamp(text: &str) -> Option<DateTime<Utc>> {
    if let Ok(instant) = DateTime::parse_from_rfc3339(text) {
        return Some(instant.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

/// Lenient numeric policy.
///
/// JSON numbers pass through; numeric strings parse after trimming.
/// Everything else — including non-finite results — is `None`, which
/// renders as a missing cell indistinguishable from an absent key.
pub fn coerce_numeric(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|number| number.is_finite())
}

/// Text rendering for non-amount metadata cells. Scalars stringify;
/// nested values are carried as compact JSON, not normalized further.
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Array(_) | Value::Object(_) => serde_json::to_string(value).ok(),
    }
}
