//! Flattened event-table model.
//!
//! These are the row and table types produced by the pipeline and consumed
//! by the storage layer. The table is schema-on-read: the metadata column
//! set is derived from the batch itself, so it travels with the rows.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use serde_json::Value;
use std::fmt;

/// Lead columns present in every cleaned table, before any metadata column.
pub const LEAD_COLUMNS: [&str; 3] = ["user_id", "event_type", "timestamp"];

/// Prefix applied to promoted metadata keys.
pub const METADATA_PREFIX: &str = "metadata_";

/// The metadata key that is coerced to a numeric column.
pub const AMOUNT_KEY: &str = "amount";

// ── Extraction output ───────────────────────────────────────────────────

/// A raw record that satisfied the required-field contract.
///
/// Required field values are stored trimmed; the timestamp stays textual
/// until normalization parses it under the strict policy.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidEvent {
    pub user_id: String,
    pub event_type: String,
    pub timestamp_text: String,
    /// Flat metadata mapping in document order; empty when absent.
    pub metadata: serde_json::Map<String, Value>,
}

/// Why a record failed extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// The required key is absent (or the record is not an object).
    MissingField(&'static str),
    /// The required value is empty after trimming.
    EmptyField(&'static str),
    /// The required value is present but not a JSON string.
    NonTextField(&'static str),
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::MissingField(field) => write!(f, "missing {field}"),
            RejectReason::EmptyField(field) => write!(f, "empty {field}"),
            RejectReason::NonTextField(field) => write!(f, "non-text {field}"),
        }
    }
}

/// One rejected record: the original payload, its batch position, and why.
///
/// Created during extraction, appended in input order, never mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct Rejection {
    pub index: usize,
    pub reason: RejectReason,
    pub record: Value,
}

// ── Cleaned table ───────────────────────────────────────────────────────

/// Column type for a promoted metadata key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MetaKind {
    Text,
    Number,
}

/// A promoted metadata column: the source key plus its coercion target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetaColumn {
    pub key: String,
    pub kind: MetaKind,
}

impl MetaColumn {
    pub fn new(key: impl Into<String>) -> Self {
        let key = key.into();
        let kind = if key == AMOUNT_KEY {
            MetaKind::Number
        } else {
            MetaKind::Text
        };
        MetaColumn { key, kind }
    }

    /// Column name as it appears in the output table.
    pub fn name(&self) -> String {
        format!("{METADATA_PREFIX}{}", self.key)
    }
}

/// A single cell in a metadata column.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MetaValue {
    Null,
    Text(String),
    Number(f64),
}

impl MetaValue {
    pub fn is_null(&self) -> bool {
        matches!(self, MetaValue::Null)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            MetaValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            MetaValue::Number(n) => Some(*n),
            _ => None,
        }
    }
}

/// One flattened event row.
///
/// `metadata` is parallel to the owning table's `columns`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CleanedRow {
    pub user_id: String,
    pub event_type: String,
    pub timestamp: DateTime<Utc>,
    pub metadata: Vec<MetaValue>,
}

/// The flattened, analytics-ready table: one row per valid event.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CleanedTable {
    /// Metadata columns, union of keys across the batch in first-seen order.
    pub columns: Vec<MetaColumn>,
    pub rows: Vec<CleanedRow>,
}

impl CleanedTable {
    /// An empty table: zero rows, zero metadata columns.
    pub fn empty() -> Self {
        CleanedTable {
            columns: Vec::new(),
            rows: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Full output column names: lead columns, then metadata columns.
    pub fn column_names(&self) -> Vec<String> {
        LEAD_COLUMNS
            .iter()
            .map(|c| (*c).to_string())
            .chain(self.columns.iter().map(MetaColumn::name))
            .collect()
    }

    /// Position of a metadata key among the metadata columns.
    pub fn column_index(&self, key: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.key == key)
    }
}

// ── Summaries ───────────────────────────────────────────────────────────

/// Events per type per UTC calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyEventCount {
    pub event_date: NaiveDate,
    pub event_type: String,
    pub event_count: u64,
}

/// Count of distinct users contributing at least one valid event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ActiveUserSummary {
    pub total_active_users: u64,
}

/// The user with the most events; ties go to the smallest `user_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MostActiveUser {
    pub user_id: String,
    pub event_count: u64,
}
