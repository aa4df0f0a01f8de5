//! Record-level extraction and validation.
//!
//! A raw record is valid iff `user_id`, `timestamp`, and `event_type` are
//! all present as JSON strings that remain non-empty after trimming.
//! Wrong-typed values count as invalid, never coerced. The shape (or
//! absence) of `metadata` has no bearing on validity.
//!
//! Extraction is a pure function: rejected records come back as data in
//! input order rather than being logged mid-traversal.

use serde_json::Value;
use tracing::debug;

use ep_common::{RejectReason, Rejection, ValidEvent};

/// Paired extraction output; `valid.len() + rejected.len()` always equals
/// the input length.
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    pub valid: Vec<ValidEvent>,
    pub rejected: Vec<Rejection>,
}

/// Classify every record independently. A malformed record never aborts
/// the batch; it lands in `rejected` with its position and reason.
pub fn validate_records(records: Vec<Value>) -> Extraction {
    let mut out = Extraction::default();
    for (index, record) in records.into_iter().enumerate() {
        match validate_record(&record) {
            Ok(event) => out.valid.push(event),
            Err(reason) => out.rejected.push(Rejection {
                index,
                reason,
                record,
            }),
        }
    }
    debug!(
        valid = out.valid.len(),
        rejected = out.rejected.len(),
        "batch validated"
    );
    out
}

fn validate_record(record: &Value) -> Result<ValidEvent, RejectReason> {
    let user_id = required_text(record, "user_id")?;
    let timestamp_text = required_text(record, "timestamp")?;
    let event_type = required_text(record, "event_type")?;

    let metadata = match record.get("metadata") {
        Some(Value::Object(map)) => map.clone(),
        _ => serde_json::Map::new(),
    };

    Ok(ValidEvent {
        user_id,
        event_type,
        timestamp_text,
        metadata,
    })
}

/// Fetch a required field as trimmed text, or say exactly why it fails.
fn required_text(record: &Value, field: &'static str) -> Result<String, RejectReason> {
    match record.get(field) {
        None => Err(RejectReason::MissingField(field)),
        Some(Value::String(text)) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                Err(RejectReason::EmptyField(field))
            } else {
                Ok(trimmed.to_string())
            }
        }
        Some(_) => Err(RejectReason::NonTextField(field)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn event(user_id: &str, event_type: &str) -> Value {
        json!({
            "user_id": user_id,
            "timestamp": "2024-01-01T10:00:00Z",
            "event_type": event_type,
        })
    }

    // ── Conservation and ordering ──────────────────────────────────

    #[test]
    fn valid_plus_rejected_equals_input() {
        let records = vec![
            event("u1", "click"),
            json!({"timestamp": "2024-01-01T10:00:00Z", "event_type": "click"}),
            event("u2", "view"),
            json!({"user_id": "", "timestamp": "t", "event_type": "click"}),
        ];
        let total = records.len();
        let out = validate_records(records);
        assert_eq!(out.valid.len() + out.rejected.len(), total);
    }

    #[test]
    fn input_order_is_preserved_within_each_sequence() {
        let records = vec![
            event("a", "click"),
            json!({"event_type": "click", "timestamp": "t"}),
            event("b", "view"),
            json!({"user_id": 42, "timestamp": "t", "event_type": "click"}),
        ];
        let out = validate_records(records);
        assert_eq!(out.valid[0].user_id, "a");
        assert_eq!(out.valid[1].user_id, "b");
        assert_eq!(out.rejected[0].index, 1);
        assert_eq!(out.rejected[1].index, 3);
    }

    #[test]
    fn empty_input_yields_empty_sequences() {
        let out = validate_records(Vec::new());
        assert!(out.valid.is_empty());
        assert!(out.rejected.is_empty());
    }

    // ── Rejection reasons ──────────────────────────────────────────

    #[test]
    fn missing_user_id_rejected() {
        let out = validate_records(vec![json!({
            "timestamp": "2024-01-01T10:00:00Z",
            "event_type": "click",
        })]);
        assert_eq!(out.rejected[0].reason, RejectReason::MissingField("user_id"));
    }

    #[test]
    fn empty_event_type_rejected() {
        let out = validate_records(vec![event("u1", "   ")]);
        assert_eq!(
            out.rejected[0].reason,
            RejectReason::EmptyField("event_type")
        );
    }

    #[test]
    fn numeric_user_id_rejected_not_coerced() {
        let out = validate_records(vec![json!({
            "user_id": 42,
            "timestamp": "2024-01-01T10:00:00Z",
            "event_type": "click",
        })]);
        assert_eq!(out.rejected[0].reason, RejectReason::NonTextField("user_id"));
    }

    #[test]
    fn non_object_record_rejected_as_missing_first_field() {
        let out = validate_records(vec![json!("not an object")]);
        assert_eq!(out.rejected[0].reason, RejectReason::MissingField("user_id"));
    }

    #[test]
    fn rejection_keeps_original_payload() {
        let bad = json!({"user_id": "", "timestamp": "t", "event_type": "e"});
        let out = validate_records(vec![bad.clone()]);
        assert_eq!(out.rejected[0].record, bad);
    }

    // ── Trimming ───────────────────────────────────────────────────

    #[test]
    fn padded_user_id_accepted_and_stored_trimmed() {
        let out = validate_records(vec![event("  a  ", "click")]);
        assert_eq!(out.valid.len(), 1);
        assert_eq!(out.valid[0].user_id, "a");
    }

    // ── Metadata never affects validity ────────────────────────────

    #[test]
    fn absent_metadata_is_fine() {
        let out = validate_records(vec![event("u1", "click")]);
        assert_eq!(out.valid.len(), 1);
        assert!(out.valid[0].metadata.is_empty());
    }

    #[test]
    fn non_object_metadata_is_ignored() {
        let out = validate_records(vec![json!({
            "user_id": "u1",
            "timestamp": "2024-01-01T10:00:00Z",
            "event_type": "click",
            "metadata": "not a map",
        })]);
        assert_eq!(out.valid.len(), 1);
        assert!(out.valid[0].metadata.is_empty());
    }

    #[test]
    fn flat_metadata_is_carried_through() {
        let out = validate_records(vec![json!({
            "user_id": "u1",
            "timestamp": "2024-01-01T10:00:00Z",
            "event_type": "click",
            "metadata": {"screen": "home", "amount": "10.5"},
        })]);
        let meta = &out.valid[0].metadata;
        assert_eq!(meta.len(), 2);
        assert_eq!(meta.get("screen").unwrap(), "home");
    }
}
