//! Arrow schema definitions for the output artifacts.
//!
//! The three summary tables have fixed schemas. The cleaned event table is
//! schema-on-read: its metadata columns are derived from the batch, so its
//! schema is built per run from the table's column set.

use std::sync::Arc;

use arrow::datatypes::{DataType, Field, Schema, TimeUnit};

use ep_common::{MetaColumn, MetaKind};

/// Schema for `cleaned_events.parquet`: the three lead columns, then one
/// nullable column per promoted metadata key.
pub fn cleaned_events_schema(columns: &[MetaColumn]) -> Arc<Schema> {
    let mut fields = vec![
        Field::new("user_id", DataType::Utf8, false),
        Field::new("event_type", DataType::Utf8, false),
        Field::new(
            "timestamp",
            DataType::Timestamp(TimeUnit::Millisecond, Some("UTC".into())),
            false,
        ),
    ];
    for column in columns {
        let data_type = match column.kind {
            MetaKind::Number => DataType::Float64,
            MetaKind::Text => DataType::Utf8,
        };
        fields.push(Field::new(column.name(), data_type, true));
    }
    Arc::new(Schema::new(fields))
}

/// Schema for `daily_event_counts.parquet`.
pub fn daily_event_counts_schema() -> Arc<Schema> {
    Arc::new(Schema::new(vec![
        Field::new("event_date", DataType::Date32, false),
        Field::new("event_type", DataType::Utf8, false),
        Field::new("event_count", DataType::UInt64, false),
    ]))
}

/// Schema for `total_active_users.parquet` (always exactly one row).
pub fn total_active_users_schema() -> Arc<Schema> {
    Arc::new(Schema::new(vec![Field::new(
        "total_active_users",
        DataType::UInt64,
        false,
    )]))
}

/// Schema for `most_active_user.parquet` (zero rows or one).
pub fn most_active_user_schema() -> Arc<Schema> {
    Arc::new(Schema::new(vec![
        Field::new("user_id", DataType::Utf8, false),
        Field::new("event_count", DataType::UInt64, false),
    ]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cleaned_schema_without_metadata_has_lead_columns_only() {
        let schema = cleaned_events_schema(&[]);
        let names: Vec<&str> = schema.fields().iter().map(|f| f.name().as_str()).collect();
        assert_eq!(names, vec!["user_id", "event_type", "timestamp"]);
    }

    #[test]
    fn metadata_columns_follow_lead_columns_in_order() {
        let columns = vec![MetaColumn::new("screen"), MetaColumn::new("amount")];
        let schema = cleaned_events_schema(&columns);
        let names: Vec<&str> = schema.fields().iter().map(|f| f.name().as_str()).collect();
        assert_eq!(
            names,
            vec![
                "user_id",
                "event_type",
                "timestamp",
                "metadata_screen",
                "metadata_amount",
            ]
        );
    }

    #[test]
    fn amount_column_is_float64_and_nullable() {
        let schema = cleaned_events_schema(&[MetaColumn::new("amount")]);
        let field = schema.field(3);
        assert_eq!(field.data_type(), &DataType::Float64);
        assert!(field.is_nullable());
    }

    #[test]
    fn timestamp_column_is_utc_millis() {
        let schema = cleaned_events_schema(&[]);
        assert_eq!(
            schema.field(2).data_type(),
            &DataType::Timestamp(TimeUnit::Millisecond, Some("UTC".into()))
        );
    }

    #[test]
    fn summary_schemas_have_expected_shapes() {
        assert_eq!(daily_event_counts_schema().fields().len(), 3);
        assert_eq!(total_active_users_schema().fields().len(), 1);
        assert_eq!(most_active_user_schema().fields().len(), 2);
    }
}
