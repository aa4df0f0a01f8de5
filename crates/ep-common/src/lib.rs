//! Eventpress common types, IDs, and errors.
//!
//! This crate provides foundational types shared across the pipeline crates:
//! - The flattened event-table model and summary rows
//! - Run identity for artifact provenance
//! - Common error types
//! - Output format specifications

pub mod error;
pub mod id;
pub mod model;
pub mod output;
pub mod schema;

pub use error::{Error, Result};
pub use id::RunId;
pub use model::{
    ActiveUserSummary, CleanedRow, CleanedTable, DailyEventCount, MetaColumn, MetaKind, MetaValue,
    MostActiveUser, RejectReason, Rejection, ValidEvent,
};
pub use output::OutputFormat;
pub use schema::ARTIFACT_SCHEMA_VERSION;
