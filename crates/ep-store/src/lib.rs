//! Eventpress artifact storage.
//!
//! This crate provides the pipeline's I/O collaborators:
//! - Raw batch loading (the input side)
//! - Arrow schema definitions for the output tables
//! - Parquet encoding with all-or-nothing persistence
//! - The rejection log writer
//! - Artifact inspection and rendering

pub mod inspect;
pub mod reject_log;
pub mod schema;
pub mod source;
pub mod writer;

pub use writer::RunArtifacts;
