//! Eventpress batch pipeline core.
//!
//! Three pure stages composed sequentially:
//! - `extract` — record-level validation, paired (valid, rejected) output
//! - `normalize` — flattening into a typed table with coerced values
//! - `aggregate` — the three independent summary views
//!
//! No stage performs I/O or keeps state between runs; reading the raw batch
//! and persisting artifacts belong to `ep-store`.

pub mod aggregate;
pub mod exit_codes;
pub mod extract;
pub mod normalize;
pub mod pipeline;

pub use exit_codes::ExitCode;
pub use pipeline::{run_batch, BatchOutput};
