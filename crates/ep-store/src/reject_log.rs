//! Rejection log collaborator.
//!
//! One line per rejected record: UTC timestamp, batch position, reason,
//! and the offending payload as compact JSON. The file is written on every
//! run, empty when nothing was rejected, so consumers can rely on its
//! presence.

use std::fmt::Write as _;
use std::path::Path;

use chrono::Utc;
use tracing::debug;

use ep_common::{Rejection, Result};

/// Render one rejection as it appears in the log, minus the timestamp.
pub fn format_rejection(rejection: &Rejection) -> Result<String> {
    let payload = serde_json::to_string(&rejection.record)?;
    Ok(format!(
        "record {}: {}: {payload}",
        rejection.index, rejection.reason
    ))
}

/// Write the rejection log, replacing any previous one.
pub fn write_rejections(path: &Path, rejections: &[Rejection]) -> Result<()> {
    let stamp = Utc::now().format("%Y-%m-%d %H:%M:%S");
    let mut log = String::new();
    for rejection in rejections {
        let line = format_rejection(rejection)?;
        let _ = writeln!(log, "{stamp} - {line}");
    }
    std::fs::write(path, log)?;
    debug!(count = rejections.len(), path = %path.display(), "rejection log written");
    Ok(())
}
