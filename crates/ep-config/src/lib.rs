//! Eventpress configuration resolution.
//!
//! This crate provides:
//! - The resolved `Config` for a pipeline run
//! - Resolution order: CLI flags → environment → defaults
//! - Artifact file-name constants shared by the writer and inspector
//! - Semantic validation of the resolved paths

use serde::Serialize;
use std::path::PathBuf;

use ep_common::{Error, Result};

// ── Artifact layout ─────────────────────────────────────────────────────

/// Cleaned event table artifact.
pub const CLEANED_EVENTS_FILE: &str = "cleaned_events.parquet";

/// Per-day-per-type counts artifact.
pub const DAILY_EVENT_COUNTS_FILE: &str = "daily_event_counts.parquet";

/// Distinct active-user count artifact.
pub const TOTAL_ACTIVE_USERS_FILE: &str = "total_active_users.parquet";

/// Most-active-user artifact.
pub const MOST_ACTIVE_USER_FILE: &str = "most_active_user.parquet";

/// Rejection log, one line per rejected record.
pub const REJECT_LOG_FILE: &str = "malformed_events.log";

/// All Parquet artifacts, in the order they are written and inspected.
pub const PARQUET_ARTIFACTS: [&str; 4] = [
    CLEANED_EVENTS_FILE,
    DAILY_EVENT_COUNTS_FILE,
    TOTAL_ACTIVE_USERS_FILE,
    MOST_ACTIVE_USER_FILE,
];

// ── Defaults and environment ────────────────────────────────────────────

pub const DEFAULT_INPUT_FILE: &str = "raw_data/raw_events.json";
pub const DEFAULT_OUTPUT_DIR: &str = "output";

pub const ENV_INPUT: &str = "EP_INPUT";
pub const ENV_OUTPUT_DIR: &str = "EP_OUTPUT_DIR";

// ── Config ──────────────────────────────────────────────────────────────

/// Resolved configuration for one pipeline run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Config {
    /// Path of the raw JSON batch.
    pub input_path: PathBuf,
    /// Directory receiving the Parquet artifacts and rejection log.
    pub output_dir: PathBuf,
}

impl Config {
    /// Resolve configuration from CLI values, the process environment, and
    /// built-in defaults, in that precedence order.
    pub fn resolve(cli_input: Option<PathBuf>, cli_output_dir: Option<PathBuf>) -> Self {
        Self::resolve_with(cli_input, cli_output_dir, |name| std::env::var(name).ok())
    }

    /// Resolution with an explicit environment lookup, for tests.
    pub fn resolve_with(
        cli_input: Option<PathBuf>,
        cli_output_dir: Option<PathBuf>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Self {
        let input_path = cli_input
            .or_else(|| env(ENV_INPUT).map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_INPUT_FILE));
        let output_dir = cli_output_dir
            .or_else(|| env(ENV_OUTPUT_DIR).map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR));
        Config {
            input_path,
            output_dir,
        }
    }

    /// Semantic validation of the resolved paths.
    ///
    /// The input file is allowed to be absent here (the source collaborator
    /// reports that with full context); the output directory must not
    /// collide with an existing non-directory.
    pub fn validate(&self) -> Result<()> {
        if self.input_path.as_os_str().is_empty() {
            return Err(Error::Config("input path is empty".to_string()));
        }
        if self.output_dir.as_os_str().is_empty() {
            return Err(Error::Config("output directory is empty".to_string()));
        }
        if self.output_dir.exists() && !self.output_dir.is_dir() {
            return Err(Error::Config(format!(
                "output path {} exists and is not a directory",
                self.output_dir.display()
            )));
        }
        Ok(())
    }

    /// Path of a named artifact under the output directory.
    pub fn artifact_path(&self, name: &str) -> PathBuf {
        self.output_dir.join(name)
    }

    /// Path of the rejection log.
    pub fn reject_log_path(&self) -> PathBuf {
        self.artifact_path(REJECT_LOG_FILE)
    }
}
