//! Exit codes for the `ep` CLI.
//!
//! Exit codes communicate run outcome without requiring output parsing.

use ep_common::Error;

/// Exit codes for `ep` operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Run complete, every record accepted
    Clean = 0,

    /// Run complete, one or more records rejected (see the rejection log)
    Rejections = 1,

    /// Configuration error
    ConfigError = 10,

    /// Input could not be read or parsed
    SourceError = 11,

    /// Transform failure (unparsable timestamp)
    TransformError = 12,

    /// Artifact storage or I/O error
    StorageError = 13,

    /// Internal/unknown error
    InternalError = 99,
}

impl ExitCode {
    /// Convert to i32 for process exit.
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Check if this exit code indicates success.
    pub fn is_success(self) -> bool {
        matches!(self, ExitCode::Clean | ExitCode::Rejections)
    }

    /// Check if this exit code indicates an error requiring attention.
    pub fn is_error(self) -> bool {
        (self as i32) >= 10
    }

    /// Map a pipeline error to its exit code family.
    pub fn from_error(error: &Error) -> Self {
        match error.code() {
            10..=19 => ExitCode::ConfigError,
            20..=29 => ExitCode::SourceError,
            30..=39 => ExitCode::TransformError,
            40..=49 | 60 => ExitCode::StorageError,
            _ => ExitCode::InternalError,
        }
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code as i32
    }
}
