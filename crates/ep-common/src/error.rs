//! Error types for Eventpress.

use thiserror::Error;

/// Result type alias for Eventpress operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type for Eventpress.
#[derive(Error, Debug)]
pub enum Error {
    // Configuration errors (10-19)
    #[error("configuration error: {0}")]
    Config(String),

    // Source errors (20-29)
    #[error("failed to read input {path}: {cause}")]
    SourceRead {
        path: String,
        #[source]
        cause: std::io::Error,
    },

    #[error("failed to parse input {path}: {cause}")]
    SourceParse {
        path: String,
        #[source]
        cause: serde_json::Error,
    },

    #[error("input {path} is not a batch: {detail}")]
    SourceShape { path: String, detail: String },

    // Transform errors (30-39)
    #[error("unparsable timestamp {value:?} in event {row}")]
    InvalidTimestamp { row: usize, value: String },

    // Storage errors (40-49)
    #[error("storage error: {0}")]
    Storage(String),

    #[error("artifact not found: {path}")]
    MissingArtifact { path: String },

    // I/O errors (60-69)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Returns the error code for this error type.
    /// Used for detailed error reporting and exit-code mapping.
    pub fn code(&self) -> u32 {
        match self {
            Error::Config(_) => 10,
            Error::SourceRead { .. } => 20,
            Error::SourceParse { .. } => 21,
            Error::SourceShape { .. } => 22,
            Error::InvalidTimestamp { .. } => 30,
            Error::Storage(_) => 40,
            Error::MissingArtifact { .. } => 41,
            Error::Io(_) => 60,
            Error::Json(_) => 61,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_group_by_family() {
        assert_eq!(Error::Config("x".into()).code(), 10);
        assert_eq!(
            Error::SourceRead {
                path: "a.json".into(),
                cause: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
            }
            .code(),
            20
        );
        assert_eq!(
            Error::InvalidTimestamp {
                row: 3,
                value: "nope".into(),
            }
            .code(),
            30
        );
        assert_eq!(Error::Storage("boom".into()).code(), 40);
    }

    #[test]
    fn invalid_timestamp_display_names_row_and_value() {
        let err = Error::InvalidTimestamp {
            row: 7,
            value: "not-a-date".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains('7'));
        assert!(msg.contains("not-a-date"));
    }

    #[test]
    fn io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: Error = io.into();
        assert_eq!(err.code(), 60);
    }
}
