//! Artifact schema versioning.

/// Current schema version stamped into every Parquet artifact.
///
/// Follows semver: MAJOR.MINOR.PATCH
/// - MAJOR: Breaking changes (column removals, type changes)
/// - MINOR: Additive changes (new optional columns)
/// - PATCH: Bug fixes, documentation
pub const ARTIFACT_SCHEMA_VERSION: &str = "1.0.0";

/// Check whether an artifact written under `version` can be read by this
/// build. Compatibility is major-version equality.
pub fn is_compatible(version: &str) -> bool {
    major_of(version) == major_of(ARTIFACT_SCHEMA_VERSION)
}

fn major_of(version: &str) -> Option<u32> {
    version.split('.').next()?.parse().ok()
}
