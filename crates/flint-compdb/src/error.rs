//! Error types for flint-compdb.

use thiserror::Error;

/// Result type for flint-compdb operations.
pub type Result<T> = std::result::Result<T, CompdbError>;

/// Errors that can occur while loading or writing a compilation database.
///
/// Per-source trace failures are deliberately not represented here; they
/// degrade to "no includes found" and are reported through
/// [`SourceOutcome`](crate::SourceOutcome) instead.
#[derive(Error, Debug)]
pub enum CompdbError {
    /// Failed to read or write database bytes.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to parse JSON (compile_commands.json).
    #[error("Failed to parse JSON: {0}")]
    ParseJson(#[from] serde_json::Error),
}
