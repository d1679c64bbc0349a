//! Error types for flint-ninja.

use thiserror::Error;

/// Result type for flint-ninja operations.
pub type Result<T> = std::result::Result<T, NinjaError>;

/// Errors that can occur during rule generation.
///
/// All of these are fatal: rule generation has no partial-success mode.
#[derive(Error, Debug)]
pub enum NinjaError {
    /// Failed to list a source directory or write the build file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to parse the TOML project configuration.
    #[error("Failed to parse TOML config: {0}")]
    ParseToml(#[from] toml::de::Error),
}
