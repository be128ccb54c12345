//! Error types for rustdigi-sim.

use thiserror::Error;

/// Result type for configuration and source operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Configuration loading and validation errors.
#[derive(Error, Debug)]
pub enum Error {
    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed configuration file.
    #[error("malformed run configuration: {0}")]
    Parse(#[from] serde_json::Error),

    /// Invalid configuration content.
    #[error("configuration error: {0}")]
    Config(#[from] rustdigi_core::ConfigError),
}
