//! I/O error types.

use thiserror::Error;

/// Result type for I/O operations.
pub type Result<T> = std::result::Result<T, Error>;

/// I/O error types.
#[derive(Error, Debug)]
pub enum Error {
    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failure while publishing a finished output file.
    ///
    /// Fatal to the run; the target path is left untouched.
    #[error("failed to publish output: {0}")]
    Storage(String),

    /// Invalid file format.
    #[error("invalid file format: {0}")]
    InvalidFormat(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(#[from] rustdigi_core::ConfigError),
}
