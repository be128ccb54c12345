//! Error types for rustdigi-core.

use crate::hit::VolumeId;
use thiserror::Error;

/// Result type alias for rustdigi operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for rustdigi operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error, fatal before any run starts.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A malformed hit was encountered.
    #[error("invalid hit: {0}")]
    InvalidHit(#[from] InvalidHit),

    /// Too many hits were dropped; the spectrum would be biased.
    #[error("dropped {dropped} of {seen} hits, above the configured limit")]
    ExcessiveDrops {
        /// Hits rejected so far.
        dropped: u64,
        /// Hits observed so far.
        seen: u64,
    },
}

/// Configuration errors.
///
/// These are surfaced before processing begins; a run never starts with an
/// invalid configuration.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// A hit's volume has no readout channel mapping and no fallback is set.
    #[error("no readout channel mapped for volume {0}")]
    UnmappedVolume(VolumeId),

    /// A numeric parameter is out of its valid domain.
    #[error("invalid {name}: {value}")]
    InvalidParameter {
        /// Name of the offending parameter.
        name: &'static str,
        /// The rejected value.
        value: f64,
    },

    /// An unrecognized particle type string.
    #[error("unknown particle type: {0}")]
    UnknownParticle(String),
}

/// Reasons a hit is rejected before accumulation.
///
/// Rejected hits are dropped and counted, never merged.
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum InvalidHit {
    /// Negative energy deposit.
    #[error("negative energy deposit: {0}")]
    NegativeEnergy(f64),

    /// NaN or infinite energy deposit.
    #[error("non-finite energy deposit")]
    NonFiniteEnergy,

    /// NaN or infinite position component.
    #[error("non-finite position")]
    NonFinitePosition,

    /// NaN, infinite, or negative timestamp.
    #[error("invalid timestamp: {0}")]
    InvalidTime(f64),
}
