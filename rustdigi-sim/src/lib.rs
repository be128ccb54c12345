//! rustdigi-sim: Run configuration and synthetic signal source.
//!
//! This crate covers the transport-engine boundary: the parameters that
//! describe a source-detector run, their validation and JSON loading, and
//! a deterministic synthetic source for tests and demo runs.
//!
#![warn(missing_docs)]

mod config;
mod error;
mod synthetic;

pub use config::{DetectorConfig, ParticleType, RunConfig, SourceConfig};
pub use error::{Error, Result};
pub use synthetic::SyntheticSource;
