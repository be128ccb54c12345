//! rustdigi-core: Core traits and types for detector hit digitization.
//!
//! This crate provides the foundational abstractions for energy-deposit
//! records, readout-channel discretization, group accumulation, and
//! centroid finalization.
//!

pub mod centroid;
pub mod error;
pub mod group;
pub mod grouping;
pub mod hit;
pub mod single;
pub mod stream;
pub mod vec3;

pub use centroid::{finalize_group, CentroidPolicy};
pub use error::{ConfigError, Error, InvalidHit, Result};
pub use group::PendingGroup;
pub use grouping::{Discretization, GroupKey};
pub use hit::{Hit, HitRecord, VolumeId};
pub use single::{SingleEvent, SinglesBatch};
pub use stream::EngineSignal;
pub use vec3::Vec3;
