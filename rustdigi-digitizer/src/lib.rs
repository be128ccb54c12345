//! rustdigi-digitizer: The hit-to-singles digitization pipeline.
//!
//! This crate folds time-ordered energy-deposit streams into digitized
//! detector events:
//! - **Per-event trigger** - groups close at engine event boundaries
//! - **Time-window trigger** - groups close after a quiet coincidence window
//! - **Run-parallel processing** - isolated pipelines merged in run order
//!
#![warn(missing_docs)]

mod digitizer;
mod processing;
mod trigger;

pub use digitizer::{Digitizer, DigitizerConfig, DigitizerStatistics};
pub use processing::{digitize, digitize_batch, digitize_runs};
pub use trigger::FinalizeTrigger;

// Re-export core types used throughout the pipeline API
pub use rustdigi_core::{
    CentroidPolicy, Discretization, EngineSignal, GroupKey, Hit, HitRecord, SingleEvent,
    SinglesBatch,
};
