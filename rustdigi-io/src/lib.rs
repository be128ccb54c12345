//! rustdigi-io: Output sink and analysis exports for rustdigi.
//!
//! This crate publishes digitized singles atomically (staged temp file,
//! renamed on commit), reads the binary record format back via memory
//! mapping, and bins the energy column into exportable spectra.
//!
#![warn(missing_docs)]

mod error;
mod reader;
mod spectrum;
mod writer;

pub use error::{Error, Result};
pub use reader::SinglesFileReader;
pub use spectrum::EnergySpectrum;
pub use writer::{DataFileWriter, SINGLES_RECORD_BYTES};
