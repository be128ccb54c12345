//! Hit traits and types for energy-deposit records.

use crate::error::InvalidHit;
use crate::vec3::Vec3;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Identifier of the physical sub-volume a hit was recorded in.
///
/// Opaque to the pipeline; the discretization mapping turns it into a
/// readout channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct VolumeId(pub u32);

impl VolumeId {
    /// Creates a new volume identifier.
    #[inline]
    #[must_use]
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    /// Returns the raw identifier.
    #[inline]
    #[must_use]
    pub fn as_u32(&self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for VolumeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Core data structure for a single energy-deposit record.
///
/// One `HitRecord` corresponds to one simulation step inside the detector.
/// Energy is in MeV, positions in millimetres, times in nanoseconds of
/// global simulation time.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct HitRecord {
    /// Energy deposited in this step (MeV).
    pub energy: f64,
    /// Post-step position (mm).
    pub position: Vec3,
    /// Global simulation time (ns).
    pub time: f64,
    /// Physical sub-volume the deposit occurred in.
    pub volume: VolumeId,
}

impl HitRecord {
    /// Creates a new hit record.
    #[inline]
    #[must_use]
    pub fn new(energy: f64, position: Vec3, time: f64, volume: VolumeId) -> Self {
        Self {
            energy,
            position,
            time,
            volume,
        }
    }
}

/// Trait for energy-deposit records.
///
/// This trait provides a common interface for different transport engines
/// to expose their hit data in a uniform way.
pub trait Hit: Send + Sync {
    /// Returns the deposited energy (MeV).
    fn energy(&self) -> f64;

    /// Returns the post-step position (mm).
    fn position(&self) -> Vec3;

    /// Returns the global simulation time (ns).
    fn time(&self) -> f64;

    /// Returns the physical sub-volume identifier.
    fn volume(&self) -> VolumeId;

    /// Validates the record before accumulation.
    ///
    /// # Errors
    /// Returns the first [`InvalidHit`] reason encountered.
    fn check(&self) -> Result<(), InvalidHit> {
        let energy = self.energy();
        if !energy.is_finite() {
            return Err(InvalidHit::NonFiniteEnergy);
        }
        if energy < 0.0 {
            return Err(InvalidHit::NegativeEnergy(energy));
        }
        if !self.position().is_finite() {
            return Err(InvalidHit::NonFinitePosition);
        }
        let time = self.time();
        if !time.is_finite() || time < 0.0 {
            return Err(InvalidHit::InvalidTime(time));
        }
        Ok(())
    }
}

impl Hit for HitRecord {
    #[inline]
    fn energy(&self) -> f64 {
        self.energy
    }

    #[inline]
    fn position(&self) -> Vec3 {
        self.position
    }

    #[inline]
    fn time(&self) -> f64 {
        self.time
    }

    #[inline]
    fn volume(&self) -> VolumeId {
        self.volume
    }
}
