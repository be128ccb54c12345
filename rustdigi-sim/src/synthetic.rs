//! Deterministic synthetic signal source.
//!
//! Stands in for the transport engine in tests, benchmarks, and demo runs:
//! every primary produces one deposit on the detector plane, followed by an
//! end-of-event boundary. Streams are reproducible for a given seed.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use rustdigi_core::{EngineSignal, HitRecord, Vec3, VolumeId};

use crate::config::RunConfig;

/// Fraction of the source energy below which deposits are not sampled.
/// Matches the full-energy-peak analysis window of the slab experiment.
const DEPOSIT_WINDOW_FRACTION: f64 = 0.75;

/// Spacing between consecutive primaries on the simulation clock (ns).
const PRIMARY_PERIOD_NS: f64 = 1_000.0;

/// Generator of single-deposit primaries over a disc-shaped beam spot.
///
/// Implements `Iterator<Item = EngineSignal<HitRecord>>`; each primary
/// yields `Hit` then `EndOfEvent`, with non-decreasing timestamps.
pub struct SyntheticSource {
    rng: StdRng,
    remaining: u64,
    deposit_lo: f64,
    deposit_hi: f64,
    disc_radius: f64,
    plane_z: f64,
    volume: VolumeId,
    clock: f64,
    pending_boundary: bool,
}

impl SyntheticSource {
    /// Creates a source from a validated run configuration.
    #[must_use]
    pub fn from_config(config: &RunConfig, seed: u64) -> Self {
        let energy = config.source.energy_mev;
        Self {
            rng: StdRng::seed_from_u64(seed),
            remaining: config.source.primaries,
            deposit_lo: energy * DEPOSIT_WINDOW_FRACTION,
            deposit_hi: energy,
            disc_radius: config.source.disc_radius_mm,
            plane_z: config.detector.distance_cm * 10.0,
            volume: VolumeId::new(0),
            clock: 0.0,
            pending_boundary: false,
        }
    }

    /// Overrides the deposit sampling range (MeV).
    #[must_use]
    pub fn with_deposit_range(mut self, lo: f64, hi: f64) -> Self {
        self.deposit_lo = lo;
        self.deposit_hi = hi;
        self
    }

    /// Number of primaries still to be generated.
    #[must_use]
    pub fn remaining(&self) -> u64 {
        self.remaining
    }

    fn sample_hit(&mut self) -> HitRecord {
        // Uniform over the disc: radius needs the sqrt transform.
        let radius = self.disc_radius * self.rng.random::<f64>().sqrt();
        let theta = self.rng.random_range(0.0..std::f64::consts::TAU);
        let energy = self.rng.random_range(self.deposit_lo..=self.deposit_hi);

        let position = Vec3::new(radius * theta.cos(), radius * theta.sin(), self.plane_z);
        let hit = HitRecord::new(energy, position, self.clock, self.volume);
        self.clock += PRIMARY_PERIOD_NS;
        hit
    }
}

impl Iterator for SyntheticSource {
    type Item = EngineSignal<HitRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.pending_boundary {
            self.pending_boundary = false;
            return Some(EngineSignal::EndOfEvent);
        }
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        self.pending_boundary = true;
        Some(EngineSignal::Hit(self.sample_hit()))
    }
}
