//! Digitized event types and their columnar batch form.

use crate::grouping::GroupKey;
use crate::vec3::Vec3;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A digitized detector event ("single").
///
/// Formed by merging every hit that shared one readout channel within one
/// finalization window. Total energy is the exact sum of the merged
/// deposits; the centroid is computed by the configured policy.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SingleEvent {
    /// Readout channel the event was accumulated under.
    pub key: GroupKey,
    /// Summed energy deposit (MeV).
    pub total_energy: f64,
    /// Spatial estimate for the event (mm).
    pub centroid: Vec3,
    /// Event timestamp, taken from the earliest merged hit (ns).
    pub time: f64,
    /// Number of merged hits.
    pub hit_count: u32,
    /// True when the centroid fell back to the unweighted mean because
    /// every merged deposit was exactly zero.
    pub zero_energy_centroid: bool,
}

/// A batch of digitized events stored in Structure of Arrays (`SoA`) format.
///
/// This is the stable columnar record layout consumed by the output sink
/// and by downstream spectrum analysis.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SinglesBatch {
    /// Columnar storage for group keys.
    pub key: Vec<u32>,
    /// Columnar storage for total energies (MeV).
    pub energy: Vec<f64>,
    /// Columnar storage for centroid X (mm).
    pub x: Vec<f64>,
    /// Columnar storage for centroid Y (mm).
    pub y: Vec<f64>,
    /// Columnar storage for centroid Z (mm).
    pub z: Vec<f64>,
    /// Columnar storage for event timestamps (ns).
    pub time: Vec<f64>,
    /// Columnar storage for merged hit counts.
    pub hit_count: Vec<u32>,
    /// Columnar storage for the zero-energy centroid flag.
    pub zero_energy: Vec<bool>,
}

impl SinglesBatch {
    /// Creates a new empty batch with specified capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            key: Vec::with_capacity(capacity),
            energy: Vec::with_capacity(capacity),
            x: Vec::with_capacity(capacity),
            y: Vec::with_capacity(capacity),
            z: Vec::with_capacity(capacity),
            time: Vec::with_capacity(capacity),
            hit_count: Vec::with_capacity(capacity),
            zero_energy: Vec::with_capacity(capacity),
        }
    }

    /// Returns the number of events in the batch.
    #[must_use]
    pub fn len(&self) -> usize {
        self.key.len()
    }

    /// Returns true if the batch is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.key.is_empty()
    }

    /// Clears all columns.
    pub fn clear(&mut self) {
        self.key.clear();
        self.energy.clear();
        self.x.clear();
        self.y.clear();
        self.z.clear();
        self.time.clear();
        self.hit_count.clear();
        self.zero_energy.clear();
    }

    /// Pushes a single event into the batch.
    pub fn push(&mut self, event: &SingleEvent) {
        self.key.push(event.key.as_u32());
        self.energy.push(event.total_energy);
        self.x.push(event.centroid.x);
        self.y.push(event.centroid.y);
        self.z.push(event.centroid.z);
        self.time.push(event.time);
        self.hit_count.push(event.hit_count);
        self.zero_energy.push(event.zero_energy_centroid);
    }

    /// Appends all events from another batch to this one.
    pub fn append(&mut self, other: &SinglesBatch) {
        self.key.extend_from_slice(&other.key);
        self.energy.extend_from_slice(&other.energy);
        self.x.extend_from_slice(&other.x);
        self.y.extend_from_slice(&other.y);
        self.z.extend_from_slice(&other.z);
        self.time.extend_from_slice(&other.time);
        self.hit_count.extend_from_slice(&other.hit_count);
        self.zero_energy.extend_from_slice(&other.zero_energy);
    }

    /// Reconstructs the event at `index`, if in range.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<SingleEvent> {
        if index >= self.len() {
            return None;
        }
        Some(SingleEvent {
            key: GroupKey::new(self.key[index]),
            total_energy: self.energy[index],
            centroid: Vec3::new(self.x[index], self.y[index], self.z[index]),
            time: self.time[index],
            hit_count: self.hit_count[index],
            zero_energy_centroid: self.zero_energy[index],
        })
    }

    /// Sum of the energy column (MeV).
    #[must_use]
    pub fn total_energy(&self) -> f64 {
        self.energy.iter().sum()
    }

    /// Sum of the merged hit counts.
    #[must_use]
    pub fn total_hits(&self) -> u64 {
        self.hit_count.iter().map(|&n| u64::from(n)).sum()
    }
}

impl FromIterator<SingleEvent> for SinglesBatch {
    fn from_iter<I: IntoIterator<Item = SingleEvent>>(iter: I) -> Self {
        let mut batch = Self::default();
        for event in iter {
            batch.push(&event);
        }
        batch
    }
}
