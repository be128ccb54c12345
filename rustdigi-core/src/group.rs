//! Running accumulation state for one open readout channel.

use crate::grouping::GroupKey;
use crate::hit::Hit;
use crate::vec3::Vec3;

/// Accumulator for hits sharing one group key.
///
/// Owned exclusively by the digitizer while open; converted into a
/// [`crate::SingleEvent`] when its finalization trigger fires.
#[derive(Debug, Clone)]
pub struct PendingGroup {
    /// Readout channel this group accumulates under.
    pub key: GroupKey,
    /// Running sum of deposited energy (MeV).
    pub total_energy: f64,
    /// Running sum of position weighted by deposit energy.
    pub weighted_position: Vec3,
    /// Running sum of unweighted positions (zero-energy fallback).
    pub position_sum: Vec3,
    /// Position of the first merged hit.
    pub first_position: Vec3,
    /// Timestamp of the first merged hit (ns).
    pub first_time: f64,
    /// Timestamp of the latest merged hit (ns).
    pub last_time: f64,
    /// Number of merged hits.
    pub hit_count: u32,
}

impl PendingGroup {
    /// Opens a group from its first hit.
    #[must_use]
    pub fn open<H: Hit>(key: GroupKey, hit: &H) -> Self {
        let position = hit.position();
        let time = hit.time();
        Self {
            key,
            total_energy: hit.energy(),
            weighted_position: position * hit.energy(),
            position_sum: position,
            first_position: position,
            first_time: time,
            last_time: time,
            hit_count: 1,
        }
    }

    /// Folds another hit into the group.
    pub fn absorb<H: Hit>(&mut self, hit: &H) {
        let position = hit.position();
        self.total_energy += hit.energy();
        self.weighted_position += position * hit.energy();
        self.position_sum += position;
        let time = hit.time();
        if time < self.first_time {
            self.first_time = time;
            self.first_position = position;
        }
        if time > self.last_time {
            self.last_time = time;
        }
        self.hit_count += 1;
    }

    /// Time span covered by the merged hits (ns).
    #[inline]
    #[must_use]
    pub fn span(&self) -> f64 {
        self.last_time - self.first_time
    }

    /// Quiet time since the latest merged hit, relative to `now` (ns).
    #[inline]
    #[must_use]
    pub fn idle_since(&self, now: f64) -> f64 {
        now - self.last_time
    }
}
