//! Centroid policies and group finalization.

use crate::group::PendingGroup;
use crate::single::SingleEvent;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Position estimate computed for a finalized group.
///
/// A closed set of strategies selected once at pipeline construction; the
/// accumulation path itself is policy-free.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum CentroidPolicy {
    /// Energy-weighted mean of hit positions (readout default).
    #[default]
    EnergyWeighted,
    /// Arithmetic mean of hit positions.
    Unweighted,
    /// Position of the earliest hit.
    FirstHit,
}

/// Converts a finalized group into a digitized event.
///
/// The event timestamp is the first-hit time, matching detector dead-time
/// semantics. For the energy-weighted policy a group whose every deposit is
/// exactly zero falls back to the unweighted mean and flags the event,
/// rather than dividing by zero.
#[must_use]
pub fn finalize_group(group: &PendingGroup, policy: CentroidPolicy) -> SingleEvent {
    let count = f64::from(group.hit_count);
    let (centroid, zero_energy) = match policy {
        CentroidPolicy::EnergyWeighted => {
            if group.total_energy > 0.0 {
                (group.weighted_position / group.total_energy, false)
            } else {
                (group.position_sum / count, true)
            }
        }
        CentroidPolicy::Unweighted => (group.position_sum / count, false),
        CentroidPolicy::FirstHit => (group.first_position, false),
    };

    SingleEvent {
        key: group.key,
        total_energy: group.total_energy,
        centroid,
        time: group.first_time,
        hit_count: group.hit_count,
        zero_energy_centroid: zero_energy,
    }
}
