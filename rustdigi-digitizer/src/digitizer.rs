//! The hit-to-singles digitization state machine.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use rustdigi_core::{
    finalize_group, CentroidPolicy, Discretization, Error, GroupKey, Hit, PendingGroup, Result,
    SingleEvent,
};

use crate::trigger::FinalizeTrigger;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Drop-rate enforcement starts after this many observed hits, so a single
/// bad record in a short stream does not abort the run.
const DROP_RATE_MIN_SAMPLE: u64 = 100;

/// Configuration for the digitization pipeline.
///
/// All policies are fixed at construction; the accumulation path never
/// re-dispatches on configuration strings.
#[derive(Debug, Clone)]
pub struct DigitizerConfig {
    /// Mapping from physical volumes to readout channels.
    pub discretization: Discretization,
    /// Position estimate computed at finalization.
    pub centroid: CentroidPolicy,
    /// When open groups are finalized.
    pub trigger: FinalizeTrigger,
    /// Maximum tolerated fraction of dropped hits before the run aborts.
    pub max_invalid_fraction: f64,
}

impl Default for DigitizerConfig {
    fn default() -> Self {
        Self {
            discretization: Discretization::Identity,
            centroid: CentroidPolicy::EnergyWeighted,
            trigger: FinalizeTrigger::PerEvent,
            max_invalid_fraction: 0.01,
        }
    }
}

impl DigitizerConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the discretization mapping.
    #[must_use]
    pub fn with_discretization(mut self, discretization: Discretization) -> Self {
        self.discretization = discretization;
        self
    }

    /// Sets the centroid policy.
    #[must_use]
    pub fn with_centroid(mut self, centroid: CentroidPolicy) -> Self {
        self.centroid = centroid;
        self
    }

    /// Sets the finalization trigger.
    #[must_use]
    pub fn with_trigger(mut self, trigger: FinalizeTrigger) -> Self {
        self.trigger = trigger;
        self
    }

    /// Sets the tolerated invalid-hit fraction.
    #[must_use]
    pub fn with_max_invalid_fraction(mut self, fraction: f64) -> Self {
        self.max_invalid_fraction = fraction;
        self
    }
}

/// Counters accumulated over one digitization run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DigitizerStatistics {
    /// Hits observed, valid or not.
    pub hits_seen: u64,
    /// Hits folded into a group.
    pub hits_merged: u64,
    /// Hits rejected by validation and dropped.
    pub invalid_dropped: u64,
    /// End-of-event boundaries observed.
    pub events_observed: u64,
    /// Digitized events emitted.
    pub singles_emitted: u64,
}

impl DigitizerStatistics {
    /// Folds another run's counters into this one.
    pub fn merge(&mut self, other: &DigitizerStatistics) {
        self.hits_seen += other.hits_seen;
        self.hits_merged += other.hits_merged;
        self.invalid_dropped += other.invalid_dropped;
        self.events_observed += other.events_observed;
        self.singles_emitted += other.singles_emitted;
    }
}

/// Streaming digitizer for one simulation run.
///
/// Owns the set of open groups, keyed by readout channel. Hits must arrive
/// in non-decreasing timestamp order within the run; independent runs use
/// independent `Digitizer` instances (the key space is run-local).
///
/// Open groups live in a `BTreeMap` so every flush emits in key order and
/// re-running the same stream reproduces the output exactly.
pub struct Digitizer {
    config: DigitizerConfig,
    open: BTreeMap<GroupKey, PendingGroup>,
    stats: DigitizerStatistics,
}

impl Digitizer {
    /// Creates a digitizer with the given configuration.
    #[must_use]
    pub fn new(config: DigitizerConfig) -> Self {
        Self {
            config,
            open: BTreeMap::new(),
            stats: DigitizerStatistics::default(),
        }
    }

    /// Processes one hit, emitting any events finalized along the way.
    ///
    /// Malformed hits are dropped and counted, never merged. Finalized
    /// events (time-window expiry) are appended to `out`.
    ///
    /// # Errors
    /// Returns [`Error::ExcessiveDrops`] when the drop fraction exceeds the
    /// configured limit, or a configuration error for an unmapped volume.
    pub fn accept<H: Hit>(&mut self, hit: &H, out: &mut Vec<SingleEvent>) -> Result<()> {
        self.stats.hits_seen += 1;

        if hit.check().is_err() {
            self.stats.invalid_dropped += 1;
            return self.check_drop_rate();
        }

        let key = self.config.discretization.resolve(hit.volume())?;

        if let FinalizeTrigger::TimeWindow { window_ns } = self.config.trigger {
            self.expire_aged(hit.time(), window_ns, out);
        }

        match self.open.entry(key) {
            Entry::Occupied(mut entry) => entry.get_mut().absorb(hit),
            Entry::Vacant(entry) => {
                entry.insert(PendingGroup::open(key, hit));
            }
        }
        self.stats.hits_merged += 1;
        Ok(())
    }

    /// Handles the engine's end-of-event boundary.
    ///
    /// Under the per-event trigger every open group finalizes here; under
    /// the time-window trigger the boundary is only counted.
    pub fn end_of_event(&mut self, out: &mut Vec<SingleEvent>) {
        self.stats.events_observed += 1;
        if matches!(self.config.trigger, FinalizeTrigger::PerEvent) {
            self.flush_open(out);
        }
    }

    /// Finalizes every group still open at the end of the run.
    pub fn finish(&mut self, out: &mut Vec<SingleEvent>) {
        self.flush_open(out);
    }

    /// Returns the counters accumulated so far.
    #[must_use]
    pub fn statistics(&self) -> &DigitizerStatistics {
        &self.stats
    }

    /// Number of groups currently open.
    #[must_use]
    pub fn open_groups(&self) -> usize {
        self.open.len()
    }

    fn emit(&mut self, group: &PendingGroup, out: &mut Vec<SingleEvent>) {
        out.push(finalize_group(group, self.config.centroid));
        self.stats.singles_emitted += 1;
    }

    fn flush_open(&mut self, out: &mut Vec<SingleEvent>) {
        let open = std::mem::take(&mut self.open);
        for group in open.values() {
            self.emit(group, out);
        }
    }

    /// Closes groups whose channel has been quiet for longer than the
    /// coincidence window. Valid because hits arrive in non-decreasing
    /// time order, so `now` never moves backwards.
    fn expire_aged(&mut self, now: f64, window_ns: f64, out: &mut Vec<SingleEvent>) {
        let expired: Vec<GroupKey> = self
            .open
            .iter()
            .filter(|(_, group)| group.idle_since(now) > window_ns)
            .map(|(&key, _)| key)
            .collect();

        for key in expired {
            if let Some(group) = self.open.remove(&key) {
                self.emit(&group, out);
            }
        }
    }

    fn check_drop_rate(&self) -> Result<()> {
        if self.stats.hits_seen < DROP_RATE_MIN_SAMPLE {
            return Ok(());
        }
        #[allow(clippy::cast_precision_loss)]
        let fraction = self.stats.invalid_dropped as f64 / self.stats.hits_seen as f64;
        if fraction > self.config.max_invalid_fraction {
            return Err(Error::ExcessiveDrops {
                dropped: self.stats.invalid_dropped,
                seen: self.stats.hits_seen,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rustdigi_core::{HitRecord, Vec3, VolumeId};

    fn hit(energy: f64, time: f64, volume: u32) -> HitRecord {
        HitRecord::new(
            energy,
            Vec3::new(0.0, 0.0, 0.0),
            time,
            VolumeId::new(volume),
        )
    }

    #[test]
    fn test_per_event_trigger_groups_by_boundary() {
        let mut digitizer = Digitizer::new(DigitizerConfig::default());
        let mut out = Vec::new();

        digitizer.accept(&hit(1.0, 0.0, 0), &mut out).unwrap();
        digitizer.accept(&hit(2.0, 1.0, 0), &mut out).unwrap();
        assert!(out.is_empty());

        digitizer.end_of_event(&mut out);
        assert_eq!(out.len(), 1);
        assert!((out[0].total_energy - 3.0).abs() < 1e-12);
        assert_eq!(out[0].hit_count, 2);

        // Next primary opens a fresh group for the same channel.
        digitizer.accept(&hit(4.0, 2.0, 0), &mut out).unwrap();
        digitizer.end_of_event(&mut out);
        assert_eq!(out.len(), 2);
        assert!((out[1].total_energy - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_distinct_volumes_make_distinct_singles() {
        let mut digitizer = Digitizer::new(DigitizerConfig::default());
        let mut out = Vec::new();

        digitizer.accept(&hit(1.0, 0.0, 0), &mut out).unwrap();
        digitizer.accept(&hit(2.0, 1.0, 1), &mut out).unwrap();
        digitizer.end_of_event(&mut out);

        assert_eq!(out.len(), 2);
        // Flush order follows key order.
        assert_eq!(out[0].key, GroupKey::new(0));
        assert_eq!(out[1].key, GroupKey::new(1));
    }

    #[test]
    fn test_invalid_hit_dropped_and_counted() {
        let mut digitizer = Digitizer::new(DigitizerConfig::default());
        let mut out = Vec::new();

        digitizer.accept(&hit(-1.0, 0.0, 0), &mut out).unwrap();
        digitizer.accept(&hit(2.0, 1.0, 0), &mut out).unwrap();
        digitizer.end_of_event(&mut out);
        digitizer.finish(&mut out);

        assert_eq!(digitizer.statistics().invalid_dropped, 1);
        assert_eq!(digitizer.statistics().hits_merged, 1);
        assert_eq!(out.len(), 1);
        assert!((out[0].total_energy - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_excessive_drop_rate_aborts_run() {
        let config = DigitizerConfig::default().with_max_invalid_fraction(0.5);
        let mut digitizer = Digitizer::new(config);
        let mut out = Vec::new();

        // All hits invalid: once past the minimum sample the run must abort.
        let mut aborted = false;
        for i in 0..200 {
            let time = f64::from(i);
            if digitizer.accept(&hit(-1.0, time, 0), &mut out).is_err() {
                aborted = true;
                break;
            }
        }
        assert!(aborted);
        assert!(digitizer.statistics().hits_seen >= 100);
        assert!(out.is_empty());
    }

    #[test]
    fn test_unmapped_volume_fails_fast() {
        let config = DigitizerConfig::default().with_discretization(Discretization::lookup([(
            VolumeId::new(0),
            GroupKey::new(0),
        )]));
        let mut digitizer = Digitizer::new(config);
        let mut out = Vec::new();

        assert!(digitizer.accept(&hit(1.0, 0.0, 5), &mut out).is_err());
    }

    #[test]
    fn test_time_window_expires_quiet_channels() {
        let config =
            DigitizerConfig::default().with_trigger(FinalizeTrigger::time_window(100.0));
        let mut digitizer = Digitizer::new(config);
        let mut out = Vec::new();

        digitizer.accept(&hit(1.0, 0.0, 0), &mut out).unwrap();
        digitizer.accept(&hit(1.0, 50.0, 0), &mut out).unwrap();
        assert!(out.is_empty());

        // 151 - 50 > 100: the first group expires before this hit merges.
        digitizer.accept(&hit(2.0, 151.0, 0), &mut out).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].hit_count, 2);
        assert!((out[0].total_energy - 2.0).abs() < 1e-12);

        digitizer.finish(&mut out);
        assert_eq!(out.len(), 2);
        assert!((out[1].total_energy - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_time_window_keeps_active_channels_open() {
        let config =
            DigitizerConfig::default().with_trigger(FinalizeTrigger::time_window(100.0));
        let mut digitizer = Digitizer::new(config);
        let mut out = Vec::new();

        // Hits arrive every 60 ns: span exceeds the window but no gap does.
        for i in 0..5 {
            digitizer
                .accept(&hit(1.0, f64::from(i) * 60.0, 0), &mut out)
                .unwrap();
        }
        assert!(out.is_empty());
        digitizer.finish(&mut out);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].hit_count, 5);
    }

    #[test]
    fn test_end_of_event_is_counted_under_time_window() {
        let config =
            DigitizerConfig::default().with_trigger(FinalizeTrigger::time_window(100.0));
        let mut digitizer = Digitizer::new(config);
        let mut out = Vec::new();

        digitizer.accept(&hit(1.0, 0.0, 0), &mut out).unwrap();
        digitizer.end_of_event(&mut out);
        // The boundary does not close groups in time-window mode.
        assert!(out.is_empty());
        assert_eq!(digitizer.statistics().events_observed, 1);
        assert_eq!(digitizer.open_groups(), 1);
    }
}
