//! High-level helpers that drive a digitizer over signal streams.

use rayon::prelude::*;

use rustdigi_core::{EngineSignal, Hit, Result, SingleEvent, SinglesBatch};

use crate::digitizer::{Digitizer, DigitizerConfig, DigitizerStatistics};

/// Digitizes one run's signal stream into an ordered list of events.
///
/// Consumes the stream in arrival order, honors end-of-event boundaries,
/// and flushes any groups still open when the stream ends.
///
/// # Errors
/// Propagates configuration errors and the excessive-drop abort.
pub fn digitize<H, I>(
    signals: I,
    config: &DigitizerConfig,
) -> Result<(Vec<SingleEvent>, DigitizerStatistics)>
where
    H: Hit,
    I: IntoIterator<Item = EngineSignal<H>>,
{
    let mut digitizer = Digitizer::new(config.clone());
    let mut out = Vec::new();

    for signal in signals {
        match signal {
            EngineSignal::Hit(hit) => digitizer.accept(&hit, &mut out)?,
            EngineSignal::EndOfEvent => digitizer.end_of_event(&mut out),
        }
    }
    digitizer.finish(&mut out);

    let stats = *digitizer.statistics();
    Ok((out, stats))
}

/// Digitizes one run into the columnar batch form consumed by the sink.
///
/// # Errors
/// Propagates configuration errors and the excessive-drop abort.
pub fn digitize_batch<H, I>(
    signals: I,
    config: &DigitizerConfig,
) -> Result<(SinglesBatch, DigitizerStatistics)>
where
    H: Hit,
    I: IntoIterator<Item = EngineSignal<H>>,
{
    let (events, stats) = digitize(signals, config)?;
    Ok((events.into_iter().collect(), stats))
}

/// Digitizes independent runs in parallel.
///
/// Each run gets its own isolated digitizer (the key space is run-local);
/// results are concatenated in run order, so output is deterministic
/// regardless of scheduling.
///
/// # Errors
/// Fails if any run fails.
pub fn digitize_runs<H, R>(
    runs: Vec<R>,
    config: &DigitizerConfig,
) -> Result<(SinglesBatch, DigitizerStatistics)>
where
    H: Hit,
    R: IntoIterator<Item = EngineSignal<H>> + Send,
{
    let per_run: Vec<(SinglesBatch, DigitizerStatistics)> = runs
        .into_par_iter()
        .map(|run| digitize_batch(run, config))
        .collect::<Result<_>>()?;

    let mut combined = SinglesBatch::default();
    let mut stats = DigitizerStatistics::default();
    for (batch, run_stats) in &per_run {
        combined.append(batch);
        stats.merge(run_stats);
    }
    Ok((combined, stats))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rustdigi_core::{HitRecord, Vec3, VolumeId};

    fn one_hit_event(energy: f64, time: f64) -> Vec<EngineSignal<HitRecord>> {
        vec![
            EngineSignal::Hit(HitRecord::new(
                energy,
                Vec3::new(0.0, 0.0, 0.0),
                time,
                VolumeId::new(0),
            )),
            EngineSignal::EndOfEvent,
        ]
    }

    #[test]
    fn test_digitize_flushes_trailing_group() {
        // Stream ends without a boundary marker: finish() must still emit.
        let signals = vec![EngineSignal::Hit(HitRecord::new(
            1.0,
            Vec3::ZERO,
            0.0,
            VolumeId::new(0),
        ))];
        let (events, stats) = digitize(signals, &DigitizerConfig::default()).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(stats.singles_emitted, 1);
        assert_eq!(stats.events_observed, 0);
    }

    #[test]
    fn test_digitize_runs_preserves_run_order() {
        let runs: Vec<_> = (0..8).map(|i| one_hit_event(f64::from(i), 0.0)).collect();
        let (batch, stats) = digitize_runs(runs, &DigitizerConfig::default()).unwrap();

        assert_eq!(batch.len(), 8);
        assert_eq!(stats.events_observed, 8);
        for (i, &energy) in batch.energy.iter().enumerate() {
            assert!((energy - i as f64).abs() < 1e-12);
        }
    }

    #[test]
    fn test_parallel_and_serial_agree() {
        let runs: Vec<_> = (0..4).map(|i| one_hit_event(f64::from(i), 0.0)).collect();

        let serial: SinglesBatch = runs
            .clone()
            .into_iter()
            .map(|run| digitize_batch(run, &DigitizerConfig::default()).unwrap().0)
            .fold(SinglesBatch::default(), |mut acc, b| {
                acc.append(&b);
                acc
            });

        let (parallel, _) = digitize_runs(runs, &DigitizerConfig::default()).unwrap();
        assert_eq!(serial, parallel);
    }
}
