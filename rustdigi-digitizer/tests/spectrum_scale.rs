//! End-to-end scale scenario: synthetic run through digitization into a
//! binned energy spectrum.

use approx::assert_relative_eq;
use rustdigi_digitizer::{digitize_batch, DigitizerConfig};
use rustdigi_io::EnergySpectrum;
use rustdigi_sim::{RunConfig, SyntheticSource};

#[test]
fn test_ten_thousand_primaries_fill_the_spectrum() {
    // Alpha at 5.5 MeV, 10k single-deposit primaries in [4.125, 5.5].
    let run = RunConfig::default();
    assert_eq!(run.source.primaries, 10_000);

    let source = SyntheticSource::from_config(&run, 1234);
    let (batch, stats) = digitize_batch(source, &DigitizerConfig::default()).unwrap();

    assert_eq!(batch.len(), 10_000);
    assert_eq!(stats.events_observed, 10_000);
    assert_eq!(stats.hits_merged, 10_000);
    assert_eq!(stats.invalid_dropped, 0);

    let mut spectrum = EnergySpectrum::new(500, 4.125, 5.5).unwrap();
    spectrum.fill_batch(&batch);

    assert_eq!(spectrum.total_counts(), 10_000);
    assert_eq!(spectrum.underflow(), 0);
    assert_eq!(spectrum.overflow(), 0);
}

#[test]
fn test_scale_run_conserves_energy() {
    let mut run = RunConfig::default();
    run.source.primaries = 2_000;

    let input_energy: f64 = SyntheticSource::from_config(&run, 99)
        .filter_map(|signal| match signal {
            rustdigi_digitizer::EngineSignal::Hit(hit) => Some(hit.energy),
            rustdigi_digitizer::EngineSignal::EndOfEvent => None,
        })
        .sum();

    let source = SyntheticSource::from_config(&run, 99);
    let (batch, _) = digitize_batch(source, &DigitizerConfig::default()).unwrap();

    assert_relative_eq!(batch.total_energy(), input_energy, max_relative = 1e-9);
}

#[test]
fn test_full_chain_is_deterministic() {
    let mut run = RunConfig::default();
    run.source.primaries = 1_000;
    let config = DigitizerConfig::default();

    let (first, _) =
        digitize_batch(SyntheticSource::from_config(&run, 7), &config).unwrap();
    let (second, _) =
        digitize_batch(SyntheticSource::from_config(&run, 7), &config).unwrap();

    assert_eq!(first, second);
}
