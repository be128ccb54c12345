//!
//! This binary provides a CLI for digitizing detector simulation runs.
#![allow(clippy::uninlined_format_args, clippy::cast_precision_loss)]

use clap::{Parser, Subcommand, ValueEnum};
use log::info;

use rustdigi_digitizer::{digitize_batch, DigitizerConfig, FinalizeTrigger};
use rustdigi_io::{DataFileWriter, EnergySpectrum, SinglesFileReader};
use rustdigi_sim::{RunConfig, SyntheticSource};
use std::path::PathBuf;
use std::time::Instant;
use thiserror::Error;

/// Spectrum analysis window as a fraction of the source energy.
const SPECTRUM_WINDOW_FRACTION: f64 = 0.75;

/// Result type for CLI operations.
type Result<T> = std::result::Result<T, CliError>;

/// CLI error types.
#[derive(Error, Debug)]
enum CliError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("I/O error: {0}")]
    RustdigiIo(#[from] rustdigi_io::Error),

    #[error("Core error: {0}")]
    Core(#[from] rustdigi_core::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] rustdigi_core::ConfigError),

    #[error("Simulation error: {0}")]
    Sim(#[from] rustdigi_sim::Error),
}

/// Singles output format selection.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum Format {
    /// Comma-separated values with a header row
    Csv,
    /// Fixed-width binary records
    Bin,
}

/// Detector simulation digitizer.
#[derive(Parser)]
#[command(name = "rustdigi")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Digitize a synthetic run into singles and an energy spectrum
    Run {
        /// Run configuration JSON file (built-in defaults when omitted)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output directory
        #[arg(short, long, default_value = "output")]
        output: PathBuf,

        /// Particle override: e-, gamma, proton, neutron, alpha, or ion:Z:A
        #[arg(long)]
        particle: Option<String>,

        /// Source energy override (MeV)
        #[arg(long)]
        energy: Option<f64>,

        /// Primary count override
        #[arg(long)]
        primaries: Option<u64>,

        /// Number of spectrum bins
        #[arg(long, default_value = "500")]
        bins: usize,

        /// Seed for the synthetic source
        #[arg(long, default_value = "0")]
        seed: u64,

        /// Coincidence window (ns); per-event grouping when omitted
        #[arg(long)]
        window_ns: Option<f64>,

        /// Singles output format
        #[arg(long, value_enum, default_value = "csv")]
        format: Format,
    },

    /// Show information about a binary singles file
    Info {
        /// Input singles file
        input: PathBuf,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            output,
            particle,
            energy,
            primaries,
            bins,
            seed,
            window_ns,
            format,
        } => {
            let mut run = match config {
                Some(path) => RunConfig::from_json_file(path)?,
                None => RunConfig::default(),
            };
            if let Some(name) = particle {
                run.source.particle = name.parse()?;
            }
            if let Some(energy) = energy {
                run.source.energy_mev = energy;
            }
            if let Some(count) = primaries {
                run.source.primaries = count;
            }
            run.validate()?;

            let trigger = window_ns.map_or(FinalizeTrigger::PerEvent, FinalizeTrigger::time_window);
            let digitizer_config = DigitizerConfig::default().with_trigger(trigger);

            info!(
                "digitizing {} {} primaries at {} MeV",
                run.source.primaries, run.source.particle, run.source.energy_mev
            );

            let start = Instant::now();
            let source = SyntheticSource::from_config(&run, seed);
            let (batch, stats) = digitize_batch(source, &digitizer_config)?;
            info!(
                "digitized {} hits into {} singles ({} dropped)",
                stats.hits_seen, stats.singles_emitted, stats.invalid_dropped
            );

            std::fs::create_dir_all(&output)?;
            let stem = run.output_stem();

            let singles_path = match format {
                Format::Csv => output.join(format!("{stem}_singles.csv")),
                Format::Bin => output.join(format!("{stem}_singles.bin")),
            };
            let mut writer = DataFileWriter::create(&singles_path)?;
            match format {
                Format::Csv => writer.write_singles_csv(&batch, true)?,
                Format::Bin => writer.write_singles_binary(&batch)?,
            }
            writer.commit()?;
            info!("published {}", singles_path.display());

            let lo = run.source.energy_mev * SPECTRUM_WINDOW_FRACTION;
            let hi = run.source.energy_mev;
            let mut spectrum = EnergySpectrum::new(bins, lo, hi)?;
            spectrum.fill_batch(&batch);

            let spectrum_path = output.join(format!("{stem}_spectrum.csv"));
            let mut writer = DataFileWriter::create(&spectrum_path)?;
            writer.write_spectrum_csv(&spectrum)?;
            writer.commit()?;
            info!("published {}", spectrum_path.display());

            let elapsed = start.elapsed();
            println!(
                "Processed {} primaries in {:.2}s",
                stats.events_observed,
                elapsed.as_secs_f64()
            );
            println!("Total singles: {}", batch.len());
            println!("Total energy: {:.3} MeV", batch.total_energy());
            println!(
                "In spectrum range [{}, {}]: {} ({} under, {} over)",
                lo,
                hi,
                spectrum.total_counts(),
                spectrum.underflow(),
                spectrum.overflow()
            );
        }

        Commands::Info { input } => {
            let reader = SinglesFileReader::open(&input)?;
            println!("File: {}", input.display());
            println!(
                "Size: {} bytes ({:.2} MB)",
                reader.file_size(),
                reader.file_size() as f64 / 1_000_000.0
            );
            println!("Records: {}", reader.record_count());

            let batch = reader.read_batch()?;
            if !batch.is_empty() {
                let min_energy = batch.energy.iter().copied().fold(f64::INFINITY, f64::min);
                let max_energy = batch
                    .energy
                    .iter()
                    .copied()
                    .fold(f64::NEG_INFINITY, f64::max);
                let min_time = batch.time.iter().copied().fold(f64::INFINITY, f64::min);
                let max_time = batch.time.iter().copied().fold(f64::NEG_INFINITY, f64::max);
                let zero_energy = batch.zero_energy.iter().filter(|&&flag| flag).count();

                println!("Total energy: {:.3} MeV", batch.total_energy());
                println!("Energy range: {min_energy} - {max_energy} MeV");
                println!("Time range: {min_time} - {max_time} ns");
                println!("Merged hits: {}", batch.total_hits());
                println!("Zero-energy centroids: {zero_energy}");
            }
        }
    }

    Ok(())
}
