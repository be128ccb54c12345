//! Atomic file writers for digitized output.
//!
//! Output is staged in a named temporary file inside the destination
//! directory and only renamed to the target path on [`DataFileWriter::commit`].
//! A run that fails mid-write leaves nothing at the target path.

use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use rustdigi_core::SinglesBatch;

use crate::spectrum::EnergySpectrum;
use crate::{Error, Result};

/// Size of one binary singles record:
/// u32 (key) + 5 x f64 (energy, x, y, z, time) + u32 (hit count) + u8 (flag).
pub const SINGLES_RECORD_BYTES: usize = 49;

/// Writer for digitized data output.
///
/// Writes singles batches and spectra to files in CSV or binary form.
pub struct DataFileWriter {
    writer: BufWriter<NamedTempFile>,
    target: PathBuf,
}

impl DataFileWriter {
    /// Opens a staged writer for the given target path.
    ///
    /// # Errors
    /// Fails if the temporary file cannot be created next to the target.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let target = path.as_ref().to_path_buf();
        let dir = match target.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let staged = NamedTempFile::new_in(dir)?;
        Ok(Self {
            writer: BufWriter::new(staged),
            target,
        })
    }

    /// The path the output will be published at.
    #[must_use]
    pub fn target(&self) -> &Path {
        &self.target
    }

    /// Writes a singles batch as CSV.
    ///
    /// # Errors
    /// Fails on write errors to the staged file.
    pub fn write_singles_csv(&mut self, batch: &SinglesBatch, header: bool) -> Result<()> {
        if header {
            writeln!(
                self.writer,
                "group_key,total_energy,x,y,z,time,hit_count,zero_energy_centroid"
            )?;
        }
        for i in 0..batch.len() {
            writeln!(
                self.writer,
                "{},{},{},{},{},{},{},{}",
                batch.key[i],
                batch.energy[i],
                batch.x[i],
                batch.y[i],
                batch.z[i],
                batch.time[i],
                batch.hit_count[i],
                u8::from(batch.zero_energy[i])
            )?;
        }
        Ok(())
    }

    /// Writes a singles batch as binary records.
    ///
    /// Format per record: u32 key + f64 energy + f64 x + f64 y + f64 z +
    /// f64 time + u32 hit count + u8 zero-energy flag, little endian,
    /// [`SINGLES_RECORD_BYTES`] bytes total.
    ///
    /// # Errors
    /// Fails on write errors to the staged file.
    pub fn write_singles_binary(&mut self, batch: &SinglesBatch) -> Result<()> {
        for i in 0..batch.len() {
            self.writer.write_all(&batch.key[i].to_le_bytes())?;
            self.writer.write_all(&batch.energy[i].to_le_bytes())?;
            self.writer.write_all(&batch.x[i].to_le_bytes())?;
            self.writer.write_all(&batch.y[i].to_le_bytes())?;
            self.writer.write_all(&batch.z[i].to_le_bytes())?;
            self.writer.write_all(&batch.time[i].to_le_bytes())?;
            self.writer.write_all(&batch.hit_count[i].to_le_bytes())?;
            self.writer.write_all(&[u8::from(batch.zero_energy[i])])?;
        }
        Ok(())
    }

    /// Writes a spectrum as a CSV table of bin edges and counts.
    ///
    /// # Errors
    /// Fails on write errors to the staged file.
    pub fn write_spectrum_csv(&mut self, spectrum: &EnergySpectrum) -> Result<()> {
        writeln!(self.writer, "bin_lo,bin_hi,counts")?;
        for (i, &count) in spectrum.counts().iter().enumerate() {
            let (lo, hi) = spectrum.bin_edges(i);
            writeln!(self.writer, "{lo},{hi},{count}")?;
        }
        Ok(())
    }

    /// Flushes and atomically publishes the staged file at the target path.
    ///
    /// # Errors
    /// Returns [`Error::Storage`] if the rename fails; the staged file is
    /// discarded and the target path stays untouched.
    pub fn commit(self) -> Result<()> {
        let Self { mut writer, target } = self;
        writer.flush()?;
        let staged = writer
            .into_inner()
            .map_err(|e| Error::Storage(format!("{}: {e}", target.display())))?;
        staged
            .persist(&target)
            .map_err(|e| Error::Storage(format!("{}: {e}", target.display())))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rustdigi_core::{GroupKey, SingleEvent, Vec3};

    fn sample_batch() -> SinglesBatch {
        [
            SingleEvent {
                key: GroupKey::new(0),
                total_energy: 5.5,
                centroid: Vec3::new(0.0, 0.0, 0.05),
                time: 0.0,
                hit_count: 1,
                zero_energy_centroid: false,
            },
            SingleEvent {
                key: GroupKey::new(1),
                total_energy: 4.25,
                centroid: Vec3::new(1.5, -2.0, 10.0),
                time: 1000.0,
                hit_count: 3,
                zero_energy_centroid: true,
            },
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_write_singles_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("singles.csv");

        let mut writer = DataFileWriter::create(&path).unwrap();
        writer.write_singles_csv(&sample_batch(), true).unwrap();
        writer.commit().unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("group_key,total_energy,"));
        assert!(content.contains("0,5.5,0,0,0.05,0,1,0"));
        assert!(content.contains("1,4.25,1.5,-2,10,1000,3,1"));
    }

    #[test]
    fn test_write_singles_binary_record_size() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("singles.bin");

        let mut writer = DataFileWriter::create(&path).unwrap();
        writer.write_singles_binary(&sample_batch()).unwrap();
        writer.commit().unwrap();

        let data = std::fs::read(&path).unwrap();
        assert_eq!(data.len(), 2 * SINGLES_RECORD_BYTES);
    }

    #[test]
    fn test_nothing_published_before_commit() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("singles.csv");

        let mut writer = DataFileWriter::create(&path).unwrap();
        writer.write_singles_csv(&sample_batch(), true).unwrap();
        assert!(!path.exists());

        writer.commit().unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_dropped_writer_leaves_no_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("singles.csv");

        {
            let mut writer = DataFileWriter::create(&path).unwrap();
            writer.write_singles_csv(&sample_batch(), true).unwrap();
            // Dropped without commit: simulated mid-run failure.
        }
        assert!(!path.exists());
        // The staging file is cleaned up as well.
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_write_spectrum_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("spectrum.csv");

        let mut spectrum = EnergySpectrum::new(2, 0.0, 1.0).unwrap();
        spectrum.fill(0.25);
        spectrum.fill(0.75);
        spectrum.fill(0.8);

        let mut writer = DataFileWriter::create(&path).unwrap();
        writer.write_spectrum_csv(&spectrum).unwrap();
        writer.commit().unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "bin_lo,bin_hi,counts");
        assert_eq!(lines[1], "0,0.5,1");
        assert_eq!(lines[2], "0.5,1,2");
    }
}
