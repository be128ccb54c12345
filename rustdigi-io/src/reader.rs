//! Memory-mapped readers for digitized output files.

use std::fs::File;
use std::path::{Path, PathBuf};

use memmap2::Mmap;

use rustdigi_core::SinglesBatch;

use crate::writer::SINGLES_RECORD_BYTES;
use crate::{Error, Result};

/// Memory-mapped reader for the binary singles record format.
pub struct SinglesFileReader {
    mmap: Mmap,
    path: PathBuf,
}

impl SinglesFileReader {
    /// Opens a singles file for memory-mapped reading.
    ///
    /// # Errors
    /// Fails if the file cannot be opened or mapped, or if its size is not
    /// a whole number of records.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(&path)?;
        // SAFETY: The file is opened read-only and we assume it is not modified concurrently.
        // This is the standard safety contract for memory mapping.
        #[allow(unsafe_code)]
        let mmap = unsafe { Mmap::map(&file)? };

        if mmap.len() % SINGLES_RECORD_BYTES != 0 {
            return Err(Error::InvalidFormat(format!(
                "{}: {} bytes is not a whole number of {SINGLES_RECORD_BYTES}-byte records",
                path.as_ref().display(),
                mmap.len()
            )));
        }

        Ok(Self {
            mmap,
            path: path.as_ref().to_path_buf(),
        })
    }

    /// Returns the file size in bytes.
    #[must_use]
    pub fn file_size(&self) -> usize {
        self.mmap.len()
    }

    /// Number of records in the file.
    #[must_use]
    pub fn record_count(&self) -> usize {
        self.mmap.len() / SINGLES_RECORD_BYTES
    }

    /// Reads every record into a columnar batch.
    ///
    /// # Errors
    /// Returns [`Error::InvalidFormat`] on a corrupted flag byte.
    pub fn read_batch(&self) -> Result<SinglesBatch> {
        let count = self.record_count();
        let mut batch = SinglesBatch::with_capacity(count);

        for record in self.mmap.chunks_exact(SINGLES_RECORD_BYTES) {
            batch.key.push(read_u32(record, 0));
            batch.energy.push(read_f64(record, 4));
            batch.x.push(read_f64(record, 12));
            batch.y.push(read_f64(record, 20));
            batch.z.push(read_f64(record, 28));
            batch.time.push(read_f64(record, 36));
            batch.hit_count.push(read_u32(record, 44));
            batch.zero_energy.push(match record[48] {
                0 => false,
                1 => true,
                other => {
                    return Err(Error::InvalidFormat(format!(
                        "{}: bad flag byte {other}",
                        self.path.display()
                    )))
                }
            });
        }
        Ok(batch)
    }
}

fn read_u32(bytes: &[u8], offset: usize) -> u32 {
    let mut buf = [0u8; 4];
    buf.copy_from_slice(&bytes[offset..offset + 4]);
    u32::from_le_bytes(buf)
}

fn read_f64(bytes: &[u8], offset: usize) -> f64 {
    let mut buf = [0u8; 8];
    buf.copy_from_slice(&bytes[offset..offset + 8]);
    f64::from_le_bytes(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::writer::DataFileWriter;
    use rustdigi_core::{GroupKey, SingleEvent, Vec3};

    fn sample_batch() -> SinglesBatch {
        [
            SingleEvent {
                key: GroupKey::new(3),
                total_energy: 4.5,
                centroid: Vec3::new(0.5, -0.5, 10.0),
                time: 2000.0,
                hit_count: 2,
                zero_energy_centroid: false,
            },
            SingleEvent {
                key: GroupKey::new(4),
                total_energy: 0.0,
                centroid: Vec3::new(1.0, 0.0, 0.0),
                time: 3000.0,
                hit_count: 3,
                zero_energy_centroid: true,
            },
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_binary_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("singles.bin");

        let batch = sample_batch();
        let mut writer = DataFileWriter::create(&path).unwrap();
        writer.write_singles_binary(&batch).unwrap();
        writer.commit().unwrap();

        let reader = SinglesFileReader::open(&path).unwrap();
        assert_eq!(reader.record_count(), 2);
        assert_eq!(reader.read_batch().unwrap(), batch);
    }

    #[test]
    fn test_truncated_file_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("singles.bin");
        std::fs::write(&path, [0u8; SINGLES_RECORD_BYTES - 1]).unwrap();

        assert!(matches!(
            SinglesFileReader::open(&path),
            Err(Error::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_corrupt_flag_byte_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("singles.bin");
        let mut record = [0u8; SINGLES_RECORD_BYTES];
        record[48] = 7;
        std::fs::write(&path, record).unwrap();

        let reader = SinglesFileReader::open(&path).unwrap();
        assert!(matches!(
            reader.read_batch(),
            Err(Error::InvalidFormat(_))
        ));
    }
}
