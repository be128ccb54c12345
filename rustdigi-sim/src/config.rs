//! Run configuration: source, detector, and analysis parameters.

use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use rustdigi_core::ConfigError;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Primary particle species emitted by the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParticleType {
    /// Electron.
    #[serde(rename = "e-")]
    Electron,
    /// Photon.
    Gamma,
    /// Proton.
    Proton,
    /// Neutron.
    Neutron,
    /// Alpha particle.
    Alpha,
    /// Generic ion with explicit charge and mass numbers.
    Ion {
        /// Atomic number.
        z: u32,
        /// Mass number.
        a: u32,
    },
}

impl ParticleType {
    /// Short label used in output file names.
    #[must_use]
    pub fn label(&self) -> String {
        match self {
            Self::Electron => "e-".to_string(),
            Self::Gamma => "gamma".to_string(),
            Self::Proton => "proton".to_string(),
            Self::Neutron => "neutron".to_string(),
            Self::Alpha => "alpha".to_string(),
            Self::Ion { z, a } => format!("ion_{z}_{a}"),
        }
    }
}

impl fmt::Display for ParticleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

impl FromStr for ParticleType {
    type Err = ConfigError;

    /// Parses `e-`, `gamma`, `proton`, `neutron`, `alpha`, or `ion:Z:A`.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "e-" | "electron" => Ok(Self::Electron),
            "gamma" => Ok(Self::Gamma),
            "proton" => Ok(Self::Proton),
            "neutron" => Ok(Self::Neutron),
            "alpha" => Ok(Self::Alpha),
            other => {
                if let Some(rest) = other.strip_prefix("ion:") {
                    let mut parts = rest.splitn(2, ':');
                    let z = parts.next().and_then(|v| v.parse().ok());
                    let a = parts.next().and_then(|v| v.parse().ok());
                    if let (Some(z), Some(a)) = (z, a) {
                        return Ok(Self::Ion { z, a });
                    }
                }
                Err(ConfigError::UnknownParticle(other.to_string()))
            }
        }
    }
}

/// Mono-energetic disc source aimed at the detector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Particle species.
    pub particle: ParticleType,
    /// Source energy (MeV).
    pub energy_mev: f64,
    /// Number of primaries to generate.
    pub primaries: u64,
    /// Disc radius of the emission surface (mm).
    pub disc_radius_mm: f64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            particle: ParticleType::Alpha,
            energy_mev: 5.5,
            primaries: 10_000,
            disc_radius_mm: 2.5,
        }
    }
}

/// Thin slab detector facing the source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectorConfig {
    /// Lateral side length of the slab (mm).
    pub side_mm: f64,
    /// Slab thickness (um).
    pub thickness_um: f64,
    /// Distance from source to slab (cm).
    pub distance_cm: f64,
    /// Detector material name.
    pub material: String,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            side_mm: 5.0,
            thickness_um: 100.0,
            distance_cm: 1.0,
            material: "Silicon".to_string(),
        }
    }
}

/// Complete configuration for one simulation run.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RunConfig {
    /// Source parameters.
    pub source: SourceConfig,
    /// Detector parameters.
    pub detector: DetectorConfig,
}

impl RunConfig {
    /// Loads a configuration from a JSON file.
    ///
    /// The configuration is validated before it is returned; a run never
    /// starts from an invalid file.
    ///
    /// # Errors
    /// Fails on I/O errors, malformed JSON, or invalid parameter values.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validates all numeric parameters.
    ///
    /// # Errors
    /// Returns [`ConfigError::InvalidParameter`] naming the first offending
    /// value.
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        let positive = [
            ("source energy (MeV)", self.source.energy_mev),
            ("detector side (mm)", self.detector.side_mm),
            ("detector thickness (um)", self.detector.thickness_um),
            ("detector distance (cm)", self.detector.distance_cm),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::InvalidParameter { name, value });
            }
        }
        if !self.source.disc_radius_mm.is_finite() || self.source.disc_radius_mm < 0.0 {
            return Err(ConfigError::InvalidParameter {
                name: "source disc radius (mm)",
                value: self.source.disc_radius_mm,
            });
        }
        if self.source.primaries == 0 {
            return Err(ConfigError::InvalidParameter {
                name: "primary count",
                value: 0.0,
            });
        }
        Ok(())
    }

    /// Stem used for output file names, e.g. `alpha_5.5`.
    #[must_use]
    pub fn output_stem(&self) -> String {
        format!("{}_{}", self.source.particle.label(), self.source.energy_mev)
    }
}
