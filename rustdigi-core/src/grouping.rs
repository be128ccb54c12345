//! Discretization of physical volumes into logical readout channels.

use std::collections::HashMap;

use crate::error::ConfigError;
use crate::hit::VolumeId;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Logical readout channel a hit is accumulated under.
///
/// Two hits with equal keys are candidates for merging into the same
/// digitized event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GroupKey(pub u32);

impl GroupKey {
    /// Creates a new group key.
    #[inline]
    #[must_use]
    pub fn new(key: u32) -> Self {
        Self(key)
    }

    /// Returns the raw key value.
    #[inline]
    #[must_use]
    pub fn as_u32(&self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for GroupKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Mapping from physical sub-volumes to readout channels.
///
/// The identity mapping gives one channel per volume. A lookup mapping
/// collapses many volumes into one logical channel (for example, grouping
/// by detector module), optionally with a catch-all fallback channel.
#[derive(Debug, Clone)]
pub enum Discretization {
    /// One readout channel per physical volume.
    Identity,
    /// Explicit volume-to-channel table.
    Lookup {
        /// Per-volume channel assignments.
        table: HashMap<VolumeId, GroupKey>,
        /// Channel for volumes absent from the table, if any.
        fallback: Option<GroupKey>,
    },
}

impl Default for Discretization {
    fn default() -> Self {
        Self::Identity
    }
}

impl Discretization {
    /// Creates the identity mapping.
    #[must_use]
    pub fn identity() -> Self {
        Self::Identity
    }

    /// Creates a lookup mapping from explicit channel assignments.
    #[must_use]
    pub fn lookup<I>(assignments: I) -> Self
    where
        I: IntoIterator<Item = (VolumeId, GroupKey)>,
    {
        Self::Lookup {
            table: assignments.into_iter().collect(),
            fallback: None,
        }
    }

    /// Sets a catch-all channel for unmapped volumes.
    ///
    /// Has no effect on the identity mapping, which is total.
    #[must_use]
    pub fn with_fallback(self, fallback: GroupKey) -> Self {
        match self {
            Self::Identity => Self::Identity,
            Self::Lookup { table, .. } => Self::Lookup {
                table,
                fallback: Some(fallback),
            },
        }
    }

    /// Resolves the readout channel for a volume.
    ///
    /// # Errors
    /// Returns [`ConfigError::UnmappedVolume`] if the volume has no channel
    /// assignment and no fallback is configured.
    pub fn resolve(&self, volume: VolumeId) -> Result<GroupKey, ConfigError> {
        match self {
            Self::Identity => Ok(GroupKey::new(volume.as_u32())),
            Self::Lookup { table, fallback } => table
                .get(&volume)
                .copied()
                .or(*fallback)
                .ok_or(ConfigError::UnmappedVolume(volume)),
        }
    }
}
