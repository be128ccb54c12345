//! Finalization triggers.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Policy deciding when an open group can no longer gain hits.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum FinalizeTrigger {
    /// Groups finalize at the end-of-event boundary signaled by the
    /// transport engine (one primary track per candidate group).
    #[default]
    PerEvent,
    /// A group finalizes once no hit has joined its channel for longer
    /// than the coincidence window (pile-up-aware digitization).
    TimeWindow {
        /// Coincidence window (ns).
        window_ns: f64,
    },
}

impl FinalizeTrigger {
    /// Creates a coincidence-window trigger.
    #[must_use]
    pub fn time_window(window_ns: f64) -> Self {
        Self::TimeWindow { window_ns }
    }
}
