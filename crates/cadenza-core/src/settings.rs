//! Project-wide musical settings

use std::num::NonZeroU32;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::values::{DEFAULT_TICKS_PER_BEAT, Seconds, Tempo, Ticks, TimeSignature};

/// Tempo, meter and tick resolution shared by every track of a project
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProjectSettings {
    /// Tempo in BPM
    pub tempo: Tempo,
    pub time_signature: TimeSignature,
    /// Pulses per quarter note (default 480)
    pub ticks_per_beat: NonZeroU32,
}

impl Default for ProjectSettings {
    fn default() -> Self {
        Self {
            tempo: Tempo::DEFAULT,
            time_signature: TimeSignature::COMMON,
            ticks_per_beat: DEFAULT_TICKS_PER_BEAT,
        }
    }
}

impl ProjectSettings {
    pub fn with_tempo(self, tempo: Tempo) -> Self {
        Self { tempo, ..self }
    }

    pub fn with_time_signature(self, time_signature: TimeSignature) -> Self {
        Self {
            time_signature,
            ..self
        }
    }

    pub fn with_ticks_per_beat(self, ticks_per_beat: NonZeroU32) -> Self {
        Self {
            ticks_per_beat,
            ..self
        }
    }

    pub fn ticks_to_seconds(&self, ticks: Ticks) -> Result<Seconds> {
        ticks.to_seconds(self.ticks_per_beat.get(), self.tempo)
    }

    pub fn seconds_to_ticks(&self, seconds: Seconds) -> Result<Ticks> {
        seconds.to_ticks(self.ticks_per_beat.get(), self.tempo)
    }

    /// Length of one bar in ticks
    pub fn ticks_per_bar(&self) -> u64 {
        self.time_signature.ticks_per_bar(self.ticks_per_beat.get())
    }
}
