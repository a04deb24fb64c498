//! Self-validating value objects for time, pitch, and mix settings
//!
//! Every type here is checked once at construction and never changes
//! afterwards. Raw numbers coming from a UI or a deserializer are wrapped
//! into one of these types first; that wrapping is the validation step.

use std::fmt;
use std::num::NonZeroU32;

use serde::{Deserialize, Serialize};

use crate::error::{CadenzaError, Result};

/// Pulses per quarter note used when nothing else is configured
pub const DEFAULT_TICKS_PER_BEAT: NonZeroU32 = NonZeroU32::new(480).unwrap();

/// Convert a float to an integer, rejecting NaN, infinities and fractions
fn integral(kind: &str, value: f64) -> Result<i64> {
    if !value.is_finite() || value.fract() != 0.0 {
        return Err(CadenzaError::invalid(format!(
            "{kind} must be an integer, got {value}"
        )));
    }
    if value.abs() >= i64::MAX as f64 {
        return Err(CadenzaError::invalid(format!(
            "{kind} is out of range: {value}"
        )));
    }
    Ok(value as i64)
}

fn finite(kind: &str, value: f64) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(CadenzaError::invalid(format!(
            "{kind} must be finite, got {value}"
        )))
    }
}

fn midi_byte(kind: &str, value: i64) -> Result<u8> {
    if (0..=127).contains(&value) {
        Ok(value as u8)
    } else {
        Err(CadenzaError::invalid(format!(
            "{kind} must be in 0..=127, got {value}"
        )))
    }
}

fn ticks_per_beat(value: u32) -> Result<f64> {
    if value == 0 {
        return Err(CadenzaError::invalid("ticks per beat must be positive"));
    }
    Ok(value as f64)
}

/// Canonical integer time unit for event positions and durations
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(try_from = "i64", into = "u64")]
pub struct Ticks(u64);

impl Ticks {
    pub const ZERO: Ticks = Ticks(0);

    pub fn new(value: i64) -> Result<Self> {
        if value < 0 {
            return Err(CadenzaError::invalid(format!(
                "ticks must be non-negative, got {value}"
            )));
        }
        Ok(Self(value as u64))
    }

    pub fn value(self) -> u64 {
        self.0
    }

    pub fn saturating_add(self, other: Ticks) -> Ticks {
        Ticks(self.0.saturating_add(other.0))
    }

    /// `(ticks / ticks_per_beat) * (60 / bpm)`, evaluated as
    /// `ticks * 60 / (ticks_per_beat * bpm)` so tiny tempos stay finite
    pub fn to_seconds(self, ticks_per_beat_value: u32, tempo: Tempo) -> Result<Seconds> {
        let tpb = ticks_per_beat(ticks_per_beat_value)?;
        if self.0 == 0 {
            return Ok(Seconds::default());
        }
        Seconds::new(self.0 as f64 * 60.0 / (tpb * tempo.bpm()))
    }
}

impl TryFrom<i64> for Ticks {
    type Error = CadenzaError;

    fn try_from(value: i64) -> Result<Self> {
        Self::new(value)
    }
}

impl TryFrom<f64> for Ticks {
    type Error = CadenzaError;

    fn try_from(value: f64) -> Result<Self> {
        Self::new(integral("ticks", value)?)
    }
}

impl From<Ticks> for u64 {
    fn from(ticks: Ticks) -> Self {
        ticks.0
    }
}

impl fmt::Display for Ticks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Wall-clock time, finite and non-negative
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Seconds(f64);

impl Seconds {
    pub fn new(value: f64) -> Result<Self> {
        let value = finite("seconds", value)?;
        if value < 0.0 {
            return Err(CadenzaError::invalid(format!(
                "seconds must be non-negative, got {value}"
            )));
        }
        Ok(Self(value))
    }

    pub fn value(self) -> f64 {
        self.0
    }

    /// Inverse of [`Ticks::to_seconds`], rounded to the nearest tick
    pub fn to_ticks(self, ticks_per_beat_value: u32, tempo: Tempo) -> Result<Ticks> {
        let tpb = ticks_per_beat(ticks_per_beat_value)?;
        if self.0 == 0.0 {
            return Ok(Ticks::ZERO);
        }
        let ticks = (self.0 * tempo.bpm() * tpb / 60.0).round();
        Ticks::try_from(ticks)
    }
}

impl TryFrom<f64> for Seconds {
    type Error = CadenzaError;

    fn try_from(value: f64) -> Result<Self> {
        Self::new(value)
    }
}

impl From<Seconds> for f64 {
    fn from(seconds: Seconds) -> Self {
        seconds.0
    }
}

impl fmt::Display for Seconds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}s", self.0)
    }
}

/// MIDI note number (0-127, 60 = middle C)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct Pitch(u8);

impl Pitch {
    pub const MIDDLE_C: Pitch = Pitch(60);

    pub fn new(value: i64) -> Result<Self> {
        midi_byte("pitch", value).map(Self)
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl TryFrom<i64> for Pitch {
    type Error = CadenzaError;

    fn try_from(value: i64) -> Result<Self> {
        Self::new(value)
    }
}

impl TryFrom<f64> for Pitch {
    type Error = CadenzaError;

    fn try_from(value: f64) -> Result<Self> {
        Self::new(integral("pitch", value)?)
    }
}

impl From<Pitch> for u8 {
    fn from(pitch: Pitch) -> Self {
        pitch.0
    }
}

impl fmt::Display for Pitch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// MIDI velocity (0-127)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct Velocity(u8);

impl Velocity {
    pub fn new(value: i64) -> Result<Self> {
        midi_byte("velocity", value).map(Self)
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl TryFrom<i64> for Velocity {
    type Error = CadenzaError;

    fn try_from(value: i64) -> Result<Self> {
        Self::new(value)
    }
}

impl TryFrom<f64> for Velocity {
    type Error = CadenzaError;

    fn try_from(value: f64) -> Result<Self> {
        Self::new(integral("velocity", value)?)
    }
}

impl From<Velocity> for u8 {
    fn from(velocity: Velocity) -> Self {
        velocity.0
    }
}

impl fmt::Display for Velocity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Linear gain (0.0 to 1.0)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Volume(f64);

impl Volume {
    pub const SILENT: Volume = Volume(0.0);
    pub const UNITY: Volume = Volume(1.0);

    pub fn new(value: f64) -> Result<Self> {
        let value = finite("volume", value)?;
        if !(0.0..=1.0).contains(&value) {
            return Err(CadenzaError::invalid(format!(
                "volume must be in 0.0..=1.0, got {value}"
            )));
        }
        Ok(Self(value))
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

impl Default for Volume {
    fn default() -> Self {
        Self::UNITY
    }
}

impl TryFrom<f64> for Volume {
    type Error = CadenzaError;

    fn try_from(value: f64) -> Result<Self> {
        Self::new(value)
    }
}

impl From<Volume> for f64 {
    fn from(volume: Volume) -> Self {
        volume.0
    }
}

/// Stereo position (-1.0 left, 0.0 center, 1.0 right)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Pan(f64);

impl Pan {
    pub const CENTER: Pan = Pan(0.0);

    pub fn new(value: f64) -> Result<Self> {
        let value = finite("pan", value)?;
        if !(-1.0..=1.0).contains(&value) {
            return Err(CadenzaError::invalid(format!(
                "pan must be in -1.0..=1.0, got {value}"
            )));
        }
        Ok(Self(value))
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

impl TryFrom<f64> for Pan {
    type Error = CadenzaError;

    fn try_from(value: f64) -> Result<Self> {
        Self::new(value)
    }
}

impl From<Pan> for f64 {
    fn from(pan: Pan) -> Self {
        pan.0
    }
}

/// Tempo in BPM, strictly positive
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Tempo(f64);

impl Tempo {
    pub const DEFAULT: Tempo = Tempo(120.0);

    pub fn new(bpm: f64) -> Result<Self> {
        let bpm = finite("tempo", bpm)?;
        if bpm <= 0.0 {
            return Err(CadenzaError::invalid(format!(
                "tempo must be positive, got {bpm}"
            )));
        }
        Ok(Self(bpm))
    }

    pub fn bpm(self) -> f64 {
        self.0
    }

    /// Duration of one beat in seconds
    pub fn beat_duration_secs(self) -> f64 {
        60.0 / self.0
    }
}

impl Default for Tempo {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<f64> for Tempo {
    type Error = CadenzaError;

    fn try_from(value: f64) -> Result<Self> {
        Self::new(value)
    }
}

impl From<Tempo> for f64 {
    fn from(tempo: Tempo) -> Self {
        tempo.0
    }
}

#[derive(Deserialize)]
struct RawTimeSignature {
    numerator: i64,
    denominator: i64,
}

/// Time signature, e.g. 4/4 or 6/8
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawTimeSignature")]
pub struct TimeSignature {
    numerator: u32,
    denominator: u32,
}

impl TimeSignature {
    pub const COMMON: TimeSignature = TimeSignature {
        numerator: 4,
        denominator: 4,
    };

    pub fn new(numerator: i64, denominator: i64) -> Result<Self> {
        if numerator <= 0 || numerator > u32::MAX as i64 {
            return Err(CadenzaError::invalid(format!(
                "time signature numerator must be a positive integer, got {numerator}"
            )));
        }
        if denominator <= 0
            || denominator > u32::MAX as i64
            || !(denominator as u64).is_power_of_two()
        {
            return Err(CadenzaError::invalid(format!(
                "time signature denominator must be a positive power of two, got {denominator}"
            )));
        }
        Ok(Self {
            numerator: numerator as u32,
            denominator: denominator as u32,
        })
    }

    pub fn numerator(self) -> u32 {
        self.numerator
    }

    pub fn denominator(self) -> u32 {
        self.denominator
    }

    /// Length of one bar in ticks, saturating at `u64::MAX`
    pub fn ticks_per_bar(self, ticks_per_beat: u32) -> u64 {
        let ticks =
            self.numerator as u128 * ticks_per_beat as u128 * 4 / self.denominator as u128;
        u64::try_from(ticks).unwrap_or(u64::MAX)
    }
}

impl Default for TimeSignature {
    fn default() -> Self {
        Self::COMMON
    }
}

impl TryFrom<RawTimeSignature> for TimeSignature {
    type Error = CadenzaError;

    fn try_from(raw: RawTimeSignature) -> Result<Self> {
        Self::new(raw.numerator, raw.denominator)
    }
}

impl fmt::Display for TimeSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.numerator, self.denominator)
    }
}
