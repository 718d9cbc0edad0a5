//! JSON-backed settings for the mixer, its output cadence and the effect
//! schedule.

use std::fmt::{Display, Formatter};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::audio::spec::{AudioSpec, ChannelLayout};
use crate::constants::{
    DEFAULT_BUFFER_MS, DEFAULT_CYCLE_MS, DEFAULT_DURATION_SECS, DEFAULT_EFFECT_INTERVAL_MS,
    DEFAULT_FREQUENCY,
};
use crate::mixer::MixerConfig;

/// Error type for reading settings files.
#[derive(Debug)]
pub enum SettingsError {
    Io(std::io::Error),
    Parse(serde_json::Error),
    MissingBackground,
}

impl Display for SettingsError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "io error: {}", err),
            Self::Parse(err) => write!(f, "invalid settings json: {}", err),
            Self::MissingBackground => write!(f, "no background track configured"),
        }
    }
}

impl std::error::Error for SettingsError {}

impl From<std::io::Error> for SettingsError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for SettingsError {
    fn from(value: serde_json::Error) -> Self {
        Self::Parse(value)
    }
}

/// Serialized mixer and schedule settings.
///
/// Every field is optional in JSON; missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MixerSettings {
    pub frequency: u32,
    pub channels: ChannelLayout,
    pub buffer_ms: u32,
    pub cycle_ms: u64,
    pub background: Option<String>,
    pub effect: Option<String>,
    pub effect_interval_ms: u64,
    /// Run length in seconds; `0` runs until stopped.
    pub duration_secs: f64,
}

impl Default for MixerSettings {
    fn default() -> Self {
        Self {
            frequency: DEFAULT_FREQUENCY,
            channels: ChannelLayout::default(),
            buffer_ms: DEFAULT_BUFFER_MS,
            cycle_ms: DEFAULT_CYCLE_MS,
            background: None,
            effect: None,
            effect_interval_ms: DEFAULT_EFFECT_INTERVAL_MS,
            duration_secs: DEFAULT_DURATION_SECS,
        }
    }
}

impl MixerSettings {
    pub fn from_json_str(json: &str) -> Result<Self, SettingsError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: &str) -> Result<Self, SettingsError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn to_json_pretty(&self) -> Result<String, SettingsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn spec(&self) -> AudioSpec {
        AudioSpec::new(self.frequency, self.channels.channels())
    }

    /// Build the mixer configuration these settings describe.
    ///
    /// # Errors
    /// Returns [`SettingsError::MissingBackground`] when no background track
    /// is set.
    pub fn to_config(&self) -> Result<MixerConfig, SettingsError> {
        let background = self
            .background
            .as_deref()
            .ok_or(SettingsError::MissingBackground)?;
        Ok(MixerConfig::new(self.spec(), background).with_buffer_ms(self.buffer_ms))
    }

    pub fn cycle(&self) -> Duration {
        Duration::from_millis(self.cycle_ms.max(1))
    }

    pub fn effect_interval(&self) -> Duration {
        Duration::from_millis(self.effect_interval_ms.max(1))
    }

    /// How long to run, or `None` to run until stopped.
    pub fn run_duration(&self) -> Option<Duration> {
        if self.duration_secs > 0.0 && self.duration_secs.is_finite() {
            Some(Duration::from_secs_f64(self.duration_secs))
        } else {
            None
        }
    }
}
