//! Sample rate and channel layout shared by the mixer and its collaborators.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::MixerError;

/// Speaker position identifying one sample stream of a track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    FrontLeft,
    FrontRight,
    FrontCentre,
    Lfe,
    RearLeft,
    RearRight,
}

/// Named channel layouts accepted by settings files and the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelLayout {
    Mono,
    #[default]
    Stereo,
}

impl ChannelLayout {
    /// Ordered channel set for this layout.
    pub fn channels(self) -> Vec<Channel> {
        match self {
            Self::Mono => vec![Channel::FrontCentre],
            Self::Stereo => vec![Channel::FrontLeft, Channel::FrontRight],
        }
    }

    /// Parse a layout name (`mono` or `stereo`, case-insensitive).
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "mono" | "1" => Some(Self::Mono),
            "stereo" | "2" => Some(Self::Stereo),
            _ => None,
        }
    }
}

/// Output format of the mixer: sample rate plus ordered channel set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioSpec {
    pub frequency: u32,
    pub channels: Vec<Channel>,
}

impl AudioSpec {
    pub fn new(frequency: u32, channels: Vec<Channel>) -> Self {
        Self {
            frequency,
            channels,
        }
    }

    pub fn stereo(frequency: u32) -> Self {
        Self::new(frequency, ChannelLayout::Stereo.channels())
    }

    pub fn mono(frequency: u32) -> Self {
        Self::new(frequency, ChannelLayout::Mono.channels())
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Number of samples per channel covering `ms` milliseconds, floored.
    pub fn samples_for_ms(&self, ms: u32) -> usize {
        (self.frequency as u64 * ms as u64 / 1000) as usize
    }

    /// Number of whole samples per channel elapsing in `duration`.
    pub fn samples_for_duration(&self, duration: Duration) -> usize {
        (duration.as_nanos() * self.frequency as u128 / 1_000_000_000) as usize
    }

    /// Reject specs the mixer cannot run with.
    ///
    /// # Errors
    /// Returns [`MixerError::InvalidSpec`] for a zero frequency, an empty
    /// channel set, or a channel listed twice.
    pub fn validate(&self) -> Result<(), MixerError> {
        if self.frequency == 0 {
            return Err(MixerError::InvalidSpec(
                "frequency must be positive".to_string(),
            ));
        }
        if self.channels.is_empty() {
            return Err(MixerError::InvalidSpec(
                "channel set must not be empty".to_string(),
            ));
        }
        for (idx, channel) in self.channels.iter().enumerate() {
            if self.channels[..idx].contains(channel) {
                return Err(MixerError::InvalidSpec(format!(
                    "channel {:?} listed more than once",
                    channel
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stereo_spec_is_valid() {
        let spec = AudioSpec::stereo(44_100);
        assert!(spec.validate().is_ok());
        assert_eq!(spec.channel_count(), 2);
    }

    #[test]
    fn zero_frequency_is_rejected() {
        let spec = AudioSpec::mono(0);
        assert!(matches!(spec.validate(), Err(MixerError::InvalidSpec(_))));
    }

    #[test]
    fn empty_and_duplicate_channels_are_rejected() {
        let empty = AudioSpec::new(48_000, Vec::new());
        assert!(matches!(empty.validate(), Err(MixerError::InvalidSpec(_))));

        let dup = AudioSpec::new(48_000, vec![Channel::FrontLeft, Channel::FrontLeft]);
        assert!(matches!(dup.validate(), Err(MixerError::InvalidSpec(_))));
    }

    #[test]
    fn hundred_ms_is_a_tenth_of_the_frequency() {
        let spec = AudioSpec::stereo(44_100);
        assert_eq!(spec.samples_for_ms(100), 4_410);
        assert_eq!(spec.samples_for_duration(Duration::from_millis(100)), 4_410);
    }

    #[test]
    fn layout_names_parse() {
        assert_eq!(ChannelLayout::parse("Mono"), Some(ChannelLayout::Mono));
        assert_eq!(ChannelLayout::parse("stereo"), Some(ChannelLayout::Stereo));
        assert_eq!(ChannelLayout::parse("quad"), None);
    }
}
