//! Error type surfaced by mixer construction and playback requests.

use std::fmt::{Display, Formatter};

use crate::asset::AssetLoadError;

/// Error type for mixer configuration, initialization and playback requests.
#[derive(Debug)]
pub enum MixerError {
    /// The audio spec or buffer settings cannot be used.
    InvalidSpec(String),
    /// Loading or decoding an asset failed.
    AssetLoad(AssetLoadError),
    /// A loaded asset does not carry one sample stream per configured channel.
    ChannelMismatch {
        path: String,
        expected: usize,
        found: usize,
    },
    /// The mixer was shut down and no longer accepts playback requests.
    ShutDown,
}

impl Display for MixerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidSpec(err) => write!(f, "invalid audio spec: {}", err),
            Self::AssetLoad(err) => write!(f, "asset load error: {}", err),
            Self::ChannelMismatch {
                path,
                expected,
                found,
            } => write!(
                f,
                "asset {} has {} channel(s), mixer expects {}",
                path, found, expected
            ),
            Self::ShutDown => write!(f, "mixer is shut down"),
        }
    }
}

impl std::error::Error for MixerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::AssetLoad(err) => Some(err),
            _ => None,
        }
    }
}

impl From<AssetLoadError> for MixerError {
    fn from(value: AssetLoadError) -> Self {
        Self::AssetLoad(value)
    }
}
