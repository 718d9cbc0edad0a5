//! # Mixdown
//!
//! Real-time PCM mixing of a looping background track with overlapping
//! one-shot sound effects. The [`mixer::Mixer`] turns elapsed time into a
//! number of samples, sums the background and every active effect into a
//! per-channel master buffer and hard-clips the result.
//!
//! Around the mixer sit the asset loaders ([`asset`]), the device driver and
//! offline renderer ([`playback`]) and JSON settings ([`settings`]).

pub mod asset;
pub mod audio;
pub mod constants;
pub mod diagnostics;
pub mod error;
pub mod mixer;
pub mod playback;
pub mod settings;

pub use error::MixerError;
pub use mixer::{Mixer, MixerConfig};
