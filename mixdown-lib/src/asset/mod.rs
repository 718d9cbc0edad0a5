//! Decoded sample assets and the loaders that produce them.
//!
//! The mixer never touches the filesystem itself: every clip it plays comes
//! from an [`AssetLoader`]. Caching is the loader's business, see
//! [`CachingLoader`].

mod cache;
mod decode;
mod error;

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub use cache::CachingLoader;
pub use decode::{decode_file, SymphoniaLoader};
pub use error::AssetLoadError;

/// A fully decoded clip held in memory.
///
/// Samples are normalized `f32` values stored one vector per channel. All
/// channels have the same length and that length is never zero.
#[derive(Debug, Clone)]
pub struct Asset {
    sample_rate: u32,
    channels: Vec<Vec<f32>>,
}

impl Asset {
    /// Build an asset from per-channel sample vectors.
    ///
    /// # Errors
    /// Returns [`AssetLoadError::Empty`] when there are no channels or no
    /// samples, and [`AssetLoadError::Decode`] when channel lengths differ.
    pub fn from_channels(
        sample_rate: u32,
        channels: Vec<Vec<f32>>,
    ) -> Result<Self, AssetLoadError> {
        let Some(first) = channels.first() else {
            return Err(AssetLoadError::Empty("no channels".to_string()));
        };
        let duration = first.len();
        if duration == 0 {
            return Err(AssetLoadError::Empty("no samples".to_string()));
        }
        if channels.iter().any(|channel| channel.len() != duration) {
            return Err(AssetLoadError::Decode(
                "channels have different lengths".to_string(),
            ));
        }

        Ok(Self {
            sample_rate,
            channels,
        })
    }

    /// Build a single-channel asset.
    pub fn mono(sample_rate: u32, samples: Vec<f32>) -> Result<Self, AssetLoadError> {
        Self::from_channels(sample_rate, vec![samples])
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Length of the clip in samples per channel.
    pub fn duration_samples(&self) -> usize {
        self.channels[0].len()
    }

    pub fn duration(&self) -> Duration {
        Duration::from_secs_f64(self.duration_samples() as f64 / self.sample_rate.max(1) as f64)
    }

    pub fn channel(&self, channel: usize) -> Option<&[f32]> {
        self.channels.get(channel).map(Vec::as_slice)
    }

    /// Sample at `index` of `channel`.
    ///
    /// Callers keep `channel < channel_count()` and
    /// `index < duration_samples()`.
    #[inline]
    pub fn sample(&self, channel: usize, index: usize) -> f32 {
        self.channels[channel][index]
    }

    /// Largest absolute sample value across all channels.
    pub fn peak(&self) -> f32 {
        self.channels
            .iter()
            .flat_map(|channel| channel.iter())
            .fold(0.0_f32, |peak, sample| peak.max(sample.abs()))
    }
}

/// Source of decoded assets, addressed by path.
pub trait AssetLoader: Send + Sync {
    /// Load (or reuse) the asset at `path`.
    fn load(&self, path: &str) -> Result<Arc<Asset>, AssetLoadError>;
}

impl<L: AssetLoader + ?Sized> AssetLoader for Arc<L> {
    fn load(&self, path: &str) -> Result<Arc<Asset>, AssetLoadError> {
        (**self).load(path)
    }
}

/// Loader serving assets registered in memory under a name.
#[derive(Debug, Default)]
pub struct MemoryLoader {
    assets: Mutex<HashMap<String, Arc<Asset>>>,
}

impl MemoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `asset` under `name`, replacing any previous entry.
    pub fn insert(&self, name: &str, asset: Asset) -> Arc<Asset> {
        let asset = Arc::new(asset);
        let mut assets = self.assets.lock().unwrap_or_else(|e| e.into_inner());
        assets.insert(name.to_string(), asset.clone());
        asset
    }

    pub fn len(&self) -> usize {
        self.assets.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl AssetLoader for MemoryLoader {
    fn load(&self, path: &str) -> Result<Arc<Asset>, AssetLoadError> {
        let assets = self.assets.lock().unwrap_or_else(|e| e.into_inner());
        assets
            .get(path)
            .cloned()
            .ok_or_else(|| AssetLoadError::NotFound(path.to_string()))
    }
}
