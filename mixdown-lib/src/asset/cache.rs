//! Path-keyed reuse of decoded assets.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use log::debug;

use super::{Asset, AssetLoadError, AssetLoader};

/// Loader wrapper that decodes each path once and hands out shared copies.
///
/// Failed loads are not remembered, so a file that appears later can still
/// be loaded.
pub struct CachingLoader<L> {
    inner: L,
    assets: Mutex<HashMap<String, Arc<Asset>>>,
}

impl<L: AssetLoader> CachingLoader<L> {
    pub fn new(inner: L) -> Self {
        Self {
            inner,
            assets: Mutex::new(HashMap::new()),
        }
    }

    /// Number of cached assets.
    pub fn cached(&self) -> usize {
        self.assets.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Drop every cached asset. Assets still referenced elsewhere stay alive.
    pub fn clear(&self) {
        self.assets.lock().unwrap_or_else(|e| e.into_inner()).clear();
    }

    pub fn inner(&self) -> &L {
        &self.inner
    }
}

impl<L: AssetLoader> AssetLoader for CachingLoader<L> {
    fn load(&self, path: &str) -> Result<Arc<Asset>, AssetLoadError> {
        if let Some(asset) = self
            .assets
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(path)
        {
            debug!("asset cache hit: {}", path);
            return Ok(asset.clone());
        }

        // Decode without holding the cache lock; a racing load of the same
        // path keeps whichever copy lands first.
        let asset = self.inner.load(path)?;
        let mut assets = self.assets.lock().unwrap_or_else(|e| e.into_inner());
        Ok(assets.entry(path.to_string()).or_insert(asset).clone())
    }
}
