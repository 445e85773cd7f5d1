//! Image preloading.
//!
//! Every requested source is read and decoded concurrently; the returned future resolves only
//! after all of them have either loaded or failed. Failures are kept per source and never stop
//! the other sources from loading.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use futures::future::join_all;
use image::GenericImageView;
use log::{info, warn};

use crate::error::AssetError;
use crate::surface::Bitmap;

#[derive(Clone, Debug, Default)]
pub struct AssetStore {
    images: HashMap<String, Arc<Bitmap>>,
    errors: HashMap<String, AssetError>,
}

impl AssetStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every source in `sources`.
    pub async fn load(sources: Vec<String>) -> Self {
        let results = join_all(sources.into_iter().map(|src| async move {
            let result = load_one(&src).await;
            (src, result)
        }))
        .await;

        let mut store = AssetStore::new();
        for (src, result) in results {
            store.insert(src, result);
        }

        info!(
            "loaded {} image(s), {} failed",
            store.images.len(),
            store.errors.len()
        );
        store
    }

    /// Record the outcome of loading `src`.
    pub fn insert(&mut self, src: String, result: Result<Bitmap, AssetError>) {
        match result {
            Ok(bitmap) => {
                self.errors.remove(&src);
                self.images.insert(src, Arc::new(bitmap));
            }
            Err(e) => {
                warn!("{}", e);
                self.images.remove(&src);
                self.errors.insert(src, e);
            }
        }
    }

    /// Look up a decoded image. Errors with the recorded load failure, or
    /// [`AssetError::NotLoaded`] if `src` was never loaded.
    pub fn get(&self, src: &str) -> Result<Arc<Bitmap>, AssetError> {
        if let Some(bitmap) = self.images.get(src) {
            return Ok(Arc::clone(bitmap));
        }
        match self.errors.get(src) {
            Some(e) => Err(e.clone()),
            None => Err(AssetError::NotLoaded(src.to_string())),
        }
    }

    pub fn loaded_count(&self) -> usize {
        self.images.len()
    }

    pub fn error_count(&self) -> usize {
        self.errors.len()
    }
}

async fn load_one(src: &str) -> Result<Bitmap, AssetError> {
    let is_svg = Path::new(src)
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("svg"))
        .unwrap_or(false);
    if is_svg {
        return Err(AssetError::Unsupported(src.to_string()));
    }

    let bytes = tokio::fs::read(src).await.map_err(|e| AssetError::Io {
        src: src.to_string(),
        source: Arc::new(e),
    })?;

    decode(src, &bytes)
}

/// Decode encoded image bytes into an RGBA bitmap.
pub fn decode(src: &str, bytes: &[u8]) -> Result<Bitmap, AssetError> {
    let img = image::load_from_memory(bytes).map_err(|e| AssetError::Decode {
        src: src.to_string(),
        source: Arc::new(e),
    })?;
    let (width, height) = img.dimensions();
    Ok(Bitmap::new(width, height, img.to_rgba8().into_raw()))
}
