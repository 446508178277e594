use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;

use feed_core::PostImage;
use feed_logging::{elapsed_ms, feed_debug};

use crate::{FailureKind, FetchError, ResourceFetcher};

/// Decoded images keyed by URL, filled on first successful fetch.
///
/// Misses are not coalesced: two concurrent requests for the same
/// uncached URL both go to the network and the later one overwrites the
/// entry. Failures are never stored.
pub struct ImageCache {
    fetcher: Arc<dyn ResourceFetcher>,
    entries: Mutex<HashMap<String, PostImage>>,
}

impl ImageCache {
    pub fn new(fetcher: Arc<dyn ResourceFetcher>) -> Self {
        Self {
            fetcher,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub async fn fetch(&self, url: &str) -> Result<PostImage, FetchError> {
        let started = Instant::now();
        if let Some(hit) = self.lookup(url) {
            feed_debug!("CACHE time for '{}': {}ms", url, elapsed_ms(started));
            return Ok(hit);
        }

        let output = self.fetcher.fetch(url).await?;
        let owned_url = url.to_string();
        let image = tokio::task::spawn_blocking(move || decode_image(&owned_url, &output.bytes))
            .await
            .map_err(|err| FetchError::new(FailureKind::Cancelled, err.to_string()))??;

        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(url.to_string(), image.clone());
        feed_debug!("GET time for '{}': {}ms", url, elapsed_ms(started));
        Ok(image)
    }

    pub fn contains(&self, url: &str) -> bool {
        self.lookup(url).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lookup(&self, url: &str) -> Option<PostImage> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(url)
            .cloned()
    }
}

/// Decodes PNG, JPEG, GIF or WebP bytes into RGBA8.
pub fn decode_image(url: &str, bytes: &[u8]) -> Result<PostImage, FetchError> {
    let decoded = image::load_from_memory(bytes)
        .map_err(|err| FetchError::new(FailureKind::Decode, err.to_string()))?;
    let rgba = decoded.to_rgba8();
    let (width, height) = rgba.dimensions();
    Ok(PostImage {
        url: url.to_string(),
        width,
        height,
        rgba: Arc::from(rgba.into_raw()),
    })
}
