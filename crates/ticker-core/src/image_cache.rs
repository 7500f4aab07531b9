// File: crates/ticker-core/src/image_cache.rs
// Summary: Remote image cache; fetch-once, decode-once URL -> image handles with LRU bounding.
// Notes:
// - Decoded images live in the LRU. An in-flight fetch is a `OnceCell` in a
//   pending map beside it, so concurrent misses for one URL share a fetch and
//   a miss evicts nothing until it has an image to store.
// - A failed fetch stores nothing; nothing negative is cached.
// - The lock is a std mutex held only for lookups, never across an await.

use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use bytes::Bytes;
use lru::LruCache;
use skia_safe as skia;
use tokio::sync::OnceCell;
use tracing::{debug, warn};

use crate::error::{Error, Result};

/// Source of raw image bytes.
#[async_trait]
pub trait ImageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Bytes>;
}

/// Fetches `http(s)://` over the network, and reads `data:` and `file://`
/// URLs locally.
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::config(format!("http client: {e}")))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl ImageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Bytes> {
        if let Some(bytes) = decode_data_uri(url)? {
            return Ok(bytes);
        }
        if let Some(path) = url.strip_prefix("file://") {
            return tokio::fs::read(path).await.map(Bytes::from).map_err(|e| Error::fetch(url, e));
        }
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| Error::fetch(url, e))?;
        resp.bytes().await.map_err(|e| Error::fetch(url, e))
    }
}

/// Payload of a `data:` URI, or `None` when `url` is not one.
pub fn decode_data_uri(url: &str) -> Result<Option<Bytes>> {
    let Some(rest) = url.strip_prefix("data:") else { return Ok(None) };
    let (meta, payload) = rest
        .split_once(',')
        .ok_or_else(|| Error::fetch(url, "data URI without payload"))?;
    if meta.ends_with(";base64") {
        base64::engine::general_purpose::STANDARD
            .decode(payload.trim())
            .map(|v| Some(Bytes::from(v)))
            .map_err(|e| Error::fetch(url, e))
    } else {
        Ok(Some(Bytes::copy_from_slice(payload.as_bytes())))
    }
}

/// Fully decode encoded bytes into a raster image.
pub fn decode_image(bytes: &[u8]) -> std::result::Result<skia::Image, String> {
    let rgba = image::load_from_memory(bytes).map_err(|e| e.to_string())?.to_rgba8();
    let (w, h) = rgba.dimensions();
    let info = skia::ImageInfo::new(
        (w as i32, h as i32),
        skia::ColorType::RGBA8888,
        skia::AlphaType::Unpremul,
        None,
    );
    let row_bytes = w as usize * 4;
    skia::images::raster_from_data(&info, skia::Data::new_copy(rgba.as_raw()), row_bytes)
        .ok_or_else(|| format!("could not wrap {w}x{h} pixels"))
}

/// Image argument for the clipped-image primitives: a decoded handle or a URL
/// still to be resolved.
#[derive(Clone, Copy, Debug)]
pub enum ImageSource<'a> {
    Image(&'a skia::Image),
    Url(&'a str),
}

impl ImageSource<'_> {
    /// Decoded image, fetching through `cache` when only a URL is known.
    /// A blank URL resolves to `None`.
    pub async fn resolve(self, cache: &ImageCache) -> Result<Option<skia::Image>> {
        match self {
            ImageSource::Image(img) => Ok(Some(img.clone())),
            ImageSource::Url(url) => cache.get_optional(Some(url)).await,
        }
    }
}

#[derive(Default, Debug)]
pub struct ImageCacheStats {
    pub hits: AtomicU64,
    /// Fetch-and-decode runs, successful or not.
    pub fetches: AtomicU64,
    pub failures: AtomicU64,
}

impl ImageCacheStats {
    pub fn hits(&self) -> u64 { self.hits.load(Ordering::Relaxed) }
    pub fn fetches(&self) -> u64 { self.fetches.load(Ordering::Relaxed) }
    pub fn failures(&self) -> u64 { self.failures.load(Ordering::Relaxed) }
}

type Pending = Arc<OnceCell<skia::Image>>;

struct Slots {
    done: LruCache<String, skia::Image>,
    pending: HashMap<String, Pending>,
}

pub struct ImageCache {
    fetcher: Arc<dyn ImageFetcher>,
    slots: Mutex<Slots>,
    stats: ImageCacheStats,
}

impl ImageCache {
    pub fn new(fetcher: Arc<dyn ImageFetcher>, capacity: NonZeroUsize) -> Self {
        Self {
            fetcher,
            slots: Mutex::new(Slots { done: LruCache::new(capacity), pending: HashMap::new() }),
            stats: ImageCacheStats::default(),
        }
    }

    /// Decoded image for `url`, fetching on first use.
    pub async fn get_or_fetch(&self, url: &str) -> Result<skia::Image> {
        let cell = {
            let mut slots = self.lock();
            if let Some(img) = slots.done.get(url) {
                self.stats.hits.fetch_add(1, Ordering::Relaxed);
                debug!(url, "image cache hit");
                return Ok(img.clone());
            }
            slots.pending.entry(url.to_string()).or_default().clone()
        };

        let result = cell
            .get_or_try_init(|| async {
                self.stats.fetches.fetch_add(1, Ordering::Relaxed);
                debug!(url, "image cache miss; fetching");
                let bytes = self.fetcher.fetch(url).await?;
                decode_image(&bytes).map_err(|reason| Error::fetch(url, reason))
            })
            .await;

        let mut slots = self.lock();
        if slots.pending.get(url).is_some_and(|p| Arc::ptr_eq(p, &cell)) {
            slots.pending.remove(url);
        }
        match result {
            Ok(img) => {
                if !slots.done.contains(url) {
                    slots.done.put(url.to_string(), img.clone());
                }
                Ok(img.clone())
            }
            Err(e) => {
                self.stats.failures.fetch_add(1, Ordering::Relaxed);
                warn!(url, error = %e, "image fetch failed");
                Err(e)
            }
        }
    }

    /// `None` for a missing or blank URL.
    pub async fn get_optional(&self, url: Option<&str>) -> Result<Option<skia::Image>> {
        match url.map(str::trim).filter(|u| !u.is_empty()) {
            Some(u) => self.get_or_fetch(u).await.map(Some),
            None => Ok(None),
        }
    }

    /// Whether a decoded image is cached for `url`.
    pub fn contains(&self, url: &str) -> bool {
        self.lock().done.contains(url)
    }

    pub fn len(&self) -> usize {
        self.lock().done.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> &ImageCacheStats {
        &self.stats
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Slots> {
        // A panic while holding the lock cannot leave an entry half-written.
        self.slots.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
