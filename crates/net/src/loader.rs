// ABOUTME: HTTP image loader that warms an in-memory image cache.
// ABOUTME: Resolves relative URLs against an optional base and fetches through resource::fetch.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use bytes::Bytes;
use domimages_core::{ImageLoader, ImagesError, LoadFuture};
use url::Url;

use crate::resource::{fetch, FetchOptions};

/// Fetched image bytes keyed by absolute URL. Clones share the same storage.
#[derive(Debug, Clone, Default)]
pub struct ImageCache {
    entries: Arc<Mutex<HashMap<String, Bytes>>>,
}

impl ImageCache {
    fn lock(&self) -> MutexGuard<'_, HashMap<String, Bytes>> {
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn insert(&self, url: impl Into<String>, body: Bytes) {
        self.lock().insert(url.into(), body);
    }

    pub fn get(&self, url: &str) -> Option<Bytes> {
        self.lock().get(url).cloned()
    }

    pub fn contains(&self, url: &str) -> bool {
        self.lock().contains_key(url)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

/// Preloads images over HTTP(S).
///
/// `data:` URLs count as loaded without any request. Any other scheme, or a
/// relative URL with no base configured, fails when the load is started.
#[derive(Debug, Clone)]
pub struct HttpImageLoader {
    client: reqwest::Client,
    base: Option<Url>,
    opts: FetchOptions,
    cache: ImageCache,
}

impl HttpImageLoader {
    pub fn new(client: reqwest::Client) -> Self {
        Self {
            client,
            base: None,
            opts: FetchOptions::default(),
            cache: ImageCache::default(),
        }
    }

    /// Resolve relative image URLs against this URL.
    pub fn base_url(mut self, base: Url) -> Self {
        self.base = Some(base);
        self
    }

    pub fn fetch_options(mut self, opts: FetchOptions) -> Self {
        self.opts = opts;
        self
    }

    /// Share an existing cache instead of starting empty.
    pub fn with_cache(mut self, cache: ImageCache) -> Self {
        self.cache = cache;
        self
    }

    pub fn cache(&self) -> &ImageCache {
        &self.cache
    }

    fn resolve(&self, url: &str) -> Result<Url, ImagesError> {
        match Url::parse(url) {
            Ok(absolute) => Ok(absolute),
            Err(url::ParseError::RelativeUrlWithoutBase) => match &self.base {
                Some(base) => base
                    .join(url)
                    .map_err(|e| ImagesError::preload_start(url, e)),
                None => Err(ImagesError::preload_start(
                    url,
                    "relative URL and no base URL configured",
                )),
            },
            Err(e) => Err(ImagesError::preload_start(url, e)),
        }
    }
}

impl ImageLoader for HttpImageLoader {
    fn start(&self, url: &str) -> Result<LoadFuture, ImagesError> {
        let target = self.resolve(url)?;

        match target.scheme() {
            "http" | "https" => {}
            "data" => return Ok(Box::pin(async { Ok(()) })),
            other => {
                return Err(ImagesError::preload_start(
                    url,
                    format!("unsupported scheme {}", other),
                ))
            }
        }

        if self.cache.contains(target.as_str()) {
            tracing::trace!(url = %target, "already cached");
            return Ok(Box::pin(async { Ok(()) }));
        }

        let client = self.client.clone();
        let opts = self.opts.clone();
        let cache = self.cache.clone();
        Ok(Box::pin(async move {
            let fetched = fetch(&client, target.as_str(), &opts).await?;
            tracing::debug!(url = %target, bytes = fetched.body.len(), "image cached");
            cache.insert(target.as_str(), fetched.body);
            Ok(())
        }))
    }
}
