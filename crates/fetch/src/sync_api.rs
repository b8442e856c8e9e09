//! Blocking (synchronous) API.
//!
//! Wraps the async [`Fetcher`] with a Tokio runtime so callers don't need
//! to manage their own async runtime.

use bestplace_core::FeatureCollection;

use crate::cache::DatasetCache;
use crate::error::{FetchError, Result};
use crate::fetcher::{FetchOutcome, Fetcher, FetcherOptions};
use crate::wfs::WfsSource;

/// Blocking wrapper around [`Fetcher`].
///
/// Uses an internal single-threaded Tokio runtime.
pub struct FetcherBlocking {
    rt: tokio::runtime::Runtime,
    inner: Fetcher,
}

impl FetcherBlocking {
    pub fn new(source: WfsSource, cache: DatasetCache, options: FetcherOptions) -> Result<Self> {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| FetchError::Runtime(e.to_string()))?;

        let inner = Fetcher::new(source, cache, options)?;
        Ok(Self { rt, inner })
    }

    /// Ensure one feature type is cached (blocking).
    pub fn ensure(&self, type_name: &str) -> Result<FetchOutcome> {
        self.rt.block_on(self.inner.ensure(type_name))
    }

    /// Ensure several feature types, sequentially (blocking).
    pub fn ensure_all<'a, I>(&self, type_names: I) -> Result<Vec<FetchOutcome>>
    where
        I: IntoIterator<Item = &'a str>,
    {
        self.rt.block_on(self.inner.ensure_all(type_names))
    }

    /// Ensure and read one feature type (blocking).
    pub fn load(&self, type_name: &str) -> Result<FeatureCollection> {
        self.rt.block_on(self.inner.load(type_name))
    }

    pub fn cache(&self) -> &DatasetCache {
        self.inner.cache()
    }

    pub fn source(&self) -> &WfsSource {
        self.inner.source()
    }
}
