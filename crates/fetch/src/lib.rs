//! # bestplace fetch
//!
//! Downloads open map layers from a WFS service with a single `GetFeature`
//! request per feature type, and keeps them in an on-disk cache so each
//! layer is fetched at most once.
//!
//! The [`Fetcher`] is async (reqwest + tokio); [`blocking`] wraps it for
//! synchronous callers.

pub mod cache;
pub mod error;
pub mod fetcher;
pub mod http;
pub mod wfs;

mod sync_api;

pub use cache::DatasetCache;
pub use error::{FetchError, Result};
pub use fetcher::{FetchOutcome, Fetcher, FetcherOptions};
pub use wfs::WfsSource;

/// Blocking API re-exported as `blocking` module.
pub mod blocking {
    pub use crate::sync_api::*;
}
