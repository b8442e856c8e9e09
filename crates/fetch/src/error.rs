//! Error types for dataset fetching.

use thiserror::Error;

/// Errors produced while downloading or caching a dataset.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status} fetching {url}")]
    Status { url: String, status: u16 },

    #[error("invalid WFS URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("WFS service exception for {type_name}: {message}")]
    ServiceException { type_name: String, message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("runtime error: {0}")]
    Runtime(String),

    #[error("core error: {0}")]
    Core(#[from] bestplace_core::Error),
}

/// Result alias for fetch operations.
pub type Result<T> = std::result::Result<T, FetchError>;
