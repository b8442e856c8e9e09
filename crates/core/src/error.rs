//! Error types for bestplace

use thiserror::Error;

/// Main error type for bestplace operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("GeoJSON error: {0}")]
    GeoJson(#[from] geojson::Error),

    #[error("constraint set is empty: nothing to aggregate")]
    EmptyInput,

    #[error("Unsupported geometry for constraint '{constraint}': {kind}")]
    UnsupportedGeometry { constraint: String, kind: &'static str },

    #[error("CRS mismatch: {0} vs {1}")]
    CrsMismatch(String, String),

    #[error("Invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("Algorithm error: {0}")]
    Algorithm(String),

    #[error("{0}")]
    Other(String),
}

/// Result type alias for bestplace operations
pub type Result<T> = std::result::Result<T, Error>;
