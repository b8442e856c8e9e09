//! The WFS endpoint and its `GetFeature` request.
//!
//! Only one request shape is built: every feature of one type, as GeoJSON,
//! in the source's projected CRS.

use crate::error::{FetchError, Result};
use reqwest::Url;
use serde::{Deserialize, Serialize};

/// Helsinki open-data GeoServer endpoint.
pub const HELSINKI_WFS_URL: &str = "https://kartta.hel.fi/ws/geoserver/avoindata/wfs";

/// Output format requested from the server.
pub const OUTPUT_FORMAT: &str = "application/json";

/// A WFS endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WfsSource {
    /// Service URL without query string
    pub base_url: String,
    /// WFS protocol version (default `1.1.0`)
    pub version: String,
    /// Requested output CRS (default `EPSG:3879`)
    pub srs_name: String,
}

impl Default for WfsSource {
    fn default() -> Self {
        Self::helsinki()
    }
}

impl WfsSource {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::helsinki()
        }
    }

    /// The Helsinki open-data service.
    pub fn helsinki() -> Self {
        Self {
            base_url: HELSINKI_WFS_URL.to_string(),
            version: "1.1.0".to_string(),
            srs_name: "EPSG:3879".to_string(),
        }
    }

    /// Build the `GetFeature` URL for one feature type.
    pub fn get_feature_url(&self, type_name: &str) -> Result<Url> {
        let base = self.base_url.trim_end_matches(['?', '&']);
        Url::parse_with_params(
            base,
            &[
                ("service", "WFS"),
                ("version", self.version.as_str()),
                ("request", "GetFeature"),
                ("typeName", type_name),
                ("srsName", self.srs_name.as_str()),
                ("outputFormat", OUTPUT_FORMAT),
            ],
        )
        .map_err(|e| FetchError::InvalidUrl {
            url: self.base_url.clone(),
            reason: e.to_string(),
        })
    }
}
