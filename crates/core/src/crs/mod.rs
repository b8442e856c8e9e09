//! Coordinate Reference System handling
//!
//! All geometries in one run share a single planar CRS. Reprojection is out
//! of scope: the CRS is only carried along, compared and written back out.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Coordinate Reference System representation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CRS {
    /// EPSG code if known
    epsg: Option<u32>,
    /// Original identifier when the CRS was not an EPSG reference
    name: Option<String>,
}

impl CRS {
    /// Create a CRS from an EPSG code
    pub fn from_epsg(code: u32) -> Self {
        Self {
            epsg: Some(code),
            name: None,
        }
    }

    /// Parse a CRS identifier.
    ///
    /// Accepts `EPSG:3879`, `epsg:3879` and the OGC URN forms
    /// `urn:ogc:def:crs:EPSG::3879` / `urn:x-ogc:def:crs:EPSG:3879`.
    /// Anything else is kept verbatim as a named CRS.
    pub fn parse(identifier: &str) -> Self {
        let trimmed = identifier.trim();
        let lower = trimmed.to_ascii_lowercase();
        if let Some(pos) = lower.rfind("epsg:") {
            let code = lower[pos + 5..].trim_start_matches(':');
            if let Ok(code) = code.parse::<u32>() {
                return Self::from_epsg(code);
            }
        }
        Self {
            epsg: None,
            name: Some(trimmed.to_string()),
        }
    }

    /// ETRS89 / GK25FIN (EPSG:3879), the CRS of Helsinki open data
    pub fn etrs_gk25() -> Self {
        Self::from_epsg(3879)
    }

    /// WGS84 geographic CRS (EPSG:4326)
    pub fn wgs84() -> Self {
        Self::from_epsg(4326)
    }

    /// Get EPSG code if known
    pub fn epsg(&self) -> Option<u32> {
        self.epsg
    }

    /// Check if two CRS are equivalent
    pub fn is_equivalent(&self, other: &CRS) -> bool {
        match (self.epsg, other.epsg) {
            (Some(a), Some(b)) => a == b,
            (None, None) => self.name == other.name,
            _ => false,
        }
    }

    /// OGC URN form, as written into GeoJSON `crs` members
    pub fn urn(&self) -> String {
        match self.epsg {
            Some(code) => format!("urn:ogc:def:crs:EPSG::{}", code),
            None => self.identifier(),
        }
    }

    /// Get a string identifier for this CRS
    pub fn identifier(&self) -> String {
        if let Some(code) = self.epsg {
            return format!("EPSG:{}", code);
        }
        self.name.clone().unwrap_or_else(|| "Unknown".to_string())
    }
}

impl fmt::Display for CRS {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.identifier())
    }
}

impl Default for CRS {
    fn default() -> Self {
        Self::etrs_gk25()
    }
}
