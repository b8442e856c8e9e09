//! Run configuration.
//!
//! Loaded from a TOML file; every field falls back to the Helsinki setup
//! when absent, and a missing file means the full default configuration.
//!
//! ```toml
//! data_dir = "data"
//! crs_epsg = 3879
//!
//! [bbox]
//! min_x = 25491000.0
//! min_y = 6670000.0
//! max_x = 25902000.0
//! max_y = 6690000.0
//!
//! [[datasets]]
//! type_name = "avoindata:Toimipisterekisteri_palvelut"
//!
//! [[datasets.rules]]
//! name = "daycare"
//! buffer = 500.0
//! filter = { type = "attribute_equals", key = "service_ids", value = "663" }
//! ```

use std::path::{Path, PathBuf};

use bestplace_algorithms::constraint::{AggregateParams, DatasetRules, RuleTable};
use bestplace_algorithms::vector::BoundingBox;
use bestplace_core::CRS;
use bestplace_fetch::WfsSource;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Aggregation settings.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct AggregateConfig {
    pub parallel_union: bool,
    pub min_area: f64,
}

impl Default for AggregateConfig {
    fn default() -> Self {
        let params = AggregateParams::default();
        Self {
            parallel_union: params.parallel_union,
            min_area: params.min_area,
        }
    }
}

impl AggregateConfig {
    pub fn params(&self) -> AggregateParams {
        AggregateParams {
            parallel_union: self.parallel_union,
            min_area: self.min_area,
        }
    }
}

/// Everything a pipeline run needs.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct RunConfig {
    /// Dataset cache directory
    pub data_dir: PathBuf,

    /// EPSG code every layer must be in
    pub crs_epsg: u32,

    /// Layers fetched, clipped and exported for context only
    pub context_layers: Vec<String>,

    pub wfs: WfsSource,

    /// Analysis extent
    pub bbox: BoundingBox,

    pub aggregate: AggregateConfig,

    /// Constraint rules per source dataset
    pub datasets: Vec<DatasetRules>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            crs_epsg: 3879,
            context_layers: vec!["avoindata:Postinumeroalue".to_string()],
            wfs: WfsSource::helsinki(),
            bbox: BoundingBox::helsinki(),
            aggregate: AggregateConfig::default(),
            datasets: RuleTable::helsinki_default().datasets,
        }
    }
}

impl RunConfig {
    /// Loads configuration from a TOML file, or the defaults if the file
    /// doesn't exist.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::from_toml_file(path)
    }

    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string(self).map_err(|e| ConfigError::Invalid(e.to_string()))
    }

    pub fn crs(&self) -> CRS {
        CRS::from_epsg(self.crs_epsg)
    }

    pub fn rule_table(&self) -> RuleTable {
        RuleTable {
            datasets: self.datasets.clone(),
        }
    }

    /// Every dataset to fetch: constraint sources first, then context layers.
    pub fn type_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.datasets.iter().map(|d| d.type_name.as_str()).collect();
        for layer in &self.context_layers {
            if !names.contains(&layer.as_str()) {
                names.push(layer);
            }
        }
        names
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.bbox.is_valid() {
            return Err(ConfigError::Invalid(format!(
                "bbox ({}, {}) - ({}, {}) is inverted or not finite",
                self.bbox.min_x, self.bbox.min_y, self.bbox.max_x, self.bbox.max_y
            )));
        }
        if self.crs_epsg == 0 {
            return Err(ConfigError::Invalid("crs_epsg must be a valid EPSG code".into()));
        }
        if self.wfs.base_url.trim().is_empty() {
            return Err(ConfigError::Invalid("wfs.base_url is empty".into()));
        }
        let min_area = self.aggregate.min_area;
        if !min_area.is_finite() || min_area < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "aggregate.min_area must be a finite value >= 0, got {}",
                min_area
            )));
        }
        if self.datasets.iter().all(|d| d.rules.is_empty()) {
            return Err(ConfigError::Invalid("no constraint rules configured".into()));
        }
        self.rule_table()
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))
    }
}
