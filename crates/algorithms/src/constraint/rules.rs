//! Constraint rules
//!
//! A rule turns one source layer into one named constraint layer: keep the
//! features matching a filter, buffer each by a fixed distance, tag the
//! result with the constraint name. A [`RuleTable`] lists the rules of every
//! dataset so a whole [`ConstraintSet`] can be derived in one call.

use crate::vector::{area, buffer_geometry, BufferParams};
use bestplace_core::{
    AttributeValue, ConstraintRecord, ConstraintSet, Error, Feature, FeatureCollection,
    NamedGeometryLayer, Result, CRS,
};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Default circle resolution for buffered points
pub const DEFAULT_SEGMENTS: usize = 32;

/// Feature selection predicate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FeatureFilter {
    /// Every feature
    #[default]
    All,
    /// Attribute text equals `value` (`663` matches both `"663"` and `663`)
    AttributeEquals { key: String, value: String },
    /// Geometry area strictly greater than `area`
    MinArea { area: f64 },
    /// Every inner filter matches
    AllOf { filters: Vec<FeatureFilter> },
}

impl FeatureFilter {
    pub fn attribute_equals(key: impl Into<String>, value: impl Into<String>) -> Self {
        FeatureFilter::AttributeEquals {
            key: key.into(),
            value: value.into(),
        }
    }

    pub fn matches(&self, feature: &Feature) -> bool {
        match self {
            FeatureFilter::All => true,
            FeatureFilter::AttributeEquals { key, value } => feature
                .get_property(key)
                .and_then(AttributeValue::as_text)
                .is_some_and(|text| text == *value),
            FeatureFilter::MinArea { area: min } => {
                feature.geometry.as_ref().is_some_and(|g| area(g) > *min)
            }
            FeatureFilter::AllOf { filters } => filters.iter().all(|f| f.matches(feature)),
        }
    }
}

/// Derive one named constraint from a layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstraintRule {
    pub name: String,
    #[serde(default)]
    pub filter: FeatureFilter,
    /// Buffer distance in CRS units
    pub buffer: f64,
    #[serde(default = "default_segments")]
    pub segments: usize,
}

fn default_segments() -> usize {
    DEFAULT_SEGMENTS
}

impl ConstraintRule {
    pub fn new(name: impl Into<String>, filter: FeatureFilter, buffer: f64) -> Self {
        Self {
            name: name.into(),
            filter,
            buffer,
            segments: DEFAULT_SEGMENTS,
        }
    }

    fn buffer_params(&self) -> BufferParams {
        BufferParams {
            distance: self.buffer,
            segments: self.segments,
        }
    }
}

/// Apply one rule to a layer.
///
/// Matching features without geometry produce null records, which the
/// aggregator drops.
pub fn derive_layer(
    layer: &FeatureCollection,
    rule: &ConstraintRule,
) -> Result<NamedGeometryLayer> {
    let params = rule.buffer_params();
    let mut records = Vec::new();

    for feature in layer.iter().filter(|f| rule.filter.matches(f)) {
        let record = match &feature.geometry {
            Some(geometry) => {
                ConstraintRecord::new(rule.name.clone(), buffer_geometry(geometry, &params)?)
            }
            None => ConstraintRecord::null(rule.name.clone()),
        };
        records.push(record);
    }

    debug!(
        constraint = rule.name.as_str(),
        selected = records.len(),
        of = layer.len(),
        "derived constraint layer"
    );
    Ok(records)
}

/// Rules for one source dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetRules {
    /// Dataset type name, e.g. `avoindata:Maavesi_merialue`
    pub type_name: String,
    #[serde(default)]
    pub rules: Vec<ConstraintRule>,
}

impl DatasetRules {
    pub fn new(type_name: impl Into<String>, rules: Vec<ConstraintRule>) -> Self {
        Self {
            type_name: type_name.into(),
            rules,
        }
    }
}

/// Ordered mapping from dataset to the constraints it yields
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuleTable {
    pub datasets: Vec<DatasetRules>,
}

impl RuleTable {
    /// Rules reproducing the Helsinki analysis
    pub fn helsinki_default() -> Self {
        let service = |code: &str| FeatureFilter::attribute_equals("service_ids", code);
        Self {
            datasets: vec![
                DatasetRules::new(
                    "avoindata:Maavesi_merialue",
                    vec![ConstraintRule::new("sea", FeatureFilter::All, 700.0)],
                ),
                DatasetRules::new(
                    "avoindata:Maavesi_muut_vesialueet",
                    vec![ConstraintRule::new("other_water", FeatureFilter::All, 100.0)],
                ),
                DatasetRules::new(
                    "avoindata:YLRE_Viheralue_alue",
                    vec![ConstraintRule::new(
                        "big_park",
                        FeatureFilter::MinArea { area: 110_000.0 },
                        700.0,
                    )],
                ),
                DatasetRules::new(
                    "avoindata:Toimipisterekisteri_palvelut",
                    vec![
                        ConstraintRule::new("daycare", service("663"), 500.0),
                        ConstraintRule::new("lower_school", service("661"), 500.0),
                        ConstraintRule::new("upper_school", service("662"), 2000.0),
                    ],
                ),
            ],
        }
    }

    /// Dataset type names in table order
    pub fn type_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.datasets.iter().map(|d| d.type_name.as_str())
    }

    /// Check buffer distances and name uniqueness.
    ///
    /// A name may appear in only one rule: two rules with the same name
    /// would silently merge into one constraint.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for rule in self.datasets.iter().flat_map(|d| &d.rules) {
            if !rule.buffer.is_finite() || rule.buffer < 0.0 {
                return Err(Error::InvalidParameter {
                    name: "buffer",
                    value: rule.buffer.to_string(),
                    reason: format!("rule '{}' needs a non-negative buffer distance", rule.name),
                });
            }
            if !seen.insert(rule.name.as_str()) {
                return Err(Error::InvalidParameter {
                    name: "name",
                    value: rule.name.clone(),
                    reason: "constraint name used by more than one rule".into(),
                });
            }
        }
        Ok(())
    }

    /// Derive every constraint layer from the loaded datasets.
    ///
    /// Every dataset of the table must be present in `layers` and share
    /// `crs`.
    pub fn derive_set(
        &self,
        layers: &HashMap<String, FeatureCollection>,
        crs: &CRS,
    ) -> Result<ConstraintSet> {
        self.validate()?;
        let mut set = ConstraintSet::new(crs.clone());

        for dataset in &self.datasets {
            let layer = layers.get(&dataset.type_name).ok_or_else(|| {
                Error::Other(format!("dataset '{}' was not loaded", dataset.type_name))
            })?;
            if !layer.crs.is_equivalent(crs) {
                return Err(Error::CrsMismatch(layer.crs.identifier(), crs.identifier()));
            }
            for rule in &dataset.rules {
                set.push_layer(derive_layer(layer, rule)?);
            }
        }
        Ok(set)
    }
}
