//! GeoJSON reading/writing
//!
//! Uses the `geojson` crate with its `geo-types` conversions. The legacy
//! `crs` member (as emitted by GeoServer) is read and written as a foreign
//! member; RFC 7946 readers ignore it.

use crate::constraint::{ConstraintRecord, ConstraintSet};
use crate::crs::CRS;
use crate::error::{Error, Result};
use crate::vector::{AttributeValue, Feature, FeatureCollection};
use geojson::{feature::Id, GeoJson, JsonObject, JsonValue};
use std::fs;
use std::path::Path;

/// Attribute holding the constraint name in exported constraint layers
pub const CONSTRAINT_NAME_PROPERTY: &str = "constraint_name";

/// Read a GeoJSON file into a FeatureCollection
///
/// Accepts a FeatureCollection, a single Feature or a bare Geometry.
pub fn read_geojson<P: AsRef<Path>>(path: P) -> Result<FeatureCollection> {
    let text = fs::read_to_string(path.as_ref())?;
    parse_geojson(&text)
}

/// Parse GeoJSON text into a FeatureCollection
pub fn parse_geojson(text: &str) -> Result<FeatureCollection> {
    let geojson: GeoJson = text.parse()?;
    match geojson {
        GeoJson::FeatureCollection(fc) => {
            let crs = fc
                .foreign_members
                .as_ref()
                .and_then(crs_from_members)
                .unwrap_or_default();
            let mut out = FeatureCollection::with_crs(crs);
            for feature in fc.features {
                out.push(convert_feature(feature)?);
            }
            Ok(out)
        }
        GeoJson::Feature(feature) => {
            let crs = feature
                .foreign_members
                .as_ref()
                .and_then(crs_from_members)
                .unwrap_or_default();
            let mut out = FeatureCollection::with_crs(crs);
            out.push(convert_feature(feature)?);
            Ok(out)
        }
        GeoJson::Geometry(geometry) => {
            let geometry = geo_types::Geometry::<f64>::try_from(geometry)?;
            let mut out = FeatureCollection::new();
            out.push(Feature::new(geometry));
            Ok(out)
        }
    }
}

/// Write a FeatureCollection as a GeoJSON file
pub fn write_geojson<P: AsRef<Path>>(collection: &FeatureCollection, path: P) -> Result<()> {
    fs::write(path.as_ref(), to_geojson_string(collection))?;
    Ok(())
}

/// Serialize a FeatureCollection to GeoJSON text
pub fn to_geojson_string(collection: &FeatureCollection) -> String {
    let features = collection
        .features
        .iter()
        .map(|f| geojson::Feature {
            bbox: None,
            geometry: f
                .geometry
                .as_ref()
                .map(|g| geojson::Geometry::new(geojson::Value::from(g))),
            id: f.id.clone().map(Id::String),
            properties: Some(
                f.properties
                    .iter()
                    .map(|(k, v)| (k.clone(), attribute_to_json(v)))
                    .collect(),
            ),
            foreign_members: None,
        })
        .collect();

    let fc = geojson::FeatureCollection {
        bbox: None,
        features,
        foreign_members: Some(crs_member(&collection.crs)),
    };
    GeoJson::FeatureCollection(fc).to_string()
}

fn convert_feature(feature: geojson::Feature) -> Result<Feature> {
    let geometry = feature
        .geometry
        .map(geo_types::Geometry::<f64>::try_from)
        .transpose()?;
    let id = feature.id.map(|id| match id {
        Id::String(s) => s,
        Id::Number(n) => n.to_string(),
    });
    let properties = feature
        .properties
        .unwrap_or_default()
        .into_iter()
        .map(|(k, v)| (k, json_to_attribute(v)))
        .collect();
    Ok(Feature {
        geometry,
        properties,
        id,
    })
}

fn json_to_attribute(value: JsonValue) -> AttributeValue {
    match value {
        JsonValue::Null => AttributeValue::Null,
        JsonValue::Bool(b) => AttributeValue::Bool(b),
        JsonValue::Number(n) => match n.as_i64() {
            Some(i) => AttributeValue::Int(i),
            None => AttributeValue::Float(n.as_f64().unwrap_or(f64::NAN)),
        },
        JsonValue::String(s) => AttributeValue::String(s),
        // Nested values are not matched on; keep their JSON text
        other => AttributeValue::String(other.to_string()),
    }
}

fn attribute_to_json(value: &AttributeValue) -> JsonValue {
    match value {
        AttributeValue::Null => JsonValue::Null,
        AttributeValue::Bool(b) => JsonValue::Bool(*b),
        AttributeValue::Int(i) => JsonValue::from(*i),
        AttributeValue::Float(f) => serde_json::Number::from_f64(*f)
            .map(JsonValue::Number)
            .unwrap_or(JsonValue::Null),
        AttributeValue::String(s) => JsonValue::String(s.clone()),
    }
}

fn crs_from_members(members: &JsonObject) -> Option<CRS> {
    let name = members.get("crs")?.get("properties")?.get("name")?.as_str()?;
    Some(CRS::parse(name))
}

fn crs_member(crs: &CRS) -> JsonObject {
    let mut members = JsonObject::new();
    members.insert(
        "crs".to_string(),
        serde_json::json!({ "type": "name", "properties": { "name": crs.urn() } }),
    );
    members
}

impl ConstraintSet {
    /// Export as features tagged with `constraint_name`.
    ///
    /// Null-geometry records are written as features without geometry.
    pub fn to_feature_collection(&self) -> FeatureCollection {
        let mut fc = FeatureCollection::with_crs(self.crs.clone());
        for record in &self.records {
            let mut feature = match &record.geometry {
                Some(mp) => Feature::new(geo_types::Geometry::MultiPolygon(mp.clone())),
                None => Feature::empty(),
            };
            feature.set_property(
                CONSTRAINT_NAME_PROPERTY,
                AttributeValue::String(record.constraint_name.clone()),
            );
            fc.push(feature);
        }
        fc
    }

    /// Rebuild a set from features carrying a `constraint_name` attribute.
    ///
    /// Features without the attribute are an error: the set invariant
    /// requires every record to be named.
    pub fn from_feature_collection(collection: FeatureCollection) -> Result<Self> {
        let mut set = ConstraintSet::new(collection.crs.clone());
        for (index, feature) in collection.features.into_iter().enumerate() {
            let name = feature
                .get_property(CONSTRAINT_NAME_PROPERTY)
                .and_then(AttributeValue::as_text)
                .ok_or_else(|| Error::InvalidParameter {
                    name: CONSTRAINT_NAME_PROPERTY,
                    value: format!("feature #{}", index),
                    reason: "missing constraint name".into(),
                })?;
            let record = match feature.geometry {
                Some(geometry) => ConstraintRecord::from_geometry(name, geometry)?,
                None => ConstraintRecord::null(name),
            };
            set.push(record);
        }
        Ok(set)
    }
}
