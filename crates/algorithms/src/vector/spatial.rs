//! Spatial operations: bounding box, union, dissolve

use geo::{unary_union, LineString, MultiPolygon, Polygon};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BoundingBox {
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self { min_x, min_y, max_x, max_y }
    }

    /// Central Helsinki in EPSG:3879
    pub fn helsinki() -> Self {
        Self::new(25_491_000.0, 6_670_000.0, 25_902_000.0, 6_690_000.0)
    }

    /// Whether min <= max on both axes and every bound is finite
    pub fn is_valid(&self) -> bool {
        [self.min_x, self.min_y, self.max_x, self.max_y]
            .iter()
            .all(|v| v.is_finite())
            && self.min_x <= self.max_x
            && self.min_y <= self.max_y
    }

    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }

    pub fn to_polygon(&self) -> Polygon<f64> {
        Polygon::new(
            LineString::from(vec![
                (self.min_x, self.min_y),
                (self.max_x, self.min_y),
                (self.max_x, self.max_y),
                (self.min_x, self.max_y),
                (self.min_x, self.min_y),
            ]),
            vec![],
        )
    }
}

/// Union of any number of multi-polygons into one valid multi-polygon.
///
/// An empty input yields an empty multi-polygon.
pub fn union_all<'a, I>(polygons: I) -> MultiPolygon<f64>
where
    I: IntoIterator<Item = &'a MultiPolygon<f64>>,
{
    unary_union(polygons)
}

/// Dissolve: group geometries by a key and union the geometries of each group.
///
/// Keys come back in lexicographic order.
pub fn dissolve(
    features: &[(String, MultiPolygon<f64>)],
) -> BTreeMap<String, MultiPolygon<f64>> {
    let mut groups: BTreeMap<&str, Vec<&MultiPolygon<f64>>> = BTreeMap::new();

    for (key, poly) in features {
        groups.entry(key.as_str()).or_default().push(poly);
    }

    groups
        .into_iter()
        .map(|(key, polys)| (key.to_string(), union_all(polys)))
        .collect()
}
