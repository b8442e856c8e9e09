//! Best-place result types

use bestplace_core::io::CONSTRAINT_NAME_PROPERTY;
use bestplace_core::{Feature, FeatureCollection, CRS};

/// Property naming the outcome of an exported result
pub const STATUS_PROPERTY: &str = "status";
use geo::{Area, Geometry, MultiPolygon};

/// State of the best-place region
///
/// Keeps "nothing computed yet" apart from "computed, but no overlap".
#[derive(Debug, Clone, PartialEq)]
pub enum BestPlace {
    /// No constraint contributed any geometry
    Unset,
    /// Constraints were applied and their intersection has no area
    Empty,
    /// Region satisfying every applied constraint
    Region(MultiPolygon<f64>),
}

impl BestPlace {
    /// Wrap a computed geometry, treating polygons of area `<= min_area`
    /// as slivers left over from boundary contacts.
    pub(crate) fn from_geometry(geometry: MultiPolygon<f64>, min_area: f64) -> Self {
        let polygons: Vec<_> = geometry
            .0
            .into_iter()
            .filter(|p| p.unsigned_area() > min_area)
            .collect();
        if polygons.is_empty() {
            BestPlace::Empty
        } else {
            BestPlace::Region(MultiPolygon::new(polygons))
        }
    }
}

/// Output of the constraint aggregation
#[derive(Debug, Clone, PartialEq)]
pub struct BestPlaceResult {
    pub region: BestPlace,
    /// Constraint names that restricted the region, in processing order
    pub applied: Vec<String>,
    /// Constraint names skipped because they had no geometry
    pub skipped: Vec<String>,
    pub crs: CRS,
}

impl BestPlaceResult {
    /// Result geometry: `None` when unset, an empty multi-polygon when
    /// the constraints do not overlap.
    pub fn geometry(&self) -> Option<MultiPolygon<f64>> {
        match &self.region {
            BestPlace::Unset => None,
            BestPlace::Empty => Some(MultiPolygon::new(vec![])),
            BestPlace::Region(mp) => Some(mp.clone()),
        }
    }

    pub fn area(&self) -> f64 {
        match &self.region {
            BestPlace::Region(mp) => mp.unsigned_area(),
            _ => 0.0,
        }
    }

    /// True for both the unset and the empty outcome
    pub fn is_degenerate(&self) -> bool {
        !matches!(self.region, BestPlace::Region(_))
    }

    /// Outcome tag written to exported layers: `unset`, `empty` or `region`
    pub fn status(&self) -> &'static str {
        match self.region {
            BestPlace::Unset => "unset",
            BestPlace::Empty => "empty",
            BestPlace::Region(_) => "region",
        }
    }

    /// Export as a layer for an external viewer.
    ///
    /// One feature per polygon, each tagged with the joined constraint
    /// names. A degenerate result is a single feature without geometry
    /// whose `status` tells unset and empty apart.
    pub fn to_feature_collection(&self) -> FeatureCollection {
        let mut fc = FeatureCollection::with_crs(self.crs.clone());
        let applied = self.applied.join(",");
        match &self.region {
            BestPlace::Region(mp) => {
                for polygon in mp.iter() {
                    let feature = Feature::new(Geometry::Polygon(polygon.clone()))
                        .with_property(CONSTRAINT_NAME_PROPERTY, applied.as_str())
                        .with_property(STATUS_PROPERTY, self.status())
                        .with_property("area", polygon.unsigned_area());
                    fc.push(feature);
                }
            }
            BestPlace::Unset | BestPlace::Empty => {
                let feature = Feature::empty()
                    .with_property(STATUS_PROPERTY, self.status())
                    .with_property("applied", applied.as_str())
                    .with_property("skipped", self.skipped.join(","));
                fc.push(feature);
            }
        }
        fc
    }
}
