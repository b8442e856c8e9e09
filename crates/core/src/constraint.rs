//! Named constraint geometries
//!
//! A constraint is a named spatial restriction ("within 500 m of a daycare").
//! Each record holds one areal geometry; all records sharing a name together
//! form the region that satisfies that constraint.

use crate::crs::CRS;
use crate::error::{Error, Result};
use geo_types::{Geometry, MultiPolygon};
use std::collections::BTreeSet;

/// One named areal geometry
#[derive(Debug, Clone, PartialEq)]
pub struct ConstraintRecord {
    pub constraint_name: String,
    /// `None` for features that had no geometry; dropped before aggregation
    pub geometry: Option<MultiPolygon<f64>>,
}

impl ConstraintRecord {
    pub fn new(constraint_name: impl Into<String>, geometry: MultiPolygon<f64>) -> Self {
        Self {
            constraint_name: constraint_name.into(),
            geometry: Some(geometry),
        }
    }

    /// Record without geometry
    pub fn null(constraint_name: impl Into<String>) -> Self {
        Self {
            constraint_name: constraint_name.into(),
            geometry: None,
        }
    }

    /// Build a record from an arbitrary geometry.
    ///
    /// Polygons and multi-polygons are accepted (rects and triangles are
    /// converted to polygons). Points and lines have no area and must be
    /// buffered first.
    pub fn from_geometry(
        constraint_name: impl Into<String>,
        geometry: Geometry<f64>,
    ) -> Result<Self> {
        let constraint_name = constraint_name.into();
        let geometry = match geometry {
            Geometry::Polygon(p) => MultiPolygon::new(vec![p]),
            Geometry::MultiPolygon(mp) => mp,
            Geometry::Rect(r) => MultiPolygon::new(vec![r.to_polygon()]),
            Geometry::Triangle(t) => MultiPolygon::new(vec![t.to_polygon()]),
            Geometry::GeometryCollection(gc) => {
                let mut polygons = Vec::new();
                for g in gc {
                    let record = Self::from_geometry(constraint_name.clone(), g)?;
                    if let Some(mp) = record.geometry {
                        polygons.extend(mp.0);
                    }
                }
                MultiPolygon::new(polygons)
            }
            other => {
                return Err(Error::UnsupportedGeometry {
                    constraint: constraint_name,
                    kind: geometry_kind(&other),
                })
            }
        };
        Ok(Self::new(constraint_name, geometry))
    }

    pub fn has_geometry(&self) -> bool {
        self.geometry.is_some()
    }
}

/// Human-readable geometry type name
pub fn geometry_kind(geometry: &Geometry<f64>) -> &'static str {
    match geometry {
        Geometry::Point(_) => "Point",
        Geometry::Line(_) => "Line",
        Geometry::LineString(_) => "LineString",
        Geometry::Polygon(_) => "Polygon",
        Geometry::MultiPoint(_) => "MultiPoint",
        Geometry::MultiLineString(_) => "MultiLineString",
        Geometry::MultiPolygon(_) => "MultiPolygon",
        Geometry::GeometryCollection(_) => "GeometryCollection",
        Geometry::Rect(_) => "Rect",
        Geometry::Triangle(_) => "Triangle",
    }
}

/// One derived constraint layer: records produced from a single rule
pub type NamedGeometryLayer = Vec<ConstraintRecord>;

/// All constraint layers of a run, concatenated
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConstraintSet {
    pub crs: CRS,
    pub records: Vec<ConstraintRecord>,
}

impl ConstraintSet {
    pub fn new(crs: CRS) -> Self {
        Self {
            crs,
            records: Vec::new(),
        }
    }

    /// Concatenate layers into one set
    pub fn from_layers<I>(crs: CRS, layers: I) -> Self
    where
        I: IntoIterator<Item = NamedGeometryLayer>,
    {
        let mut set = Self::new(crs);
        for layer in layers {
            set.push_layer(layer);
        }
        set
    }

    pub fn push(&mut self, record: ConstraintRecord) {
        self.records.push(record);
    }

    pub fn push_layer(&mut self, layer: NamedGeometryLayer) {
        self.records.extend(layer);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Distinct constraint names in lexicographic ascending order
    pub fn names(&self) -> Vec<&str> {
        self.records
            .iter()
            .map(|r| r.constraint_name.as_str())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Non-null geometries of one constraint, in input order
    pub fn select<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a MultiPolygon<f64>> + 'a {
        self.records
            .iter()
            .filter(move |r| r.constraint_name == name)
            .filter_map(|r| r.geometry.as_ref())
    }

    /// Remove records without geometry, returning how many were dropped
    pub fn drop_null_geometries(&mut self) -> usize {
        let before = self.records.len();
        self.records.retain(ConstraintRecord::has_geometry);
        before - self.records.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo_types::{polygon, LineString, Point, Polygon};

    fn square(x: f64, y: f64, size: f64) -> Polygon<f64> {
        polygon![
            (x: x, y: y),
            (x: x + size, y: y),
            (x: x + size, y: y + size),
            (x: x, y: y + size),
            (x: x, y: y),
        ]
    }

    #[test]
    fn test_record_from_polygon() {
        let polygon = Geometry::Polygon(square(0.0, 0.0, 1.0));
        let r = ConstraintRecord::from_geometry("sea", polygon).unwrap();
        assert_eq!(r.constraint_name, "sea");
        assert_eq!(r.geometry.unwrap().0.len(), 1);
    }

    #[test]
    fn test_record_rejects_point() {
        let err = ConstraintRecord::from_geometry("daycare", Geometry::Point(Point::new(0.0, 0.0)))
            .unwrap_err();
        assert!(matches!(
            err,
            Error::UnsupportedGeometry { kind: "Point", .. }
        ));
    }

    #[test]
    fn test_record_rejects_line_inside_collection() {
        let gc = geo_types::GeometryCollection::from(vec![
            Geometry::Polygon(square(0.0, 0.0, 1.0)),
            Geometry::LineString(LineString::from(vec![(0.0, 0.0), (1.0, 1.0)])),
        ]);
        assert!(ConstraintRecord::from_geometry("x", Geometry::GeometryCollection(gc)).is_err());
    }

    #[test]
    fn test_names_sorted_and_distinct() {
        let mut set = ConstraintSet::default();
        set.push(ConstraintRecord::new("sea", MultiPolygon::new(vec![square(0.0, 0.0, 1.0)])));
        set.push(ConstraintRecord::new("big_park", MultiPolygon::new(vec![square(0.0, 0.0, 1.0)])));
        set.push(ConstraintRecord::new("daycare", MultiPolygon::new(vec![square(0.0, 0.0, 1.0)])));
        set.push(ConstraintRecord::null("daycare"));
        assert_eq!(set.names(), vec!["big_park", "daycare", "sea"]);
    }

    #[test]
    fn test_select_skips_null() {
        let set = ConstraintSet::from_layers(
            CRS::default(),
            vec![
                vec![ConstraintRecord::null("other_water")],
                vec![
                    ConstraintRecord::new("sea", MultiPolygon::new(vec![square(0.0, 0.0, 1.0)])),
                    ConstraintRecord::null("sea"),
                ],
            ],
        );
        assert_eq!(set.len(), 3);
        assert_eq!(set.select("sea").count(), 1);
        assert_eq!(set.select("other_water").count(), 0);
    }

    #[test]
    fn test_drop_null_geometries() {
        let mut set = ConstraintSet::default();
        set.push(ConstraintRecord::null("a"));
        set.push(ConstraintRecord::new("a", MultiPolygon::new(vec![square(0.0, 0.0, 1.0)])));
        assert_eq!(set.drop_null_geometries(), 1);
        assert_eq!(set.len(), 1);
    }
}
