//! Geometric measurements: area, perimeter

use geo::{Area as GeoArea, Geometry, LineString, Polygon};

/// Calculate the area of a geometry.
///
/// Returns unsigned area in CRS units squared. Points and lines have
/// zero area; collections sum their members.
pub fn area(geom: &Geometry<f64>) -> f64 {
    match geom {
        Geometry::Polygon(p) => p.unsigned_area(),
        Geometry::MultiPolygon(mp) => mp.unsigned_area(),
        Geometry::Rect(r) => r.unsigned_area(),
        Geometry::Triangle(t) => t.unsigned_area(),
        Geometry::GeometryCollection(gc) => gc.iter().map(area).sum(),
        _ => 0.0,
    }
}

fn ring_length(ring: &LineString<f64>) -> f64 {
    ring.lines().map(|l| l.dx().hypot(l.dy())).sum()
}

fn polygon_perimeter(p: &Polygon<f64>) -> f64 {
    ring_length(p.exterior()) + p.interiors().iter().map(ring_length).sum::<f64>()
}

/// Calculate the perimeter of an areal geometry.
///
/// Returns the total length of exterior and interior rings.
pub fn perimeter(geom: &Geometry<f64>) -> f64 {
    match geom {
        Geometry::Polygon(p) => polygon_perimeter(p),
        Geometry::MultiPolygon(mp) => mp.0.iter().map(polygon_perimeter).sum(),
        Geometry::Rect(r) => polygon_perimeter(&r.to_polygon()),
        Geometry::Triangle(t) => polygon_perimeter(&t.to_polygon()),
        Geometry::GeometryCollection(gc) => gc.iter().map(perimeter).sum(),
        _ => 0.0,
    }
}
