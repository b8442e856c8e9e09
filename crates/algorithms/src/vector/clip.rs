//! Clipping operations
//!
//! Clip geometries to a rectangular extent. Areal geometry is intersected
//! with the extent polygon (holes survive), lines are clipped segment by
//! segment with Cohen-Sutherland.

use super::spatial::BoundingBox;
use bestplace_core::FeatureCollection;
use geo::{
    BooleanOps, Coord, Geometry, GeometryCollection, Line, LineString, MultiLineString, MultiPoint,
    MultiPolygon,
};

/// Clip a geometry by a rectangular extent.
///
/// Returns `None` when nothing of the geometry lies inside.
pub fn clip_to_bbox(geom: &Geometry<f64>, bbox: &BoundingBox) -> Option<Geometry<f64>> {
    match geom {
        Geometry::Point(p) => bbox.contains_point(p.x(), p.y()).then(|| geom.clone()),

        Geometry::MultiPoint(mp) => {
            let inside: Vec<_> = mp
                .iter()
                .filter(|p| bbox.contains_point(p.x(), p.y()))
                .copied()
                .collect();
            (!inside.is_empty()).then(|| Geometry::MultiPoint(MultiPoint::new(inside)))
        }

        Geometry::Polygon(poly) => clip_areal(&MultiPolygon::new(vec![poly.clone()]), bbox),
        Geometry::MultiPolygon(mp) => clip_areal(mp, bbox),
        Geometry::Rect(r) => clip_areal(&MultiPolygon::new(vec![r.to_polygon()]), bbox),
        Geometry::Triangle(t) => clip_areal(&MultiPolygon::new(vec![t.to_polygon()]), bbox),

        Geometry::Line(l) => clip_segment(l.start, l.end, bbox)
            .map(|(a, b)| Geometry::Line(Line::new(a, b))),

        Geometry::LineString(ls) => lines_to_geometry(clip_line_string(ls, bbox)),

        Geometry::MultiLineString(mls) => {
            lines_to_geometry(mls.iter().flat_map(|ls| clip_line_string(ls, bbox)).collect())
        }

        Geometry::GeometryCollection(gc) => {
            let parts: Vec<_> = gc.iter().filter_map(|g| clip_to_bbox(g, bbox)).collect();
            (!parts.is_empty())
                .then(|| Geometry::GeometryCollection(GeometryCollection::from(parts)))
        }
    }
}

/// Clip every feature of a layer, dropping features that end up empty.
///
/// Features without geometry are dropped as well: they cannot lie inside
/// the extent.
pub fn clip_collection(collection: &FeatureCollection, bbox: &BoundingBox) -> FeatureCollection {
    let mut out = FeatureCollection::with_crs(collection.crs.clone());
    for feature in &collection.features {
        let Some(geometry) = feature.geometry.as_ref() else {
            continue;
        };
        if let Some(clipped) = clip_to_bbox(geometry, bbox) {
            let mut kept = feature.clone();
            kept.geometry = Some(clipped);
            out.push(kept);
        }
    }
    out
}

fn clip_areal(mp: &MultiPolygon<f64>, bbox: &BoundingBox) -> Option<Geometry<f64>> {
    let mut clipped = mp.intersection(&bbox.to_polygon());
    match clipped.0.len() {
        0 => None,
        1 => clipped.0.pop().map(Geometry::Polygon),
        _ => Some(Geometry::MultiPolygon(clipped)),
    }
}

fn lines_to_geometry(mut runs: Vec<LineString<f64>>) -> Option<Geometry<f64>> {
    match runs.len() {
        0 => None,
        1 => runs.pop().map(Geometry::LineString),
        _ => Some(Geometry::MultiLineString(MultiLineString::new(runs))),
    }
}

/// Clip a line string into the runs that stay inside the box.
///
/// A line that leaves and re-enters the box yields separate runs.
fn clip_line_string(ls: &LineString<f64>, bbox: &BoundingBox) -> Vec<LineString<f64>> {
    let mut runs = Vec::new();
    let mut current: Vec<Coord<f64>> = Vec::new();

    for window in ls.0.windows(2) {
        match clip_segment(window[0], window[1], bbox) {
            Some((c0, c1)) => {
                if current.last() != Some(&c0) {
                    finish_run(&mut runs, &mut current);
                    current.push(c0);
                }
                current.push(c1);
            }
            None => finish_run(&mut runs, &mut current),
        }
    }
    finish_run(&mut runs, &mut current);
    runs
}

fn finish_run(runs: &mut Vec<LineString<f64>>, current: &mut Vec<Coord<f64>>) {
    let coords = std::mem::take(current);
    if coords.len() >= 2 {
        runs.push(LineString::new(coords));
    }
}

/// Cohen-Sutherland region codes
const INSIDE: u8 = 0b0000;
const LEFT: u8 = 0b0001;
const RIGHT: u8 = 0b0010;
const BOTTOM: u8 = 0b0100;
const TOP: u8 = 0b1000;

fn outcode(p: Coord<f64>, bbox: &BoundingBox) -> u8 {
    let mut code = INSIDE;
    if p.x < bbox.min_x { code |= LEFT; }
    if p.x > bbox.max_x { code |= RIGHT; }
    if p.y < bbox.min_y { code |= BOTTOM; }
    if p.y > bbox.max_y { code |= TOP; }
    code
}

fn clip_segment(
    mut p0: Coord<f64>,
    mut p1: Coord<f64>,
    bbox: &BoundingBox,
) -> Option<(Coord<f64>, Coord<f64>)> {
    let mut code0 = outcode(p0, bbox);
    let mut code1 = outcode(p1, bbox);

    loop {
        if (code0 | code1) == 0 {
            return Some((p0, p1));
        }
        if (code0 & code1) != 0 {
            return None;
        }

        let code_out = if code0 != 0 { code0 } else { code1 };
        let dx = p1.x - p0.x;
        let dy = p1.y - p0.y;

        let new_point = if code_out & TOP != 0 {
            let t = (bbox.max_y - p0.y) / dy;
            Coord { x: p0.x + t * dx, y: bbox.max_y }
        } else if code_out & BOTTOM != 0 {
            let t = (bbox.min_y - p0.y) / dy;
            Coord { x: p0.x + t * dx, y: bbox.min_y }
        } else if code_out & RIGHT != 0 {
            let t = (bbox.max_x - p0.x) / dx;
            Coord { x: bbox.max_x, y: p0.y + t * dy }
        } else {
            let t = (bbox.min_x - p0.x) / dx;
            Coord { x: bbox.min_x, y: p0.y + t * dy }
        };

        if code_out == code0 {
            p0 = new_point;
            code0 = outcode(p0, bbox);
        } else {
            p1 = new_point;
            code1 = outcode(p1, bbox);
        }
    }
}
