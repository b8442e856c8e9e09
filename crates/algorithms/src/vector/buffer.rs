//! Buffer operations
//!
//! Create buffer zones around geometries. Points become circles
//! approximated as polygons; lines and polygons are offset with the
//! `geo` buffer, which rounds convex corners.

use super::spatial::union_all;
use bestplace_core::{Error, Result};
use geo::{Buffer, Geometry, LineString, MultiPolygon, Point, Polygon};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Parameters for buffer operations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BufferParams {
    /// Buffer distance in CRS units (must be >= 0)
    pub distance: f64,
    /// Number of segments used for a full circle around points (default: 32)
    pub segments: usize,
}

impl Default for BufferParams {
    fn default() -> Self {
        Self {
            distance: 1.0,
            segments: 32,
        }
    }
}

impl BufferParams {
    pub fn new(distance: f64) -> Self {
        Self {
            distance,
            ..Self::default()
        }
    }

    fn validate(&self) -> Result<()> {
        if !self.distance.is_finite() || self.distance < 0.0 {
            return Err(Error::InvalidParameter {
                name: "distance",
                value: self.distance.to_string(),
                reason: "buffer distance must be a finite, non-negative number".into(),
            });
        }
        Ok(())
    }
}

/// Create a circular buffer around a point.
///
/// Generates a polygon approximating a circle with the given number
/// of segments (at least 4).
pub fn buffer_points(point: &Point<f64>, params: &BufferParams) -> Polygon<f64> {
    let n = params.segments.max(4);
    let r = params.distance.abs();
    let cx = point.x();
    let cy = point.y();

    let mut coords = Vec::with_capacity(n + 1);
    for i in 0..n {
        let angle = 2.0 * PI * i as f64 / n as f64;
        coords.push((cx + r * angle.cos(), cy + r * angle.sin()));
    }
    // Close the ring
    coords.push(coords[0]);

    Polygon::new(LineString::from(coords), vec![])
}

/// Buffer any geometry into the region within `params.distance` of it.
///
/// Multi-point inputs are unioned so the output never contains
/// overlapping polygons. A zero distance leaves areal geometry unchanged
/// and collapses points and lines to an empty result.
pub fn buffer_geometry(geom: &Geometry<f64>, params: &BufferParams) -> Result<MultiPolygon<f64>> {
    params.validate()?;

    let out = match geom {
        Geometry::Point(p) => {
            if params.distance == 0.0 {
                MultiPolygon::new(vec![])
            } else {
                MultiPolygon::new(vec![buffer_points(p, params)])
            }
        }
        Geometry::MultiPoint(mp) => {
            if params.distance == 0.0 {
                MultiPolygon::new(vec![])
            } else {
                let circles: Vec<MultiPolygon<f64>> = mp
                    .iter()
                    .map(|p| MultiPolygon::new(vec![buffer_points(p, params)]))
                    .collect();
                union_all(circles.iter())
            }
        }
        Geometry::Polygon(p) if params.distance == 0.0 => MultiPolygon::new(vec![p.clone()]),
        Geometry::MultiPolygon(mp) if params.distance == 0.0 => mp.clone(),
        Geometry::GeometryCollection(gc) => {
            let parts = gc
                .iter()
                .map(|g| buffer_geometry(g, params))
                .collect::<Result<Vec<_>>>()?;
            union_all(parts.iter())
        }
        other => other.buffer(params.distance),
    };
    Ok(out)
}
