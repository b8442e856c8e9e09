//! Vector analysis algorithms
//!
//! Geometric operations on vector features:
//! - Buffer: expand geometries by a distance
//! - Clip: restrict geometries to a bounding box
//! - Bounding box, union and dissolve
//! - Area and perimeter

mod buffer;
mod clip;
mod measurements;
mod spatial;

pub use buffer::{buffer_geometry, buffer_points, BufferParams};
pub use clip::{clip_collection, clip_to_bbox};
pub use measurements::{area, perimeter};
pub use spatial::{dissolve, union_all, BoundingBox};
