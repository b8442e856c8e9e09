//! # bestplace algorithms
//!
//! Spatial algorithms for best-place analysis.
//!
//! ## Available Algorithm Categories
//!
//! - **vector**: Buffer, clip, union/dissolve, area
//! - **constraint**: Declarative constraint rules and the best-place aggregator

pub mod constraint;
pub mod vector;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::constraint::{
        aggregate, derive_layer, AggregateParams, BestPlace, BestPlaceResult, ConstraintAggregator,
        ConstraintRule, DatasetRules, FeatureFilter, RuleTable,
    };
    pub use crate::vector::{
        area, buffer_geometry, clip_collection, clip_to_bbox, dissolve, perimeter, BoundingBox,
        BufferParams,
    };
    pub use bestplace_core::prelude::*;
}
