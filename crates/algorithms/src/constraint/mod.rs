//! Constraint derivation and best-place aggregation
//!
//! - Rules: filter + buffer a layer into a named constraint layer
//! - Aggregate: intersect every named constraint into the best place

mod aggregate;
mod result;
mod rules;

pub use aggregate::{aggregate, AggregateParams, ConstraintAggregator};
pub use result::{BestPlace, BestPlaceResult, STATUS_PROPERTY};
pub use rules::{
    derive_layer, ConstraintRule, DatasetRules, FeatureFilter, RuleTable, DEFAULT_SEGMENTS,
};
