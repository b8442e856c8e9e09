//! Best-place aggregation
//!
//! Folds the named constraints of a [`ConstraintSet`] into the region that
//! satisfies all of them:
//!
//! ```text
//! names  = sorted distinct constraint names
//! acc    = Unset
//! for n in names:
//!     geoms = records named n with geometry
//!     if geoms is empty: skip n
//!     u = union(geoms)
//!     acc = if acc is Unset { u } else { acc ∩ u }
//! ```
//!
//! Each constraint is unioned before it is intersected, so a constraint made
//! of several disjoint shapes acts as one region. Names are tracked by the
//! fold only; the geometry operations never see them.

use super::result::{BestPlace, BestPlaceResult};
use crate::vector::union_all;
use bestplace_core::{Algorithm, ConstraintSet, Error, Result};
use geo::{BooleanOps, MultiPolygon};
use tracing::{debug, warn};

/// Parameters for constraint aggregation
#[derive(Debug, Clone)]
pub struct AggregateParams {
    /// Compute the per-constraint unions on the rayon pool (when the
    /// `parallel` feature is enabled). The fold order is unaffected.
    pub parallel_union: bool,
    /// Result polygons with area at or below this value are discarded
    pub min_area: f64,
}

impl Default for AggregateParams {
    fn default() -> Self {
        Self {
            parallel_union: true,
            min_area: 0.0,
        }
    }
}

/// Constraint aggregation algorithm
#[derive(Debug, Clone, Default)]
pub struct ConstraintAggregator;

impl Algorithm for ConstraintAggregator {
    type Input = ConstraintSet;
    type Output = BestPlaceResult;
    type Params = AggregateParams;
    type Error = Error;

    fn name(&self) -> &'static str {
        "ConstraintAggregator"
    }

    fn description(&self) -> &'static str {
        "Intersect the unioned geometry of every named constraint to find the best place"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        aggregate(&input, params)
    }
}

/// Union of the non-null geometries named `name`, `None` when there are none
fn union_of(set: &ConstraintSet, name: &str) -> Option<MultiPolygon<f64>> {
    let selection: Vec<&MultiPolygon<f64>> = set.select(name).collect();
    (!selection.is_empty()).then(|| union_all(selection))
}

/// One union per name, in the order of `names`.
#[cfg(feature = "parallel")]
fn unions_by_name(
    set: &ConstraintSet,
    names: &[&str],
    parallel: bool,
) -> Vec<Option<MultiPolygon<f64>>> {
    use rayon::prelude::*;
    if parallel {
        names.par_iter().map(|name| union_of(set, name)).collect()
    } else {
        names.iter().map(|name| union_of(set, name)).collect()
    }
}

#[cfg(not(feature = "parallel"))]
fn unions_by_name(
    set: &ConstraintSet,
    names: &[&str],
    _parallel: bool,
) -> Vec<Option<MultiPolygon<f64>>> {
    names.iter().map(|name| union_of(set, name)).collect()
}

/// Compute the region satisfying every constraint in the set.
///
/// # Errors
/// [`Error::EmptyInput`] when the set holds no records at all, and
/// [`Error::InvalidParameter`] when `min_area` is negative or not finite.
/// A set whose constraints all lack geometry is not an error; it yields
/// [`BestPlace::Unset`].
pub fn aggregate(set: &ConstraintSet, params: AggregateParams) -> Result<BestPlaceResult> {
    if !params.min_area.is_finite() || params.min_area < 0.0 {
        return Err(Error::InvalidParameter {
            name: "min_area",
            value: params.min_area.to_string(),
            reason: "must be finite and >= 0".into(),
        });
    }
    if set.is_empty() {
        return Err(Error::EmptyInput);
    }

    let names = set.names();
    let unions = unions_by_name(set, &names, params.parallel_union);

    let mut region = BestPlace::Unset;
    let mut applied = Vec::new();
    let mut skipped = Vec::new();

    for (name, union) in names.into_iter().zip(unions) {
        let Some(union) = union else {
            warn!(constraint = name, "no geometry for constraint, skipping");
            skipped.push(name.to_string());
            continue;
        };

        region = match region {
            BestPlace::Unset => BestPlace::from_geometry(union, params.min_area),
            BestPlace::Empty => BestPlace::Empty,
            BestPlace::Region(acc) => {
                BestPlace::from_geometry(acc.intersection(&union), params.min_area)
            }
        };
        debug!(
            constraint = name,
            empty = matches!(region, BestPlace::Empty),
            "applied constraint"
        );
        applied.push(name.to_string());
    }

    Ok(BestPlaceResult {
        region,
        applied,
        skipped,
        crs: set.crs.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use bestplace_core::ConstraintRecord;
    use geo::{Area, LineString, Polygon};

    fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> MultiPolygon<f64> {
        MultiPolygon::new(vec![Polygon::new(
            LineString::from(vec![(x0, y0), (x1, y0), (x1, y1), (x0, y1), (x0, y0)]),
            vec![],
        )])
    }

    fn set_of(records: Vec<ConstraintRecord>) -> ConstraintSet {
        let mut set = ConstraintSet::default();
        for r in records {
            set.push(r);
        }
        set
    }

    #[test]
    fn test_empty_input_is_error() {
        let err = aggregate(&ConstraintSet::default(), AggregateParams::default());
        assert!(matches!(err, Err(Error::EmptyInput)));
    }

    #[test]
    fn test_all_skipped_is_unset() {
        let set = set_of(vec![ConstraintRecord::null("a"), ConstraintRecord::null("b")]);
        let result = aggregate(&set, AggregateParams::default()).unwrap();
        assert_eq!(result.region, BestPlace::Unset);
        assert!(result.geometry().is_none());
        assert_eq!(result.skipped, vec!["a", "b"]);
        assert!(result.applied.is_empty());
    }

    #[test]
    fn test_two_overlapping_constraints() {
        let set = set_of(vec![
            ConstraintRecord::new("b", rect(5.0, 0.0, 15.0, 10.0)),
            ConstraintRecord::new("a", rect(0.0, 0.0, 10.0, 10.0)),
        ]);
        let result = aggregate(&set, AggregateParams::default()).unwrap();
        assert!((result.area() - 50.0).abs() < 1e-9);
        assert_eq!(result.applied, vec!["a", "b"]);
    }

    #[test]
    fn test_stays_empty_after_no_overlap() {
        let set = set_of(vec![
            ConstraintRecord::new("a", rect(0.0, 0.0, 1.0, 1.0)),
            ConstraintRecord::new("b", rect(5.0, 5.0, 6.0, 6.0)),
            ConstraintRecord::new("c", rect(0.0, 0.0, 10.0, 10.0)),
        ]);
        let result = aggregate(&set, AggregateParams::default()).unwrap();
        assert_eq!(result.region, BestPlace::Empty);
        assert_eq!(result.geometry().map(|g| g.0.len()), Some(0));
        assert_eq!(result.applied.len(), 3);
    }

    #[test]
    fn test_touching_constraints_are_empty() {
        // Shared edge only: no area in common
        let set = set_of(vec![
            ConstraintRecord::new("a", rect(0.0, 0.0, 1.0, 1.0)),
            ConstraintRecord::new("b", rect(1.0, 0.0, 2.0, 1.0)),
        ]);
        let result = aggregate(&set, AggregateParams::default()).unwrap();
        assert_eq!(result.region, BestPlace::Empty);
    }

    #[test]
    fn test_sequential_matches_parallel() {
        let set = set_of(vec![
            ConstraintRecord::new("a", rect(0.0, 0.0, 10.0, 10.0)),
            ConstraintRecord::new("a", rect(20.0, 0.0, 30.0, 10.0)),
            ConstraintRecord::new("b", rect(5.0, 5.0, 25.0, 15.0)),
        ]);
        let par = aggregate(&set, AggregateParams::default()).unwrap();
        let seq = aggregate(
            &set,
            AggregateParams { parallel_union: false, ..AggregateParams::default() },
        )
        .unwrap();
        assert!((par.area() - seq.area()).abs() < 1e-9);
        assert!((par.area() - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_min_area_drops_slivers() {
        let set = set_of(vec![
            ConstraintRecord::new("a", rect(0.0, 0.0, 10.0, 10.0)),
            ConstraintRecord::new("b", rect(9.99, 0.0, 20.0, 10.0)),
        ]);
        let params = AggregateParams { min_area: 1.0, ..AggregateParams::default() };
        let result = aggregate(&set, params).unwrap();
        assert_eq!(result.region, BestPlace::Empty);
    }

    #[test]
    fn test_non_finite_min_area_is_error() {
        let set = set_of(vec![ConstraintRecord::new("a", rect(0.0, 0.0, 10.0, 10.0))]);
        for min_area in [f64::NAN, f64::INFINITY, -1.0] {
            let params = AggregateParams { min_area, ..AggregateParams::default() };
            let err = aggregate(&set, params);
            assert!(
                matches!(err, Err(Error::InvalidParameter { name: "min_area", .. })),
                "min_area {} accepted",
                min_area
            );
        }
    }

    #[test]
    fn test_algorithm_trait() {
        let set = set_of(vec![ConstraintRecord::new("sea", rect(0.0, 0.0, 2.0, 2.0))]);
        let algo = ConstraintAggregator;
        assert_eq!(algo.name(), "ConstraintAggregator");
        let result = algo.execute_default(set).unwrap();
        assert!((result.geometry().unwrap().unsigned_area() - 4.0).abs() < 1e-9);
    }
}
