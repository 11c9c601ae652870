// crates/knave-classifier/src/distance.rs

//! Distance computation, concrete and lifted over abstract regions.

use knave_core::Metric;
use knave_domains::AbstractValue;

/// Abstract distance from a lifted region to a concrete training point,
/// accumulated on top of `init` so callers can thread a pre-existing
/// accumulator.
///
/// Squared Euclidean sums `(Dᵢ − pᵢ)²`; Manhattan sums `|Dᵢ − pᵢ|`. The
/// result is a single abstract scalar soundly enclosing the metric over
/// every concretization of the region.
///
/// # Panics
/// Debug builds panic on a dimension mismatch between region and point.
#[must_use]
pub fn region_distance<V: AbstractValue>(
    region: &[V],
    point: &[f64],
    metric: Metric,
    init: V,
) -> V {
    debug_assert_eq!(region.len(), point.len(), "region/point dimension mismatch");
    let mut acc = init;
    for (d, &p) in region.iter().zip(point) {
        let diff = d.sub_scalar(p);
        let term = match metric {
            Metric::Euclidean => diff.square(),
            Metric::Manhattan => diff.abs(),
        };
        acc = acc.add(&term);
    }
    acc
}

/// Concrete distance between two points under the same metric family.
#[must_use]
pub fn point_distance(a: &[f64], b: &[f64], metric: Metric) -> f64 {
    debug_assert_eq!(a.len(), b.len(), "point dimension mismatch");
    a.iter()
        .zip(b)
        .map(|(x, y)| {
            let d = x - y;
            match metric {
                Metric::Euclidean => d * d,
                Metric::Manhattan => d.abs(),
            }
        })
        .sum()
}
