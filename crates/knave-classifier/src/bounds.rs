// crates/knave-classifier/src/bounds.rs

//! Per-label vote-count bounds among the k nearest training points.
//!
//! For each candidate label the result is an integer-valued [`Interval`]
//! `[lb, ub]`: `lb` counts points *certainly* among the k nearest for every
//! concretization, `ub` counts points that *possibly* are. Soundness rests
//! on the strict dominance checks below; the heap's total order only decides
//! where the walks may stop.

use crate::heap::ExtractionHeap;
use knave_core::Label;
use knave_domains::{AbstractValue, Interval};
use std::collections::BTreeMap;

/// Compute label-count bounds for one `k`.
///
/// Invariants on the result: `0 ≤ lb ≤ ub ≤ k`, `Σ ub ≥ k`, `Σ lb ≤ k`.
///
/// # Panics
/// Debug builds panic if `k` exceeds the number of entries.
#[must_use]
pub fn label_bounds<V: AbstractValue>(
    heap: &mut ExtractionHeap<V>,
    k: usize,
) -> BTreeMap<Label, Interval> {
    let total = heap.len();
    debug_assert!(k >= 1 && k <= total, "k={k} out of range for {total} entries");

    let mut bounds: BTreeMap<Label, Interval> = BTreeMap::new();
    let mut certain = 0usize;

    // Top-k walk: every extracted point possibly votes; it certainly votes
    // when no later point that might displace it carries a different label.
    for i in 1..=k {
        let Some((di, li)) = heap.nth_smallest(i).cloned() else {
            break;
        };
        bounds.entry(li).or_insert_with(|| Interval::point(0.0)).ub += 1.0;

        let mut certainly = true;
        for j in (i + 1)..=total {
            let Some((dj, lj)) = heap.nth_smallest(j).cloned() else {
                break;
            };
            if di.strictly_dominated_by(&dj) {
                // By the heap order no later j can displace i either.
                break;
            }
            if lj != li {
                certainly = false;
                break;
            }
        }
        if certainly {
            bounds
                .entry(li)
                .or_insert_with(|| Interval::point(0.0))
                .lb += 1.0;
            certain += 1;
        }
    }

    // Tail walk: points past k may displace uncertain top-k slots and push
    // their own label's upper bound, capped by the open uncertainty.
    let uncertainty = k - certain;
    if uncertainty > 0 {
        let top: Vec<(V, Label)> = (1..=k)
            .filter_map(|i| heap.nth_smallest(i).cloned())
            .collect();

        'tail: for j in (k + 1)..=total {
            let Some((dj, lj)) = heap.nth_smallest(j).cloned() else {
                break;
            };
            let mut possibly_closer = false;
            for (rank, (di, li)) in top.iter().enumerate().rev() {
                if dj.strictly_dominates(di) {
                    if rank + 1 == k {
                        // j cannot beat even the farthest of the top-k, and
                        // the heap order rules out every later candidate.
                        break 'tail;
                    }
                    break;
                }
                if lj != *li {
                    possibly_closer = true;
                }
            }
            if possibly_closer {
                let b = bounds.entry(lj).or_insert_with(|| Interval::point(0.0));
                if b.ub - b.lb < uncertainty as f64 {
                    b.ub += 1.0;
                }
            }
        }
    }

    debug_assert!(bounds.values().all(|b| b.lb >= 0.0 && b.lb <= b.ub));
    debug_assert!(bounds.values().map(|b| b.ub).sum::<f64>() >= k as f64);
    debug_assert!(bounds.values().map(|b| b.lb).sum::<f64>() <= k as f64);
    bounds
}
