// crates/knave-classifier/src/vote.rs

//! Sound plurality voting over label-count bounds.

use knave_core::Label;
use knave_domains::{AbstractValue, Interval};
use std::collections::{BTreeMap, BTreeSet};

/// The set of labels that can win a plurality vote among the k nearest, for
/// some concretization consistent with `bounds`.
///
/// A label survives when it can reach the minimum winning score
/// `⌈k / |candidates|⌉` and no other label's guaranteed count strictly
/// exceeds its possible count.
#[must_use]
pub fn possible_winners(bounds: &BTreeMap<Label, Interval>, k: usize) -> BTreeSet<Label> {
    // Labels that certainly receive zero votes cannot appear.
    let mut live: BTreeMap<Label, Interval> = bounds
        .iter()
        .filter(|(_, b)| !b.dominated_by_scalar(0.0))
        .map(|(l, b)| (*l, *b))
        .collect();

    if live.len() <= 1 || k == 1 {
        // For k = 1 any label that could be the nearest can win outright.
        return live.keys().copied().collect();
    }

    // Tighten lower bounds: votes not accounted for by the other labels'
    // upper bounds must fall on this label.
    // When Σ ub = k this restores Σ lb = k; the clamp keeps the operation
    // total on bounds looser than any reachable state.
    let sum_ub: f64 = live.values().map(|b| b.ub).sum();
    for b in live.values_mut() {
        let floor = (k as f64 - (sum_ub - b.ub)).min(b.ub);
        if floor > b.lb {
            b.lb = floor;
        }
    }

    let min_score = (k + live.len() - 1) / live.len(); // ⌈k / |candidates|⌉

    live.iter()
        .filter(|(l, b)| {
            !b.strictly_dominated_by_scalar(min_score as f64)
                && live
                    .iter()
                    .all(|(m, bm)| m == *l || !b.strictly_dominated_by(bm))
        })
        .map(|(l, _)| *l)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounds_of(entries: &[(Label, f64, f64)]) -> BTreeMap<Label, Interval> {
        entries
            .iter()
            .map(|&(l, lb, ub)| (l, Interval::new(lb, ub)))
            .collect()
    }

    #[test]
    fn clear_majority_wins_alone() {
        let b = bounds_of(&[(0, 2.0, 2.0), (1, 1.0, 1.0)]);
        let w = possible_winners(&b, 3);
        assert_eq!(w, BTreeSet::from([0]));
    }

    #[test]
    fn zero_count_labels_are_dropped() {
        let b = bounds_of(&[(0, 3.0, 3.0), (1, 0.0, 0.0)]);
        let w = possible_winners(&b, 3);
        assert_eq!(w, BTreeSet::from([0]));
    }

    #[test]
    fn k1_returns_every_possible_nearest() {
        let b = bounds_of(&[(0, 0.0, 1.0), (1, 0.0, 1.0)]);
        let w = possible_winners(&b, 1);
        assert_eq!(w, BTreeSet::from([0, 1]));
    }

    #[test]
    fn uncertain_counts_keep_both_labels() {
        // k=3, both labels can reach 2 of 3 votes.
        let b = bounds_of(&[(0, 1.0, 2.0), (1, 1.0, 2.0)]);
        let w = possible_winners(&b, 3);
        assert_eq!(w, BTreeSet::from([0, 1]));
    }

    #[test]
    fn below_floor_cannot_win() {
        // k=5 over two candidates: winning needs ⌈5/2⌉ = 3 votes.
        let b = bounds_of(&[(0, 3.0, 4.0), (1, 1.0, 2.0)]);
        let w = possible_winners(&b, 5);
        assert_eq!(w, BTreeSet::from([0]));
    }

    #[test]
    fn guaranteed_majority_excludes_the_rest() {
        // Label 1 may reach 2 votes, but label 0 is guaranteed 3.
        let b = bounds_of(&[(0, 3.0, 3.0), (1, 0.0, 2.0)]);
        let w = possible_winners(&b, 5);
        assert_eq!(w, BTreeSet::from([0]));
    }

    #[test]
    fn lb_tightening_restores_the_missing_votes() {
        // k=3, Σub = 3: every label's lb rises to its ub, so the label with
        // the larger share wins alone.
        let b = bounds_of(&[(0, 0.0, 2.0), (1, 0.0, 1.0)]);
        let w = possible_winners(&b, 3);
        assert_eq!(w, BTreeSet::from([0]));
    }
}
