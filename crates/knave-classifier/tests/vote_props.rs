//! Property suite for the voting stage.

use knave_classifier::vote::possible_winners;
use knave_core::Label;
use knave_domains::Interval;
use proptest::prelude::*;
use std::collections::BTreeMap;

fn arb_bounds(k: usize) -> impl Strategy<Value = BTreeMap<Label, Interval>> {
    proptest::collection::vec((0..=k, 0..=k), 1..=4).prop_map(move |raw| {
        raw.into_iter()
            .enumerate()
            .map(|(l, (a, b))| {
                let (lb, ub) = if a <= b { (a, b) } else { (b, a) };
                (l as Label, Interval::new(lb as f64, ub as f64))
            })
            .collect()
    })
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 512, .. ProptestConfig::default() })]

    /// Widening any upper bound or shrinking any lower bound can only grow
    /// the winner set, never remove a label from it.
    #[test]
    fn widening_bounds_never_removes_winners(
        k in 1usize..=7,
        bounds in arb_bounds(7),
        which in 0usize..4,
        widen_ub in proptest::bool::ANY,
    ) {
        let base = possible_winners(&bounds, k);

        let keys: Vec<Label> = bounds.keys().copied().collect();
        let target = keys[which % keys.len()];
        let mut widened = bounds.clone();
        if let Some(b) = widened.get_mut(&target) {
            if widen_ub {
                *b = Interval::new(b.lb, (b.ub + 1.0).min(k as f64));
            } else {
                *b = Interval::new((b.lb - 1.0).max(0.0), b.ub);
            }
        }
        let wide = possible_winners(&widened, k);

        prop_assert!(base.is_subset(&wide),
            "winners {base:?} shrank to {wide:?} after widening {target}");
    }

    /// The winner set is never empty when some label has a positive upper
    /// bound and the bounds are consistent with k votes.
    #[test]
    fn winners_nonempty_on_consistent_bounds(
        k in 1usize..=7,
        n_labels in 1usize..=4,
    ) {
        // Exact counts summing to k: the degenerate, fully-known case.
        let mut bounds = BTreeMap::new();
        let per = k / n_labels;
        let mut rest = k - per * n_labels;
        for l in 0..n_labels {
            let c = per + usize::from(rest > 0);
            rest = rest.saturating_sub(1);
            bounds.insert(l as Label, Interval::new(c as f64, c as f64));
        }
        let w = possible_winners(&bounds, k);
        prop_assert!(!w.is_empty());
    }
}
