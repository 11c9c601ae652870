//! Property suites for the two abstract domains.
//!
//! The load-bearing property is *membership soundness*: evaluating a random
//! expression tree concretely, with the inputs drawn from their hulls, always
//! lands inside the bounds both domains report. Affine sequences additionally
//! check that the reduced affine form is never wider than interval
//! arithmetic, and the dominance relations are checked for internal
//! consistency on both domains.

use knave_domains::{AbstractValue, Interval, Raf};
use proptest::prelude::*;

/// Small relative slack for accumulated floating-point error.
const TOL: f64 = 1e-7;

#[derive(Clone, Debug)]
enum Op {
    AddFeature(usize),
    SubFeature(usize),
    MulFeature(usize),
    AddScalar(f64),
    MulScalar(f64),
    Abs,
    Square,
}

fn arb_feature() -> impl Strategy<Value = (f64, f64)> {
    // (lo, width) with modest magnitudes to keep products well-conditioned.
    (-3.0f64..3.0, 0.0f64..2.0)
}

fn arb_op(n_features: usize) -> impl Strategy<Value = Op> {
    prop_oneof![
        (0..n_features).prop_map(Op::AddFeature),
        (0..n_features).prop_map(Op::SubFeature),
        (0..n_features).prop_map(Op::MulFeature),
        (-2.0f64..2.0).prop_map(Op::AddScalar),
        (-2.0f64..2.0).prop_map(Op::MulScalar),
        Just(Op::Abs),
        Just(Op::Square),
    ]
}

fn arb_affine_op(n_features: usize) -> impl Strategy<Value = Op> {
    prop_oneof![
        (0..n_features).prop_map(Op::AddFeature),
        (0..n_features).prop_map(Op::SubFeature),
        (-2.0f64..2.0).prop_map(Op::AddScalar),
        (-2.0f64..2.0).prop_map(Op::MulScalar),
    ]
}

/// Evaluate the op sequence concretely, over intervals, and over affine
/// forms; return `(concrete, interval, raf)`.
fn evaluate(
    features: &[(f64, f64)],
    eps: &[f64],
    ops: &[Op],
) -> (f64, Interval, Raf) {
    let n = features.len();
    let hulls: Vec<Interval> = features
        .iter()
        .map(|(lo, w)| Interval::new(*lo, lo + w))
        .collect();
    let xs: Vec<f64> = hulls
        .iter()
        .zip(eps)
        .map(|(h, e)| h.midpoint() + h.radius() * e)
        .collect();

    let mut c = 0.0f64;
    let mut iv = Interval::zero(n);
    let mut rf = Raf::zero(n);
    for op in ops {
        match op {
            Op::AddFeature(i) => {
                c += xs[*i];
                iv = iv.add(&Interval::from_feature(hulls[*i], *i, n));
                rf = rf.add(&Raf::from_feature(hulls[*i], *i, n));
            }
            Op::SubFeature(i) => {
                c -= xs[*i];
                iv = iv.sub(&Interval::from_feature(hulls[*i], *i, n));
                rf = rf.sub(&Raf::from_feature(hulls[*i], *i, n));
            }
            Op::MulFeature(i) => {
                c *= xs[*i];
                iv = iv.mul(&Interval::from_feature(hulls[*i], *i, n));
                rf = rf.mul(&Raf::from_feature(hulls[*i], *i, n));
            }
            Op::AddScalar(s) => {
                c += s;
                iv = iv.add_scalar(*s);
                rf = rf.add_scalar(*s);
            }
            Op::MulScalar(s) => {
                c *= s;
                iv = iv.mul_scalar(*s);
                rf = rf.mul_scalar(*s);
            }
            Op::Abs => {
                c = c.abs();
                iv = iv.abs();
                rf = rf.abs();
            }
            Op::Square => {
                c *= c;
                iv = iv.square();
                rf = rf.square();
            }
        }
    }
    (c, iv, rf)
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 256, .. ProptestConfig::default() })]

    /// Concrete evaluation stays inside both domains' bounds, whatever the
    /// expression tree.
    #[test]
    fn membership_soundness(
        features in proptest::collection::vec(arb_feature(), 1..=4),
        eps in proptest::collection::vec(-1.0f64..=1.0, 4),
        ops in proptest::collection::vec(arb_op(4), 1..=8),
    ) {
        let n = features.len();
        let ops: Vec<Op> = ops
            .into_iter()
            .map(|op| match op {
                Op::AddFeature(i) => Op::AddFeature(i % n),
                Op::SubFeature(i) => Op::SubFeature(i % n),
                Op::MulFeature(i) => Op::MulFeature(i % n),
                other => other,
            })
            .collect();
        let (c, iv, rf) = evaluate(&features, &eps[..n], &ops);

        let slack = TOL * (1.0 + c.abs());
        prop_assert!(c >= iv.lower() - slack && c <= iv.upper() + slack,
            "concrete {c} outside interval [{}, {}]", iv.lower(), iv.upper());
        prop_assert!(c >= rf.lower() - slack && c <= rf.upper() + slack,
            "concrete {c} outside raf [{}, {}]", rf.lower(), rf.upper());
    }

    /// On affine sequences the reduced affine form is exact, hence never
    /// wider than interval arithmetic on the same expression.
    #[test]
    fn affine_tightness(
        features in proptest::collection::vec(arb_feature(), 1..=4),
        ops in proptest::collection::vec(arb_affine_op(4), 1..=10),
    ) {
        let n = features.len();
        let ops: Vec<Op> = ops
            .into_iter()
            .map(|op| match op {
                Op::AddFeature(i) => Op::AddFeature(i % n),
                Op::SubFeature(i) => Op::SubFeature(i % n),
                other => other,
            })
            .collect();
        let (_, iv, rf) = evaluate(&features, &vec![0.0; n], &ops);

        let slack = TOL * (1.0 + iv.lower().abs() + iv.upper().abs());
        prop_assert!(rf.lower() >= iv.lower() - slack,
            "raf lower {} below interval lower {}", rf.lower(), iv.lower());
        prop_assert!(rf.upper() <= iv.upper() + slack,
            "raf upper {} above interval upper {}", rf.upper(), iv.upper());
    }

    /// Dominance sanity on intervals: strict implies non-strict, and
    /// domination one way forbids strict domination the other way.
    #[test]
    fn interval_ordering_sanity(
        a in -5.0f64..5.0, wa in 0.0f64..3.0,
        b in -5.0f64..5.0, wb in 0.0f64..3.0,
    ) {
        let x = Interval::new(a, a + wa);
        let y = Interval::new(b, b + wb);

        if x.strictly_dominates(&y) {
            prop_assert!(x.dominates(&y));
        }
        if x.dominates(&y) {
            prop_assert!(!y.strictly_dominates(&x));
        }
        // Partial order: either one dominates or they are incomparable.
        let comparable = x.dominates(&y) || y.dominates(&x);
        let incomparable = !x.dominates(&y) && !y.dominates(&x);
        prop_assert!(comparable || incomparable);
    }

    /// Dominance sanity on affine forms sharing a symbol.
    #[test]
    fn raf_ordering_sanity(
        lo in -3.0f64..3.0, w in 0.0f64..2.0,
        p in -3.0f64..3.0, q in -3.0f64..3.0,
    ) {
        let x = Raf::from_hull(Interval::new(lo, lo + w), 0, 1);
        let dp = x.sub_scalar(p).square();
        let dq = x.sub_scalar(q).square();

        if dp.strictly_dominates(&dq) {
            prop_assert!(dp.dominates(&dq));
            prop_assert!(!dq.dominates(&dp));
            prop_assert!(dq.strictly_dominated_by(&dp));
        }
        if dp.dominates(&dq) {
            prop_assert!(!dq.strictly_dominates(&dp));
        }
    }

    /// The straddling absolute-value enclosure is sound pointwise.
    #[test]
    fn raf_abs_encloses_concretizations(
        lo in -3.0f64..0.0, hi in 0.001f64..3.0,
        e in -1.0f64..=1.0,
        p in -1.0f64..1.0,
    ) {
        // x straddles zero by construction; x − p may or may not.
        let hull = Interval::new(lo, hi);
        let x = Raf::from_hull(hull, 0, 2);
        let shifted = x.sub_scalar(p);
        let a = shifted.abs();

        let cx = hull.midpoint() + hull.radius() * e;
        let concrete = (cx - p).abs();
        let slack = TOL * (1.0 + concrete);
        prop_assert!(concrete >= a.lower() - slack && concrete <= a.upper() + slack,
            "|{cx} - {p}| = {concrete} outside [{}, {}]", a.lower(), a.upper());
    }
}
