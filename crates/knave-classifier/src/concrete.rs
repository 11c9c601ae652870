// crates/knave-classifier/src/concrete.rs

//! Exact tie-aware concrete k-NN, the ground-truth reference.
//!
//! When the k-th and (k+1)-th distances tie, every size-completing subset of
//! the equidistant points is enumerated and the winner sets are unioned, so
//! the result is the exact set of labels a tie-breaking concrete classifier
//! could output. Enumeration short-circuits once every class is in the
//! union.

use crate::distance::point_distance;
use knave_core::{Dataset, Label, Metric};
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

/// Concrete k-NN classifier over a fitted training set.
#[derive(Debug)]
pub struct ConcreteKnn<'a> {
    train: &'a Dataset,
    metric: Metric,
}

impl<'a> ConcreteKnn<'a> {
    /// Bind the classifier to a fitted training set and metric.
    #[must_use]
    pub fn new(train: &'a Dataset, metric: Metric) -> Self {
        Self { train, metric }
    }

    /// Exact winner sets for every requested `k` at the point `x`.
    ///
    /// A non-singleton set means the concrete classification itself is
    /// ambiguous (vote tie, or distance ties straddling position k).
    #[must_use]
    pub fn classify(&self, x: &[f64], ks: &[usize]) -> BTreeMap<usize, BTreeSet<Label>> {
        let mut dists: Vec<(f64, Label)> = self
            .train
            .points
            .iter()
            .zip(&self.train.labels)
            .map(|(p, &l)| (point_distance(x, p, self.metric), l))
            .collect();
        dists.sort_by(|a, b| {
            a.0.partial_cmp(&b.0)
                .unwrap_or(Ordering::Equal)
                .then(a.1.cmp(&b.1))
        });

        ks.iter().map(|&k| (k, self.classify_k(&dists, k))).collect()
    }

    fn classify_k(&self, sorted: &[(f64, Label)], k: usize) -> BTreeSet<Label> {
        let n = sorted.len();
        let k = k.min(n).max(1);

        if k == n || sorted[k - 1].0 < sorted[k].0 {
            return argmax_labels(sorted[..k].iter().map(|&(_, l)| l));
        }

        // Ties straddle position k: strictly closer points always vote, and
        // every way of completing the top-k from the equidistant ring is
        // enumerated.
        let kth = sorted[k - 1].0;
        let certain: Vec<Label> = sorted
            .iter()
            .take_while(|(d, _)| *d < kth)
            .map(|&(_, l)| l)
            .collect();
        let tied: Vec<Label> = sorted
            .iter()
            .filter(|(d, _)| *d == kth)
            .map(|&(_, l)| l)
            .collect();
        let need = k - certain.len();
        let n_classes = self.train.classes.len();

        let mut union = BTreeSet::new();
        for_each_combination(tied.len(), need, |choice| {
            let votes = certain
                .iter()
                .copied()
                .chain(choice.iter().map(|&i| tied[i]));
            union.extend(argmax_labels(votes));
            union.len() < n_classes
        });
        union
    }
}

/// Labels with the maximal vote count.
fn argmax_labels(votes: impl Iterator<Item = Label>) -> BTreeSet<Label> {
    let mut counts: BTreeMap<Label, usize> = BTreeMap::new();
    for l in votes {
        *counts.entry(l).or_insert(0) += 1;
    }
    let best = counts.values().copied().max().unwrap_or(0);
    counts
        .into_iter()
        .filter(|&(_, c)| c == best)
        .map(|(l, _)| l)
        .collect()
}

/// Visit every size-`r` index combination of `0..n` in lexicographic order;
/// the callback returns `false` to stop early.
fn for_each_combination<F: FnMut(&[usize]) -> bool>(n: usize, r: usize, mut f: F) {
    if r > n {
        return;
    }
    if r == 0 {
        let _ = f(&[]);
        return;
    }
    let mut idx: Vec<usize> = (0..r).collect();
    loop {
        if !f(&idx) {
            return;
        }
        // Rightmost index with room to advance.
        let mut i = r;
        loop {
            if i == 0 {
                return;
            }
            i -= 1;
            if idx[i] != n - r + i {
                break;
            }
            if i == 0 {
                return;
            }
        }
        idx[i] += 1;
        for j in i + 1..r {
            idx[j] = idx[j - 1] + 1;
        }
    }
}
