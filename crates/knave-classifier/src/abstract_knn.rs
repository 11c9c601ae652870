// crates/knave-classifier/src/abstract_knn.rs

//! The domain-generic abstract k-NN classifier.
//!
//! One instantiation per abstract domain ([`Interval`](knave_domains::Interval)
//! or [`Raf`](knave_domains::Raf)); the pipeline is identical: lift the
//! region, compute one abstract distance per training point, extract through
//! the heap, bound the label counts, vote.

use crate::bounds::label_bounds;
use crate::distance::region_distance;
use crate::heap::ExtractionHeap;
use crate::vote::possible_winners;
use knave_core::{Dataset, Label, Metric, Region};
use knave_domains::AbstractValue;
use std::collections::{BTreeMap, BTreeSet};
use std::marker::PhantomData;
use tracing::trace;

/// Abstract k-NN classifier over a fitted training set.
///
/// The training set is shared read-only; every call allocates its own heap
/// and bounds, so one instance serves concurrent callers.
#[derive(Debug)]
pub struct AbstractKnn<'a, V> {
    train: &'a Dataset,
    metric: Metric,
    _domain: PhantomData<V>,
}

impl<'a, V: AbstractValue> AbstractKnn<'a, V> {
    /// Bind the classifier to a fitted training set and metric.
    #[must_use]
    pub fn new(train: &'a Dataset, metric: Metric) -> Self {
        Self {
            train,
            metric,
            _domain: PhantomData,
        }
    }

    /// Sound winner sets for every requested `k` over one abstract region.
    ///
    /// Each returned set is a superset of the labels any concrete point in
    /// the region could receive; a singleton therefore proves stability on
    /// this region.
    ///
    /// # Panics
    /// Debug builds panic when a `k` exceeds the training-set size.
    #[must_use]
    pub fn classify(&self, region: &Region, ks: &[usize]) -> BTreeMap<usize, BTreeSet<Label>> {
        let n_symbols = region.len();
        let lifted: Vec<V> = region
            .iter()
            .enumerate()
            .map(|(i, hull)| V::from_feature(*hull, i, n_symbols))
            .collect();

        let entries: Vec<(V, Label)> = self
            .train
            .points
            .iter()
            .zip(&self.train.labels)
            .map(|(p, &label)| {
                (
                    region_distance(&lifted, p, self.metric, V::zero(n_symbols)),
                    label,
                )
            })
            .collect();
        let mut heap = ExtractionHeap::new(entries);

        ks.iter()
            .map(|&k| {
                let bounds = label_bounds(&mut heap, k);
                let winners = possible_winners(&bounds, k);
                trace!(k, winners = winners.len(), "abstract vote");
                (k, winners)
            })
            .collect()
    }
}
