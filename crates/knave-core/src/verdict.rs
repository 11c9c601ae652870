// crates/knave-core/src/verdict.rs

//! Per-point verdicts and the tallies aggregated from them.

use crate::types::{Answer, Label};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Outcome of verifying one test point for one `k`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct KVerdict {
    /// Sound over-approximation of the labels any concretization can get.
    pub labels: BTreeSet<Label>,
    /// Whether the whole region classifies identically.
    pub stable: Answer,
    /// Whether the unique classification matches the ground truth.
    pub robust: Answer,
}

/// Outcome of verifying one test point across all requested `k`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PointVerdict {
    /// Position of the point in the consumed test sequence.
    pub index: usize,
    /// Ground-truth label.
    pub true_label: Label,
    /// Set when the point was skipped because its concrete classification
    /// was already ambiguous (`skip_ties`).
    pub skipped: bool,
    /// Per-k verdicts (empty when skipped).
    pub per_k: BTreeMap<usize, KVerdict>,
}

impl PointVerdict {
    /// A skipped-point placeholder.
    #[must_use]
    pub fn skipped(index: usize, true_label: Label) -> Self {
        Self {
            index,
            true_label,
            skipped: true,
            per_k: BTreeMap::new(),
        }
    }
}

/// Yes/no/don't-know counter triple.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Tally {
    /// Proven.
    pub yes: usize,
    /// Refuted.
    pub no: usize,
    /// Left open by the abstraction.
    pub dont_know: usize,
}

impl Tally {
    /// Count one answer.
    pub fn record(&mut self, a: Answer) {
        match a {
            Answer::Yes => self.yes += 1,
            Answer::No => self.no += 1,
            Answer::DontKnow => self.dont_know += 1,
        }
    }

    /// Total counted points.
    #[inline]
    #[must_use]
    pub fn total(&self) -> usize {
        self.yes + self.no + self.dont_know
    }

    /// Fraction of proven points, in percent (0 when nothing was counted).
    #[must_use]
    pub fn percent_yes(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            0.0
        } else {
            100.0 * self.yes as f64 / total as f64
        }
    }
}
