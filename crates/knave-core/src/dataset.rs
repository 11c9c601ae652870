// crates/knave-core/src/dataset.rs

//! Fitted datasets and their feature schema.
//!
//! Column layout after preprocessing: categorical encodings occupy a prefix
//! of each feature vector (two-level columns as a single 0/1 column, wider
//! ones one-hot), followed by the min-max-scaled numerical features. The
//! schema records both halves so perturbations know which columns may be
//! widened and which must be enumerated.

use crate::types::Label;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// One encoded categorical column group.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct CatBlock {
    /// First column of the block in the encoded feature vector.
    pub start: usize,
    /// Number of encoded columns: 1 for two-level columns, `levels.len()`
    /// for one-hot blocks.
    pub width: usize,
    /// Level names in fit order.
    pub levels: Vec<String>,
}

impl CatBlock {
    /// Number of legal settings of this block.
    #[inline]
    #[must_use]
    pub fn cardinality(&self) -> usize {
        if self.width == 1 {
            self.levels.len().min(2)
        } else {
            self.width
        }
    }
}

/// One scaled numerical feature.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct NumFeature {
    /// Absolute column index in the encoded feature vector.
    pub index: usize,
    /// Declared lower bound of the scaled range.
    pub lo: f64,
    /// Declared upper bound of the scaled range.
    pub hi: f64,
}

/// Feature layout of a fitted dataset.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct Schema {
    /// Categorical blocks, in column order, occupying the vector prefix.
    pub cat_blocks: Vec<CatBlock>,
    /// Scaled numerical features following the categorical prefix.
    pub num_features: Vec<NumFeature>,
}

impl Schema {
    /// Total number of encoded columns.
    #[must_use]
    pub fn n_columns(&self) -> usize {
        self.cat_blocks.iter().map(|b| b.width).sum::<usize>() + self.num_features.len()
    }

    /// A purely numerical schema over `n` features with one shared range.
    #[must_use]
    pub fn numeric(n: usize, lo: f64, hi: f64) -> Self {
        Self {
            cat_blocks: Vec::new(),
            num_features: (0..n).map(|index| NumFeature { index, lo, hi }).collect(),
        }
    }
}

/// An immutable fitted dataset: points, labels, class names, schema.
///
/// Shared read-only across all classifications; a concurrent driver hands
/// out `&Dataset` to every worker.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Dataset {
    /// Encoded feature vectors, one per point.
    pub points: Vec<Vec<f64>>,
    /// Label of each point, indexing into `classes`.
    pub labels: Vec<Label>,
    /// Sorted class display names.
    pub classes: Vec<String>,
    /// Feature layout.
    pub schema: Schema,
}

impl Dataset {
    /// Number of points.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the dataset has no points.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Number of encoded feature columns.
    #[must_use]
    pub fn n_features(&self) -> usize {
        self.points.first().map_or(0, Vec::len)
    }

    /// Display name of a label.
    ///
    /// # Panics
    /// Panics if `label` is not a valid class index; labels are produced by
    /// the fit that also produced `classes`.
    #[must_use]
    pub fn class_name(&self, label: Label) -> &str {
        &self.classes[label as usize]
    }

    /// The full set of labels.
    #[must_use]
    pub fn class_set(&self) -> BTreeSet<Label> {
        (0..self.classes.len() as Label).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toy() -> Dataset {
        Dataset {
            points: vec![vec![0.0, 0.0], vec![1.0, 1.0]],
            labels: vec![0, 1],
            classes: vec!["A".into(), "B".into()],
            schema: Schema::numeric(2, 0.0, 1.0),
        }
    }

    #[test]
    fn accessors() {
        let d = toy();
        assert_eq!(d.len(), 2);
        assert_eq!(d.n_features(), 2);
        assert_eq!(d.class_name(1), "B");
        assert_eq!(d.class_set().len(), 2);
        assert_eq!(d.schema.n_columns(), 2);
    }

    #[test]
    fn cat_block_cardinality() {
        let binary = CatBlock {
            start: 0,
            width: 1,
            levels: vec!["no".into(), "yes".into()],
        };
        assert_eq!(binary.cardinality(), 2);

        let onehot = CatBlock {
            start: 0,
            width: 3,
            levels: vec!["a".into(), "b".into(), "c".into()],
        };
        assert_eq!(onehot.cardinality(), 3);
    }
}
