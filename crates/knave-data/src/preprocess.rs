// crates/knave-data/src/preprocess.rs

//! Fit-on-train preprocessing: min-max scaling of numeric columns into the
//! declared feature range, two-level/one-hot encoding of categorical
//! columns, and label interning.
//!
//! The encoded layout puts every categorical block first (in original column
//! order), then the scaled numeric features — the order the perturbation
//! enumeration expects. The test set is transformed with the training fit;
//! unseen categorical levels or class labels are data errors, not new
//! levels.

use crate::loader::{RawCell, RawTable};
use knave_core::{CatBlock, DataError, Dataset, Label, NumFeature, Schema};
use std::collections::BTreeMap;

/// Scaling options for the numeric columns.
#[derive(Clone, Debug)]
pub struct FitOptions {
    /// Target range shared by all numeric features.
    pub feature_range: (f64, f64),
    /// Per-feature overrides, keyed by numeric feature ordinal (the n-th
    /// numeric column of the raw table).
    pub overrides: BTreeMap<usize, (f64, f64)>,
}

impl Default for FitOptions {
    fn default() -> Self {
        Self {
            feature_range: (0.0, 1.0),
            overrides: BTreeMap::new(),
        }
    }
}

/// What the fit learned about one raw column.
#[derive(Clone, Debug)]
enum ColumnKind {
    Numeric { min: f64, max: f64 },
    Categorical { levels: Vec<String> },
}

/// A preprocessing fit, reusable for any table with the same raw layout.
#[derive(Clone, Debug)]
pub struct Fitter {
    kinds: Vec<ColumnKind>,
    classes: Vec<String>,
    schema: Schema,
    options: FitOptions,
}

/// Learn column kinds, scaling parameters, levels, and classes from the
/// training table.
///
/// # Errors
/// [`DataError::Empty`] on an empty table.
pub fn fit(table: &RawTable, options: FitOptions) -> Result<Fitter, DataError> {
    if table.is_empty() {
        return Err(DataError::Empty("training"));
    }

    let mut classes: Vec<String> = table.labels.clone();
    classes.sort();
    classes.dedup();

    let n_cols = table.n_columns();
    let mut kinds = Vec::with_capacity(n_cols);
    for c in 0..n_cols {
        let is_numeric = table.rows.iter().all(|r| matches!(r[c], RawCell::Num(_)));
        if is_numeric {
            let mut min = f64::INFINITY;
            let mut max = f64::NEG_INFINITY;
            for r in &table.rows {
                if let RawCell::Num(v) = r[c] {
                    min = min.min(v);
                    max = max.max(v);
                }
            }
            kinds.push(ColumnKind::Numeric { min, max });
        } else {
            let mut levels: Vec<String> = table.rows.iter().map(|r| r[c].repr()).collect();
            levels.sort();
            levels.dedup();
            kinds.push(ColumnKind::Categorical { levels });
        }
    }

    let schema = build_schema(&kinds, &options);
    Ok(Fitter {
        kinds,
        classes,
        schema,
        options,
    })
}

fn build_schema(kinds: &[ColumnKind], options: &FitOptions) -> Schema {
    let mut cat_blocks = Vec::new();
    let mut cursor = 0usize;
    for kind in kinds {
        if let ColumnKind::Categorical { levels } = kind {
            let width = if levels.len() <= 2 { 1 } else { levels.len() };
            cat_blocks.push(CatBlock {
                start: cursor,
                width,
                levels: levels.clone(),
            });
            cursor += width;
        }
    }

    let mut num_features = Vec::new();
    let mut ordinal = 0usize;
    for kind in kinds {
        if matches!(kind, ColumnKind::Numeric { .. }) {
            let (lo, hi) = options
                .overrides
                .get(&ordinal)
                .copied()
                .unwrap_or(options.feature_range);
            num_features.push(NumFeature {
                index: cursor,
                lo,
                hi,
            });
            cursor += 1;
            ordinal += 1;
        }
    }

    Schema {
        cat_blocks,
        num_features,
    }
}

impl Fitter {
    /// The fitted schema.
    #[must_use]
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// The sorted class names discovered at fit time.
    #[must_use]
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    /// Encode a table with this fit.
    ///
    /// # Errors
    /// [`DataError::FeatureMismatch`] on a different raw column count,
    /// [`DataError::UnknownLevel`] / [`DataError::UnknownLabel`] on contents
    /// never seen at fit time, [`DataError::Malformed`] on a symbol in a
    /// numeric column.
    pub fn transform(&self, table: &RawTable) -> Result<Dataset, DataError> {
        if table.n_columns() != self.kinds.len() {
            return Err(DataError::FeatureMismatch {
                train: self.kinds.len(),
                test: table.n_columns(),
            });
        }

        let n_out = self.schema.n_columns();
        let mut points = Vec::with_capacity(table.len());
        for (row_idx, row) in table.rows.iter().enumerate() {
            let mut out = vec![0.0f64; n_out];
            let mut block_iter = self.schema.cat_blocks.iter();
            let mut num_iter = self.schema.num_features.iter();

            for (c, kind) in self.kinds.iter().enumerate() {
                match kind {
                    ColumnKind::Categorical { levels } => {
                        let block = block_iter.next().unwrap_or_else(|| unreachable!());
                        let repr = row[c].repr();
                        let Some(level) = levels.iter().position(|l| *l == repr) else {
                            return Err(DataError::UnknownLevel {
                                level: repr,
                                column: c,
                            });
                        };
                        if block.width == 1 {
                            out[block.start] = level as f64;
                        } else {
                            out[block.start + level] = 1.0;
                        }
                    }
                    ColumnKind::Numeric { min, max } => {
                        let nf = num_iter.next().unwrap_or_else(|| unreachable!());
                        let RawCell::Num(v) = row[c] else {
                            return Err(DataError::Malformed {
                                line: row_idx + 1,
                                reason: format!("non-numeric value in numeric column {c}"),
                            });
                        };
                        out[nf.index] = scale(v, *min, *max, nf.lo, nf.hi);
                    }
                }
            }
            points.push(out);
        }

        let mut labels: Vec<Label> = Vec::with_capacity(table.len());
        for raw in &table.labels {
            let Ok(idx) = self.classes.binary_search(raw) else {
                return Err(DataError::UnknownLabel(raw.clone()));
            };
            labels.push(idx as Label);
        }

        Ok(Dataset {
            points,
            labels,
            classes: self.classes.clone(),
            schema: self.schema.clone(),
        })
    }
}

/// Min-max scale `v` from `[min, max]` (fit) into `[lo, hi]` (declared).
/// A constant column maps onto the range floor.
fn scale(v: f64, min: f64, max: f64, lo: f64, hi: f64) -> f64 {
    if max > min {
        lo + (v - min) * (hi - lo) / (max - min)
    } else {
        lo
    }
}
