// crates/knave-perturb/src/lib.rs

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![warn(
    missing_docs,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    clippy::unwrap_used,
    clippy::expect_used
)]

//! Adversarial perturbations and their finite abstract-region enumeration.
//!
//! A perturbation maps a concrete test point to a finite family of abstract
//! regions whose union contains every perturbed input. Purely numerical
//! perturbations produce a single box; categorical noise enumerates the
//! Cartesian product of the fuzzed blocks' legal settings, pinning the
//! enumerated columns and widening the numerical ones.

use knave_core::{CatBlock, ConfigError, Region, Schema};
use knave_domains::Interval;
use serde::{Deserialize, Serialize};

/// A perturbation specification, as it appears in run configurations.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Perturbation {
    /// L∞ ball of radius `epsilon` on every numerical feature.
    LInf {
        /// Shared radius, in the scaled feature space.
        epsilon: f64,
    },
    /// Per-feature hyper-rectangle.
    HyperRect {
        /// One radius per numerical feature.
        epsilons: Vec<f64>,
    },
    /// Categorical noise on the listed blocks, combined with a numerical
    /// perturbation for the remaining features.
    NoiseCat {
        /// The numerical perturbation applied alongside the enumeration.
        noise: Box<Perturbation>,
        /// Indices of categorical blocks (in schema order) to fuzz.
        cat_on: Vec<usize>,
    },
}

impl Perturbation {
    /// Fail-fast validation against a fitted schema.
    ///
    /// # Errors
    /// Returns a [`ConfigError`] naming the offending key on any
    /// out-of-range radius, arity mismatch, nested categorical noise, or
    /// bad block index.
    pub fn validate(&self, schema: &Schema) -> Result<(), ConfigError> {
        match self {
            Self::LInf { epsilon } => {
                if !(0.0..=1.0).contains(epsilon) {
                    return Err(ConfigError::invalid(
                        "epsilon",
                        format!("{epsilon} outside [0, 1]"),
                    ));
                }
                Ok(())
            }
            Self::HyperRect { epsilons } => {
                if epsilons.len() != schema.num_features.len() {
                    return Err(ConfigError::invalid(
                        "epsilons",
                        format!(
                            "expected {} radii, got {}",
                            schema.num_features.len(),
                            epsilons.len()
                        ),
                    ));
                }
                if let Some(bad) = epsilons.iter().find(|e| !(0.0..=1.0).contains(*e)) {
                    return Err(ConfigError::invalid(
                        "epsilons",
                        format!("{bad} outside [0, 1]"),
                    ));
                }
                Ok(())
            }
            Self::NoiseCat { noise, cat_on } => {
                if matches!(**noise, Self::NoiseCat { .. }) {
                    return Err(ConfigError::invalid(
                        "noise",
                        "categorical noise cannot nest",
                    ));
                }
                noise.validate(schema)?;
                for &b in cat_on {
                    if b >= schema.cat_blocks.len() {
                        return Err(ConfigError::invalid(
                            "cat_on",
                            format!(
                                "block {b} out of range (schema has {})",
                                schema.cat_blocks.len()
                            ),
                        ));
                    }
                }
                let mut seen = cat_on.clone();
                seen.sort_unstable();
                seen.dedup();
                if seen.len() != cat_on.len() {
                    return Err(ConfigError::invalid("cat_on", "duplicate block index"));
                }
                Ok(())
            }
        }
    }

    /// Number of abstract regions this perturbation enumerates.
    #[must_use]
    pub fn num_regions(&self, schema: &Schema) -> usize {
        match self {
            Self::LInf { .. } | Self::HyperRect { .. } => 1,
            Self::NoiseCat { cat_on, .. } => cat_on
                .iter()
                .map(|&b| schema.cat_blocks[b].cardinality())
                .product(),
        }
    }

    /// The `idx`-th abstract region around test point `x`.
    ///
    /// Numerical features widen to `[max(lo, xᵢ−ε), min(hi, xᵢ+ε)]` (and are
    /// re-widened to keep `xᵢ` itself inside, should a test value escape the
    /// declared range); categorical columns are pinned to the point's values
    /// unless the block is fuzzed, in which case `idx` selects its setting.
    ///
    /// # Panics
    /// Panics if `idx ≥ num_regions(schema)` or `x` is shorter than the
    /// schema's column count.
    #[must_use]
    pub fn region(&self, schema: &Schema, x: &[f64], idx: usize) -> Region {
        assert!(idx < self.num_regions(schema), "region index out of range");

        // Every column pinned, then widen/enumerate below.
        let mut region: Region = x.iter().map(|&v| Interval::point(v)).collect();

        for (i, nf) in schema.num_features.iter().enumerate() {
            let eps = self.numeric_epsilon(i);
            let v = x[nf.index];
            let lb = (v - eps).max(nf.lo).min(v);
            let ub = (v + eps).min(nf.hi).max(v);
            region[nf.index] = Interval::new(lb, ub);
        }

        if let Self::NoiseCat { cat_on, .. } = self {
            let mut rest = idx;
            for &b in cat_on {
                let block = &schema.cat_blocks[b];
                let card = block.cardinality();
                let setting = rest % card;
                rest /= card;
                write_block_setting(&mut region, block, setting);
            }
        }

        region
    }

    /// The radius applied to the `i`-th numerical feature.
    fn numeric_epsilon(&self, i: usize) -> f64 {
        match self {
            Self::LInf { epsilon } => *epsilon,
            Self::HyperRect { epsilons } => epsilons[i],
            Self::NoiseCat { noise, .. } => noise.numeric_epsilon(i),
        }
    }
}

/// Pin a categorical block's columns to one enumerated setting.
fn write_block_setting(region: &mut Region, block: &CatBlock, setting: usize) {
    if block.width == 1 {
        region[block.start] = Interval::point(setting as f64);
    } else {
        for j in 0..block.width {
            let v = if j == setting { 1.0 } else { 0.0 };
            region[block.start + j] = Interval::point(v);
        }
    }
}
