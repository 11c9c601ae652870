// crates/knave-cli/src/config.rs

//! Run configuration: JSON shape, defaults, and fail-fast validation.

use knave_core::{ConfigError, DomainKind, Metric};
use knave_data::{DatasetFormat, FitOptions};
use knave_perturb::Perturbation;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// A verification run, as parsed from the `--config` JSON file.
///
/// Validation that needs the fitted datasets (k against the training size,
/// radii arity, categorical block indices) happens after loading; everything
/// else fails here, naming the offending key.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunConfig {
    /// On-disk dataset format.
    pub dataset_format: DatasetFormat,
    /// Training-set path.
    pub training_set: PathBuf,
    /// Test-set path.
    pub test_set: PathBuf,
    /// Perturbation specification.
    pub perturbation: Perturbation,
    /// Neighbourhood sizes to verify.
    pub k: Vec<usize>,
    /// Distance metric.
    pub distance_metric: Metric,
    /// Abstract domain (defaults to reduced affine forms).
    #[serde(default = "default_domain")]
    pub abstract_domain: DomainKind,
    /// Scaled range shared by all numeric features.
    #[serde(default)]
    pub feature_range: Option<(f64, f64)>,
    /// Per-feature range overrides, keyed by numeric feature ordinal.
    #[serde(default)]
    pub feature_range_overrides: BTreeMap<usize, (f64, f64)>,
    /// Verify only the first `num_test` consumed points.
    #[serde(default)]
    pub num_test: Option<usize>,
    /// Shuffle the test set before consumption.
    #[serde(default)]
    pub random: bool,
    /// Shuffle seed; implies `random`.
    #[serde(default)]
    pub random_state: Option<u64>,
    /// Skip test points whose concrete classification already ties.
    #[serde(default)]
    pub skip_ties: bool,
    /// Worker threads: 0 = rayon default, 1 = sequential.
    #[serde(default)]
    pub jobs: usize,
    /// Output directory for the result tree (stdout summary only if unset).
    #[serde(default)]
    pub save_in: Option<PathBuf>,
}

fn default_domain() -> DomainKind {
    DomainKind::Raf
}

impl RunConfig {
    /// Dataset-independent validation.
    ///
    /// # Errors
    /// A [`ConfigError`] naming the offending key.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.k.is_empty() {
            return Err(ConfigError::invalid("k", "at least one value required"));
        }
        if let Some(&bad) = self.k.iter().find(|&&k| k == 0) {
            return Err(ConfigError::invalid("k", format!("{bad} is not positive")));
        }
        if let Some((lo, hi)) = self.feature_range {
            if lo >= hi {
                return Err(ConfigError::invalid(
                    "feature_range",
                    format!("[{lo}, {hi}] is not a proper range"),
                ));
            }
        }
        for (ordinal, (lo, hi)) in &self.feature_range_overrides {
            if lo >= hi {
                return Err(ConfigError::invalid(
                    "feature_range_overrides",
                    format!("feature {ordinal}: [{lo}, {hi}] is not a proper range"),
                ));
            }
        }
        if self.num_test == Some(0) {
            return Err(ConfigError::invalid("num_test", "must be positive"));
        }
        // Radii ranges are schema-independent; arity is checked post-load.
        validate_radii(&self.perturbation)?;
        Ok(())
    }

    /// Scaling options derived from the range settings.
    #[must_use]
    pub fn fit_options(&self) -> FitOptions {
        FitOptions {
            feature_range: self.feature_range.unwrap_or((0.0, 1.0)),
            overrides: self.feature_range_overrides.clone(),
        }
    }

    /// The shuffle seed, if shuffling was requested.
    #[must_use]
    pub fn shuffle_seed(&self) -> Option<u64> {
        match (self.random, self.random_state) {
            (_, Some(seed)) => Some(seed),
            (true, None) => Some(rand_seed_from_entropy()),
            (false, None) => None,
        }
    }
}

/// Entropy-derived seed for `random: true` without an explicit state.
fn rand_seed_from_entropy() -> u64 {
    // Wall-clock nanos are enough entropy for test-set shuffling.
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map_or(0, |d| u64::try_from(d.as_nanos() & u128::from(u64::MAX)).unwrap_or(0))
}

/// Range check on ε values, independent of the schema.
fn validate_radii(p: &Perturbation) -> Result<(), ConfigError> {
    match p {
        Perturbation::LInf { epsilon } => {
            if !(0.0..=1.0).contains(epsilon) {
                return Err(ConfigError::invalid(
                    "epsilon",
                    format!("{epsilon} outside [0, 1]"),
                ));
            }
        }
        Perturbation::HyperRect { epsilons } => {
            if epsilons.is_empty() {
                return Err(ConfigError::invalid("epsilons", "no radii given"));
            }
            if let Some(bad) = epsilons.iter().find(|e| !(0.0..=1.0).contains(*e)) {
                return Err(ConfigError::invalid(
                    "epsilons",
                    format!("{bad} outside [0, 1]"),
                ));
            }
        }
        Perturbation::NoiseCat { noise, cat_on } => {
            if matches!(**noise, Perturbation::NoiseCat { .. }) {
                return Err(ConfigError::invalid("noise", "categorical noise cannot nest"));
            }
            if cat_on.is_empty() {
                return Err(ConfigError::invalid("cat_on", "no categorical blocks listed"));
            }
            validate_radii(noise)?;
        }
    }
    Ok(())
}
