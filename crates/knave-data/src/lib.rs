// crates/knave-data/src/lib.rs

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]

//! Dataset ingestion for kNAVe: raw loaders (CSV with the label in column 0,
//! LIBSVM/SVMLight), fit-on-train preprocessing (min-max scaling, two-level
//! and one-hot categorical encoding), and a seeded synthetic generator for
//! experiments.

pub mod loader;
pub mod preprocess;
pub mod synth;

pub use loader::{read_table, DatasetFormat, RawCell, RawTable};
pub use preprocess::{fit, FitOptions, Fitter};

use anyhow::{Context as _, Result};
use knave_core::Dataset;
use std::path::Path;

/// Load a training/test pair, fit the preprocessing on the training set and
/// transform both with the same fit.
///
/// LIBSVM files are sparse; both tables are padded to the larger column
/// count (absent features are zero) before fitting. CSV tables must agree on
/// the column count exactly.
///
/// # Errors
/// Any loader, fit, or transform failure, with file-path context.
pub fn load_pair(
    format: DatasetFormat,
    train_path: &Path,
    test_path: &Path,
    options: FitOptions,
) -> Result<(Dataset, Dataset)> {
    let mut train_raw = read_table(format, train_path)
        .with_context(|| format!("loading training set {}", train_path.display()))?;
    let mut test_raw = read_table(format, test_path)
        .with_context(|| format!("loading test set {}", test_path.display()))?;

    if format == DatasetFormat::Libsvm {
        let width = train_raw.n_columns().max(test_raw.n_columns());
        train_raw.pad_columns(width);
        test_raw.pad_columns(width);
    }
    if test_raw.is_empty() {
        return Err(knave_core::DataError::Empty("test").into());
    }

    let fitter = fit(&train_raw, options)?;
    let train = fitter.transform(&train_raw)?;
    let test = fitter.transform(&test_raw)?;
    Ok((train, test))
}
