// crates/knave-data/src/synth.rs

//! Seeded synthetic dataset generator: one uniform blob per class, already
//! inside the unit hypercube, written as label-first CSV.

use anyhow::{Context as _, Result};
use rand::{rngs::StdRng, Rng as _, SeedableRng};
use std::path::Path;

/// Shape of a synthetic dataset pair.
#[derive(Clone, Copy, Debug)]
pub struct SynthSpec {
    /// Training points.
    pub train: usize,
    /// Test points.
    pub test: usize,
    /// Numeric features.
    pub features: usize,
    /// Classes (blobs).
    pub classes: usize,
    /// RNG seed; equal seeds reproduce equal datasets.
    pub seed: u64,
}

/// One generated row: class name plus feature values.
pub type SynthRow = (String, Vec<f64>);

/// Generate `(train, test)` rows around per-class blob centers.
#[must_use]
pub fn generate(spec: &SynthSpec) -> (Vec<SynthRow>, Vec<SynthRow>) {
    let mut rng = StdRng::seed_from_u64(spec.seed);

    let centers: Vec<Vec<f64>> = (0..spec.classes)
        .map(|_| (0..spec.features).map(|_| rng.random_range(0.2..0.8)).collect())
        .collect();

    let mut draw = |n: usize| -> Vec<SynthRow> {
        (0..n)
            .map(|i| {
                let class = i % spec.classes;
                let point = centers[class]
                    .iter()
                    .map(|c| (c + rng.random_range(-0.15..0.15)).clamp(0.0, 1.0))
                    .collect();
                (format!("c{class}"), point)
            })
            .collect()
    };

    let train = draw(spec.train);
    let test = draw(spec.test);
    (train, test)
}

/// Write rows as label-first CSV (no header).
///
/// # Errors
/// I/O failures, with path context.
pub fn write_csv(path: &Path, rows: &[SynthRow]) -> Result<()> {
    let mut w = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .with_context(|| format!("create {}", path.display()))?;
    for (label, features) in rows {
        let mut record = vec![label.clone()];
        record.extend(features.iter().map(ToString::to_string));
        w.write_record(&record)
            .with_context(|| format!("write record to {}", path.display()))?;
    }
    w.flush().with_context(|| format!("flush {}", path.display()))?;
    Ok(())
}
