// crates/knave-verify/src/driver.rs

//! Per-point verification pipeline and its sequential/parallel dispatch.

use anyhow::{bail, Result};
use knave_classifier::{AbstractKnn, ConcreteKnn};
use knave_core::{Answer, Dataset, DomainKind, KVerdict, Label, Metric, PointVerdict, Tally};
use knave_domains::{Interval, Raf};
use knave_perturb::Perturbation;
use rand::seq::SliceRandom as _;
use rand::{rngs::StdRng, SeedableRng as _};
use rayon::prelude::*;
use std::collections::{BTreeMap, BTreeSet};
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Driver settings, independent of the datasets.
#[derive(Clone, Debug)]
pub struct VerifyOptions {
    /// Neighbourhood sizes to verify, each in `1..=|training|`.
    pub ks: Vec<usize>,
    /// Distance metric.
    pub metric: Metric,
    /// Abstract domain to classify regions in.
    pub domain: DomainKind,
    /// Skip test points whose concrete classification is already ambiguous.
    pub skip_ties: bool,
    /// Worker threads: 0 uses the rayon default, 1 runs sequentially.
    pub jobs: usize,
}

/// Aggregated outcome of a verification run.
#[derive(Clone, Debug)]
pub struct Verification {
    /// Per-point verdicts, in test-consumption order.
    pub points: Vec<PointVerdict>,
    /// Per-k stability tallies over the counted (non-skipped) points.
    pub stability: BTreeMap<usize, Tally>,
    /// Per-k robustness tallies over the counted points.
    pub robustness: BTreeMap<usize, Tally>,
    /// Points excluded by `skip_ties`.
    pub skipped: usize,
    /// Wall-clock time of the verification phase.
    pub elapsed: Duration,
}

/// Choose which test points to consume, honoring shuffling and truncation.
///
/// The random state is consumed here, before any parallel dispatch.
#[must_use]
pub fn select_test_points(
    n_test: usize,
    num_test: Option<usize>,
    shuffle_seed: Option<u64>,
) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..n_test).collect();
    if let Some(seed) = shuffle_seed {
        let mut rng = StdRng::seed_from_u64(seed);
        indices.shuffle(&mut rng);
    }
    if let Some(limit) = num_test {
        indices.truncate(limit);
    }
    indices
}

/// Verify the selected test points against the fitted training set.
///
/// Result rows come back in selection order regardless of the dispatch mode.
///
/// # Errors
/// Fails fast on empty datasets, mismatched feature counts, out-of-range
/// `k`, or a perturbation inconsistent with the schema.
pub fn verify(
    train: &Dataset,
    test: &Dataset,
    indices: &[usize],
    perturbation: &Perturbation,
    opts: &VerifyOptions,
) -> Result<Verification> {
    if train.is_empty() {
        bail!("empty training set");
    }
    if test.is_empty() || indices.is_empty() {
        bail!("empty test set");
    }
    if train.n_features() != test.n_features() {
        bail!(
            "feature count mismatch: training has {}, test has {}",
            train.n_features(),
            test.n_features()
        );
    }
    if opts.ks.is_empty() {
        bail!("no k values requested");
    }
    if let Some(&bad) = opts.ks.iter().find(|&&k| k == 0 || k > train.len()) {
        bail!("k = {bad} outside 1..={}", train.len());
    }
    perturbation.validate(&train.schema)?;

    let start = Instant::now();
    let n_regions = perturbation.num_regions(&train.schema);
    info!(
        points = indices.len(),
        regions_per_point = n_regions,
        domain = %opts.domain,
        metric = %opts.metric,
        "verification started"
    );

    let run = |(seq, &test_idx): (usize, &usize)| -> PointVerdict {
        check_point(
            train,
            perturbation,
            opts,
            seq,
            &test.points[test_idx],
            test.labels[test_idx],
        )
    };

    let points: Vec<PointVerdict> = match opts.jobs {
        1 => indices.iter().enumerate().map(run).collect(),
        0 => indices.par_iter().enumerate().map(run).collect(),
        n => rayon::ThreadPoolBuilder::new()
            .num_threads(n)
            .build()?
            .install(|| indices.par_iter().enumerate().map(run).collect()),
    };

    let mut stability: BTreeMap<usize, Tally> =
        opts.ks.iter().map(|&k| (k, Tally::default())).collect();
    let mut robustness = stability.clone();
    let mut skipped = 0usize;
    for p in &points {
        if p.skipped {
            skipped += 1;
            continue;
        }
        for (&k, v) in &p.per_k {
            if let Some(t) = stability.get_mut(&k) {
                t.record(v.stable);
            }
            if let Some(t) = robustness.get_mut(&k) {
                t.record(v.robust);
            }
        }
    }

    let elapsed = start.elapsed();
    info!(?elapsed, skipped, "verification finished");
    Ok(Verification {
        points,
        stability,
        robustness,
        skipped,
        elapsed,
    })
}

/// Verify one test point: concrete reference, region enumeration, abstract
/// classification, tri-state resolution.
fn check_point(
    train: &Dataset,
    perturbation: &Perturbation,
    opts: &VerifyOptions,
    seq: usize,
    x: &[f64],
    true_label: Label,
) -> PointVerdict {
    let concrete = ConcreteKnn::new(train, opts.metric).classify(x, &opts.ks);
    if opts.skip_ties && concrete.values().any(|s| s.len() > 1) {
        debug!(seq, "skipped: concrete classification is ambiguous");
        return PointVerdict::skipped(seq, true_label);
    }

    let all_classes = train.class_set();
    let mut union: BTreeMap<usize, BTreeSet<Label>> =
        opts.ks.iter().map(|&k| (k, BTreeSet::new())).collect();

    let n_regions = perturbation.num_regions(&train.schema);
    for i in 0..n_regions {
        let region = perturbation.region(&train.schema, x, i);
        let labels = match opts.domain {
            DomainKind::Interval => {
                AbstractKnn::<Interval>::new(train, opts.metric).classify(&region, &opts.ks)
            }
            DomainKind::Raf => {
                AbstractKnn::<Raf>::new(train, opts.metric).classify(&region, &opts.ks)
            }
        };
        for (k, set) in labels {
            if let Some(u) = union.get_mut(&k) {
                u.extend(set);
            }
        }
        // Nothing left to learn once every k covers the whole class set.
        if union.values().all(|u| *u == all_classes) {
            break;
        }
    }

    let per_k = union
        .into_iter()
        .map(|(k, labels)| {
            let (stable, robust) = resolve(&labels, &concrete[&k], true_label);
            (k, KVerdict { labels, stable, robust })
        })
        .collect();

    PointVerdict {
        index: seq,
        true_label,
        skipped: false,
        per_k,
    }
}

/// Tri-state resolution for one k.
///
/// A singleton abstract answer proves stability; a non-singleton one is a
/// genuine instability only when the concrete classification of the
/// unperturbed point already ties, otherwise the abstraction may simply be
/// too coarse.
fn resolve(
    abstract_labels: &BTreeSet<Label>,
    concrete_labels: &BTreeSet<Label>,
    true_label: Label,
) -> (Answer, Answer) {
    if abstract_labels.len() == 1 {
        let robust = if abstract_labels.contains(&true_label) {
            Answer::Yes
        } else {
            Answer::No
        };
        (Answer::Yes, robust)
    } else if concrete_labels.len() > 1 {
        (Answer::No, Answer::No)
    } else {
        (Answer::DontKnow, Answer::DontKnow)
    }
}
