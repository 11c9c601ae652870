//! knave-bench-harness
//!
//! Run small end-to-end benchmarks (generate -> fit -> verify) over both
//! abstract domains and append CSV rows into
//! `benchmarks/reports/bench-<unix>.csv`.
//!
//! Usage examples:
//!   cargo run -p knave-bench-harness -- --train 400 --test 50 --eps 0.02
//!   cargo run -p knave-bench-harness -- --features 8 --classes 4 --repeats 3

use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};

use knave_core::{DomainKind, Metric, Schema};
use knave_data::synth::{generate, SynthSpec};
use knave_perturb::Perturbation;
use knave_verify::{verify, VerifyOptions};

fn parse_flag(name: &str, default: &str) -> String {
    let mut it = std::env::args().skip(1);
    while let Some(k) = it.next() {
        if k == format!("--{name}") {
            return it.next().unwrap_or_else(|| default.to_string());
        }
    }
    default.to_string()
}

fn dur_ms(d: Duration) -> u128 {
    d.as_millis()
}

fn main() -> Result<()> {
    let train_n: usize = parse_flag("train", "400").parse().context("--train")?;
    let test_n: usize = parse_flag("test", "50").parse().context("--test")?;
    let features: usize = parse_flag("features", "4").parse().context("--features")?;
    let classes: usize = parse_flag("classes", "3").parse().context("--classes")?;
    let eps: f64 = parse_flag("eps", "0.02").parse().context("--eps")?;
    let repeats: u32 = parse_flag("repeats", "1").parse().context("--repeats")?;
    println!(
        "Profile: train={train_n}, test={test_n}, features={features}, classes={classes}, eps={eps}, repeats={repeats}"
    );

    let spec = SynthSpec {
        train: train_n,
        test: test_n,
        features,
        classes,
        seed: 42,
    };
    let (train_rows, test_rows) = generate(&spec);
    let to_dataset = |rows: &[(String, Vec<f64>)]| knave_core::Dataset {
        points: rows.iter().map(|(_, p)| p.clone()).collect(),
        labels: rows
            .iter()
            .map(|(l, _)| l.trim_start_matches('c').parse().unwrap_or(0))
            .collect(),
        classes: (0..classes).map(|c| format!("c{c}")).collect(),
        schema: Schema::numeric(features, 0.0, 1.0),
    };
    let train = to_dataset(&train_rows);
    let test = to_dataset(&test_rows);

    fs::create_dir_all("benchmarks/reports").ok();
    let ts = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    let csv_path = PathBuf::from(format!("benchmarks/reports/bench-{ts}.csv"));
    let mut csv = fs::File::create(&csv_path)
        .with_context(|| format!("create {}", csv_path.display()))?;
    writeln!(csv, "domain,repeat,ms,stable_yes,stable_dontknow")?;

    let indices: Vec<usize> = (0..test.len()).collect();
    let perturbation = Perturbation::LInf { epsilon: eps };

    for domain in [DomainKind::Interval, DomainKind::Raf] {
        for rep in 0..repeats {
            let opts = VerifyOptions {
                ks: vec![1, 3, 5],
                metric: Metric::Euclidean,
                domain,
                skip_ties: false,
                jobs: 0,
            };
            let outcome = verify(&train, &test, &indices, &perturbation, &opts)?;
            let stable = outcome.stability.values().map(|t| t.yes).sum::<usize>();
            let open = outcome.stability.values().map(|t| t.dont_know).sum::<usize>();
            println!(
                "{domain}: rep={rep} elapsed={}ms stable={stable} undecided={open}",
                dur_ms(outcome.elapsed)
            );
            writeln!(csv, "{domain},{rep},{},{stable},{open}", dur_ms(outcome.elapsed))?;
        }
    }

    println!("Wrote {}", csv_path.display());
    Ok(())
}
