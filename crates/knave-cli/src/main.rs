// crates/knave-cli/src/main.rs

#![forbid(unsafe_code)]
#![deny(
    rust_2018_idioms,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo
)]

mod config;

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use config::RunConfig;
use knave_data::synth::{generate, write_csv, SynthSpec};
use knave_data::load_pair;
use knave_verify::report::summary_lines;
use knave_verify::{select_test_points, verify, write_reports, VerifyOptions};
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(
    name = "knave",
    about = "Abstract k-NN robustness verifier",
    long_about = "Abstract k-NN robustness verifier.\n\nVerifies, for each test point and each k, whether every input inside an adversarial perturbation region receives the same classification (stability) and whether that classification matches the ground truth (robustness).",
    version = env!("CARGO_PKG_VERSION"),
    disable_help_subcommand = true
)]
struct Cli {
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Run a verification described by a JSON configuration file.
    Verify {
        /// Path to the run configuration (JSON)
        #[arg(long)]
        config: PathBuf,
    },

    /// Generate a synthetic scaled dataset pair (label-first CSV).
    Synth {
        /// Training points
        #[arg(long, default_value_t = 200, value_parser = clap::value_parser!(u32).range(1..))]
        train: u32,

        /// Test points
        #[arg(long, default_value_t = 50, value_parser = clap::value_parser!(u32).range(1..))]
        test: u32,

        /// Numeric features
        #[arg(long, default_value_t = 4, value_parser = clap::value_parser!(u32).range(1..))]
        features: u32,

        /// Classes
        #[arg(long, default_value_t = 3, value_parser = clap::value_parser!(u32).range(2..))]
        classes: u32,

        /// RNG seed
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Output directory for train.csv / test.csv
        #[arg(long, default_value = "synth")]
        out_dir: PathBuf,
    },
}

fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    match cli.cmd {
        Cmd::Verify { config } => run_verify(&config),
        Cmd::Synth {
            train,
            test,
            features,
            classes,
            seed,
            out_dir,
        } => run_synth(train, test, features, classes, seed, out_dir),
    }
}

/// Initialize tracing with an env-driven filter (default INFO).
fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let fmt_layer = fmt::layer().with_target(false).with_level(true).compact();

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();
}

fn run_verify(config_path: &PathBuf) -> Result<()> {
    let f = File::open(config_path)
        .with_context(|| format!("open config {}", config_path.display()))?;
    let cfg: RunConfig = serde_json::from_reader(BufReader::new(f))
        .with_context(|| format!("parse config {}", config_path.display()))?;
    cfg.validate()?;

    info!(train=%cfg.training_set.display(), test=%cfg.test_set.display(), "loading datasets");
    let (train, test) = load_pair(
        cfg.dataset_format,
        &cfg.training_set,
        &cfg.test_set,
        cfg.fit_options(),
    )?;
    info!(
        points = train.len(),
        features = train.n_features(),
        classes = train.classes.len(),
        "training set fitted"
    );

    // Schema-dependent validation now that the fit exists.
    cfg.perturbation.validate(&train.schema)?;
    if let Some(&bad) = cfg.k.iter().find(|&&k| k > train.len()) {
        anyhow::bail!(
            "invalid value for `k`: {bad} exceeds the training-set size {}",
            train.len()
        );
    }

    let indices = select_test_points(test.len(), cfg.num_test, cfg.shuffle_seed());
    let opts = VerifyOptions {
        ks: cfg.k.clone(),
        metric: cfg.distance_metric,
        domain: cfg.abstract_domain,
        skip_ties: cfg.skip_ties,
        jobs: cfg.jobs,
    };

    let outcome = verify(&train, &test, &indices, &cfg.perturbation, &opts)?;

    for line in summary_lines(&outcome) {
        println!("{line}");
    }
    if outcome.skipped > 0 {
        println!("skipped {} ambiguous test points", outcome.skipped);
    }

    if let Some(dir) = &cfg.save_in {
        let config_echo = serde_json::to_value(&cfg).context("re-serialize config")?;
        write_reports(dir, &config_echo, &train.classes, &outcome)
            .with_context(|| format!("writing results to {}", dir.display()))?;
        println!("Results written to {}", dir.display());
    }
    Ok(())
}

fn run_synth(
    train: u32,
    test: u32,
    features: u32,
    classes: u32,
    seed: u64,
    out_dir: PathBuf,
) -> Result<()> {
    let spec = SynthSpec {
        train: train as usize,
        test: test as usize,
        features: features as usize,
        classes: classes as usize,
        seed,
    };
    let (train_rows, test_rows) = generate(&spec);

    std::fs::create_dir_all(&out_dir)
        .with_context(|| format!("creating {}", out_dir.display()))?;
    let train_path = out_dir.join("train.csv");
    let test_path = out_dir.join("test.csv");
    write_csv(&train_path, &train_rows)?;
    write_csv(&test_path, &test_rows)?;

    println!(
        "Generated {} train / {} test points, {} features, {} classes → {}",
        spec.train,
        spec.test,
        spec.features,
        spec.classes,
        out_dir.display()
    );
    Ok(())
}
