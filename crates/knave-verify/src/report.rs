// crates/knave-verify/src/report.rs

//! Persisted outputs of a verification run.
//!
//! Layout under the configured directory:
//! - `k=<k>/details.csv` — one row per consumed test point,
//! - `robustness.csv` / `stability.csv` — per-k tallies,
//! - `runtime.txt` — integer seconds of the verification phase,
//! - `config.json` — backup of the parsed configuration,
//! - `report.json` — machine-readable artifact (CBOR via `.cbor`).

use crate::driver::Verification;
use anyhow::{anyhow, Context as _, Result};
use knave_core::{Label, Tally};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write as _};
use std::path::Path;

/// Machine-readable run artifact.
#[derive(Debug, Serialize, Deserialize)]
pub struct RunReport {
    /// Echo of the parsed run configuration.
    pub config: serde_json::Value,
    /// Per-k stability tallies.
    pub stability: BTreeMap<usize, Tally>,
    /// Per-k robustness tallies.
    pub robustness: BTreeMap<usize, Tally>,
    /// Points excluded by `skip_ties`.
    pub skipped: usize,
    /// Verification wall-clock, whole seconds.
    pub elapsed_secs: u64,
    /// Per-point verdicts in consumption order.
    pub points: Vec<knave_core::PointVerdict>,
}

impl RunReport {
    /// Assemble the artifact from a finished verification.
    #[must_use]
    pub fn new(config: serde_json::Value, v: &Verification) -> Self {
        Self {
            config,
            stability: v.stability.clone(),
            robustness: v.robustness.clone(),
            skipped: v.skipped,
            elapsed_secs: v.elapsed.as_secs(),
            points: v.points.clone(),
        }
    }
}

/// Ensure the parent directory for a file exists (no-op if none).
fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() {
            fs::create_dir_all(dir)
                .with_context(|| format!("creating parent directory {}", dir.display()))?;
        }
    }
    Ok(())
}

/// Return the lowercase extension (without dot) if present.
fn ext_lower(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|s| s.to_ascii_lowercase())
}

/// Write the artifact as JSON (pretty).
///
/// # Errors
/// I/O and serialization failures, with path context.
pub fn write_report_json(path: &Path, report: &RunReport) -> Result<()> {
    ensure_parent_dir(path)?;
    let f = File::create(path).with_context(|| format!("create {}", path.display()))?;
    let w = BufWriter::new(f);
    serde_json::to_writer_pretty(w, report).context("serialize JSON report")?;
    Ok(())
}

/// Write the artifact as CBOR.
///
/// # Errors
/// I/O and serialization failures, with path context.
pub fn write_report_cbor(path: &Path, report: &RunReport) -> Result<()> {
    ensure_parent_dir(path)?;
    let f = File::create(path).with_context(|| format!("create {}", path.display()))?;
    let mut w = BufWriter::new(f);
    ciborium::ser::into_writer(report, &mut w).context("serialize CBOR report")?;
    Ok(())
}

/// Auto-detect write by extension (defaults to JSON if unknown or missing).
///
/// # Errors
/// See [`write_report_json`] / [`write_report_cbor`].
pub fn write_report_auto(path: &Path, report: &RunReport) -> Result<()> {
    match ext_lower(path).as_deref() {
        Some("cbor") => write_report_cbor(path, report),
        _ => write_report_json(path, report),
    }
}

/// Auto-detect read by extension `.json` / `.cbor`.
///
/// # Errors
/// Unknown extensions are rejected; otherwise I/O and deserialization
/// failures with path context.
pub fn read_report_auto(path: &Path) -> Result<RunReport> {
    let f = File::open(path).with_context(|| format!("open {}", path.display()))?;
    let mut rdr = BufReader::new(f);
    match ext_lower(path).as_deref() {
        Some("json") => serde_json::from_reader(rdr).context("deserialize JSON report"),
        Some("cbor") => ciborium::de::from_reader(&mut rdr).context("deserialize CBOR report"),
        Some(other) => Err(anyhow!(
            "unsupported report extension: {other} (supported: .json, .cbor)"
        )),
        None => Err(anyhow!("path has no extension (expected .json or .cbor)")),
    }
}

/// Render a label set as class names joined by `|`.
fn render_labels(classes: &[String], labels: &BTreeSet<Label>) -> String {
    labels
        .iter()
        .map(|&l| classes[l as usize].as_str())
        .collect::<Vec<_>>()
        .join("|")
}

/// Write the whole result tree under `dir`.
///
/// # Errors
/// Any I/O or serialization failure, with path context.
pub fn write_reports(
    dir: &Path,
    config: &serde_json::Value,
    classes: &[String],
    v: &Verification,
) -> Result<()> {
    fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;

    // Config backup.
    let backup = dir.join("config.json");
    let f = File::create(&backup).with_context(|| format!("create {}", backup.display()))?;
    serde_json::to_writer_pretty(BufWriter::new(f), config).context("serialize config backup")?;

    // Per-k details.
    for (&k, _) in &v.stability {
        let path = dir.join(format!("k={k}")).join("details.csv");
        write_details_csv(&path, classes, v, k)?;
    }

    write_summary_csv(&dir.join("stability.csv"), &v.stability)?;
    write_summary_csv(&dir.join("robustness.csv"), &v.robustness)?;

    // Integer seconds, matching the summary granularity.
    let runtime = dir.join("runtime.txt");
    let mut f =
        File::create(&runtime).with_context(|| format!("create {}", runtime.display()))?;
    writeln!(f, "{}", v.elapsed.as_secs()).context("write runtime")?;

    write_report_auto(
        &dir.join("report.json"),
        &RunReport::new(config.clone(), v),
    )?;
    Ok(())
}

fn write_details_csv(path: &Path, classes: &[String], v: &Verification, k: usize) -> Result<()> {
    ensure_parent_dir(path)?;
    let mut w = csv::Writer::from_path(path)
        .with_context(|| format!("create {}", path.display()))?;
    w.write_record(["Point", "TrueLabel", "Classification", "Stable", "Robust"])
        .context("write details header")?;
    for p in &v.points {
        let true_name = &classes[p.true_label as usize];
        let (classification, stable, robust) = if p.skipped {
            (String::new(), "Skip".to_string(), "Skip".to_string())
        } else {
            let kv = &p.per_k[&k];
            (
                render_labels(classes, &kv.labels),
                kv.stable.to_string(),
                kv.robust.to_string(),
            )
        };
        w.write_record([
            p.index.to_string(),
            true_name.clone(),
            classification,
            stable,
            robust,
        ])
        .with_context(|| format!("write details row {}", p.index))?;
    }
    w.flush().with_context(|| format!("flush {}", path.display()))?;
    Ok(())
}

fn write_summary_csv(path: &Path, tallies: &BTreeMap<usize, Tally>) -> Result<()> {
    let mut w = csv::Writer::from_path(path)
        .with_context(|| format!("create {}", path.display()))?;
    w.write_record(["K", "Yes", "No", "DoNotKnow", "Percentage"])
        .context("write summary header")?;
    for (k, t) in tallies {
        w.write_record([
            k.to_string(),
            t.yes.to_string(),
            t.no.to_string(),
            t.dont_know.to_string(),
            format!("{:.2}", t.percent_yes()),
        ])
        .with_context(|| format!("write summary row k={k}"))?;
    }
    w.flush().with_context(|| format!("flush {}", path.display()))?;
    Ok(())
}

/// One human-readable summary line per k, for terminal output.
#[must_use]
pub fn summary_lines(v: &Verification) -> Vec<String> {
    v.stability
        .iter()
        .map(|(k, s)| {
            let r = v.robustness.get(k).copied().unwrap_or_default();
            format!(
                "k={k}: stable {}/{} ({:.2}%), robust {}/{} ({:.2}%), undecided {}",
                s.yes,
                s.total(),
                s.percent_yes(),
                r.yes,
                r.total(),
                r.percent_yes(),
                s.dont_know,
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use knave_core::{Answer, KVerdict, PointVerdict};
    use std::time::Duration;

    fn sample_verification() -> Verification {
        let mk = |idx: usize, labels: &[Label], stable, robust| PointVerdict {
            index: idx,
            true_label: 0,
            skipped: false,
            per_k: BTreeMap::from([(
                1usize,
                KVerdict {
                    labels: labels.iter().copied().collect(),
                    stable,
                    robust,
                },
            )]),
        };
        let mut stability = BTreeMap::new();
        let mut robustness = BTreeMap::new();
        let mut s = Tally::default();
        s.record(Answer::Yes);
        s.record(Answer::DontKnow);
        stability.insert(1usize, s);
        robustness.insert(1usize, s);
        Verification {
            points: vec![
                mk(0, &[0], Answer::Yes, Answer::Yes),
                mk(1, &[0, 1], Answer::DontKnow, Answer::DontKnow),
            ],
            stability,
            robustness,
            skipped: 0,
            elapsed: Duration::from_secs(3),
        }
    }

    fn tmp_dir(name: &str) -> std::path::PathBuf {
        let mut p = std::env::temp_dir();
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        p.push(format!("knave_report_{name}_{nanos}"));
        p
    }

    #[test]
    fn report_tree_is_complete() {
        let dir = tmp_dir("tree");
        let v = sample_verification();
        let config = serde_json::json!({"k": [1]});
        let classes = vec!["A".to_string(), "B".to_string()];
        write_reports(&dir, &config, &classes, &v).unwrap();

        for file in ["config.json", "stability.csv", "robustness.csv", "runtime.txt", "report.json"] {
            assert!(dir.join(file).exists(), "missing {file}");
        }
        assert!(dir.join("k=1").join("details.csv").exists());

        let runtime = std::fs::read_to_string(dir.join("runtime.txt")).unwrap();
        assert_eq!(runtime.trim(), "3");

        let details = std::fs::read_to_string(dir.join("k=1").join("details.csv")).unwrap();
        assert!(details.starts_with("Point,TrueLabel,Classification,Stable,Robust"));
        assert!(details.contains("0,A,A,Yes,Yes"));
        assert!(details.contains("1,A,A|B,Do not know,Do not know"));

        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn report_artifact_roundtrips_json_and_cbor() {
        let v = sample_verification();
        let report = RunReport::new(serde_json::json!({"seed": 1}), &v);

        for ext in ["json", "cbor"] {
            let mut path = tmp_dir("artifact");
            path.set_extension(ext);
            write_report_auto(&path, &report).unwrap();
            let back = read_report_auto(&path).unwrap();
            assert_eq!(back.elapsed_secs, 3);
            assert_eq!(back.points.len(), 2);
            assert_eq!(back.stability[&1], report.stability[&1]);
            let _ = std::fs::remove_file(path);
        }
    }

    #[test]
    fn summary_lines_render_percentages() {
        let v = sample_verification();
        let lines = summary_lines(&v);
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("k=1"));
        assert!(lines[0].contains("50.00%"));
    }
}
