// crates/knave-verify/src/lib.rs

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]

//! The kNAVe verification driver and its report writers.
//!
//! [`verify`] walks the selected test points, runs the concrete reference
//! and the abstract classifier over every enumerated perturbation region,
//! and aggregates per-k stability/robustness tallies. [`report`] persists
//! the result tree (per-k detail CSVs, summary CSVs, runtime, config
//! backup, machine-readable artifact).

pub mod driver;
pub mod report;

pub use driver::{select_test_points, verify, Verification, VerifyOptions};
pub use report::{write_report_auto, write_reports, RunReport};
