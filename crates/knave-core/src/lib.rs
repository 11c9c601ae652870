// crates/knave-core/src/lib.rs

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]

//! Canonical core types used across the kNAVe workspace.
//!
//! Everything the verifier crates share lives here: labels and metrics, the
//! fitted dataset with its feature schema, the error taxonomy, and the
//! verdict/tally types the driver aggregates into reports.

pub mod dataset;
pub mod error;
pub mod types;
pub mod verdict;

// ---- Re-exports for workspace compatibility ----
pub use dataset::*;
pub use error::*;
pub use types::*;
pub use verdict::*;
