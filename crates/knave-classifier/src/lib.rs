// crates/knave-classifier/src/lib.rs

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]

//! The kNAVe classifier core.
//!
//! - [`distance`]: abstract and concrete distance computation.
//! - [`heap`]: lazy ordered extraction over partially ordered distances.
//! - [`bounds`]: per-label vote-count bounds among the k nearest.
//! - [`vote`]: sound plurality voting over count bounds.
//! - [`AbstractKnn`]: the domain-generic abstract classifier.
//! - [`ConcreteKnn`]: the exact tie-aware reference classifier.

pub mod abstract_knn;
pub mod bounds;
pub mod concrete;
pub mod distance;
pub mod heap;
pub mod vote;

pub use abstract_knn::AbstractKnn;
pub use concrete::ConcreteKnn;
pub use heap::ExtractionHeap;
