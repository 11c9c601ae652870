//! Sound numeric abstract domains for region-based k-NN verification.
//!
//! - [`Interval`]: closed real intervals with endpoint-wise arithmetic.
//! - [`Raf`]: reduced affine forms `c + Σ aᵢ·εᵢ + r·ε_new` over shared noise
//!   symbols, which keep correlations across a computation and therefore
//!   bound differences much tighter than the interval hull.
//! - [`AbstractValue`]: the common algebra both domains implement. All
//!   operations are total and over-approximating; the hot path never returns
//!   errors.
//!
//! The four dominance orderings are *partial*: two abstract scalars may be
//! incomparable, which downstream code must treat as "don't know". They are
//! defined once here, through the difference `self − other`, so that each
//! domain's own subtraction decides how tight the comparison is. For
//! intervals this reduces to the usual endpoint tests; for affine forms the
//! shared symbols cancel in the subtraction, which is exactly the
//! correlation-aware comparison.

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![warn(
    missing_docs,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    clippy::unwrap_used,
    clippy::expect_used
)]

pub mod interval;
pub mod raf;

pub use interval::Interval;
pub use raf::Raf;

/// Common algebra of sound abstract scalars.
///
/// Implementations must guarantee that every operation over-approximates the
/// concrete operation: if `x ∈ γ(a)` and `y ∈ γ(b)` then `x + y ∈ γ(a.add(b))`
/// and so on for every method. Totality is part of the contract — a coarse
/// result is always acceptable, an error never is.
pub trait AbstractValue: Clone + std::fmt::Debug {
    /// Greatest lower bound of the concretization (may be `-∞`).
    fn lower(&self) -> f64;
    /// Least upper bound of the concretization (may be `+∞`).
    fn upper(&self) -> f64;

    /// Negation.
    #[must_use]
    fn neg(&self) -> Self;
    /// Addition.
    #[must_use]
    fn add(&self, other: &Self) -> Self;
    /// Subtraction.
    #[must_use]
    fn sub(&self, other: &Self) -> Self;
    /// Multiplication.
    #[must_use]
    fn mul(&self, other: &Self) -> Self;
    /// Absolute value.
    #[must_use]
    fn abs(&self) -> Self;
    /// Squaring. Usually tighter than `self.mul(self)`.
    #[must_use]
    fn square(&self) -> Self;

    /// Add a concrete scalar.
    #[must_use]
    fn add_scalar(&self, s: f64) -> Self;
    /// Subtract a concrete scalar.
    #[must_use]
    fn sub_scalar(&self, s: f64) -> Self;
    /// Multiply by a concrete scalar.
    #[must_use]
    fn mul_scalar(&self, s: f64) -> Self;

    /// The additive identity of a computation over `n_symbols` region features.
    #[must_use]
    fn zero(n_symbols: usize) -> Self;

    /// Lift one feature of an abstract region into the domain.
    ///
    /// `symbol` is the feature's index within the region and `n_symbols` the
    /// region dimensionality; domains without symbol bookkeeping ignore both.
    #[must_use]
    fn from_feature(hull: Interval, symbol: usize, n_symbols: usize) -> Self;

    /// `self ≥ other` for every concretization pair. Partial: `false` means
    /// "not provably", not "provably not".
    fn dominates(&self, other: &Self) -> bool {
        self.sub(other).lower() >= 0.0
    }

    /// `self > other` for every concretization pair.
    fn strictly_dominates(&self, other: &Self) -> bool {
        self.sub(other).lower() > 0.0
    }

    /// `self ≤ other` for every concretization pair.
    fn dominated_by(&self, other: &Self) -> bool {
        self.sub(other).upper() <= 0.0
    }

    /// `self < other` for every concretization pair.
    fn strictly_dominated_by(&self, other: &Self) -> bool {
        self.sub(other).upper() < 0.0
    }

    /// `self ≥ s` for every concretization.
    fn dominates_scalar(&self, s: f64) -> bool {
        self.lower() >= s
    }

    /// `self > s` for every concretization.
    fn strictly_dominates_scalar(&self, s: f64) -> bool {
        self.lower() > s
    }

    /// `self ≤ s` for every concretization.
    fn dominated_by_scalar(&self, s: f64) -> bool {
        self.upper() <= s
    }

    /// `self < s` for every concretization.
    fn strictly_dominated_by_scalar(&self, s: f64) -> bool {
        self.upper() < s
    }
}
