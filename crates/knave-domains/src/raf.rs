// crates/knave-domains/src/raf.rs

//! Reduced affine forms: `c + Σᵢ aᵢ·εᵢ + r·ε_new` with `εᵢ ∈ [−1, 1]`.
//!
//! The linear coefficients `aᵢ` live on noise symbols that are *shared*
//! across a computation, so correlations survive: `x.sub(&x)` is exactly
//! zero, and distances to two training points computed from the same region
//! compare far tighter than their interval hulls would.
//!
//! Non-affine operations (`mul`, `square`, `abs`) fold their excess error
//! into the accumulated magnitude `r` on a fresh symbol, keeping `r ≥ 0`.
//!
//! The straddling absolute value uses the min-range (Chebyshev) enclosure of
//! `|t|` on the hull `[lb, ub]`: the chord bounds `|·|` from above and the
//! parallel tangent through the origin from below, so
//! `|x| ⊆ m·x + δ ± δ` with `m = (ub+lb)/(ub−lb)` and `δ = −lb·(1+m)/2`.
//! When the form depends on a single symbol this coincides with the exact
//! best affine enclosure, which is kept as an explicit fast path.

use crate::{AbstractValue, Interval};
use std::fmt;

/// Reduced affine form over a fixed set of noise symbols.
///
/// Invariants: `noise ≥ 0`; `linear.len()` is fixed per computation (the
/// dimensionality of the adversarial region) and never resized mid-operation.
#[derive(Clone, Debug, PartialEq)]
pub struct Raf {
    /// Center coefficient.
    pub center: f64,
    /// Linear coefficients, one per shared noise symbol.
    pub linear: Vec<f64>,
    /// Accumulated noise magnitude on a fresh symbol.
    pub noise: f64,
}

/// Shape of a form that depends on exactly one noise symbol.
enum SingleSymbol {
    /// One non-zero linear coefficient, no accumulated noise.
    Tracked(usize),
    /// Only the fresh-symbol magnitude is non-zero.
    Fresh,
}

impl Raf {
    /// The constant form `c` over `n_symbols` symbols.
    #[must_use]
    pub fn constant(c: f64, n_symbols: usize) -> Self {
        Self {
            center: c,
            linear: vec![0.0; n_symbols],
            noise: 0.0,
        }
    }

    /// Lift a feature hull onto its own symbol: `mid + rad·ε_symbol`.
    ///
    /// # Panics
    /// Debug builds panic if `symbol` is out of range.
    #[must_use]
    pub fn from_hull(hull: Interval, symbol: usize, n_symbols: usize) -> Self {
        debug_assert!(symbol < n_symbols, "symbol {symbol} out of {n_symbols}");
        let mut linear = vec![0.0; n_symbols];
        linear[symbol] = hull.radius();
        Self {
            center: hull.midpoint(),
            linear,
            noise: 0.0,
        }
    }

    /// L1 norm of the linear coefficients.
    #[inline]
    #[must_use]
    pub fn linear_l1(&self) -> f64 {
        self.linear.iter().map(|a| a.abs()).sum()
    }

    /// Total deviation radius `Σ|aᵢ| + r`.
    #[inline]
    #[must_use]
    pub fn radius(&self) -> f64 {
        self.linear_l1() + self.noise
    }

    /// Interval hull `[lower, upper]`.
    #[must_use]
    pub fn hull(&self) -> Interval {
        Interval::new(self.lower(), self.upper())
    }

    fn single_symbol(&self) -> Option<SingleSymbol> {
        let mut tracked = None;
        for (i, a) in self.linear.iter().enumerate() {
            if *a != 0.0 {
                if tracked.is_some() {
                    return None;
                }
                tracked = Some(i);
            }
        }
        match (tracked, self.noise != 0.0) {
            (Some(i), false) => Some(SingleSymbol::Tracked(i)),
            (None, true) => Some(SingleSymbol::Fresh),
            _ => None,
        }
    }

    /// Exact best affine enclosure of `|c + a·ε|` on `ε ∈ [−1, 1]` for a
    /// straddling single-symbol form: returns `(offset, slope, residual)`.
    fn abs_single_coeffs(c: f64, a: f64) -> (f64, f64, f64) {
        let p = (c + a).abs();
        let q = (c - a).abs();
        let slope = 0.5 * (p - q);
        let offset = (c * (p - q) + a * (p + q)) / (4.0 * a);
        let residual = (-c * (p - q) + a * (p + q)) / (4.0 * a);
        debug_assert!(residual >= 0.0, "negative abs residual {residual}");
        (offset, slope, residual)
    }

    /// Min-range enclosure for the straddling multi-symbol case.
    fn abs_min_range(&self, lo: f64, hi: f64) -> Self {
        let m = (hi + lo) / (hi - lo);
        let delta = -lo * (1.0 + m) / 2.0;
        debug_assert!(delta >= 0.0, "negative abs slack {delta}");
        let mut out = self.mul_scalar(m);
        out.center += delta;
        out.noise += delta;
        out
    }
}

impl AbstractValue for Raf {
    #[inline]
    fn lower(&self) -> f64 {
        self.center - self.radius()
    }

    #[inline]
    fn upper(&self) -> f64 {
        self.center + self.radius()
    }

    fn neg(&self) -> Self {
        Self {
            center: -self.center,
            linear: self.linear.iter().map(|a| -a).collect(),
            noise: self.noise,
        }
    }

    fn add(&self, other: &Self) -> Self {
        debug_assert_eq!(self.linear.len(), other.linear.len());
        Self {
            center: self.center + other.center,
            linear: self
                .linear
                .iter()
                .zip(&other.linear)
                .map(|(a, b)| a + b)
                .collect(),
            noise: self.noise + other.noise,
        }
    }

    fn sub(&self, other: &Self) -> Self {
        debug_assert_eq!(self.linear.len(), other.linear.len());
        Self {
            center: self.center - other.center,
            linear: self
                .linear
                .iter()
                .zip(&other.linear)
                .map(|(a, b)| a - b)
                .collect(),
            noise: self.noise + other.noise,
        }
    }

    fn mul(&self, other: &Self) -> Self {
        debug_assert_eq!(self.linear.len(), other.linear.len());
        let dot: f64 = self
            .linear
            .iter()
            .zip(&other.linear)
            .map(|(a, b)| a * b)
            .sum();
        let dot_abs: f64 = self
            .linear
            .iter()
            .zip(&other.linear)
            .map(|(a, b)| (a * b).abs())
            .sum();

        let center = self.center * other.center + 0.5 * dot;
        let linear = self
            .linear
            .iter()
            .zip(&other.linear)
            .map(|(a, b)| other.center * a + self.center * b)
            .collect();
        let cross = (self.linear_l1() + self.noise) * (other.linear_l1() + other.noise)
            - 0.5 * dot_abs;
        let noise =
            other.center.abs() * self.noise + self.center.abs() * other.noise + cross;
        debug_assert!(noise >= -1e-9, "negative product noise {noise}");

        Self {
            center,
            linear,
            noise: noise.max(0.0),
        }
    }

    fn abs(&self) -> Self {
        let lo = self.lower();
        let hi = self.upper();
        if lo >= 0.0 {
            return self.clone();
        }
        if hi <= 0.0 {
            return self.neg();
        }
        match self.single_symbol() {
            Some(SingleSymbol::Tracked(i)) => {
                let (offset, slope, residual) =
                    Self::abs_single_coeffs(self.center, self.linear[i]);
                let mut linear = vec![0.0; self.linear.len()];
                linear[i] = slope;
                Self {
                    center: offset,
                    linear,
                    noise: residual,
                }
            }
            Some(SingleSymbol::Fresh) => {
                // The fresh symbol is not tracked, so its slope folds into the
                // accumulated magnitude.
                let (offset, slope, residual) =
                    Self::abs_single_coeffs(self.center, self.noise);
                Self {
                    center: offset,
                    linear: vec![0.0; self.linear.len()],
                    noise: residual + slope.abs(),
                }
            }
            None => self.abs_min_range(lo, hi),
        }
    }

    fn square(&self) -> Self {
        let sumsq: f64 = self.linear.iter().map(|a| a * a).sum();
        let l1 = self.linear_l1();
        let center = self.center * self.center + 0.5 * sumsq;
        let linear = self.linear.iter().map(|a| 2.0 * self.center * a).collect();
        let spread = l1 + self.noise;
        let noise = 2.0 * self.center.abs() * self.noise + spread * spread - 0.5 * sumsq;
        debug_assert!(noise >= -1e-9, "negative square noise {noise}");

        Self {
            center,
            linear,
            noise: noise.max(0.0),
        }
    }

    fn add_scalar(&self, s: f64) -> Self {
        Self {
            center: self.center + s,
            linear: self.linear.clone(),
            noise: self.noise,
        }
    }

    fn sub_scalar(&self, s: f64) -> Self {
        Self {
            center: self.center - s,
            linear: self.linear.clone(),
            noise: self.noise,
        }
    }

    fn mul_scalar(&self, s: f64) -> Self {
        Self {
            center: self.center * s,
            linear: self.linear.iter().map(|a| a * s).collect(),
            noise: self.noise * s.abs(),
        }
    }

    #[inline]
    fn zero(n_symbols: usize) -> Self {
        Self::constant(0.0, n_symbols)
    }

    #[inline]
    fn from_feature(hull: Interval, symbol: usize, n_symbols: usize) -> Self {
        Self::from_hull(hull, symbol, n_symbols)
    }
}

impl fmt::Display for Raf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ± {}", self.center, self.radius())
    }
}
