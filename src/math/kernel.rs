//! Distance-decay kernels for service catchments.
//!
//! ## Purpose
//!
//! A service unit's influence decays with distance. This module defines the
//! kernel shapes that model the decay, evaluates them, inverts them to find
//! the cutoff distance past which a unit contributes nothing measurable, and
//! rescales them when a unit's reach must shrink or grow.
//!
//! ## Design notes
//!
//! * [`Catchment`] is plain data (shape, amplitude, lengthscale); behavior is
//!   dispatched on the shape enum.
//! * Cutoff inversion prefers closed forms. The Gaussian uses
//!   `L·√(2·ln(A/c))`; the exponential shape routes through the generic
//!   bisection solver, which any future shape without a closed form reuses.
//! * Rescaling by `f` maps the kernel to `f·k(d/f)`: both the amplitude and
//!   the lengthscale scale by `f`. The reference model deflates
//!   private-sector units this way.
//!
//! ## Key concepts
//!
//! * **Cutoff distance**: the `d` with `score(d) = cutoff`; beyond it the
//!   engine treats the score as zero and skips the pair entirely.
//!
//! ## Invariants
//!
//! * Scores are non-negative and non-increasing in distance for positive
//!   amplitude and lengthscale.
//! * `cutoff_distance` returns 0 when the amplitude never exceeds the
//!   cutoff, and `None` only when the solver fails to bracket or converge.
//!
//! ## Non-goals
//!
//! * No network or travel-time decay; distance is always great-circle.

// External dependencies
use num_traits::Float;

// ============================================================================
// Constants
// ============================================================================

/// Default kernel value below which a unit's contribution is ignored.
pub const KERNEL_VALUE_CUTOFF: f64 = 1e-4;

/// Initial bracket guess for the cutoff solver, in kilometers.
const SOLVER_START_GUESS_KM: f64 = 1.0;

/// Bracket growth gives up past this distance (Earth's circumference).
const SOLVER_MAX_BRACKET_KM: f64 = 40_075.0;

/// Hard iteration cap for bisection.
const SOLVER_MAX_ITERATIONS: usize = 200;

// ============================================================================
// Kernel shapes
// ============================================================================

/// Functional form of a catchment's distance decay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KernelShape {
    /// `A · exp(−d² / (2·L²))`, the reference shape.
    #[default]
    Gaussian,
    /// `A · exp(−d / L)`: heavier tail, inverted through the generic
    /// solver.
    Exponential,
}

impl KernelShape {
    /// Human-readable shape name.
    pub fn label(&self) -> &'static str {
        match self {
            KernelShape::Gaussian => "gaussian",
            KernelShape::Exponential => "exponential",
        }
    }
}

// ============================================================================
// Catchment
// ============================================================================

/// One age band's distance-decay curve for one service unit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Catchment<T> {
    /// Kernel shape.
    pub shape: KernelShape,
    /// Score at distance zero.
    pub amplitude: T,
    /// Decay lengthscale in kilometers.
    pub lengthscale: T,
}

impl<T: Float> Catchment<T> {
    /// Gaussian catchment with unit amplitude.
    pub fn gaussian(lengthscale: T) -> Self {
        Self {
            shape: KernelShape::Gaussian,
            amplitude: T::one(),
            lengthscale,
        }
    }

    /// Exponential catchment with unit amplitude.
    pub fn exponential(lengthscale: T) -> Self {
        Self {
            shape: KernelShape::Exponential,
            amplitude: T::one(),
            lengthscale,
        }
    }

    /// Replace the amplitude, keeping shape and lengthscale.
    pub fn with_amplitude(mut self, amplitude: T) -> Self {
        self.amplitude = amplitude;
        self
    }

    /// Evaluate the kernel at a distance in kilometers.
    #[inline]
    pub fn score(&self, distance: T) -> T {
        match self.shape {
            KernelShape::Gaussian => {
                let two = T::from(2.0).unwrap();
                let z = distance / self.lengthscale;
                self.amplitude * (-(z * z) / two).exp()
            }
            KernelShape::Exponential => self.amplitude * (-(distance / self.lengthscale)).exp(),
        }
    }

    /// Distance at which the score falls to `cutoff`, in kilometers.
    ///
    /// Returns `Some(0)` when the amplitude never exceeds the cutoff, and
    /// `None` when the generic solver cannot bracket or converge; callers
    /// treat that as an unbounded catchment. `cutoff` must be positive.
    pub fn cutoff_distance(&self, cutoff: T) -> Option<T> {
        if self.amplitude <= cutoff {
            return Some(T::zero());
        }
        match self.shape {
            KernelShape::Gaussian => {
                let two = T::from(2.0).unwrap();
                let log_ratio = (self.amplitude / cutoff).ln();
                Some(self.lengthscale * (two * log_ratio).sqrt())
            }
            KernelShape::Exponential => {
                solve_cutoff_distance(|d| self.score(d), cutoff, T::from(SOLVER_START_GUESS_KM).unwrap())
            }
        }
    }

    /// Rescale the kernel so that `new(d) = factor · old(d / factor)`.
    ///
    /// Callers validate the factor; see `ServiceUnit::rescale`.
    pub fn rescale(&mut self, factor: T) {
        self.amplitude = self.amplitude * factor;
        self.lengthscale = self.lengthscale * factor;
    }
}

// ============================================================================
// Generic cutoff solver
// ============================================================================

/// Find the distance where a non-increasing `score` falls to `cutoff`.
///
/// Grows an upper bracket geometrically from `start_guess_km`, then bisects.
/// Returns `None` when no bracket exists within the solver's range. Used for
/// shapes without a closed-form inverse.
pub fn solve_cutoff_distance<T, F>(score: F, cutoff: T, start_guess_km: T) -> Option<T>
where
    T: Float,
    F: Fn(T) -> T,
{
    let two = T::from(2.0).unwrap();
    let max_bracket = T::from(SOLVER_MAX_BRACKET_KM).unwrap();

    // Score already at or below the cutoff at the origin.
    if score(T::zero()) <= cutoff {
        return Some(T::zero());
    }

    // Grow the bracket until the score drops below the cutoff.
    let mut lo = T::zero();
    let mut hi = start_guess_km;
    while score(hi) > cutoff {
        lo = hi;
        hi = hi * two;
        if hi > max_bracket {
            return None;
        }
    }

    // Bisect [lo, hi]; the crossing is unique for monotone kernels.
    let tolerance = T::from(1e-12).unwrap().max(T::epsilon() * hi);
    let mut iterations = 0;
    while hi - lo > tolerance && iterations < SOLVER_MAX_ITERATIONS {
        let mid = (lo + hi) / two;
        if score(mid) > cutoff {
            lo = mid;
        } else {
            hi = mid;
        }
        iterations += 1;
    }

    Some((lo + hi) / two)
}
