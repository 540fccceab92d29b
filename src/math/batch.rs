//! Vectorized planar-bound evaluation.
//!
//! ## Purpose
//!
//! The pruning stage evaluates the planar lower bound for one unit against
//! every demand location, the only dense loop in the engine. This module
//! bridges `f32`/`f64` to SIMD implementations of that loop through the
//! [`BatchGeo`] trait, with a scalar reference implementation the tests
//! compare against.
//!
//! ## Design notes
//!
//! * Two-lane `f64` and four-lane `f32` vectors via `wide`; remainders fall
//!   through to a scalar tail.
//! * Multiplies and adds stay separate (no fused ops), so SIMD and scalar
//!   paths round identically.
//!
//! ## Invariants
//!
//! * `out[i] = (ky·(lat[i]−lat0))² + (kx·(lon[i]−lon0))²` for every lane,
//!   exactly as the scalar reference computes it.
//!
//! ## Non-goals
//!
//! * No runtime feature detection; `wide` lowers to whatever the target
//!   supports.

// External dependencies
use num_traits::Float;
use wide::{f32x4, f64x2};

// ============================================================================
// BatchGeo trait
// ============================================================================

/// Batch evaluation of the squared planar bound for concrete float types.
pub trait BatchGeo: Float + 'static {
    /// Fill `out[i]` with the squared planar bound between `(lat0, lon0)`
    /// and `(lat[i], lon[i])`, using per-degree factors `ky` (latitude) and
    /// `kx` (longitude).
    #[allow(clippy::too_many_arguments)]
    fn planar_bound_sq(
        lat: &[Self],
        lon: &[Self],
        lat0: Self,
        lon0: Self,
        ky: Self,
        kx: Self,
        out: &mut [Self],
    );
}

/// Scalar reference implementation of [`BatchGeo::planar_bound_sq`].
#[allow(clippy::too_many_arguments)]
pub fn planar_bound_sq_scalar<T: Float>(
    lat: &[T],
    lon: &[T],
    lat0: T,
    lon0: T,
    ky: T,
    kx: T,
    out: &mut [T],
) {
    debug_assert_eq!(lat.len(), lon.len());
    debug_assert_eq!(lat.len(), out.len());
    for i in 0..lat.len() {
        let dy = (lat[i] - lat0) * ky;
        let dx = (lon[i] - lon0) * kx;
        out[i] = dy * dy + dx * dx;
    }
}

// ============================================================================
// SIMD implementations
// ============================================================================

impl BatchGeo for f64 {
    fn planar_bound_sq(
        lat: &[f64],
        lon: &[f64],
        lat0: f64,
        lon0: f64,
        ky: f64,
        kx: f64,
        out: &mut [f64],
    ) {
        debug_assert_eq!(lat.len(), lon.len());
        debug_assert_eq!(lat.len(), out.len());
        let n = lat.len();

        let v_lat0 = f64x2::splat(lat0);
        let v_lon0 = f64x2::splat(lon0);
        let v_ky = f64x2::splat(ky);
        let v_kx = f64x2::splat(kx);

        let mut i = 0;
        while i + 2 <= n {
            // SAFETY: i + 1 < n by the loop condition, and all three slices
            // were asserted to share the same length.
            unsafe {
                let la = f64x2::new([*lat.get_unchecked(i), *lat.get_unchecked(i + 1)]);
                let lo = f64x2::new([*lon.get_unchecked(i), *lon.get_unchecked(i + 1)]);
                let dy = (la - v_lat0) * v_ky;
                let dx = (lo - v_lon0) * v_kx;
                let bound = dy * dy + dx * dx;
                let lanes = bound.to_array();
                *out.get_unchecked_mut(i) = lanes[0];
                *out.get_unchecked_mut(i + 1) = lanes[1];
            }
            i += 2;
        }

        // Scalar tail for an odd remainder.
        while i < n {
            let dy = (lat[i] - lat0) * ky;
            let dx = (lon[i] - lon0) * kx;
            out[i] = dy * dy + dx * dx;
            i += 1;
        }
    }
}

impl BatchGeo for f32 {
    fn planar_bound_sq(
        lat: &[f32],
        lon: &[f32],
        lat0: f32,
        lon0: f32,
        ky: f32,
        kx: f32,
        out: &mut [f32],
    ) {
        debug_assert_eq!(lat.len(), lon.len());
        debug_assert_eq!(lat.len(), out.len());
        let n = lat.len();

        let v_lat0 = f32x4::splat(lat0);
        let v_lon0 = f32x4::splat(lon0);
        let v_ky = f32x4::splat(ky);
        let v_kx = f32x4::splat(kx);

        let mut i = 0;
        while i + 4 <= n {
            // SAFETY: i + 3 < n by the loop condition, and all three slices
            // were asserted to share the same length.
            unsafe {
                let la = f32x4::new([
                    *lat.get_unchecked(i),
                    *lat.get_unchecked(i + 1),
                    *lat.get_unchecked(i + 2),
                    *lat.get_unchecked(i + 3),
                ]);
                let lo = f32x4::new([
                    *lon.get_unchecked(i),
                    *lon.get_unchecked(i + 1),
                    *lon.get_unchecked(i + 2),
                    *lon.get_unchecked(i + 3),
                ]);
                let dy = (la - v_lat0) * v_ky;
                let dx = (lo - v_lon0) * v_kx;
                let bound = dy * dy + dx * dx;
                let lanes = bound.to_array();
                *out.get_unchecked_mut(i) = lanes[0];
                *out.get_unchecked_mut(i + 1) = lanes[1];
                *out.get_unchecked_mut(i + 2) = lanes[2];
                *out.get_unchecked_mut(i + 3) = lanes[3];
            }
            i += 4;
        }

        while i < n {
            let dy = (lat[i] - lat0) * ky;
            let dx = (lon[i] - lon0) * kx;
            out[i] = dy * dy + dx * dx;
            i += 1;
        }
    }
}
