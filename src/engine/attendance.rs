//! Attendance estimation and the correction factor.
//!
//! ## Purpose
//!
//! Scores say how reachable a unit is; attendance says how many people it
//! likely serves. This module splits each location's population across the
//! units that reach it, in proportion to their scores, and derives the
//! per-unit correction factor that dampens outlier loads before scores are
//! re-aggregated.
//!
//! ## Design notes
//!
//! * A location whose score column sums below the cutoff assigns nobody; its
//!   band population is tallied as unassigned and reported, never raised to
//!   an error.
//! * The load ratio divides attendance by capacity when every unit of the
//!   category has one, and by the category's own mean attendance otherwise.
//!   The fallback is self-referential and logged as a warning.
//! * `0/0` ratios become 0 by rule, then clipping pins them at the lower
//!   clip bound; no NaN leaves this module.
//!
//! ## Invariants
//!
//! * Correction factors always lie in `[1/m, m]` for clip level `m`.
//! * When every column sum clears the cutoff, the band's total load equals
//!   the band's total population exactly (coefficients sum to one per
//!   location).

// External dependencies
use num_traits::Float;
use tracing::warn;

// Internal dependencies
use crate::engine::interaction::InteractionMatrix;
use crate::math::batch::BatchGeo;
use crate::model::category::ServiceCategory;

/// Decimal places attendance and KPI values are rounded to.
const OUTPUT_PRECISION: i32 = 4;

/// Round to the fixed output precision.
#[inline]
pub fn round_output<T: Float>(value: T) -> T {
    let scale = T::from(10.0f64.powi(OUTPUT_PRECISION)).unwrap();
    (value * scale).round() / scale
}

// ============================================================================
// Load splitting
// ============================================================================

/// Per-unit loads for one band, plus the population nobody reached.
#[derive(Debug, Clone, PartialEq)]
pub struct BandLoads<T> {
    /// Load contribution per unit, aligned with the matrix's unit rows.
    pub loads: Vec<T>,
    /// Band population at locations whose column sum fell below the cutoff.
    pub unassigned: T,
}

/// Split one band's population across units in proportion to their scores.
///
/// Locations with `column_sum > cutoff` hand out normalized coefficients
/// `score / column_sum`; the rest assign nothing and count as unassigned.
pub fn split_band_population<T: BatchGeo>(
    matrix: &InteractionMatrix<T>,
    population: &[T],
    cutoff: T,
) -> BandLoads<T> {
    debug_assert_eq!(population.len(), matrix.n_locations());

    let column_sums = matrix.column_sums();
    let mut loads = vec![T::zero(); matrix.n_units()];
    for entry in matrix.entries() {
        let location = entry.location as usize;
        let sum = column_sums[location];
        if sum > cutoff {
            let unit = entry.unit as usize;
            loads[unit] = loads[unit] + entry.score / sum * population[location];
        }
    }

    let mut unassigned = T::zero();
    for (location, &sum) in column_sums.iter().enumerate() {
        if sum <= cutoff {
            unassigned = unassigned + population[location];
        }
    }

    BandLoads { loads, unassigned }
}

// ============================================================================
// Correction factor
// ============================================================================

/// Clip a load ratio into `[1/m, m]` and return its reciprocal.
#[inline]
pub fn correction_factor<T: Float>(ratio: T, clip_level: T) -> T {
    // 0/0 and other undefined ratios are zero by rule, then pinned at the
    // lower clip bound.
    let ratio = if ratio.is_nan() { T::zero() } else { ratio };
    let clipped = ratio.max(clip_level.recip()).min(clip_level);
    clipped.recip()
}

/// Per-unit correction factors for one category.
///
/// The reference load ratio is `attendance / capacity` when every unit has a
/// known capacity, and `attendance / mean(attendance)` otherwise.
pub fn correction_factors<T: Float>(
    category: ServiceCategory,
    attendance: &[T],
    capacities: &[Option<T>],
    clip_level: T,
) -> Vec<T> {
    debug_assert_eq!(attendance.len(), capacities.len());

    let all_known = capacities.iter().all(|c| c.is_some());
    if all_known {
        attendance
            .iter()
            .zip(capacities.iter())
            .map(|(&load, capacity)| {
                let capacity = capacity.unwrap_or_else(T::zero);
                correction_factor(load / capacity, clip_level)
            })
            .collect()
    } else {
        warn!(
            category = category.label(),
            "missing capacity data, correcting against the category's mean attendance"
        );
        let count = T::from(attendance.len()).unwrap();
        let mean = attendance.iter().fold(T::zero(), |acc, &a| acc + a) / count;
        attendance
            .iter()
            .map(|&load| correction_factor(load / mean, clip_level))
            .collect()
    }
}
