//! Population-weighted KPI tables.
//!
//! ## Purpose
//!
//! Scores are per demand location; planners read per zone. This module
//! collapses each category's band scores into one value per (zone, band):
//! the population-weighted mean over the zone's locations, with NaN marking
//! the combinations that carry no information.
//!
//! ## Design notes
//!
//! * NaN is a value here, not an error: bands the category does not demand
//!   and zones with zero band population weight nothing, and NaN says so
//!   explicitly in the table.
//! * Every weighted mean is checked against the zone's raw score range
//!   before rounding. A mean outside `[min − ε, max + ε]` can only come from
//!   an aggregation bug, so the violation is fatal and names the category,
//!   zone, and band.
//! * ε scales with machine epsilon and the magnitude of the range bounds, so
//!   the check is as tight for micro-scores as for large ones.
//!
//! ## Invariants
//!
//! * Zones appear sorted by id; all bands appear for every zone.
//! * Every non-NaN table value lies within its zone's raw score range.

// External dependencies
use num_traits::Float;

// Internal dependencies
use crate::engine::attendance::round_output;
use crate::engine::executor::Evaluation;
use crate::model::age::AgeBand;
use crate::model::category::ServiceCategory;
use crate::model::demand::DemandTable;
use crate::primitives::errors::{ReachError, Result};

// ============================================================================
// KpiTable
// ============================================================================

/// One zone's weighted means, one slot per age band.
#[derive(Debug, Clone, PartialEq)]
pub struct KpiRow<T> {
    /// City-zone identifier.
    pub zone: u32,
    /// Weighted mean per band, NaN where the combination carries none.
    pub values: [T; AgeBand::COUNT],
}

/// Per-category (zone × band) tables of population-weighted means.
#[derive(Debug, Clone)]
pub struct KpiTable<T> {
    /// Rows sorted by zone id; `None` for categories not evaluated.
    tables: Vec<Option<Vec<KpiRow<T>>>>,
}

impl<T: Float> KpiTable<T> {
    /// Rows for one category, sorted by zone id.
    pub fn rows(&self, category: ServiceCategory) -> Option<&[KpiRow<T>]> {
        self.tables[category.index()].as_deref()
    }

    /// One table value; `None` when the category was not evaluated or the
    /// zone is unknown.
    pub fn value(&self, category: ServiceCategory, zone: u32, band: AgeBand) -> Option<T> {
        let rows = self.rows(category)?;
        rows.binary_search_by_key(&zone, |row| row.zone)
            .ok()
            .map(|i| rows[i].values[band.index()])
    }
}

// ============================================================================
// Weighting
// ============================================================================

/// Weight one evaluation's scores by band population, per zone.
///
/// NaN marks bands the category does not demand and zones whose band
/// population sums to zero. Fails when a weighted mean escapes the zone's
/// raw score range.
pub fn weight_by_population<T: Float>(
    evaluation: &Evaluation<T>,
    demand: &DemandTable<T>,
) -> Result<KpiTable<T>> {
    let mut tables: Vec<Option<Vec<KpiRow<T>>>> = (0..ServiceCategory::COUNT)
        .map(|_| None)
        .collect();

    for category in ServiceCategory::ALL {
        if !evaluation.has_category(category) {
            continue;
        }
        let mut rows = Vec::new();
        for zone in demand.zones() {
            let mut values = [T::nan(); AgeBand::COUNT];
            for band in AgeBand::ALL {
                if !category.demands(band) {
                    continue;
                }
                let scores = match evaluation.band_scores(category, band) {
                    Some(s) => s,
                    None => continue,
                };
                values[band.index()] =
                    zone_band_mean(category, zone, band, scores, demand)?;
            }
            rows.push(KpiRow { zone, values });
        }
        tables[category.index()] = Some(rows);
    }

    Ok(KpiTable { tables })
}

/// Weighted mean for one (zone, band), invariant-checked then rounded.
fn zone_band_mean<T: Float>(
    category: ServiceCategory,
    zone: u32,
    band: AgeBand,
    scores: &[T],
    demand: &DemandTable<T>,
) -> Result<T> {
    let locations = demand.locations();
    let mut weighted = T::zero();
    let mut pop_sum = T::zero();
    let mut min = T::infinity();
    let mut max = T::neg_infinity();
    for &row in demand.rows_for_zone(zone) {
        let score = scores[row];
        let pop = locations[row].population_of(band);
        weighted = weighted + score * pop;
        pop_sum = pop_sum + pop;
        min = min.min(score);
        max = max.max(score);
    }
    if pop_sum == T::zero() {
        return Ok(T::nan());
    }
    let mean = weighted / pop_sum;
    check_score_range(category, zone, band, mean, min, max)?;
    Ok(round_output(mean))
}

/// Reject a weighted mean falling outside `[min − ε, max + ε]`.
///
/// A population-weighted mean is a convex combination of the zone's raw
/// scores; anything outside their range is an aggregation bug. ε scales with
/// machine epsilon and the magnitude of the bounds.
pub fn check_score_range<T: Float>(
    category: ServiceCategory,
    zone: u32,
    band: AgeBand,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    let eps = T::epsilon()
        * T::from(64.0).unwrap()
        * T::one().max(min.abs()).max(max.abs());
    if value < min - eps || value > max + eps {
        return Err(ReachError::KpiOutOfRange {
            category: category.label(),
            zone,
            band: band.label(),
            value: value.to_f64().unwrap_or(f64::NAN),
            min: min.to_f64().unwrap_or(f64::NAN),
            max: max.to_f64().unwrap_or(f64::NAN),
        });
    }
    Ok(())
}
