//! Execution engine for accessibility evaluation.
//!
//! ## Purpose
//!
//! This module orchestrates one full model run: validate inputs, derive the
//! region's pruning bound, build the interaction matrices per category and
//! band, split populations into attendance, derive correction factors, and
//! aggregate corrected scores with each category's norm. The executor is the
//! only place the four engine steps meet.
//!
//! ## Design notes
//!
//! * Categories are independent until their outputs land in the shared
//!   result, so each category is one task; the `parallel` flag switches
//!   between rayon and sequential iteration over the same task list.
//! * Bands of one category run sequentially in band order so the category's
//!   distance cache is reused across bands; each task owns its cache
//!   partition, keeping the run deterministic and lock-free.
//! * Attendance is written into the units only after all tasks finish, so
//!   tasks borrow the unit slice immutably.
//!
//! ## Invariants
//!
//! * Parallel and sequential execution produce bitwise-identical outputs.
//! * Each unit's `attendance` slot is written at most once per run.
//!
//! ## Non-goals
//!
//! * No loading or export; callers own the data boundary.

// External dependencies
use num_traits::Float;
use rayon::prelude::*;
use tracing::debug;

// Internal dependencies
use crate::engine::attendance::{correction_factors, round_output, split_band_population};
use crate::engine::interaction::{
    build_band_matrix, InteractionMatrix, PairBudget, PruningCounters,
};
use crate::engine::validator::Validator;
use crate::math::batch::BatchGeo;
use crate::math::geodesic::PlanarBound;
use crate::math::kernel::KERNEL_VALUE_CUTOFF;
use crate::model::age::{AgeBand, BandMap};
use crate::model::category::ServiceCategory;
use crate::model::demand::DemandTable;
use crate::model::unit::ServiceUnit;
use crate::primitives::cache::{CacheStats, DistanceCache};
use crate::primitives::errors::Result;

// ============================================================================
// Configuration
// ============================================================================

/// Scalar configuration for one engine run.
///
/// Carried as `f64` and converted to the run's float type at the boundary,
/// matching the error taxonomy.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Kernel value below which a contribution is ignored.
    pub cutoff: f64,
    /// Clip level `m` bounding correction factors to `[1/m, m]`.
    pub clip_level: f64,
    /// Whether Steps 2–3 (attendance and correction) run at all.
    pub attendance_correction: bool,
    /// Distance cache capacity in pairs, per category task.
    pub cache_capacity: usize,
    /// Optional cap on exact distance evaluations per run.
    pub pair_budget: Option<u64>,
    /// Run category tasks on the rayon pool.
    pub parallel: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            cutoff: KERNEL_VALUE_CUTOFF,
            clip_level: 1.4,
            attendance_correction: true,
            cache_capacity: 1 << 20,
            pair_budget: None,
            parallel: false,
        }
    }
}

// ============================================================================
// Output
// ============================================================================

/// Diagnostics from one engine run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    /// Population left unassigned per category, summed over bands.
    pub unassigned: [f64; ServiceCategory::COUNT],
    /// Merged distance-cache counters across category tasks.
    pub cache: CacheStats,
    /// Merged pruning counters across category tasks.
    pub pruning: PruningCounters,
}

/// Scores and attendance from one engine run.
#[derive(Debug, Clone)]
pub struct Evaluation<T> {
    /// Per-category, per-band accessibility scores in demand row order;
    /// `None` for categories with no units in the run.
    scores: Vec<Option<BandMap<Vec<T>>>>,
    /// Attendance aligned with the input unit slice; `None` everywhere when
    /// correction is disabled.
    attendance: Vec<Option<T>>,
    report: RunReport,
}

impl<T: Float> Evaluation<T> {
    /// Accessibility score for one (category, band, location), if the
    /// category was evaluated and the band is demanded.
    pub fn score(&self, category: ServiceCategory, band: AgeBand, location: usize) -> Option<T> {
        self.band_scores(category, band)
            .and_then(|scores| scores.get(location).copied())
    }

    /// One band's scores over all locations, in demand row order.
    pub fn band_scores(&self, category: ServiceCategory, band: AgeBand) -> Option<&[T]> {
        self.scores[category.index()]
            .as_ref()
            .and_then(|bands| bands.get(band))
            .map(|scores| scores.as_slice())
    }

    /// Whether the category had units in the run.
    pub fn has_category(&self, category: ServiceCategory) -> bool {
        self.scores[category.index()].is_some()
    }

    /// Estimated attendance aligned with the input unit slice.
    pub fn attendance(&self) -> &[Option<T>] {
        &self.attendance
    }

    /// Run diagnostics.
    pub fn report(&self) -> &RunReport {
        &self.report
    }

    /// Assemble an evaluation from raw parts, bypassing the engine.
    ///
    /// Only for tests that need to feed hand-built scores downstream.
    #[cfg(feature = "dev")]
    pub fn from_parts(
        scores: Vec<Option<BandMap<Vec<T>>>>,
        attendance: Vec<Option<T>>,
        report: RunReport,
    ) -> Self {
        Self {
            scores,
            attendance,
            report,
        }
    }
}

/// Everything one category task produces.
struct CategoryOutcome<T> {
    category: ServiceCategory,
    /// Indices into the caller's unit slice, aligned with local unit rows.
    unit_rows: Vec<usize>,
    scores: BandMap<Vec<T>>,
    /// Rounded per-unit attendance; `None` when correction is disabled.
    attendance: Option<Vec<T>>,
    unassigned: f64,
    cache_stats: CacheStats,
    counters: PruningCounters,
}

// ============================================================================
// Executor
// ============================================================================

/// Orchestrates the four engine steps over one city's data.
pub struct Executor;

impl Executor {
    /// Run the full engine: interaction, attendance, correction,
    /// aggregation.
    ///
    /// Writes each unit's attendance slot when correction is enabled and
    /// returns the scores, the attendance, and the run report.
    pub fn run<T>(
        config: &EngineConfig,
        units: &mut [ServiceUnit<T>],
        demand: &DemandTable<T>,
    ) -> Result<Evaluation<T>>
    where
        T: BatchGeo + Send + Sync,
    {
        Validator::validate_config(config)?;
        Validator::validate_inputs(units, demand)?;

        let bound = region_bound(units, demand);
        let budget = PairBudget::new(config.pair_budget);

        // One task per category with at least one unit.
        let mut tasks: Vec<(ServiceCategory, Vec<usize>)> = Vec::new();
        for category in ServiceCategory::ALL {
            let rows: Vec<usize> = units
                .iter()
                .enumerate()
                .filter(|(_, u)| u.category() == category)
                .map(|(i, _)| i)
                .collect();
            if !rows.is_empty() {
                tasks.push((category, rows));
            }
        }

        let outcomes: Vec<CategoryOutcome<T>> = {
            let shared: &[ServiceUnit<T>] = units;
            let run_one = |task: &(ServiceCategory, Vec<usize>)| {
                run_category(task.0, &task.1, shared, demand, &bound, config, &budget)
            };
            if config.parallel {
                tasks.par_iter().map(run_one).collect::<Result<_>>()?
            } else {
                tasks.iter().map(run_one).collect::<Result<_>>()?
            }
        };

        // Fold task outputs into the shared result and write attendance.
        let mut scores: Vec<Option<BandMap<Vec<T>>>> = (0..ServiceCategory::COUNT)
            .map(|_| None)
            .collect();
        let mut attendance: Vec<Option<T>> = vec![None; units.len()];
        let mut report = RunReport {
            unassigned: [0.0; ServiceCategory::COUNT],
            cache: CacheStats::default(),
            pruning: PruningCounters::default(),
        };
        for outcome in outcomes {
            let index = outcome.category.index();
            report.unassigned[index] += outcome.unassigned;
            report.cache.merge(&outcome.cache_stats);
            report.pruning.merge(&outcome.counters);
            if let Some(loads) = &outcome.attendance {
                for (&row, &load) in outcome.unit_rows.iter().zip(loads.iter()) {
                    units[row].set_attendance(load);
                    attendance[row] = Some(load);
                }
            }
            scores[index] = Some(outcome.scores);
        }

        debug!(
            exact_pairs = report.pruning.exact_pairs,
            pruned_pairs = report.pruning.pruned_pairs,
            cache_hits = report.cache.hits,
            cache_misses = report.cache.misses,
            cache_evictions = report.cache.evictions,
            "engine run complete"
        );

        Ok(Evaluation {
            scores,
            attendance,
            report,
        })
    }
}

/// Planar bound for the combined supply-plus-demand region.
fn region_bound<T: Float>(units: &[ServiceUnit<T>], demand: &DemandTable<T>) -> PlanarBound<T> {
    let (lat_min, lat_max, _, _) = demand.extent();
    let mut max_abs_lat = lat_min.abs().max(lat_max.abs());
    for unit in units {
        max_abs_lat = max_abs_lat.max(unit.position().lat.abs());
    }
    PlanarBound::for_max_abs_latitude(max_abs_lat)
}

/// Steps 1–4 for one category: matrices per band, attendance, correction,
/// aggregation.
fn run_category<T>(
    category: ServiceCategory,
    unit_rows: &[usize],
    units: &[ServiceUnit<T>],
    demand: &DemandTable<T>,
    bound: &PlanarBound<T>,
    config: &EngineConfig,
    budget: &PairBudget,
) -> Result<CategoryOutcome<T>>
where
    T: BatchGeo,
{
    let refs: Vec<&ServiceUnit<T>> = unit_rows.iter().map(|&row| &units[row]).collect();
    let cutoff = T::from(config.cutoff).unwrap();

    // Step 1: interaction matrices, one per demanded band, sharing the
    // category's cache.
    let mut cache = DistanceCache::new(config.cache_capacity)?;
    let mut counters = PruningCounters::default();
    let mut scratch = Vec::new();
    let mut matrices: Vec<(AgeBand, InteractionMatrix<T>)> =
        Vec::with_capacity(category.demand_bands().len());
    for &band in category.demand_bands() {
        let matrix = build_band_matrix(
            &refs,
            band,
            demand,
            bound,
            &mut cache,
            budget,
            &mut counters,
            &mut scratch,
        )?;
        matrices.push((band, matrix));
    }

    // Steps 2–3: attendance and correction factors, skipped when disabled.
    let (attendance, factors, unassigned) = if config.attendance_correction {
        let mut totals = vec![T::zero(); refs.len()];
        let mut unassigned_total = T::zero();
        for (band, matrix) in &matrices {
            let population = demand.population_column(*band);
            let band_loads = split_band_population(matrix, &population, cutoff);
            if band_loads.unassigned > T::zero() {
                debug!(
                    category = category.label(),
                    band = band.label(),
                    unassigned = band_loads.unassigned.to_f64().unwrap_or(f64::NAN),
                    "population below interaction cutoff left unassigned"
                );
            }
            unassigned_total = unassigned_total + band_loads.unassigned;
            for (total, load) in totals.iter_mut().zip(band_loads.loads.iter()) {
                *total = *total + *load;
            }
        }
        let attendance: Vec<T> = totals.into_iter().map(round_output).collect();
        let capacities: Vec<Option<T>> = refs.iter().map(|u| u.capacity()).collect();
        let clip_level = T::from(config.clip_level).unwrap();
        let factors = correction_factors(category, &attendance, &capacities, clip_level);
        (
            Some(attendance),
            Some(factors),
            unassigned_total.to_f64().unwrap_or(f64::NAN),
        )
    } else {
        (None, None, 0.0)
    };

    // Step 4: corrected aggregation with the category's norm.
    let rule = category.rule();
    let mut scores = BandMap::new();
    for (band, matrix) in &matrices {
        let mut acc = vec![rule.identity::<T>(); demand.len()];
        for entry in matrix.entries() {
            let factor = match &factors {
                Some(f) => f[entry.unit as usize],
                None => T::one(),
            };
            let location = entry.location as usize;
            acc[location] = rule.accumulate(acc[location], entry.score * factor);
        }
        scores.insert(*band, acc.into_iter().map(|a| rule.finish(a)).collect());
    }

    Ok(CategoryOutcome {
        category,
        unit_rows: unit_rows.to_vec(),
        scores,
        attendance,
        unassigned,
        cache_stats: cache.stats(),
        counters,
    })
}
