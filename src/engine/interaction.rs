//! Interaction matrices and the two-stage distance pruning.
//!
//! ## Purpose
//!
//! The heart of the model is the interaction between supply and demand: for
//! one (category, band) pair, a matrix of kernel scores indexed by (unit,
//! demand location). A naive build evaluates an expensive great-circle
//! distance for every pair; this module makes it tractable with a two-stage
//! filter — a vectorized planar lower bound first, the exact haversine only
//! for pairs the bound cannot rule out, memoized across the bands of a
//! category.
//!
//! ## Design notes
//!
//! * Matrices are sparse: only pairs that survive pruning are stored, in
//!   (unit, location) order by construction. Absent pairs read as zero, and
//!   every consumer folds entries with the rule's identity element, so the
//!   sparse form is score-identical to the dense one.
//! * The bound comparison happens in squared kilometers against the squared
//!   threshold; the hot loop takes no square roots.
//! * Exact evaluations are charged against an optional run-wide budget; an
//!   exhausted budget aborts the run rather than degrading scores.
//!
//! ## Invariants
//!
//! * `entries` is strictly ordered by (unit, location).
//! * An infinite threshold disables pruning for its band; a zero threshold
//!   prunes every pair of its unit.

// Standard library
use std::sync::atomic::{AtomicU64, Ordering};

// Internal dependencies
use crate::math::batch::BatchGeo;
use crate::math::geodesic::{haversine, PlanarBound};
use crate::model::age::AgeBand;
use crate::model::demand::DemandTable;
use crate::model::unit::ServiceUnit;
use crate::primitives::cache::DistanceCache;
use crate::primitives::errors::{ReachError, Result};

// ============================================================================
// Pair budget
// ============================================================================

/// Run-wide cap on exact distance evaluations, shared across tasks.
#[derive(Debug)]
pub struct PairBudget {
    limit: Option<u64>,
    used: AtomicU64,
}

impl PairBudget {
    /// Budget with an optional cap; `None` never exhausts.
    pub fn new(limit: Option<u64>) -> Self {
        Self {
            limit,
            used: AtomicU64::new(0),
        }
    }

    /// Charge one exact evaluation, failing when the cap is exceeded.
    #[inline]
    pub fn charge(&self) -> Result<()> {
        let used = self.used.fetch_add(1, Ordering::Relaxed) + 1;
        match self.limit {
            Some(budget) if used > budget => Err(ReachError::PairBudgetExceeded { budget }),
            _ => Ok(()),
        }
    }

    /// Exact evaluations charged so far.
    pub fn used(&self) -> u64 {
        self.used.load(Ordering::Relaxed)
    }
}

// ============================================================================
// InteractionMatrix
// ============================================================================

/// One surviving (unit, location) score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatrixEntry<T> {
    /// Unit index within the category, row-major key.
    pub unit: u32,
    /// Demand-location row index.
    pub location: u32,
    /// Kernel score at the exact distance.
    pub score: T,
}

/// Sparse (unit × location) score table for one (category, band) pair.
#[derive(Debug, Clone, PartialEq)]
pub struct InteractionMatrix<T> {
    n_units: usize,
    n_locations: usize,
    entries: Vec<MatrixEntry<T>>,
}

impl<T: BatchGeo> InteractionMatrix<T> {
    /// Number of unit rows, including all-zero ones.
    pub fn n_units(&self) -> usize {
        self.n_units
    }

    /// Number of demand-location columns.
    pub fn n_locations(&self) -> usize {
        self.n_locations
    }

    /// Surviving entries in (unit, location) order.
    pub fn entries(&self) -> &[MatrixEntry<T>] {
        &self.entries
    }

    /// Score for a pair; absent pairs are zero.
    pub fn get(&self, unit: u32, location: u32) -> T {
        self.entries
            .binary_search_by(|e| (e.unit, e.location).cmp(&(unit, location)))
            .map(|i| self.entries[i].score)
            .unwrap_or_else(|_| T::zero())
    }

    /// Per-location sums across units.
    pub fn column_sums(&self) -> Vec<T> {
        let mut sums = vec![T::zero(); self.n_locations];
        for entry in &self.entries {
            sums[entry.location as usize] = sums[entry.location as usize] + entry.score;
        }
        sums
    }
}

// ============================================================================
// Matrix construction
// ============================================================================

/// Counters from one matrix build, folded into the run report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PruningCounters {
    /// Pairs discarded by the planar lower bound.
    pub pruned_pairs: u64,
    /// Pairs whose exact distance was computed (cache misses).
    pub exact_pairs: u64,
}

impl PruningCounters {
    /// Fold another set of counters into this one.
    pub fn merge(&mut self, other: &PruningCounters) {
        self.pruned_pairs += other.pruned_pairs;
        self.exact_pairs += other.exact_pairs;
    }
}

/// Build the interaction matrix for one (category, band) pair.
///
/// `units` are the category's units; `scratch` is a reusable bound buffer
/// sized to the location count. The cache persists across the bands of one
/// category, so pairs surviving pruning in several bands compute their exact
/// distance once.
#[allow(clippy::too_many_arguments)]
pub fn build_band_matrix<T: BatchGeo>(
    units: &[&ServiceUnit<T>],
    band: AgeBand,
    demand: &DemandTable<T>,
    bound: &PlanarBound<T>,
    cache: &mut DistanceCache<T>,
    budget: &PairBudget,
    counters: &mut PruningCounters,
    scratch: &mut Vec<T>,
) -> Result<InteractionMatrix<T>> {
    let n_locations = demand.len();
    let (ky, kx) = bound.factors();
    scratch.resize(n_locations, T::zero());

    let mut entries = Vec::new();
    for (u, unit) in units.iter().enumerate() {
        let catchment = match unit.catchment(band) {
            Some(c) => *c,
            // Units not serving the band contribute a zero row.
            None => continue,
        };
        let threshold = unit.threshold(band).unwrap_or_else(T::infinity);
        if threshold == T::zero() {
            counters.pruned_pairs += n_locations as u64;
            continue;
        }
        let threshold_sq = if threshold.is_finite() {
            threshold * threshold
        } else {
            T::infinity()
        };

        let position = unit.position();
        T::planar_bound_sq(
            demand.latitudes(),
            demand.longitudes(),
            position.lat,
            position.lon,
            ky,
            kx,
            scratch,
        );

        for location in 0..n_locations {
            // Stage 1: the lower bound already proves the pair is beyond
            // the cutoff distance.
            if scratch[location] >= threshold_sq {
                counters.pruned_pairs += 1;
                continue;
            }

            // Stage 2: exact distance, memoized per (unit, location).
            let distance = match cache.get(u as u32, location as u32) {
                Some(d) => d,
                None => {
                    budget.charge()?;
                    counters.exact_pairs += 1;
                    let d = haversine(position, demand.locations()[location].position);
                    cache.insert(u as u32, location as u32, d);
                    d
                }
            };

            entries.push(MatrixEntry {
                unit: u as u32,
                location: location as u32,
                score: catchment.score(distance),
            });
        }
    }

    Ok(InteractionMatrix {
        n_units: units.len(),
        n_locations,
        entries,
    })
}
