//! Demand locations and the indexed demand table.
//!
//! ## Purpose
//!
//! Demand is where the residents are: census-section centroids with a zone
//! identifier and a population count per age band. This module defines one
//! row ([`DemandLocation`]) and [`DemandTable`], which owns the rows plus the
//! indices the engine and the KPI weighting need: coordinate columns for
//! batch pruning, and a zone index built once at construction.
//!
//! ## Design notes
//!
//! * Coordinates are stored twice: per row for exact distances, and as flat
//!   `lat`/`lon` columns the SIMD pruning pass reads directly.
//! * Two rows with bitwise-equal positions are rejected at construction; the
//!   engine keys its distance cache by row index, so duplicate positions
//!   would silently alias.
//! * The zone index maps each zone id to its row indices, sorted by zone id.
//!   KPI grouping iterates it instead of re-scanning rows.
//!
//! ## Invariants
//!
//! * The table is non-empty, all positions are finite and in range, and the
//!   region extent stays within [`MAX_REGION_SPAN_DEG`].
//! * Populations are finite and non-negative; zero is allowed.

// Standard library
use std::collections::HashMap;

// External dependencies
use num_traits::Float;

// Internal dependencies
use crate::math::geodesic::{GeoPoint, MAX_REGION_SPAN_DEG};
use crate::model::age::AgeBand;
use crate::primitives::errors::{ReachError, Result};

// ============================================================================
// DemandLocation
// ============================================================================

/// One population aggregation point, e.g. a census-section centroid.
#[derive(Debug, Clone, PartialEq)]
pub struct DemandLocation<T> {
    /// City-zone identifier the location aggregates into.
    pub zone: u32,
    /// Position on the Earth's surface.
    pub position: GeoPoint<T>,
    /// Residents per age band, indexed by [`AgeBand::index`].
    pub population: [T; AgeBand::COUNT],
}

impl<T: Float> DemandLocation<T> {
    /// Row with the given zone and position and zero population everywhere.
    pub fn new(zone: u32, lat: T, lon: T) -> Self {
        Self {
            zone,
            position: GeoPoint::new(lat, lon),
            population: [T::zero(); AgeBand::COUNT],
        }
    }

    /// Set the population of one band, consuming-self for chained setup.
    pub fn with_population(mut self, band: AgeBand, count: T) -> Self {
        self.population[band.index()] = count;
        self
    }

    /// Residents in one band.
    #[inline]
    pub fn population_of(&self, band: AgeBand) -> T {
        self.population[band.index()]
    }
}

// ============================================================================
// DemandTable
// ============================================================================

/// Validated, indexed collection of demand locations.
#[derive(Debug, Clone)]
pub struct DemandTable<T> {
    rows: Vec<DemandLocation<T>>,
    /// Flat latitude column, aligned with `rows`.
    lat: Vec<T>,
    /// Flat longitude column, aligned with `rows`.
    lon: Vec<T>,
    /// Zone id to row indices, sorted by zone id.
    zone_index: Vec<(u32, Vec<usize>)>,
}

impl<T: Float> DemandTable<T> {
    /// Build the table, validating rows and constructing the indices.
    ///
    /// Fails on an empty row set, out-of-range or duplicate positions,
    /// non-finite or negative populations, or a region wider than the planar
    /// pruning bound supports.
    pub fn new(rows: Vec<DemandLocation<T>>) -> Result<Self> {
        if rows.is_empty() {
            return Err(ReachError::EmptyDemand);
        }

        // Check 1: per-row validity.
        for (row, location) in rows.iter().enumerate() {
            location.position.validate()?;
            for (band, &count) in AgeBand::ALL.iter().zip(location.population.iter()) {
                if !count.is_finite() || count < T::zero() {
                    return Err(ReachError::InvalidDemandRow {
                        row,
                        reason: format!(
                            "population for band {} must be finite and non-negative, got {}",
                            band.label(),
                            count.to_f64().unwrap_or(f64::NAN)
                        ),
                    });
                }
            }
        }

        // Check 2: no two rows share a position. Keys are coordinate bit
        // patterns, so only exact duplicates collide.
        let mut seen: HashMap<(u64, u64), usize> = HashMap::with_capacity(rows.len());
        for (row, location) in rows.iter().enumerate() {
            let key = (
                location.position.lat.to_f64().unwrap_or(f64::NAN).to_bits(),
                location.position.lon.to_f64().unwrap_or(f64::NAN).to_bits(),
            );
            if let Some(&first) = seen.get(&key) {
                return Err(ReachError::DuplicatePosition { first, second: row });
            }
            seen.insert(key, row);
        }

        // Check 3: region extent.
        let (lat_min, lat_max, lon_min, lon_max) = extent(&rows);
        let lat_span = (lat_max - lat_min).to_f64().unwrap_or(f64::NAN);
        let lon_span = (lon_max - lon_min).to_f64().unwrap_or(f64::NAN);
        if lat_span > MAX_REGION_SPAN_DEG || lon_span > MAX_REGION_SPAN_DEG {
            return Err(ReachError::RegionTooLarge {
                lat_span,
                lon_span,
                max_span: MAX_REGION_SPAN_DEG,
            });
        }

        // Coordinate columns for the batch pruning pass.
        let lat: Vec<T> = rows.iter().map(|r| r.position.lat).collect();
        let lon: Vec<T> = rows.iter().map(|r| r.position.lon).collect();

        // Zone index, sorted by zone id.
        let mut by_zone: HashMap<u32, Vec<usize>> = HashMap::new();
        for (row, location) in rows.iter().enumerate() {
            by_zone.entry(location.zone).or_default().push(row);
        }
        let mut zone_index: Vec<(u32, Vec<usize>)> = by_zone.into_iter().collect();
        zone_index.sort_unstable_by_key(|(zone, _)| *zone);

        Ok(Self {
            rows,
            lat,
            lon,
            zone_index,
        })
    }

    /// Number of demand locations.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table holds no rows; always false for a built table.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// All rows in construction order.
    pub fn locations(&self) -> &[DemandLocation<T>] {
        &self.rows
    }

    /// Flat latitude column aligned with row order.
    pub fn latitudes(&self) -> &[T] {
        &self.lat
    }

    /// Flat longitude column aligned with row order.
    pub fn longitudes(&self) -> &[T] {
        &self.lon
    }

    /// Zone ids present in the table, sorted and deduplicated.
    pub fn zones(&self) -> impl Iterator<Item = u32> + '_ {
        self.zone_index.iter().map(|(zone, _)| *zone)
    }

    /// Row indices belonging to a zone, or an empty slice for an unknown
    /// zone.
    pub fn rows_for_zone(&self, zone: u32) -> &[usize] {
        match self.zone_index.binary_search_by_key(&zone, |(z, _)| *z) {
            Ok(i) => &self.zone_index[i].1,
            Err(_) => &[],
        }
    }

    /// Population of one band at every location, in row order.
    pub fn population_column(&self, band: AgeBand) -> Vec<T> {
        self.rows.iter().map(|r| r.population_of(band)).collect()
    }

    /// Total population of one band across all locations.
    pub fn total_population(&self, band: AgeBand) -> T {
        self.rows
            .iter()
            .fold(T::zero(), |acc, r| acc + r.population_of(band))
    }

    /// Bounding box of the rows as `(lat_min, lat_max, lon_min, lon_max)`.
    pub fn extent(&self) -> (T, T, T, T) {
        extent(&self.rows)
    }
}

/// Bounding box of a non-empty row slice.
fn extent<T: Float>(rows: &[DemandLocation<T>]) -> (T, T, T, T) {
    let first = rows[0].position;
    let mut lat_min = first.lat;
    let mut lat_max = first.lat;
    let mut lon_min = first.lon;
    let mut lon_max = first.lon;
    for location in &rows[1..] {
        lat_min = lat_min.min(location.position.lat);
        lat_max = lat_max.max(location.position.lat);
        lon_min = lon_min.min(location.position.lon);
        lon_max = lon_max.max(location.position.lon);
    }
    (lat_min, lat_max, lon_min, lon_max)
}
