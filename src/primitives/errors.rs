//! Error taxonomy for accessibility evaluation.
//!
//! ## Purpose
//!
//! This module defines [`ReachError`], the single error type returned by every
//! fallible operation in the crate, and the crate-wide [`Result`] alias. The
//! taxonomy separates conditions that must abort a run (invalid inputs,
//! exceeded budgets, violated output invariants) from conditions the engine
//! recovers from on its own — the latter are logged through `tracing` and
//! never surface here.
//!
//! ## Design notes
//!
//! * One flat enum; callers match on variants instead of downcasting.
//! * Numeric payloads are carried as `f64` so the error type stays
//!   independent of the engine's float parameter.
//! * Display strings are stable and asserted in tests; change them
//!   deliberately.
//!
//! ## Non-goals
//!
//! * No error codes or exit-status mapping; binaries decide that themselves.

// External dependencies
use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = core::result::Result<T, ReachError>;

/// Fatal conditions raised by model construction, evaluation, or KPI
/// weighting.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ReachError {
    /// The kernel value cutoff is zero, negative, or not finite.
    #[error("kernel value cutoff must be positive and finite, got {value}")]
    InvalidCutoff {
        /// Offending cutoff value.
        value: f64,
    },

    /// The attendance-correction clip level is at or below 1, or not finite.
    #[error("attendance correction clip level must be finite and greater than 1, got {value}")]
    InvalidClipLevel {
        /// Offending clip level.
        value: f64,
    },

    /// The distance cache was configured with zero capacity.
    #[error("distance cache capacity must be at least 1")]
    InvalidCacheCapacity,

    /// A coordinate is not finite or lies outside the valid range.
    #[error("position out of range: latitude {latitude}, longitude {longitude}")]
    InvalidPosition {
        /// Latitude in decimal degrees.
        latitude: f64,
        /// Longitude in decimal degrees.
        longitude: f64,
    },

    /// A service unit failed construction validation.
    #[error("invalid service unit '{unit}': {reason}")]
    InvalidUnit {
        /// Unit name, or its id when unnamed.
        unit: String,
        /// Which check failed.
        reason: String,
    },

    /// A catchment rescale factor is zero, negative, or not finite.
    #[error("rescale factor must be positive and finite, got {value}")]
    InvalidRescaleFactor {
        /// Offending factor.
        value: f64,
    },

    /// Precomputed cutoff thresholds do not cover the same age bands as the
    /// unit's catchments.
    #[error("precomputed thresholds for unit '{unit}' do not match its catchment bands (band {band})")]
    ThresholdBandMismatch {
        /// Unit name, or its id when unnamed.
        unit: String,
        /// First band found on one side but not the other.
        band: &'static str,
    },

    /// The demand table has no rows.
    #[error("demand table is empty")]
    EmptyDemand,

    /// Two demand rows share a position.
    #[error("demand rows {first} and {second} share the same position")]
    DuplicatePosition {
        /// Index of the earlier row.
        first: usize,
        /// Index of the later row.
        second: usize,
    },

    /// A demand row carries a non-finite or negative value.
    #[error("invalid demand row {row}: {reason}")]
    InvalidDemandRow {
        /// Row index in construction order.
        row: usize,
        /// Which check failed.
        reason: String,
    },

    /// The combined extent of units and demand locations exceeds the span
    /// supported by the planar pruning bound.
    #[error("region spans {lat_span}° of latitude and {lon_span}° of longitude, exceeding the {max_span}° limit")]
    RegionTooLarge {
        /// Latitude span in degrees.
        lat_span: f64,
        /// Longitude span in degrees.
        lon_span: f64,
        /// Maximum supported span in degrees.
        max_span: f64,
    },

    /// `evaluate` was called with an empty unit slice.
    #[error("no service units supplied")]
    NoUnits,

    /// An input collection exceeds the size the engine can index.
    #[error("{what} count {len} exceeds the supported maximum {max}")]
    InputTooLarge {
        /// Which collection overflowed.
        what: &'static str,
        /// Observed length.
        len: usize,
        /// Supported maximum.
        max: usize,
    },

    /// The pairwise-distance stage hit the configured evaluation budget.
    #[error("exact distance evaluations exceeded the configured budget of {budget} pairs")]
    PairBudgetExceeded {
        /// Configured budget.
        budget: u64,
    },

    /// A population-weighted KPI fell outside the range of the raw scores it
    /// was computed from.
    #[error("KPI for category {category}, zone {zone}, band {band} is {value}, outside the observed score range [{min}, {max}]")]
    KpiOutOfRange {
        /// Category label.
        category: &'static str,
        /// Zone identifier.
        zone: u32,
        /// Band label.
        band: &'static str,
        /// Computed weighted mean.
        value: f64,
        /// Minimum raw score in the zone.
        min: f64,
        /// Maximum raw score in the zone.
        max: f64,
    },
}
