//! Input validation for engine configuration and run inputs.
//!
//! ## Purpose
//!
//! This module gathers the fatal, caller-error checks the engine performs
//! before any computation: configuration bounds, run input shapes, and the
//! combined region extent that keeps the planar pruning bound sound.
//!
//! ## Design notes
//!
//! * **Fail-Fast**: validation stops at the first error encountered.
//! * **Efficiency**: checks are ordered from cheap to expensive.
//! * Demand tables validate their own rows at construction; the checks here
//!   cover what only the engine can see: the unit list and the combined
//!   supply-plus-demand extent.
//!
//! ## Invariants
//!
//! * Validated inputs index into `u32` pair keys without overflow.
//! * The combined extent of validated inputs stays within
//!   [`MAX_REGION_SPAN_DEG`] on both axes.
//!
//! ## Non-goals
//!
//! * No correction of invalid inputs; callers fix and retry.

// External dependencies
use num_traits::Float;

// Internal dependencies
use crate::engine::executor::EngineConfig;
use crate::math::geodesic::MAX_REGION_SPAN_DEG;
use crate::model::demand::DemandTable;
use crate::model::unit::ServiceUnit;
use crate::primitives::errors::{ReachError, Result};

// ============================================================================
// Validator
// ============================================================================

/// Validation utility for engine configuration and run inputs.
///
/// All methods return `Result<()>` and fail fast on the first violation.
pub struct Validator;

impl Validator {
    /// Validate an engine configuration.
    pub fn validate_config(config: &EngineConfig) -> Result<()> {
        // Check 1: kernel value cutoff.
        if !config.cutoff.is_finite() || config.cutoff <= 0.0 {
            return Err(ReachError::InvalidCutoff {
                value: config.cutoff,
            });
        }

        // Check 2: correction clip level.
        if !config.clip_level.is_finite() || config.clip_level <= 1.0 {
            return Err(ReachError::InvalidClipLevel {
                value: config.clip_level,
            });
        }

        // Check 3: cache capacity.
        if config.cache_capacity == 0 {
            return Err(ReachError::InvalidCacheCapacity);
        }

        Ok(())
    }

    /// Validate the unit list and the combined region extent for one run.
    pub fn validate_inputs<T: Float>(
        units: &[ServiceUnit<T>],
        demand: &DemandTable<T>,
    ) -> Result<()> {
        // Check 1: supply present.
        if units.is_empty() {
            return Err(ReachError::NoUnits);
        }

        // Check 2: everything indexes into u32 pair keys.
        if units.len() > u32::MAX as usize {
            return Err(ReachError::InputTooLarge {
                what: "service unit",
                len: units.len(),
                max: u32::MAX as usize,
            });
        }
        if demand.len() > u32::MAX as usize {
            return Err(ReachError::InputTooLarge {
                what: "demand location",
                len: demand.len(),
                max: u32::MAX as usize,
            });
        }

        // Check 3: combined supply-plus-demand extent. The demand table
        // already checked its own rows; units can still stretch the region
        // past what the planar bound supports.
        let (mut lat_min, mut lat_max, mut lon_min, mut lon_max) = demand.extent();
        for unit in units {
            let p = unit.position();
            lat_min = lat_min.min(p.lat);
            lat_max = lat_max.max(p.lat);
            lon_min = lon_min.min(p.lon);
            lon_max = lon_max.max(p.lon);
        }
        let lat_span = (lat_max - lat_min).to_f64().unwrap_or(f64::NAN);
        let lon_span = (lon_max - lon_min).to_f64().unwrap_or(f64::NAN);
        if !(lat_span <= MAX_REGION_SPAN_DEG) || !(lon_span <= MAX_REGION_SPAN_DEG) {
            return Err(ReachError::RegionTooLarge {
                lat_span,
                lon_span,
                max_span: MAX_REGION_SPAN_DEG,
            });
        }

        Ok(())
    }
}
