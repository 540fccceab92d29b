//! High-level API for accessibility evaluation.
//!
//! ## Purpose
//!
//! This module provides the primary user-facing entry point. It implements a
//! fluent builder for configuring the engine and a model type exposing the
//! two operations: `evaluate` (scores + attendance) and
//! `weight_by_population` (per-zone KPI tables).
//!
//! ## Design notes
//!
//! * **Ergonomic**: Fluent builder with sensible defaults for all parameters.
//! * **Validated**: Configuration is validated once, when `.build()` is called.
//! * **Reusable**: A built model is immutable and can evaluate any number of
//!   cities.
//!
//! ## Key concepts
//!
//! * **Configuration Flow**: `Reach::new()` → setters → `.build()` →
//!   [`ReachModel`].
//! * **Two operations**: `evaluate` runs the engine; `weight_by_population`
//!   collapses an evaluation into zone KPIs.

// Internal dependencies
use crate::engine::executor::Executor;
use crate::engine::validator::Validator;
use crate::evaluation::kpi;
use crate::math::batch::BatchGeo;
use crate::primitives::errors::Result;

// Publicly re-exported types
pub use crate::engine::executor::{EngineConfig, Evaluation, RunReport};
pub use crate::evaluation::kpi::{KpiRow, KpiTable};
pub use crate::math::kernel::{Catchment, KernelShape};
pub use crate::model::age::{AgeBand, BandMap};
pub use crate::model::category::{CombinationRule, ServiceArea, ServiceCategory};
pub use crate::model::demand::{DemandLocation, DemandTable};
pub use crate::model::unit::{ServiceUnit, ServiceUnitBuilder};
pub use crate::primitives::errors::ReachError;

// ============================================================================
// Builder
// ============================================================================

/// Fluent builder for configuring an accessibility model.
#[derive(Debug, Clone, Default)]
pub struct ReachBuilder {
    config: EngineConfig,
}

impl ReachBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the kernel value cutoff (must be finite and positive).
    pub fn cutoff(mut self, cutoff: f64) -> Self {
        self.config.cutoff = cutoff;
        self
    }

    /// Set the clip level bounding correction factors (must exceed 1).
    pub fn correction_clip(mut self, clip_level: f64) -> Self {
        self.config.clip_level = clip_level;
        self
    }

    /// Enable or disable attendance estimation and correction.
    pub fn attendance_correction(mut self, enabled: bool) -> Self {
        self.config.attendance_correction = enabled;
        self
    }

    /// Set the distance cache capacity per category task (must be nonzero).
    pub fn cache_capacity(mut self, capacity: usize) -> Self {
        self.config.cache_capacity = capacity;
        self
    }

    /// Cap the exact distance evaluations per run; `None` removes the cap.
    pub fn pair_budget(mut self, budget: Option<u64>) -> Self {
        self.config.pair_budget = budget;
        self
    }

    /// Run category tasks on the rayon pool.
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.config.parallel = parallel;
        self
    }

    /// Validate the configuration and build the model.
    pub fn build(self) -> Result<ReachModel> {
        Validator::validate_config(&self.config)?;
        Ok(ReachModel {
            config: self.config,
        })
    }
}

// ============================================================================
// Model
// ============================================================================

/// A validated, reusable accessibility model.
#[derive(Debug, Clone)]
pub struct ReachModel {
    config: EngineConfig,
}

impl ReachModel {
    /// Evaluate one city: accessibility scores per (category, band,
    /// location) and per-unit attendance.
    ///
    /// Attendance is also written into the units, so a subsequent
    /// [`ServiceUnit::rescale`] round trip sees it.
    pub fn evaluate<T>(
        &self,
        units: &mut [ServiceUnit<T>],
        demand: &DemandTable<T>,
    ) -> Result<Evaluation<T>>
    where
        T: BatchGeo + Send + Sync,
    {
        Executor::run(&self.config, units, demand)
    }

    /// Collapse an evaluation into per-zone, population-weighted KPI tables.
    pub fn weight_by_population<T>(
        &self,
        evaluation: &Evaluation<T>,
        demand: &DemandTable<T>,
    ) -> Result<KpiTable<T>>
    where
        T: BatchGeo,
    {
        kpi::weight_by_population(evaluation, demand)
    }

    /// The validated configuration this model runs with.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}
