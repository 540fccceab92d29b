//! # cityreach
//!
//! Spatial accessibility of urban public services.
//!
//! `cityreach` scores how reachable a city's public services are for its
//! residents. Each service unit (a school, a library, a transit stop, a
//! pharmacy, a green area) projects a distance-decaying **catchment** around
//! its position; each demand location carries population split into eleven
//! **age bands**. The engine combines the two sides into per-location
//! accessibility scores, estimates per-unit **attendance** by splitting
//! population across the units that reach it, dampens over- and under-loaded
//! units with a **correction factor**, and finally collapses scores into
//! per-zone, population-weighted **KPI tables**.
//!
//! ## Quick start
//!
//! ```
//! use cityreach::prelude::*;
//!
//! fn main() -> Result<(), ReachError> {
//!     // One school with a 1.2 km Gaussian catchment for primary-age
//!     // children.
//!     let unit = ServiceUnitBuilder::new(School)
//!         .name("Scuola Primaria A. Manzoni")
//!         .unit_id(1)
//!         .position(40.0, 9.0)
//!         .capacity(250.0)
//!         .catchment(AgeBand::ChildPrimary, Catchment::gaussian(1.2))
//!         .cutoff(1e-4)
//!         .build()?;
//!     let mut units = vec![unit];
//!
//!     // Two demand locations in two city zones.
//!     let demand = DemandTable::new(vec![
//!         DemandLocation::new(1, 40.005, 9.0)
//!             .with_population(AgeBand::ChildPrimary, 120.0),
//!         DemandLocation::new(2, 39.995, 9.0)
//!             .with_population(AgeBand::ChildPrimary, 80.0),
//!     ])?;
//!
//!     // Build the model, evaluate, and weight into zone KPIs.
//!     let model = Reach::new().cutoff(1e-4).build()?;
//!     let evaluation = model.evaluate(&mut units, &demand)?;
//!     let kpis = model.weight_by_population(&evaluation, &demand)?;
//!
//!     let scores = evaluation.band_scores(School, AgeBand::ChildPrimary);
//!     assert!(scores.is_some());
//!     assert!(kpis.value(School, 1, AgeBand::ChildPrimary).is_some());
//!     Ok(())
//! }
//! ```
//!
//! ## The service catalog
//!
//! Five categories are built in, each with its own demanded age bands and
//! score combination rule:
//!
//! | Category      | Area                | Demanded bands            | Rule |
//! |---------------|---------------------|---------------------------|------|
//! | `School`      | Education & culture | Primary through high      | L2   |
//! | `Library`     | Education & culture | Primary age and older     | L2   |
//! | `TransitStop` | Transport           | Primary age and older     | L2   |
//! | `Pharmacy`    | Health              | All bands                 | L∞   |
//! | `UrbanGreen`  | Environment         | All bands                 | L2   |
//!
//! The L2 rule rewards having several reachable units; the L∞ rule scores
//! only the best one, matching services where a single nearby provider
//! suffices.
//!
//! ## Configuration
//!
//! | Parameter                 | Default   | Meaning                                          |
//! |---------------------------|-----------|--------------------------------------------------|
//! | **cutoff**                | `1e-4`    | Kernel value below which interaction is ignored  |
//! | **correction_clip**       | `1.4`     | Clip level `m` bounding correction to `[1/m, m]` |
//! | **attendance_correction** | `true`    | Run attendance estimation and correction         |
//! | **cache_capacity**        | `1 << 20` | LRU distance cache entries per category task     |
//! | **pair_budget**           | `None`    | Optional cap on exact distance evaluations       |
//! | **parallel**              | `false`   | Run category tasks on the rayon pool             |
//!
//! ## How the engine prunes
//!
//! Exact great-circle distances are expensive at city scale. For every
//! (unit, band) the builder solves the distance at which the catchment
//! drops below the cutoff; at evaluation time a vectorized planar lower
//! bound (equirectangular, valid for regions up to 5° across) discards
//! every pair provably beyond that threshold before any haversine is
//! computed. Surviving distances are memoized in a bounded LRU cache shared
//! across the bands of a category, so multi-band categories pay for each
//! pair once.
//!
//! ## Errors and logging
//!
//! Invalid configuration, malformed units or demand rows, oversized
//! regions, exhausted pair budgets, and KPI sanity violations are fatal and
//! surface as [`ReachError`](prelude::ReachError). Degraded-but-valid
//! situations — an unsolvable cutoff threshold, population below the
//! interaction cutoff, missing capacity data — are logged through
//! `tracing` and reported in the run report instead.

#![deny(missing_docs)]

// ============================================================================
// Internal Modules
// ============================================================================

// Layer 1: Primitives - data structures and basic utilities.
//
// Contains the error taxonomy and the bounded LRU distance cache.
mod primitives;

// Layer 2: Math - pure mathematical functions.
//
// Contains geodesic distances and the planar pruning bound, catchment
// kernels with cutoff inversion, and the vectorized bound batch kernel.
mod math;

// Layer 3: Model - domain vocabulary.
//
// Contains age bands and per-band maps, the service catalog with its
// combination rules, validated service units, and the indexed demand table.
mod model;

// Layer 4: Engine - orchestration and execution control.
//
// Contains interaction matrix construction with two-stage pruning,
// attendance estimation and correction, input validation, and the executor.
mod engine;

// Layer 5: Evaluation - post-processing.
//
// Contains population-weighted KPI tables with the sanity invariant.
mod evaluation;

// High-level fluent API for accessibility evaluation.
//
// Provides the `Reach` builder for configuring and running the engine.
mod api;

// ============================================================================
// Prelude
// ============================================================================

/// Standard cityreach prelude.
///
/// This module is intended to be wildcard-imported for convenient access
/// to the most commonly used types:
///
/// ```
/// use cityreach::prelude::*;
/// ```
pub mod prelude {
    pub use crate::api::{
        AgeBand, BandMap, Catchment, CombinationRule, DemandLocation, DemandTable, EngineConfig,
        Evaluation, KernelShape,
        KernelShape::{Exponential, Gaussian},
        KpiRow, KpiTable, ReachBuilder as Reach, ReachError, ReachModel, RunReport, ServiceArea,
        ServiceCategory,
        ServiceCategory::{Library, Pharmacy, School, TransitStop, UrbanGreen},
        ServiceUnit, ServiceUnitBuilder,
    };
}

// ============================================================================
// Testing re-exports
// ============================================================================

/// Internal modules for development and testing.
///
/// This module re-exports internal modules for development and testing purposes.
/// It is only available with the `dev` feature enabled.
///
/// **Warning**: These are internal implementation details and may change without notice.
/// Do not use in production code.
#[cfg(feature = "dev")]
pub mod internals {
    /// Internal primitive types and utilities.
    pub mod primitives {
        pub use crate::primitives::*;
    }
    /// Internal math functions.
    pub mod math {
        pub use crate::math::*;
    }
    /// Internal model types.
    pub mod model {
        pub use crate::model::*;
    }
    /// Internal execution engine.
    pub mod engine {
        pub use crate::engine::*;
    }
    /// Internal evaluation.
    pub mod evaluation {
        pub use crate::evaluation::*;
    }
    /// Internal API.
    pub mod api {
        pub use crate::api::*;
    }
}
