//! Layer 3: Model
//!
//! # Purpose
//!
//! This layer defines the domain vocabulary of the accessibility model:
//! - Age bands and fixed-slot per-band maps
//! - The service catalog with its combination rules
//! - Validated service units with per-band catchments
//! - The indexed demand table
//!
//! # Architecture
//!
//! ```text
//! Layer 6: API
//!   ↓
//! Layer 5: Evaluation
//!   ↓
//! Layer 4: Engine
//!   ↓
//! Layer 3: Model ← You are here
//!   ↓
//! Layer 2: Math
//!   ↓
//! Layer 1: Primitives
//! ```

/// Age bands and per-band maps.
pub mod age;

/// Service catalog and combination rules.
pub mod category;

/// Demand locations and the demand table.
pub mod demand;

/// Service units and their builder.
pub mod unit;
