//! Layer 5: Evaluation
//!
//! # Purpose
//!
//! This layer post-processes engine output:
//! - Population-weighted KPI tables per zone and band
//!
//! # Architecture
//!
//! ```text
//! Layer 6: API
//!   ↓
//! Layer 5: Evaluation ← You are here
//!   ↓
//! Layer 4: Engine
//!   ↓
//! Layer 3: Model
//!   ↓
//! Layer 2: Math
//!   ↓
//! Layer 1: Primitives
//! ```

/// Population-weighted KPI tables.
pub mod kpi;
