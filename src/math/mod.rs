//! Layer 2: Math
//!
//! # Purpose
//!
//! This layer provides the pure mathematics of the accessibility model:
//! - Great-circle measures and the planar pruning bound
//! - Catchment kernels and cutoff-distance inversion
//! - Vectorized batch evaluation of the pruning bound
//!
//! These are reusable building blocks with no engine-specific logic.
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
//! Layer 3: Model
//!   ↓
//! Layer 2: Math ← You are here
//!   ↓
//! Layer 1: Primitives
//! ```

/// Batched SIMD evaluation of the pruning bound.
pub mod batch;

/// Great-circle measures and the planar lower bound.
pub mod geodesic;

/// Catchment kernels and cutoff inversion.
pub mod kernel;
