//! Layer 1: Primitives
//!
//! # Purpose
//!
//! This layer provides the foundations every other layer builds on:
//! - The crate-wide error taxonomy
//! - The bounded cache that memoizes exact pairwise distances
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
//! Layer 2: Math
//!   ↓
//! Layer 1: Primitives ← You are here
//! ```

/// Bounded LRU memoization of exact distances.
pub mod cache;

/// Error taxonomy and result alias.
pub mod errors;
