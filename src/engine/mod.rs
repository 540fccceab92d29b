//! Layer 4: Engine
//!
//! # Purpose
//!
//! This layer runs the accessibility computation:
//! - Interaction matrices with two-stage distance pruning
//! - Attendance estimation and correction factors
//! - Input validation for configuration and run inputs
//! - The executor orchestrating one full run
//!
//! # Architecture
//!
//! ```text
//! Layer 6: API
//!   ↓
//! Layer 5: Evaluation
//!   ↓
//! Layer 4: Engine ← You are here
//!   ↓
//! Layer 3: Model
//!   ↓
//! Layer 2: Math
//!   ↓
//! Layer 1: Primitives
//! ```

/// Attendance estimation and correction factors.
pub mod attendance;

/// Run orchestration and configuration.
pub mod executor;

/// Interaction matrices and distance pruning.
pub mod interaction;

/// Configuration and input validation.
pub mod validator;
