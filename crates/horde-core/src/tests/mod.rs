//! Test module for determinism and integration tests.
//!
//! This module exercises the pieces together rather than one at a time:
//! - **Determinism tests**: same seed and inputs give identical state hashes
//! - **Integration tests**: pool, grid, spawner and systems through full steps
//! - **Helper functions**: utilities for test setup
//!
//! # Test Structure
//!
//! - `determinism.rs`: Tests that verify deterministic execution
//! - `integration.rs`: End-to-end tests of the simulation
//! - `helpers.rs`: Test setup utilities and factory functions

mod determinism;
mod helpers;

// Re-export for convenience
pub use helpers::*;
