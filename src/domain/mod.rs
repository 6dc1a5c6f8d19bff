//! Domain layer: pure editor model and shared types.
//!
//! This layer contains types that are used across multiple layers of the crate
//! but do not depend on the graph scope or the run service.
//!
//! Submodules:
//! - [`execution`]: Single-run status and result models.
//! - [`model`]: Persisted types (selectors, variable types, conditions, iteration config, nodes).

pub mod execution;
pub mod model;
