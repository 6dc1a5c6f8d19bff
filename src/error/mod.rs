//! Error types for the editor core.
//!
//! - [`EditorError`]: errors raised while loading graphs, configs and node data.
//! - [`RunError`]: errors reported by the single-run service.
//!
//! Edits that target a condition id which no longer exists are not errors:
//! they leave the configuration unchanged.

pub mod editor_error;
pub mod run_error;

pub use editor_error::EditorError;
pub use run_error::RunError;

/// Convenience alias for editor-level results.
pub type EditorResult<T> = Result<T, EditorError>;
/// Convenience alias for run-service results.
pub type RunResult<T> = Result<T, RunError>;
