//! Iteration node editing: the controller, output typing and diagnostics.

pub mod controller;
pub mod output_type;
pub mod validation;

pub use controller::IterationConfigController;
pub use output_type::{filter_input_var, promote};
pub use validation::{validate, Diagnostic, DiagnosticLevel, ValidationReport};
