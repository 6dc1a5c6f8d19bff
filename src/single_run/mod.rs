//! Single-step debug run of an iteration node: form state, input mapping
//! and the run session.

pub mod form;
pub mod mapper;
pub mod runner;

pub use form::RunInputForm;
pub use mapper::{iterator_input_key, CompositeKey, InputVar, InputVarLabel, RunInputMapper};
pub use runner::{PanelState, SingleRunService, SingleRunSession};
