//! Single-run execution status types.

mod status;

pub use status::{RunningStatus, SingleRunResult};
