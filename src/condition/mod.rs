//! End-condition editing: operator catalog and copy-on-write edits.

pub mod catalog;
pub mod edit;

pub use catalog::{default_operator, is_operator_allowed, operators_for};
