//! Graph helpers that derive an iteration node's variable scope.

pub mod branch;

pub use branch::{
    before_nodes_in_same_branch, iteration_children, scope_for_iteration, BranchGraph,
    NodeIndexMap,
};
