//! Variable scope of an iteration node: what it can reference, and what the
//! nodes inside it consume.

pub mod known_vars;
pub mod outputs;
pub mod resolver;
pub mod usage;

pub use outputs::{node_output_vars, to_node_output_vars, NodeOutputVars};
pub use resolver::{ReferenceKind, ResolvedVariable, VariableScope};
pub use usage::{extract_template_selectors, node_used_vars, pass_to_server_keys};
