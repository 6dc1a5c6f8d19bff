pub mod draft;
pub mod parser;
pub mod schema;

pub use draft::sanitize_draft;
pub use parser::{parse_graph, DslFormat};
pub use schema::{GraphEdge, WorkflowGraph};
