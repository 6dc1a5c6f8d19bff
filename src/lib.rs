//! # XWorkflow Editor: iteration node configuration core
//!
//! `xworkflow-editor` holds the editing logic behind the iteration node of a
//! Dify-compatible workflow editor:
//!
//! - **Variable scope**: resolving selectors such as `["llm_1", "text"]`,
//!   `["sys", "query"]` or `["iter", "item"]` against the nodes before the
//!   iteration, the nodes inside it, and environment/conversation variables.
//! - **End conditions**: a two-level condition tree (conditions with optional
//!   file-attribute sub-conditions), edited copy-on-write with operator
//!   defaults per variable type.
//! - **Settings**: iterator and output selectors, output type promotion,
//!   parallelism and error-handling mode.
//! - **Single run**: mapping the debug-run form onto the inputs of the nodes
//!   inside the iteration, and tracking a run through an external service.
//! - **Graph loading**: YAML/JSON/TOML graphs, branch-aware scope derivation,
//!   and draft snapshots ready to sync.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use xworkflow_editor::{parse_graph, DslFormat, EditorContext, IterationConfigController};
//! use xworkflow_editor::domain::model::{ValueSelector, VarType};
//!
//! let yaml = std::fs::read_to_string("workflow.yaml").unwrap();
//! let graph = parse_graph(&yaml, DslFormat::Yaml).unwrap();
//! let mut iteration =
//!     IterationConfigController::from_graph(&graph, "iteration_1", EditorContext::default())
//!         .unwrap();
//! iteration.set_iterator_selector(ValueSelector::from(["start", "docs"]));
//! iteration.add_condition(ValueSelector::from(["start", "count"]), VarType::Number);
//! let draft = iteration.snapshot().unwrap();
//! println!("{}", draft);
//! ```

pub mod condition;
pub mod config;
pub mod core;
pub mod domain;
pub mod dsl;
pub mod error;
pub mod graph;
pub mod iteration;
pub mod scope;
pub mod single_run;

pub use config::EditorConfig;
pub use core::{create_event_channel, EditorContext, EditorEvent, IdGenerator};
pub use domain::execution::{RunningStatus, SingleRunResult};
pub use dsl::{parse_graph, sanitize_draft, DslFormat, WorkflowGraph};
pub use error::{EditorError, EditorResult, RunError, RunResult};
pub use graph::scope_for_iteration;
pub use iteration::{IterationConfigController, ValidationReport};
pub use scope::{ReferenceKind, ResolvedVariable, VariableScope};
pub use single_run::{SingleRunService, SingleRunSession};
