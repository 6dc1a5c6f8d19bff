//! Editor model types shared across layers.

mod condition;
mod iteration;
mod node;
mod selector;
mod var_type;

pub use condition::{
    CaseItem, ComparisonOperator, Condition, ConditionPatch, ConditionValue, LogicalOperator,
    NumberVarType, SubCondition, SubConditionPatch,
};
pub use iteration::{IterationConfig, IterationErrorMode};
pub(crate) use iteration::DEFAULT_PARALLEL_NUMS;
pub use node::{
    ConversationVariable, EnvironmentVariable, NodeData, NodeType, OutputVar, WorkflowNode,
};
pub use selector::ValueSelector;
pub use var_type::VarType;
