use crate::domain::model::{ValueSelector, VarType};

pub const SYSTEM_NAMESPACE: &str = "sys";
pub const ENV_NAMESPACE: &str = "env";
pub const CONVERSATION_NAMESPACE: &str = "conversation";

pub const RESERVED_NAMESPACES: &[&str] = &[SYSTEM_NAMESPACE, ENV_NAMESPACE, CONVERSATION_NAMESPACE];

/// Legacy pseudo-node id some drafts use for `sys.query`.
pub const START_QUERY_ALIAS: &str = "start_query";

/// System variables and their types.
pub const SYSTEM_VARIABLES: &[(&str, VarType)] = &[
    ("query", VarType::String),
    ("files", VarType::ArrayFile),
    ("conversation_id", VarType::String),
    ("user_id", VarType::String),
    ("dialogue_count", VarType::Number),
    ("app_id", VarType::String),
    ("workflow_id", VarType::String),
    ("workflow_run_id", VarType::String),
];

/// Attributes exposed by file variables.
pub const FILE_ATTRIBUTES: &[(&str, VarType)] = &[
    ("name", VarType::String),
    ("size", VarType::Number),
    ("type", VarType::String),
    ("extension", VarType::String),
    ("mime_type", VarType::String),
    ("transfer_method", VarType::String),
    ("url", VarType::String),
    ("related_id", VarType::String),
];

/// Iteration-scoped variables exposed to the iteration body.
pub const ITERATION_ITEM: &str = "item";
pub const ITERATION_INDEX: &str = "index";

pub fn is_system_var(selector: &ValueSelector) -> bool {
    matches!(selector.first(), Some(SYSTEM_NAMESPACE) | Some(START_QUERY_ALIAS))
}

pub fn system_var_type(name: &str) -> VarType {
    SYSTEM_VARIABLES
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, t)| *t)
        .unwrap_or(VarType::Any)
}

pub fn file_attribute_type(key: &str) -> Option<VarType> {
    FILE_ATTRIBUTES
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, t)| *t)
}
