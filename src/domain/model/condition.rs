use serde::{Deserialize, Serialize};

use super::{ValueSelector, VarType};

/// Comparison operators offered by condition editors.
///
/// Serialised with the labels the workflow backend stores (`"not contains"`,
/// `"≥"`, ...); the engine's snake-case names are accepted on input.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComparisonOperator {
    #[serde(rename = "contains")]
    Contains,
    #[serde(rename = "not contains", alias = "not_contains")]
    NotContains,
    #[serde(rename = "start with", alias = "start_with")]
    StartWith,
    #[serde(rename = "end with", alias = "end_with")]
    EndWith,
    #[serde(rename = "is")]
    Is,
    #[serde(rename = "is not", alias = "is_not")]
    IsNot,
    #[serde(rename = "empty")]
    Empty,
    #[serde(rename = "not empty", alias = "not_empty")]
    NotEmpty,
    #[serde(rename = "in")]
    In,
    #[serde(rename = "not in", alias = "not_in")]
    NotIn,
    #[serde(rename = "all of", alias = "all_of")]
    AllOf,
    #[serde(rename = "=", alias = "equal")]
    Equal,
    #[serde(rename = "≠", alias = "not_equal")]
    NotEqual,
    #[serde(rename = ">", alias = "greater_than")]
    GreaterThan,
    #[serde(rename = "<", alias = "less_than")]
    LessThan,
    #[serde(
        rename = "≥",
        alias = "greater_than_or_equal",
        alias = "greater_or_equal"
    )]
    GreaterOrEqual,
    #[serde(rename = "≤", alias = "less_than_or_equal", alias = "less_or_equal")]
    LessOrEqual,
    #[serde(rename = "is null", alias = "null")]
    Null,
    #[serde(rename = "is not null", alias = "not_null")]
    NotNull,
    #[serde(rename = "exists")]
    Exists,
    #[serde(rename = "not exists", alias = "not_exists")]
    NotExists,
}

impl ComparisonOperator {
    /// Operators whose result does not depend on the condition value.
    pub fn ignores_value(&self) -> bool {
        matches!(
            self,
            ComparisonOperator::Empty
                | ComparisonOperator::NotEmpty
                | ComparisonOperator::Null
                | ComparisonOperator::NotNull
                | ComparisonOperator::Exists
                | ComparisonOperator::NotExists
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ComparisonOperator::Contains => "contains",
            ComparisonOperator::NotContains => "not contains",
            ComparisonOperator::StartWith => "start with",
            ComparisonOperator::EndWith => "end with",
            ComparisonOperator::Is => "is",
            ComparisonOperator::IsNot => "is not",
            ComparisonOperator::Empty => "empty",
            ComparisonOperator::NotEmpty => "not empty",
            ComparisonOperator::In => "in",
            ComparisonOperator::NotIn => "not in",
            ComparisonOperator::AllOf => "all of",
            ComparisonOperator::Equal => "=",
            ComparisonOperator::NotEqual => "≠",
            ComparisonOperator::GreaterThan => ">",
            ComparisonOperator::LessThan => "<",
            ComparisonOperator::GreaterOrEqual => "≥",
            ComparisonOperator::LessOrEqual => "≤",
            ComparisonOperator::Null => "is null",
            ComparisonOperator::NotNull => "is not null",
            ComparisonOperator::Exists => "exists",
            ComparisonOperator::NotExists => "not exists",
        }
    }
}

impl std::fmt::Display for ComparisonOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Combinator applied across a list of conditions.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum LogicalOperator {
    #[default]
    And,
    Or,
}

impl LogicalOperator {
    pub fn toggled(self) -> Self {
        match self {
            LogicalOperator::And => LogicalOperator::Or,
            LogicalOperator::Or => LogicalOperator::And,
        }
    }
}

/// Right-hand side of a comparison: a scalar string or a list (for `in`).
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum ConditionValue {
    Text(String),
    List(Vec<String>),
}

impl Default for ConditionValue {
    fn default() -> Self {
        ConditionValue::Text(String::new())
    }
}

impl ConditionValue {
    pub fn is_empty(&self) -> bool {
        match self {
            ConditionValue::Text(s) => s.is_empty(),
            ConditionValue::List(items) => items.is_empty(),
        }
    }
}

impl From<&str> for ConditionValue {
    fn from(value: &str) -> Self {
        ConditionValue::Text(value.to_string())
    }
}

impl From<Vec<String>> for ConditionValue {
    fn from(value: Vec<String>) -> Self {
        ConditionValue::List(value)
    }
}

/// Whether a numeric comparison reads its value from a variable or a constant.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NumberVarType {
    Variable,
    Constant,
}

/// A top-level end condition of an iteration node.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct Condition {
    pub id: String,
    #[serde(rename = "varType", alias = "var_type")]
    pub var_type: VarType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variable_selector: Option<ValueSelector>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comparison_operator: Option<ComparisonOperator>,
    #[serde(default)]
    pub value: ConditionValue,
    #[serde(
        rename = "numberVarType",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub number_var_type: Option<NumberVarType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_variable_condition: Option<CaseItem>,
}

/// A condition on a named attribute of its parent condition's variable.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct SubCondition {
    pub id: String,
    #[serde(default)]
    pub key: String,
    #[serde(rename = "varType", alias = "var_type")]
    pub var_type: VarType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comparison_operator: Option<ComparisonOperator>,
    #[serde(default)]
    pub value: ConditionValue,
    #[serde(
        rename = "numberVarType",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub number_var_type: Option<NumberVarType>,
}

/// A group of sub-conditions joined by one logical operator.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Default)]
pub struct CaseItem {
    #[serde(default)]
    pub logical_operator: LogicalOperator,
    #[serde(default)]
    pub conditions: Vec<SubCondition>,
}

/// Fields to merge into an existing [`Condition`]. `None` leaves a field as is.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConditionPatch {
    pub var_type: Option<VarType>,
    pub variable_selector: Option<ValueSelector>,
    pub comparison_operator: Option<ComparisonOperator>,
    pub value: Option<ConditionValue>,
    pub number_var_type: Option<NumberVarType>,
    pub sub_variable_condition: Option<CaseItem>,
}

/// Fields to merge into an existing [`SubCondition`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubConditionPatch {
    pub key: Option<String>,
    pub var_type: Option<VarType>,
    pub comparison_operator: Option<ComparisonOperator>,
    pub value: Option<ConditionValue>,
    pub number_var_type: Option<NumberVarType>,
}
