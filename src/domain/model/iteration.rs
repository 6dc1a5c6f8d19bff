use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{Condition, LogicalOperator, ValueSelector, VarType};

/// How an iteration reacts when one of its runs fails.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum IterationErrorMode {
    #[default]
    Terminated,
    #[serde(rename = "remove-abnormal-output", alias = "remove_abnormal")]
    RemoveAbnormal,
    #[serde(alias = "continue_on_error")]
    ContinueOnError,
}

/// Persisted configuration of an iteration node, as stored in the node's
/// `data` object.
///
/// Values are treated as immutable once built: edits produce a new
/// `IterationConfig` (see [`crate::condition::edit`]).
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct IterationConfig {
    #[serde(default)]
    pub start_node_id: String,
    #[serde(
        rename = "startNodeType",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub start_node_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iteration_id: Option<String>,
    #[serde(default)]
    pub iterator_selector: ValueSelector,
    #[serde(default)]
    pub output_selector: ValueSelector,
    #[serde(default = "default_output_type")]
    pub output_type: VarType,
    #[serde(default)]
    pub is_parallel: bool,
    #[serde(default = "default_parallel_nums")]
    pub parallel_nums: u32,
    #[serde(default)]
    pub error_handle_mode: IterationErrorMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub break_conditions: Option<Vec<Condition>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_conditions: Option<Vec<Condition>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_condition_logical_operator: Option<LogicalOperator>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable_end_condition: Option<bool>,
    /// Node data owned by other collaborators (title, type, `_` UI flags...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

pub(crate) const DEFAULT_PARALLEL_NUMS: u32 = 10;

fn default_output_type() -> VarType {
    VarType::ArrayString
}

fn default_parallel_nums() -> u32 {
    DEFAULT_PARALLEL_NUMS
}

impl Default for IterationConfig {
    fn default() -> Self {
        Self {
            start_node_id: String::new(),
            start_node_type: None,
            iteration_id: None,
            iterator_selector: ValueSelector::default(),
            output_selector: ValueSelector::default(),
            output_type: default_output_type(),
            is_parallel: false,
            parallel_nums: DEFAULT_PARALLEL_NUMS,
            error_handle_mode: IterationErrorMode::default(),
            break_conditions: None,
            end_conditions: None,
            end_condition_logical_operator: None,
            enable_end_condition: None,
            extra: Map::new(),
        }
    }
}

impl IterationConfig {
    pub fn end_conditions(&self) -> &[Condition] {
        self.end_conditions.as_deref().unwrap_or(&[])
    }

    pub fn logical_operator(&self) -> LogicalOperator {
        self.end_condition_logical_operator.unwrap_or_default()
    }

    pub fn end_condition_enabled(&self) -> bool {
        self.enable_end_condition.unwrap_or(false)
    }

    pub fn find_condition(&self, condition_id: &str) -> Option<&Condition> {
        self.end_conditions().iter().find(|c| c.id == condition_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults_from_minimal_node_data() {
        let config: IterationConfig = serde_json::from_value(json!({
            "type": "iteration",
            "title": "Iteration",
            "start_node_id": "iter_start"
        }))
        .unwrap();
        assert_eq!(config.parallel_nums, 10);
        assert_eq!(config.output_type, VarType::ArrayString);
        assert_eq!(config.error_handle_mode, IterationErrorMode::Terminated);
        assert_eq!(config.logical_operator(), LogicalOperator::And);
        assert!(config.end_conditions().is_empty());
        assert_eq!(config.extra.get("title"), Some(&json!("Iteration")));
    }

    #[test]
    fn test_error_mode_wire_names() {
        let mode: IterationErrorMode =
            serde_json::from_value(json!("remove-abnormal-output")).unwrap();
        assert_eq!(mode, IterationErrorMode::RemoveAbnormal);
        let mode: IterationErrorMode = serde_json::from_value(json!("continue_on_error")).unwrap();
        assert_eq!(mode, IterationErrorMode::ContinueOnError);
        assert_eq!(
            serde_json::to_value(IterationErrorMode::ContinueOnError).unwrap(),
            json!("continue-on-error")
        );
    }

    #[test]
    fn test_extra_fields_survive_roundtrip() {
        let raw = json!({
            "type": "iteration",
            "start_node_id": "s",
            "iterator_selector": ["start", "items"],
            "_isShowTips": false,
            "desc": "loop over items"
        });
        let config: IterationConfig = serde_json::from_value(raw).unwrap();
        let back = serde_json::to_value(&config).unwrap();
        assert_eq!(back["desc"], json!("loop over items"));
        assert_eq!(back["_isShowTips"], json!(false));
        assert_eq!(back["iterator_selector"], json!(["start", "items"]));
    }
}
