//! Variables consumed by a node, and the keys the backend expects them under
//! for a single run.

use regex::Regex;
use serde_json::Value;

use crate::domain::model::{NodeType, ValueSelector, WorkflowNode};

const TEMPLATE_SELECTOR_PATTERN: &str = r"\{\{#([^#]+)#\}\}";
const CONTEXT_KEY: &str = "#context#";
const QUERY_KEY: &str = "query";

/// Extract selectors referenced as `{{#node.var#}}` in a text.
pub fn extract_template_selectors(text: &str) -> Vec<ValueSelector> {
    let Ok(re) = Regex::new(TEMPLATE_SELECTOR_PATTERN) else {
        return Vec::new();
    };
    re.captures_iter(text)
        .map(|cap| ValueSelector::parse_str(cap[1].trim()))
        .filter(|sel| sel.len() >= 2)
        .collect()
}

/// Every selector the node reads, deduplicated in first-seen order.
pub fn node_used_vars(node: &WorkflowNode) -> Vec<ValueSelector> {
    let mut used = Vec::new();
    let mut push = |sel: ValueSelector| {
        if !sel.is_empty() && !used.contains(&sel) {
            used.push(sel);
        }
    };

    let mut texts = Vec::new();
    for value in node.data.extra.values() {
        collect_strings(value, &mut texts);
    }
    for text in texts {
        for sel in extract_template_selectors(text) {
            push(sel);
        }
    }

    let Some(kind) = node.kind() else {
        return used;
    };
    match kind {
        NodeType::Code | NodeType::TemplateTransform | NodeType::End => {
            let field = if kind == NodeType::End { "outputs" } else { "variables" };
            for entry in array_field(node, field) {
                let selector = entry.get("value_selector");
                if let Some(sel) = selector.and_then(ValueSelector::parse_value) {
                    push(sel);
                }
            }
        }
        NodeType::IfElse => {
            let legacy = array_field(node, "conditions");
            let cases = array_field(node, "cases")
                .iter()
                .flat_map(|case| case.get("conditions").and_then(Value::as_array))
                .flatten();
            for cond in legacy.iter().chain(cases) {
                let selector = cond.get("variable_selector");
                if let Some(sel) = selector.and_then(ValueSelector::parse_value) {
                    push(sel);
                }
            }
        }
        NodeType::VariableAggregator | NodeType::VariableAssigner => {
            for entry in array_field(node, "variables") {
                if let Some(sel) = ValueSelector::parse_value(entry) {
                    push(sel);
                }
            }
        }
        NodeType::QuestionClassifier | NodeType::KnowledgeRetrieval => {
            if let Some(sel) = selector_field(node, "query_variable_selector") {
                push(sel);
            }
        }
        NodeType::ParameterExtractor => {
            if let Some(sel) = selector_field(node, "query") {
                push(sel);
            }
        }
        NodeType::DocumentExtractor => {
            if let Some(sel) = selector_field(node, "variable_selector") {
                push(sel);
            }
        }
        NodeType::ListOperator => {
            if let Some(sel) = selector_field(node, "variable") {
                push(sel);
            }
        }
        NodeType::Iteration => {
            if let Some(sel) = selector_field(node, "iterator_selector") {
                push(sel);
            }
        }
        NodeType::Llm => {
            let context = node
                .field("context")
                .filter(|c| c.get("enabled").and_then(Value::as_bool).unwrap_or(true))
                .and_then(|c| c.get("variable_selector"))
                .and_then(ValueSelector::parse_value);
            if let Some(sel) = context {
                push(sel);
            }
        }
        NodeType::Tool | NodeType::Agent => {
            if let Some(Value::Object(params)) = node.field("tool_parameters") {
                for param in params.values() {
                    let is_variable = param.get("type").and_then(Value::as_str) == Some("variable");
                    if let (true, Some(sel)) =
                        (is_variable, param.get("value").and_then(ValueSelector::parse_value))
                    {
                        push(sel);
                    }
                }
            }
        }
        _ => {}
    }
    used
}

/// Keys under which a single run of `node` expects the value of `selector`.
pub fn pass_to_server_keys(node: &WorkflowNode, selector: &ValueSelector) -> Vec<String> {
    let template_key = format!("#{}#", selector.dotted());
    match node.kind() {
        Some(NodeType::Code) | Some(NodeType::TemplateTransform) => array_field(node, "variables")
            .iter()
            .filter(|entry| {
                entry.get("value_selector").and_then(ValueSelector::parse_value).as_ref()
                    == Some(selector)
            })
            .filter_map(|entry| entry.get("variable").and_then(Value::as_str))
            .map(str::to_string)
            .collect(),
        Some(NodeType::QuestionClassifier)
        | Some(NodeType::KnowledgeRetrieval)
        | Some(NodeType::ParameterExtractor) => vec![QUERY_KEY.to_string()],
        Some(NodeType::Llm) => {
            let mut keys = vec![template_key];
            let context = node
                .field("context")
                .and_then(|c| c.get("variable_selector"))
                .and_then(ValueSelector::parse_value);
            if context.as_ref() == Some(selector) {
                keys.push(CONTEXT_KEY.to_string());
            }
            keys
        }
        _ => vec![template_key],
    }
}

fn collect_strings<'a>(value: &'a Value, out: &mut Vec<&'a str>) {
    match value {
        Value::String(s) => out.push(s),
        Value::Array(items) => items.iter().for_each(|v| collect_strings(v, out)),
        Value::Object(map) => map.values().for_each(|v| collect_strings(v, out)),
        _ => {}
    }
}

fn array_field<'a>(node: &'a WorkflowNode, name: &str) -> &'a [Value] {
    node.field(name)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

fn selector_field(node: &WorkflowNode, name: &str) -> Option<ValueSelector> {
    node.field(name)
        .filter(|v| v.is_array())
        .and_then(ValueSelector::parse_value)
}
