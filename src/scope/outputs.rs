//! Declared outputs of workflow nodes, by node type.

use serde_json::Value;

use crate::domain::model::{NodeType, OutputVar, VarType, WorkflowNode};

/// Outputs of one node, as listed by the variable picker.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeOutputVars {
    pub node_id: String,
    pub title: String,
    pub vars: Vec<OutputVar>,
}

/// Outputs a node declares, derived from its type and configuration.
pub fn node_output_vars(node: &WorkflowNode) -> Vec<OutputVar> {
    let Some(kind) = node.kind() else {
        return explicit_outputs(node);
    };

    match kind {
        NodeType::Start => start_variables(node),
        NodeType::Llm => vec![OutputVar::new("text", VarType::String)],
        NodeType::Agent | NodeType::Tool => vec![
            OutputVar::new("text", VarType::String),
            OutputVar::new("files", VarType::ArrayFile),
            OutputVar::new("json", VarType::ArrayObject),
        ],
        NodeType::Code => code_outputs(node),
        NodeType::TemplateTransform => vec![OutputVar::new("output", VarType::String)],
        NodeType::Answer => vec![OutputVar::new("answer", VarType::String)],
        NodeType::HttpRequest => vec![
            OutputVar::new("body", VarType::String),
            OutputVar::new("status_code", VarType::Number),
            OutputVar::new("headers", VarType::Object),
            OutputVar::new("files", VarType::ArrayFile),
        ],
        NodeType::QuestionClassifier => vec![OutputVar::new("class_name", VarType::String)],
        NodeType::KnowledgeRetrieval => vec![OutputVar::new("result", VarType::ArrayObject)],
        NodeType::DocumentExtractor => {
            let is_array = node
                .field("is_array_file")
                .and_then(Value::as_bool)
                .unwrap_or(false);
            let text_type = if is_array {
                VarType::ArrayString
            } else {
                VarType::String
            };
            vec![OutputVar::new("text", text_type)]
        }
        NodeType::ListOperator => {
            let list_type = typed_field(node, "var_type").unwrap_or(VarType::Array);
            vec![
                OutputVar::new("result", list_type),
                OutputVar::new("first_record", list_type.item_type()),
                OutputVar::new("last_record", list_type.item_type()),
            ]
        }
        NodeType::Iteration => vec![OutputVar::new(
            "output",
            typed_field(node, "output_type").unwrap_or(VarType::ArrayString),
        )],
        NodeType::VariableAggregator | NodeType::VariableAssigner => vec![OutputVar::new(
            "output",
            typed_field(node, "output_type").unwrap_or(VarType::Any),
        )],
        NodeType::ParameterExtractor => parameter_extractor_outputs(node),
        NodeType::End
        | NodeType::IfElse
        | NodeType::Assigner
        | NodeType::IterationStart
        | NodeType::Loop => Vec::new(),
    }
}

/// Output listing for a set of nodes, skipping nodes without outputs.
pub fn to_node_output_vars<'a, I>(nodes: I) -> Vec<NodeOutputVars>
where
    I: IntoIterator<Item = &'a WorkflowNode>,
{
    nodes
        .into_iter()
        .filter_map(|node| {
            let vars = node_output_vars(node);
            if vars.is_empty() {
                return None;
            }
            Some(NodeOutputVars {
                node_id: node.id.clone(),
                title: node.data.title.clone(),
                vars,
            })
        })
        .collect()
}

fn typed_field(node: &WorkflowNode, name: &str) -> Option<VarType> {
    node.field(name)
        .and_then(Value::as_str)
        .and_then(VarType::from_dsl_type)
}

fn start_input_type(input_type: &str) -> VarType {
    match input_type {
        "text-input" | "paragraph" | "select" => VarType::String,
        "number" => VarType::Number,
        "file" => VarType::File,
        "file-list" => VarType::ArrayFile,
        "json" => VarType::Object,
        other => VarType::from_dsl_type(other).unwrap_or(VarType::String),
    }
}

fn start_variables(node: &WorkflowNode) -> Vec<OutputVar> {
    let Some(Value::Array(vars)) = node.field("variables") else {
        return Vec::new();
    };
    vars.iter()
        .filter_map(|v| {
            let name = v.get("variable")?.as_str()?;
            let input_type = v.get("type").and_then(Value::as_str).unwrap_or("text-input");
            Some(OutputVar::new(name, start_input_type(input_type)))
        })
        .collect()
}

fn code_outputs(node: &WorkflowNode) -> Vec<OutputVar> {
    let Some(Value::Object(outputs)) = node.field("outputs") else {
        return Vec::new();
    };
    outputs
        .iter()
        .map(|(name, decl)| {
            let var_type = decl
                .get("type")
                .and_then(Value::as_str)
                .and_then(VarType::from_dsl_type)
                .unwrap_or(VarType::Any);
            let children = decl
                .get("children")
                .cloned()
                .and_then(|c| serde_json::from_value::<Vec<OutputVar>>(c).ok())
                .unwrap_or_default();
            OutputVar {
                variable: name.clone(),
                var_type,
                children,
            }
        })
        .collect()
}

fn parameter_extractor_outputs(node: &WorkflowNode) -> Vec<OutputVar> {
    let mut vars: Vec<OutputVar> = match node.field("parameters") {
        Some(Value::Array(params)) => params
            .iter()
            .filter_map(|p| {
                let name = p.get("name")?.as_str()?;
                let var_type = p
                    .get("type")
                    .and_then(Value::as_str)
                    .and_then(VarType::from_dsl_type)
                    .unwrap_or(VarType::String);
                Some(OutputVar::new(name, var_type))
            })
            .collect(),
        _ => Vec::new(),
    };
    vars.push(OutputVar::new("__is_success", VarType::Number));
    vars.push(OutputVar::new("__reason", VarType::String));
    vars
}

fn explicit_outputs(node: &WorkflowNode) -> Vec<OutputVar> {
    node.field("outputs")
        .cloned()
        .and_then(|v| serde_json::from_value::<Vec<OutputVar>>(v).ok())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_start_variables() {
        let node = WorkflowNode::new(
            "start",
            "start",
            json!({"variables": [
                {"variable": "topic", "type": "text-input"},
                {"variable": "count", "type": "number"},
                {"variable": "docs", "type": "file-list"}
            ]}),
        );
        let vars = node_output_vars(&node);
        assert_eq!(vars.len(), 3);
        assert_eq!(vars[0], OutputVar::new("topic", VarType::String));
        assert_eq!(vars[2].var_type, VarType::ArrayFile);
    }

    #[test]
    fn test_code_outputs_with_children() {
        let node = WorkflowNode::new(
            "code",
            "code",
            json!({"outputs": {
                "profile": {"type": "object", "children": [
                    {"variable": "age", "type": "number"}
                ]}
            }}),
        );
        let vars = node_output_vars(&node);
        assert_eq!(vars[0].var_type, VarType::Object);
        assert_eq!(vars[0].children[0].variable, "age");
    }

    #[test]
    fn test_list_operator_item_types() {
        let node = WorkflowNode::new("lo", "list-operator", json!({"var_type": "array[file]"}));
        let vars = node_output_vars(&node);
        assert_eq!(vars[0].var_type, VarType::ArrayFile);
        assert_eq!(vars[1].var_type, VarType::File);
    }

    #[test]
    fn test_unknown_type_uses_explicit_outputs() {
        let node = WorkflowNode::new(
            "p",
            "plugin.custom",
            json!({"outputs": [{"variable": "score", "type": "number"}]}),
        );
        assert_eq!(node_output_vars(&node), vec![OutputVar::new("score", VarType::Number)]);
    }

    #[test]
    fn test_to_node_output_vars_skips_empty() {
        let nodes = vec![
            WorkflowNode::new("if", "if-else", json!({})),
            WorkflowNode::new("llm", "llm", json!({"title": "Summarize"})),
        ];
        let listed = to_node_output_vars(&nodes);
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].title, "Summarize");
    }
}
