use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::VarType;

/// Block types known to the editor (workflow DSL `type` tag).
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum NodeType {
    Start,
    End,
    Answer,
    Llm,
    KnowledgeRetrieval,
    QuestionClassifier,
    IfElse,
    Code,
    TemplateTransform,
    HttpRequest,
    VariableAssigner,
    VariableAggregator,
    #[serde(rename = "assigner")]
    Assigner,
    Tool,
    ParameterExtractor,
    Iteration,
    IterationStart,
    Loop,
    DocumentExtractor,
    ListOperator,
    Agent,
}

impl NodeType {
    pub fn parse(node_type: &str) -> Option<Self> {
        serde_json::from_value(Value::String(node_type.to_string())).ok()
    }
}

/// A declared output (or nested field) of a node.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct OutputVar {
    pub variable: String,
    #[serde(rename = "type")]
    pub var_type: VarType,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<OutputVar>,
}

impl OutputVar {
    pub fn new(variable: impl Into<String>, var_type: VarType) -> Self {
        Self {
            variable: variable.into(),
            var_type,
            children: Vec::new(),
        }
    }
}

/// A node of the workflow graph, as the editor sees it.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct WorkflowNode {
    pub id: String,
    /// Id of the enclosing iteration/loop for nodes placed inside one.
    #[serde(
        rename = "parentId",
        alias = "parent_id",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub parent_id: Option<String>,
    pub data: NodeData,
}

/// Common node data. Type-specific configuration stays in `extra`.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct NodeData {
    #[serde(rename = "type")]
    pub node_type: String,
    #[serde(default)]
    pub title: String,
    #[serde(rename = "isInIteration", default)]
    pub is_in_iteration: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iteration_id: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl WorkflowNode {
    pub fn new(id: impl Into<String>, node_type: impl Into<String>, data: Value) -> Self {
        let extra = match data {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        let title = extra
            .get("title")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        Self {
            id: id.into(),
            parent_id: None,
            data: NodeData {
                node_type: node_type.into(),
                title,
                is_in_iteration: false,
                iteration_id: None,
                extra,
            },
        }
    }

    /// Place the node inside the given iteration.
    pub fn inside(mut self, iteration_id: impl Into<String>) -> Self {
        let iteration_id = iteration_id.into();
        self.parent_id = Some(iteration_id.clone());
        self.data.is_in_iteration = true;
        self.data.iteration_id = Some(iteration_id);
        self
    }

    pub fn kind(&self) -> Option<NodeType> {
        NodeType::parse(&self.data.node_type)
    }

    /// The enclosing iteration, if any.
    pub fn enclosing_iteration(&self) -> Option<&str> {
        self.data.iteration_id.as_deref().or(self.parent_id.as_deref())
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.data.extra.get(name)
    }
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct EnvironmentVariable {
    pub name: String,
    #[serde(default)]
    pub value: Value,
    #[serde(default, alias = "type")]
    pub value_type: VarType,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct ConversationVariable {
    pub name: String,
    #[serde(default, alias = "type")]
    pub value_type: VarType,
    #[serde(default)]
    pub value: Value,
}
