use serde::{Deserialize, Serialize};

use crate::domain::model::{
    ConversationVariable, EnvironmentVariable, IterationConfig, NodeType, WorkflowNode,
};
use crate::error::{EditorError, EditorResult};

/// A workflow graph as loaded from a draft or an exported app.
#[derive(Deserialize, Serialize, Debug, Clone, Default)]
pub struct WorkflowGraph {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default)]
    pub nodes: Vec<WorkflowNode>,
    #[serde(default)]
    pub edges: Vec<GraphEdge>,
    #[serde(default)]
    pub environment_variables: Vec<EnvironmentVariable>,
    #[serde(default)]
    pub conversation_variables: Vec<ConversationVariable>,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct GraphEdge {
    #[serde(default)]
    pub id: String,
    pub source: String,
    pub target: String,
    #[serde(
        default,
        rename = "sourceHandle",
        alias = "source_handle",
        skip_serializing_if = "Option::is_none"
    )]
    pub source_handle: Option<String>,
}

impl WorkflowGraph {
    pub fn node(&self, node_id: &str) -> Option<&WorkflowNode> {
        self.nodes.iter().find(|n| n.id == node_id)
    }

    /// Decode the configuration of the iteration node `node_id`.
    pub fn iteration_config(&self, node_id: &str) -> EditorResult<IterationConfig> {
        let node = self
            .node(node_id)
            .ok_or_else(|| EditorError::NodeNotFound(node_id.to_string()))?;
        if node.kind() != Some(NodeType::Iteration) {
            return Err(EditorError::NotAnIteration {
                node_id: node_id.to_string(),
                node_type: node.data.node_type.clone(),
            });
        }
        let data = serde_json::to_value(&node.data)?;
        Ok(serde_json::from_value(data)?)
    }
}
