//! Scope derivation from a workflow graph.

use std::collections::{HashMap, HashSet, VecDeque};

use petgraph::stable_graph::{NodeIndex, StableDiGraph};
use petgraph::Direction;

use crate::dsl::WorkflowGraph;
use crate::domain::model::WorkflowNode;
use crate::error::{EditorError, EditorResult};
use crate::scope::VariableScope;

/// Node id to petgraph `NodeIndex`.
pub type NodeIndexMap = HashMap<String, NodeIndex>;

/// Edge topology of a [`WorkflowGraph`], keyed by node id.
pub struct BranchGraph {
    graph: StableDiGraph<String, ()>,
    node_index_map: NodeIndexMap,
}

impl BranchGraph {
    pub fn build(workflow: &WorkflowGraph) -> Self {
        let mut graph = StableDiGraph::new();
        let mut node_index_map = NodeIndexMap::new();
        for node in &workflow.nodes {
            let idx = graph.add_node(node.id.clone());
            node_index_map.insert(node.id.clone(), idx);
        }
        for edge in &workflow.edges {
            match (
                node_index_map.get(&edge.source),
                node_index_map.get(&edge.target),
            ) {
                (Some(&src), Some(&dst)) => {
                    graph.add_edge(src, dst, ());
                }
                _ => tracing::debug!(
                    source = %edge.source,
                    target = %edge.target,
                    "skipping edge with unknown endpoint"
                ),
            }
        }
        Self {
            graph,
            node_index_map,
        }
    }

    /// Ids of every node reaching `node_id` through incoming edges, in
    /// topological order.
    pub fn ancestors(&self, node_id: &str) -> EditorResult<Vec<String>> {
        let start = *self
            .node_index_map
            .get(node_id)
            .ok_or_else(|| EditorError::NodeNotFound(node_id.to_string()))?;

        let mut seen = HashSet::new();
        let mut queue = VecDeque::from([start]);
        let mut reached = Vec::new();
        while let Some(idx) = queue.pop_front() {
            for pred in self.graph.neighbors_directed(idx, Direction::Incoming) {
                if pred != start && seen.insert(pred) {
                    reached.push(pred);
                    queue.push_back(pred);
                }
            }
        }

        let order: HashMap<NodeIndex, usize> = match petgraph::algo::toposort(&self.graph, None) {
            Ok(sorted) => sorted.into_iter().enumerate().map(|(i, idx)| (idx, i)).collect(),
            Err(_) => {
                tracing::debug!(node_id, "graph has a cycle, keeping traversal order");
                HashMap::new()
            }
        };
        if !order.is_empty() {
            reached.sort_by_key(|idx| order.get(idx).copied().unwrap_or(usize::MAX));
        }

        Ok(reached
            .into_iter()
            .filter_map(|idx| self.graph.node_weight(idx).cloned())
            .collect())
    }
}

/// Nodes before `node_id` in the same branch, skipping nodes placed inside
/// an iteration.
pub fn before_nodes_in_same_branch(
    workflow: &WorkflowGraph,
    node_id: &str,
) -> EditorResult<Vec<WorkflowNode>> {
    let ids = BranchGraph::build(workflow).ancestors(node_id)?;
    Ok(ids
        .iter()
        .filter_map(|id| workflow.node(id))
        .filter(|node| node.enclosing_iteration().is_none())
        .cloned()
        .collect())
}

/// Nodes placed inside the iteration `iteration_id`.
pub fn iteration_children(workflow: &WorkflowGraph, iteration_id: &str) -> Vec<WorkflowNode> {
    workflow
        .nodes
        .iter()
        .filter(|node| node.enclosing_iteration() == Some(iteration_id))
        .cloned()
        .collect()
}

/// Everything an iteration node can reference, derived from the graph.
pub fn scope_for_iteration(
    workflow: &WorkflowGraph,
    iteration_id: &str,
) -> EditorResult<VariableScope> {
    let config = workflow.iteration_config(iteration_id)?;
    let mut scope = VariableScope::new(iteration_id)
        .with_before_nodes(before_nodes_in_same_branch(workflow, iteration_id)?)
        .with_iteration_children(iteration_children(workflow, iteration_id))
        .with_environment_variables(workflow.environment_variables.clone())
        .with_conversation_variables(workflow.conversation_variables.clone());
    scope.refresh_item_type(&config.iterator_selector);
    Ok(scope)
}
