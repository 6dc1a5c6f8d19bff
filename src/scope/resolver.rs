//! Variable reference resolution over an explicit graph scope.

use crate::domain::model::{
    ConversationVariable, EnvironmentVariable, OutputVar, ValueSelector, VarType, WorkflowNode,
};

use super::known_vars::{
    file_attribute_type, system_var_type, CONVERSATION_NAMESPACE, ENV_NAMESPACE,
    ITERATION_INDEX, ITERATION_ITEM, START_QUERY_ALIAS, SYSTEM_NAMESPACE,
};
use super::outputs::node_output_vars;

/// Where a variable reference points to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceKind {
    System,
    Environment,
    Conversation,
    /// `item` / `index` of the iteration being edited.
    IterationScope,
    Node { in_iteration: bool },
    /// The reference does not resolve in the current scope.
    Broken,
}

/// A successfully resolved variable reference.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedVariable {
    pub var_type: VarType,
    /// Node id for node outputs, the namespace for reserved variables.
    pub origin: String,
    pub kind: ReferenceKind,
    /// Set when the selector addresses an attribute of a file variable.
    pub file_attribute: Option<String>,
}

impl ResolvedVariable {
    fn reserved(var_type: VarType, origin: &str, kind: ReferenceKind) -> Self {
        Self {
            var_type,
            origin: origin.to_string(),
            kind,
            file_attribute: None,
        }
    }
}

/// The nodes and declarations visible from one iteration node.
///
/// Built by the caller (see [`crate::graph::scope_for_iteration`]) and handed
/// to the controller explicitly.
#[derive(Debug, Clone, Default)]
pub struct VariableScope {
    pub iteration_node_id: String,
    /// Nodes before the iteration in the same branch, in graph order.
    pub before_nodes: Vec<WorkflowNode>,
    /// Nodes inside the iteration body.
    pub iteration_children: Vec<WorkflowNode>,
    pub environment_variables: Vec<EnvironmentVariable>,
    pub conversation_variables: Vec<ConversationVariable>,
    /// Type of the iteration's `item`, derived from the iterator selector.
    pub item_type: VarType,
}

impl VariableScope {
    pub fn new(iteration_node_id: impl Into<String>) -> Self {
        Self {
            iteration_node_id: iteration_node_id.into(),
            item_type: VarType::Any,
            ..Default::default()
        }
    }

    pub fn with_before_nodes(mut self, nodes: Vec<WorkflowNode>) -> Self {
        self.before_nodes = nodes;
        self
    }

    pub fn with_iteration_children(mut self, nodes: Vec<WorkflowNode>) -> Self {
        self.iteration_children = nodes;
        self
    }

    pub fn with_environment_variables(mut self, vars: Vec<EnvironmentVariable>) -> Self {
        self.environment_variables = vars;
        self
    }

    pub fn with_conversation_variables(mut self, vars: Vec<ConversationVariable>) -> Self {
        self.conversation_variables = vars;
        self
    }

    /// Before-nodes followed by iteration children.
    pub fn scope_nodes(&self) -> impl Iterator<Item = &WorkflowNode> {
        self.before_nodes.iter().chain(self.iteration_children.iter())
    }

    pub fn node_info(&self, node_id: &str) -> Option<&WorkflowNode> {
        self.scope_nodes().find(|n| n.id == node_id)
    }

    pub fn is_node_in_iteration(&self, node_id: &str) -> bool {
        self.iteration_children.iter().any(|n| n.id == node_id)
    }

    /// Recompute the `item` type from the iterator selector.
    pub fn refresh_item_type(&mut self, iterator_selector: &ValueSelector) {
        self.item_type = self
            .resolve(iterator_selector)
            .map(|v| v.var_type.item_type())
            .unwrap_or(VarType::Any);
    }

    /// Resolve a selector to its declared type and origin.
    pub fn resolve(&self, selector: &ValueSelector) -> Option<ResolvedVariable> {
        let segments = selector.segments();
        let head = segments.first()?.as_str();
        let name = segments.get(1).map(String::as_str);

        match head {
            SYSTEM_NAMESPACE => {
                let var_type = name.map(system_var_type).unwrap_or(VarType::Any);
                return Some(ResolvedVariable::reserved(
                    var_type,
                    SYSTEM_NAMESPACE,
                    ReferenceKind::System,
                ));
            }
            START_QUERY_ALIAS => {
                return Some(ResolvedVariable::reserved(
                    system_var_type("query"),
                    SYSTEM_NAMESPACE,
                    ReferenceKind::System,
                ));
            }
            ENV_NAMESPACE => {
                let name = name?;
                let var = self.environment_variables.iter().find(|v| v.name == name)?;
                return Some(ResolvedVariable::reserved(
                    var.value_type,
                    ENV_NAMESPACE,
                    ReferenceKind::Environment,
                ));
            }
            CONVERSATION_NAMESPACE => {
                let name = name?;
                let var = self.conversation_variables.iter().find(|v| v.name == name)?;
                return Some(ResolvedVariable::reserved(
                    var.value_type,
                    CONVERSATION_NAMESPACE,
                    ReferenceKind::Conversation,
                ));
            }
            _ => {}
        }

        if head == self.iteration_node_id {
            let name = name?;
            let scoped = match name {
                ITERATION_ITEM => OutputVar::new(name, self.item_type),
                ITERATION_INDEX => OutputVar::new(name, VarType::Number),
                _ => return None,
            };
            let (var_type, file_attribute) =
                walk_outputs(std::slice::from_ref(&scoped), &segments[1..])?;
            return Some(ResolvedVariable {
                var_type,
                origin: head.to_string(),
                kind: ReferenceKind::IterationScope,
                file_attribute,
            });
        }

        let (node, in_iteration) = match self.before_nodes.iter().find(|n| n.id == head) {
            Some(node) => (node, false),
            None => (self.iteration_children.iter().find(|n| n.id == head)?, true),
        };
        let outputs = node_output_vars(node);
        let (var_type, file_attribute) = walk_outputs(&outputs, &segments[1..])?;
        Some(ResolvedVariable {
            var_type,
            origin: node.id.clone(),
            kind: ReferenceKind::Node { in_iteration },
            file_attribute,
        })
    }

    pub fn classify(&self, selector: &ValueSelector) -> ReferenceKind {
        self.resolve(selector)
            .map(|v| v.kind)
            .unwrap_or(ReferenceKind::Broken)
    }

    /// `true` when the selector names an attribute of a file variable,
    /// e.g. `["start", "doc", "name"]`.
    pub fn is_var_file_attribute(&self, selector: &ValueSelector) -> bool {
        if selector.len() < 3 {
            return false;
        }
        selector
            .parent()
            .and_then(|parent| self.resolve(&parent))
            .map(|v| v.var_type == VarType::File)
            .unwrap_or(false)
    }

    /// The attribute key the operator catalog should use for this selector.
    pub fn file_attribute_key(&self, selector: &ValueSelector) -> Option<String> {
        if self.is_var_file_attribute(selector) {
            selector.last().map(str::to_string)
        } else {
            None
        }
    }
}

fn walk_outputs(outputs: &[OutputVar], path: &[String]) -> Option<(VarType, Option<String>)> {
    let (first, rest) = path.split_first()?;
    let mut current = outputs.iter().find(|v| &v.variable == first)?;

    for (idx, segment) in rest.iter().enumerate() {
        let is_last = idx + 1 == rest.len();
        if current.var_type == VarType::File && is_last {
            let attr_type = file_attribute_type(segment)?;
            return Some((attr_type, Some(segment.clone())));
        }
        if current.children.is_empty() {
            // Objects without a declared shape accept any field.
            return match current.var_type {
                VarType::Object | VarType::Any => Some((VarType::Any, None)),
                _ => None,
            };
        }
        current = current.children.iter().find(|c| &c.variable == segment)?;
    }

    Some((current.var_type, None))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn scope() -> VariableScope {
        VariableScope::new("iter")
            .with_before_nodes(vec![WorkflowNode::new(
                "start",
                "start",
                json!({"title": "Start", "variables": [
                    {"variable": "items", "type": "file-list"},
                    {"variable": "doc", "type": "file"},
                    {"variable": "meta", "type": "json"}
                ]}),
            )])
            .with_iteration_children(vec![WorkflowNode::new(
                "llm_in",
                "llm",
                json!({"title": "Inner LLM"}),
            )
            .inside("iter")])
            .with_environment_variables(vec![EnvironmentVariable {
                name: "api_key".into(),
                value: json!("k"),
                value_type: VarType::Secret,
            }])
            .with_conversation_variables(vec![ConversationVariable {
                name: "topic".into(),
                value_type: VarType::String,
                value: json!(null),
            }])
    }

    #[test]
    fn test_system_vars_resolve_regardless_of_scope() {
        let empty = VariableScope::new("iter");
        let v = empty.resolve(&ValueSelector::from(["sys", "files"])).unwrap();
        assert_eq!(v.kind, ReferenceKind::System);
        assert_eq!(v.var_type, VarType::ArrayFile);
        let alias = empty.resolve(&ValueSelector::from(["start_query", "query"])).unwrap();
        assert_eq!(alias.var_type, VarType::String);
    }

    #[test]
    fn test_env_and_conversation() {
        let s = scope();
        let env = s.resolve(&ValueSelector::from(["env", "api_key"])).unwrap();
        assert_eq!(env.kind, ReferenceKind::Environment);
        assert_eq!(env.var_type, VarType::Secret);
        let conv = s.resolve(&ValueSelector::from(["conversation", "topic"])).unwrap();
        assert_eq!(conv.kind, ReferenceKind::Conversation);
        assert_eq!(
            s.classify(&ValueSelector::from(["conversation", "missing"])),
            ReferenceKind::Broken
        );
    }

    #[test]
    fn test_node_outputs_inside_and_outside() {
        let s = scope();
        let outer = s.resolve(&ValueSelector::from(["start", "items"])).unwrap();
        assert_eq!(outer.kind, ReferenceKind::Node { in_iteration: false });
        assert_eq!(outer.var_type, VarType::ArrayFile);
        let inner = s.resolve(&ValueSelector::from(["llm_in", "text"])).unwrap();
        assert_eq!(inner.kind, ReferenceKind::Node { in_iteration: true });
        assert_eq!(
            s.classify(&ValueSelector::from(["ghost", "text"])),
            ReferenceKind::Broken
        );
        assert_eq!(
            s.classify(&ValueSelector::from(["start", "nope"])),
            ReferenceKind::Broken
        );
    }

    #[test]
    fn test_iteration_item_follows_iterator() {
        let mut s = scope();
        s.refresh_item_type(&ValueSelector::from(["start", "items"]));
        let item = s.resolve(&ValueSelector::from(["iter", "item"])).unwrap();
        assert_eq!(item.kind, ReferenceKind::IterationScope);
        assert_eq!(item.var_type, VarType::File);
        let index = s.resolve(&ValueSelector::from(["iter", "index"])).unwrap();
        assert_eq!(index.var_type, VarType::Number);
    }

    #[test]
    fn test_iteration_item_paths_walk_like_outputs() {
        let mut s = scope();
        s.refresh_item_type(&ValueSelector::from(["start", "items"]));
        let name = s.resolve(&ValueSelector::from(["iter", "item", "name"])).unwrap();
        assert_eq!(name.kind, ReferenceKind::IterationScope);
        assert_eq!(name.var_type, VarType::String);
        assert_eq!(name.file_attribute.as_deref(), Some("name"));
        assert!(s.is_var_file_attribute(&ValueSelector::from(["iter", "item", "name"])));

        assert_eq!(
            s.classify(&ValueSelector::from(["iter", "item", "bogus"])),
            ReferenceKind::Broken
        );
        assert_eq!(
            s.classify(&ValueSelector::from(["iter", "index", "x", "y"])),
            ReferenceKind::Broken
        );

        s.refresh_item_type(&ValueSelector::from(["start", "meta"]));
        let field = s.resolve(&ValueSelector::from(["iter", "item", "author"])).unwrap();
        assert_eq!(field.var_type, VarType::Any);
    }

    #[test]
    fn test_file_attributes() {
        let s = scope();
        let attr = s.resolve(&ValueSelector::from(["start", "doc", "size"])).unwrap();
        assert_eq!(attr.var_type, VarType::Number);
        assert_eq!(attr.file_attribute.as_deref(), Some("size"));
        assert!(s.is_var_file_attribute(&ValueSelector::from(["start", "doc", "name"])));
        assert!(!s.is_var_file_attribute(&ValueSelector::from(["start", "doc"])));
        assert_eq!(
            s.file_attribute_key(&ValueSelector::from(["start", "doc", "name"])),
            Some("name".to_string())
        );
    }

    #[test]
    fn test_untyped_object_fields() {
        let s = scope();
        let field = s.resolve(&ValueSelector::from(["start", "meta", "author"])).unwrap();
        assert_eq!(field.var_type, VarType::Any);
    }
}
