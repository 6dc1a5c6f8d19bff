//! Maps the single-run form of an iteration node onto the inputs the run
//! service expects.
//!
//! Each variable consumed inside the iteration body (and produced outside
//! it) becomes one form field keyed by its dotted path. On submission the
//! value of that field is copied to every `{node_id}.{server_key}` that
//! consumes it.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::model::ValueSelector;
use crate::scope::known_vars::is_system_var;
use crate::scope::{node_used_vars, pass_to_server_keys, VariableScope};

/// Identifies one (variable, consuming node, key position) triple.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CompositeKey {
    /// Dotted variable path, e.g. `nodeA.output`.
    pub path: String,
    pub node_id: String,
    pub index: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputVarLabel {
    pub node_type: Option<String>,
    pub node_name: Option<String>,
    pub variable: String,
}

/// A field of the single-run form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputVar {
    pub label: InputVarLabel,
    /// Form key: the variable's dotted path.
    pub variable: String,
    pub value_selector: ValueSelector,
}

#[derive(Debug, Clone)]
pub struct RunInputMapper {
    iterator_key: String,
    used_out_vars: Vec<InputVar>,
    server_keys: Vec<(CompositeKey, String)>,
}

/// Form key carrying the iterator input, e.g. `iter_1.input_selector`.
pub fn iterator_input_key(iteration_id: &str, suffix: &str) -> String {
    format!("{}.{}", iteration_id, suffix)
}

impl RunInputMapper {
    pub fn build(scope: &VariableScope, iterator_key_suffix: &str) -> Self {
        let iteration_id = scope.iteration_node_id.as_str();
        let mut used: Vec<ValueSelector> = Vec::new();
        let mut server_keys: Vec<(CompositeKey, String)> = Vec::new();

        for node in &scope.iteration_children {
            for selector in node_used_vars(node) {
                let Some(head) = selector.first() else {
                    continue;
                };
                // item / index of this iteration
                if head == iteration_id {
                    continue;
                }
                if scope.is_node_in_iteration(head) {
                    continue;
                }

                let path = selector.dotted();
                if !used.iter().any(|s| s.dotted() == path) {
                    used.push(selector.clone());
                }
                let node_keys = pass_to_server_keys(node, &selector);
                for (index, server_key) in node_keys.into_iter().enumerate() {
                    let key = CompositeKey {
                        path: path.clone(),
                        node_id: node.id.clone(),
                        index,
                    };
                    match server_keys.iter_mut().find(|(k, _)| *k == key) {
                        Some(entry) => entry.1 = server_key,
                        None => server_keys.push((key, server_key)),
                    }
                }
            }
        }

        let default_name = scope.scope_nodes().next().map(|n| n.data.title.clone());
        let used_out_vars = used
            .into_iter()
            .map(|selector| {
                let info = selector.first().and_then(|head| scope.node_info(head));
                let node_name = info
                    .map(|n| n.data.title.clone())
                    .filter(|t| !t.is_empty())
                    .or_else(|| default_name.clone());
                let variable = if is_system_var(&selector) {
                    selector.dotted()
                } else {
                    selector.last().unwrap_or_default().to_string()
                };
                InputVar {
                    label: InputVarLabel {
                        node_type: info.map(|n| n.data.node_type.clone()),
                        node_name,
                        variable,
                    },
                    variable: selector.dotted(),
                    value_selector: selector,
                }
            })
            .collect();

        tracing::debug!(
            iteration_id,
            inputs = server_keys.len(),
            "built single-run input mapping"
        );

        Self {
            iterator_key: iterator_input_key(iteration_id, iterator_key_suffix),
            used_out_vars,
            server_keys,
        }
    }

    pub fn iterator_key(&self) -> &str {
        &self.iterator_key
    }

    /// Run-form fields, one per external variable, in first-use order.
    pub fn used_out_vars(&self) -> &[InputVar] {
        &self.used_out_vars
    }

    pub fn server_keys(&self) -> &[(CompositeKey, String)] {
        &self.server_keys
    }

    /// Initial form data: `{iterator_key: [""]}`.
    pub fn default_run_input_data(&self) -> Map<String, Value> {
        let mut data = Map::new();
        data.insert(
            self.iterator_key.clone(),
            Value::Array(vec![Value::String(String::new())]),
        );
        data
    }

    /// Expand form values into the run payload.
    ///
    /// Missing variables map to `null`; a missing iterator value becomes `[]`.
    pub fn expand(&self, form: &Map<String, Value>) -> Map<String, Value> {
        let mut inputs = Map::new();
        for (key, server_key) in &self.server_keys {
            let value = form.get(&key.path).cloned().unwrap_or(Value::Null);
            inputs.insert(format!("{}.{}", key.node_id, server_key), value);
        }
        let iterator = form
            .get(&self.iterator_key)
            .cloned()
            .unwrap_or_else(|| Value::Array(Vec::new()));
        inputs.insert(self.iterator_key.clone(), iterator);
        inputs
    }
}
