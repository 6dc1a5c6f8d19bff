//! Graph parser: converts raw YAML/JSON/TOML text into [`WorkflowGraph`].
//!
//! Both the bare graph shape (`nodes`, `edges`, ...) and the exported app
//! shape (`workflow.graph.nodes`, `workflow.environment_variables`, ...) are
//! accepted.

use serde_json::{Map, Value};

use super::schema::WorkflowGraph;
use crate::error::{EditorError, EditorResult};

/// Supported graph input formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DslFormat {
    /// YAML format (`.yaml` / `.yml`).
    Yaml,
    /// JSON format (`.json`).
    Json,
    /// TOML format (`.toml`).
    Toml,
}

impl DslFormat {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "yaml" | "yml" => Some(DslFormat::Yaml),
            "json" => Some(DslFormat::Json),
            "toml" => Some(DslFormat::Toml),
            _ => None,
        }
    }
}

pub fn parse_graph(content: &str, format: DslFormat) -> EditorResult<WorkflowGraph> {
    let raw: Value = match format {
        DslFormat::Yaml => serde_saphyr::from_str(content)
            .map_err(|e| EditorError::DslParseError(e.to_string()))?,
        DslFormat::Json => serde_json::from_str(content)
            .map_err(|e| EditorError::DslParseError(e.to_string()))?,
        DslFormat::Toml => {
            let toml_val: toml::Value = toml::from_str(content)
                .map_err(|e| EditorError::DslParseError(e.to_string()))?;
            toml_value_to_json(toml_val)
        }
    };
    let Value::Object(root) = raw else {
        return Err(EditorError::DslParseError(
            "graph document must be a mapping".to_string(),
        ));
    };

    let graph: WorkflowGraph = serde_json::from_value(unwrap_app_export(root))
        .map_err(|e| EditorError::DslParseError(e.to_string()))?;
    tracing::debug!(
        nodes = graph.nodes.len(),
        edges = graph.edges.len(),
        "parsed workflow graph"
    );
    Ok(graph)
}

/// Flatten `{workflow: {graph: {nodes, edges}, environment_variables, ...}}`
/// into the bare graph shape. Other documents pass through unchanged.
fn unwrap_app_export(mut root: Map<String, Value>) -> Value {
    let Some(Value::Object(mut workflow)) = root.remove("workflow") else {
        return Value::Object(root);
    };

    let mut flat = Map::new();
    if let Some(version) = root.remove("version") {
        flat.insert("version".to_string(), version);
    }
    if let Some(Value::Object(graph)) = workflow.remove("graph") {
        flat.extend(graph);
    }
    for key in ["environment_variables", "conversation_variables"] {
        if let Some(vars) = workflow.remove(key) {
            flat.insert(key.to_string(), vars);
        }
    }
    Value::Object(flat)
}

/// Convert a [`toml::Value`] into a [`serde_json::Value`].
///
/// TOML has no null; `Datetime` values are stringified.
fn toml_value_to_json(val: toml::Value) -> Value {
    match val {
        toml::Value::String(s) => Value::String(s),
        toml::Value::Integer(i) => serde_json::json!(i),
        toml::Value::Float(f) => serde_json::json!(f),
        toml::Value::Boolean(b) => Value::Bool(b),
        toml::Value::Array(arr) => Value::Array(arr.into_iter().map(toml_value_to_json).collect()),
        toml::Value::Table(tbl) => Value::Object(
            tbl.into_iter()
                .map(|(k, v)| (k, toml_value_to_json(v)))
                .collect(),
        ),
        toml::Value::Datetime(dt) => Value::String(dt.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_yaml() {
        let yaml = r#"
nodes:
  - id: start
    data:
      type: start
      title: Start
  - id: iter
    data:
      type: iteration
      title: Loop
      iterator_selector: [start, items]
edges:
  - source: start
    target: iter
"#;
        let graph = parse_graph(yaml, DslFormat::Yaml).unwrap();
        assert_eq!(graph.nodes.len(), 2);
        assert_eq!(graph.nodes[1].data.node_type, "iteration");
        assert_eq!(graph.edges[0].target, "iter");
    }

    #[test]
    fn test_parse_app_export() {
        let yaml = r#"
version: "0.1.5"
app:
  mode: workflow
workflow:
  environment_variables:
    - name: api_key
      value_type: secret
      value: k
  conversation_variables: []
  graph:
    nodes:
      - id: start
        data:
          type: start
    edges: []
"#;
        let graph = parse_graph(yaml, DslFormat::Yaml).unwrap();
        assert_eq!(graph.version.as_deref(), Some("0.1.5"));
        assert_eq!(graph.nodes.len(), 1);
        assert_eq!(graph.environment_variables[0].name, "api_key");
    }

    #[test]
    fn test_parse_json() {
        let json = r#"{"nodes":[{"id":"s","data":{"type":"start","title":"S"}}],"edges":[]}"#;
        let graph = parse_graph(json, DslFormat::Json).unwrap();
        assert_eq!(graph.nodes.len(), 1);
    }

    #[test]
    fn test_parse_toml() {
        let toml_str = r#"
edges = []

[[nodes]]
id = "start_1"
[nodes.data]
type = "start"
title = "Start"
"#;
        let graph = parse_graph(toml_str, DslFormat::Toml).unwrap();
        assert_eq!(graph.nodes.len(), 1);
        assert_eq!(graph.nodes[0].data.node_type, "start");
    }

    #[test]
    fn test_parse_invalid() {
        assert!(matches!(
            parse_graph("{{{invalid", DslFormat::Json),
            Err(EditorError::DslParseError(_))
        ));
        assert!(parse_graph("[[[bad", DslFormat::Toml).is_err());
        assert!(parse_graph("[1, 2]", DslFormat::Json).is_err());
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(DslFormat::from_extension("YML"), Some(DslFormat::Yaml));
        assert_eq!(DslFormat::from_extension("txt"), None);
    }
}
