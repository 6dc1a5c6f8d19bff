//! Editor-level error types.

use super::RunError;
use thiserror::Error;

/// Editor-level errors
#[derive(Debug, Error)]
pub enum EditorError {
    #[error("DSL parse error: {0}")]
    DslParseError(String),
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Serialization error: {0}")]
    SerializationError(String),
    #[error("Node not found: {0}")]
    NodeNotFound(String),
    #[error("Node {node_id} is not an iteration (type: {node_type})")]
    NotAnIteration { node_id: String, node_type: String },
    #[error("Run error: {0}")]
    Run(#[from] RunError),
}

impl From<serde_json::Error> for EditorError {
    fn from(e: serde_json::Error) -> Self {
        EditorError::SerializationError(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_editor_error_display() {
        assert_eq!(
            EditorError::DslParseError("x".into()).to_string(),
            "DSL parse error: x"
        );
        assert_eq!(
            EditorError::NodeNotFound("n".into()).to_string(),
            "Node not found: n"
        );
        assert_eq!(
            EditorError::NotAnIteration {
                node_id: "llm_1".into(),
                node_type: "llm".into()
            }
            .to_string(),
            "Node llm_1 is not an iteration (type: llm)"
        );
    }

    #[test]
    fn test_editor_error_from_run_error() {
        let err: EditorError = RunError::Timeout.into();
        assert!(matches!(err, EditorError::Run(RunError::Timeout)));
        assert!(err.to_string().contains("Timeout"));
    }

    #[test]
    fn test_editor_error_from_serde() {
        let bad = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: EditorError = bad.into();
        assert!(matches!(err, EditorError::SerializationError(_)));
    }
}
