use thiserror::Error;

/// Errors surfaced by a [`crate::single_run::SingleRunService`].
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RunError {
    #[error("Run service error: {0}")]
    ServiceError(String),
    #[error("Invalid run input: {0}")]
    InputError(String),
    #[error("Run stopped")]
    Stopped,
    #[error("Timeout: single run exceeded time limit")]
    Timeout,
}

impl From<serde_json::Error> for RunError {
    fn from(e: serde_json::Error) -> Self {
        RunError::InputError(e.to_string())
    }
}
