//! Single-run status: the states a debug run of one node moves through.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Status of a single-step debug run.
///
/// `Idle → Running → Succeeded | Failed | Stopped`. A new run may start from
/// any terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RunningStatus {
    #[default]
    Idle,
    Running,
    Succeeded,
    Failed,
    Stopped,
}

impl RunningStatus {
    pub fn is_running(&self) -> bool {
        matches!(self, RunningStatus::Running)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            RunningStatus::Succeeded | RunningStatus::Failed | RunningStatus::Stopped
        )
    }
}

/// Result payload delivered by the run service. Opaque to the editor apart
/// from the per-iteration breakdown shown in the iteration detail panel.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SingleRunResult {
    #[serde(default)]
    pub outputs: Value,
    #[serde(default)]
    pub iterations: Vec<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elapsed_ms: Option<u64>,
}
