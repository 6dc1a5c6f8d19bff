//! Editor configuration.

use serde::{Deserialize, Serialize};

use crate::error::{EditorError, EditorResult};

/// Configuration for iteration node editing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct EditorConfig {
    /// Upper bound offered by the parallelism slider.
    #[serde(default = "default_max_parallel_limit")]
    pub max_parallel_limit: u32,
    /// `parallel_nums` given to freshly created iteration nodes.
    #[serde(default = "default_parallel_nums")]
    pub default_parallel_nums: u32,
    /// Suffix of the single-run form key that carries the iterator input
    /// (`{node_id}.{suffix}`).
    #[serde(default = "default_iterator_input_key_suffix")]
    pub iterator_input_key_suffix: String,
    /// Give up on a single run after this many seconds. No limit when unset.
    #[serde(default)]
    pub single_run_timeout_secs: Option<u64>,
}

fn default_max_parallel_limit() -> u32 {
    10
}

fn default_parallel_nums() -> u32 {
    crate::domain::model::DEFAULT_PARALLEL_NUMS
}

fn default_iterator_input_key_suffix() -> String {
    "input_selector".to_string()
}

impl Default for EditorConfig {
    fn default() -> Self {
        EditorConfig {
            max_parallel_limit: default_max_parallel_limit(),
            default_parallel_nums: default_parallel_nums(),
            iterator_input_key_suffix: default_iterator_input_key_suffix(),
            single_run_timeout_secs: None,
        }
    }
}

impl EditorConfig {
    pub fn from_json(content: &str) -> EditorResult<Self> {
        serde_json::from_str(content).map_err(|e| EditorError::ConfigError(e.to_string()))
    }

    pub fn from_yaml(content: &str) -> EditorResult<Self> {
        serde_saphyr::from_str(content).map_err(|e| EditorError::ConfigError(e.to_string()))
    }

    /// Clamp a requested parallelism into `1..=max_parallel_limit`.
    pub fn clamp_parallel_nums(&self, requested: u32) -> u32 {
        requested.clamp(1, self.max_parallel_limit.max(1))
    }
}
