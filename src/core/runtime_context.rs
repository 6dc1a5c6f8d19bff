use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;

use crate::config::EditorConfig;
use crate::core::event_bus::{EditorEvent, EventSender};
use crate::domain::execution::RunningStatus;
use crate::domain::model::IterationConfig;

/// Context handed to editor controllers: id generation, configuration and
/// an optional event sink.
#[derive(Clone)]
pub struct EditorContext {
    pub id_generator: Arc<dyn IdGenerator>,
    pub config: EditorConfig,
    pub event_tx: Option<EventSender>,
}

impl Default for EditorContext {
    fn default() -> Self {
        Self {
            id_generator: Arc::new(RealIdGenerator),
            config: EditorConfig::default(),
            event_tx: None,
        }
    }
}

impl EditorContext {
    pub fn with_event_tx(mut self, event_tx: EventSender) -> Self {
        self.event_tx = Some(event_tx);
        self
    }

    pub fn with_id_generator(mut self, id_generator: Arc<dyn IdGenerator>) -> Self {
        self.id_generator = id_generator;
        self
    }

    pub fn with_config(mut self, config: EditorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn next_id(&self) -> String {
        self.id_generator.next_id()
    }

    pub(crate) fn emit_config_changed(&self, node_id: &str, config: &Arc<IterationConfig>) {
        self.emit(EditorEvent::ConfigChanged {
            node_id: node_id.to_string(),
            config: config.clone(),
            timestamp: Utc::now(),
        });
    }

    pub(crate) fn emit_run_status(
        &self,
        node_id: &str,
        status: RunningStatus,
        error: Option<String>,
    ) {
        self.emit(EditorEvent::RunStatusChanged {
            node_id: node_id.to_string(),
            status,
            error,
            timestamp: Utc::now(),
        });
    }

    fn emit(&self, event: EditorEvent) {
        if let Some(tx) = &self.event_tx {
            if tx.send(event).is_err() {
                tracing::debug!("editor event receiver dropped");
            }
        }
    }
}

pub trait IdGenerator: Send + Sync {
    fn next_id(&self) -> String;
}

pub struct RealIdGenerator;

impl Default for RealIdGenerator {
    fn default() -> Self {
        Self
    }
}

impl IdGenerator for RealIdGenerator {
    fn next_id(&self) -> String {
        uuid::Uuid::new_v4().to_string()
    }
}

pub struct FakeIdGenerator {
    pub prefix: String,
    pub counter: AtomicU64,
}

impl FakeIdGenerator {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            counter: AtomicU64::new(0),
        }
    }
}

impl IdGenerator for FakeIdGenerator {
    fn next_id(&self) -> String {
        let id = self.counter.fetch_add(1, Ordering::SeqCst);
        format!("{}-{}", self.prefix, id)
    }
}
