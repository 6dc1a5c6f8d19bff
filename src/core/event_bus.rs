use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;

use crate::domain::execution::RunningStatus;
use crate::domain::model::IterationConfig;

/// Editor events, delivered to collaborators such as the draft syncer.
#[derive(Clone, Debug)]
pub enum EditorEvent {
    /// A mutation produced a new configuration for the node.
    ConfigChanged {
        node_id: String,
        config: Arc<IterationConfig>,
        timestamp: DateTime<Utc>,
    },

    /// The single-run status of the node changed.
    RunStatusChanged {
        node_id: String,
        status: RunningStatus,
        error: Option<String>,
        timestamp: DateTime<Utc>,
    },
}

impl EditorEvent {
    pub fn node_id(&self) -> &str {
        match self {
            EditorEvent::ConfigChanged { node_id, .. } => node_id,
            EditorEvent::RunStatusChanged { node_id, .. } => node_id,
        }
    }
}

pub type EventSender = mpsc::UnboundedSender<EditorEvent>;

pub type EventReceiver = mpsc::UnboundedReceiver<EditorEvent>;

pub fn create_event_channel() -> (EventSender, EventReceiver) {
    mpsc::unbounded_channel()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_event_channel() {
        let (sender, mut receiver) = create_event_channel();

        sender
            .send(EditorEvent::RunStatusChanged {
                node_id: "iter1".to_string(),
                status: RunningStatus::Running,
                error: None,
                timestamp: Utc::now(),
            })
            .unwrap();

        let event = receiver.recv().await.unwrap();
        assert_eq!(event.node_id(), "iter1");
        match event {
            EditorEvent::RunStatusChanged { status, .. } => {
                assert_eq!(status, RunningStatus::Running);
            }
            _ => panic!("Unexpected event type"),
        }
    }
}
