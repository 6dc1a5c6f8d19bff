//! Single-run session of an iteration node and its panel state.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{Map, Value};
use tokio_util::sync::CancellationToken;

use crate::core::runtime_context::EditorContext;
use crate::domain::execution::{RunningStatus, SingleRunResult};
use crate::error::{RunError, RunResult};

/// Backend that executes one node in isolation.
#[async_trait]
pub trait SingleRunService: Send + Sync {
    async fn run(&self, node_id: &str, inputs: Map<String, Value>) -> RunResult<SingleRunResult>;

    async fn stop(&self, node_id: &str) -> RunResult<()>;
}

/// Visibility of the single-run and iteration-detail panels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PanelState {
    pub show_single_run: bool,
    pub show_iteration_detail: bool,
}

impl PanelState {
    pub fn show_single_run(&mut self) {
        self.show_single_run = true;
    }

    /// Closing the run panel also closes the iteration detail.
    pub fn hide_single_run(&mut self) {
        self.show_single_run = false;
        self.show_iteration_detail = false;
    }

    pub fn show_iteration_detail(&mut self) {
        self.show_iteration_detail = true;
    }

    pub fn hide_iteration_detail(&mut self) {
        self.show_iteration_detail = false;
    }

    pub fn back_to_single_run(&mut self) {
        self.hide_iteration_detail();
        self.show_single_run();
    }
}

#[derive(Default)]
struct SessionState {
    status: RunningStatus,
    result: Option<SingleRunResult>,
    error: Option<String>,
    listener: Option<CancellationToken>,
}

/// Tracks one node's debug run. Cloning shares the state, so a clone can
/// stop a run another task is awaiting.
#[derive(Clone)]
pub struct SingleRunSession {
    node_id: String,
    ctx: EditorContext,
    timeout: Option<Duration>,
    state: Arc<Mutex<SessionState>>,
}

impl SingleRunSession {
    pub fn new(node_id: impl Into<String>, ctx: EditorContext) -> Self {
        let timeout = ctx.config.single_run_timeout_secs.map(Duration::from_secs);
        Self {
            node_id: node_id.into(),
            ctx,
            timeout,
            state: Arc::new(Mutex::new(SessionState::default())),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn node_id(&self) -> &str {
        &self.node_id
    }

    pub fn status(&self) -> RunningStatus {
        self.state.lock().status
    }

    pub fn result(&self) -> Option<SingleRunResult> {
        self.state.lock().result.clone()
    }

    pub fn error(&self) -> Option<String> {
        self.state.lock().error.clone()
    }

    /// Run the node with already expanded `inputs` and wait for the outcome.
    ///
    /// Returns [`RunError::Stopped`] when [`handle_stop`](Self::handle_stop)
    /// was called before the service answered; the late answer is dropped.
    pub async fn handle_run(
        &self,
        service: &dyn SingleRunService,
        inputs: Map<String, Value>,
    ) -> RunResult<SingleRunResult> {
        let listener = CancellationToken::new();
        {
            let mut state = self.state.lock();
            if let Some(previous) = state.listener.replace(listener.clone()) {
                previous.cancel();
            }
            state.status = RunningStatus::Running;
            state.result = None;
            state.error = None;
        }
        tracing::info!(node_id = %self.node_id, inputs = inputs.len(), "single run started");
        self.ctx
            .emit_run_status(&self.node_id, RunningStatus::Running, None);

        let run = service.run(&self.node_id, inputs);
        let outcome = tokio::select! {
            _ = listener.cancelled() => None,
            res = run_with_timeout(run, self.timeout) => Some(res),
        };

        let (status, error) = {
            let mut state = self.state.lock();
            let outcome = match outcome {
                Some(res) if !listener.is_cancelled() => res,
                _ => {
                    tracing::info!(
                        node_id = %self.node_id,
                        "single run result discarded after stop"
                    );
                    return Err(RunError::Stopped);
                }
            };
            state.listener = None;
            match outcome {
                Ok(result) => {
                    state.status = RunningStatus::Succeeded;
                    state.result = Some(result.clone());
                    drop(state);
                    tracing::info!(node_id = %self.node_id, "single run succeeded");
                    self.ctx
                        .emit_run_status(&self.node_id, RunningStatus::Succeeded, None);
                    return Ok(result);
                }
                Err(e) => {
                    state.status = RunningStatus::Failed;
                    state.error = Some(e.to_string());
                    (RunningStatus::Failed, e)
                }
            }
        };

        tracing::warn!(node_id = %self.node_id, error = %error, "single run failed");
        self.ctx
            .emit_run_status(&self.node_id, status, Some(error.to_string()));
        Err(error)
    }

    /// Stop listening for the current run and tell the service to stop it.
    pub async fn handle_stop(&self, service: &dyn SingleRunService) -> RunResult<()> {
        {
            let mut state = self.state.lock();
            if let Some(listener) = state.listener.take() {
                listener.cancel();
            }
            state.status = RunningStatus::Stopped;
        }
        tracing::info!(node_id = %self.node_id, "single run stopped");
        self.ctx
            .emit_run_status(&self.node_id, RunningStatus::Stopped, None);
        service.stop(&self.node_id).await
    }
}

async fn run_with_timeout<F>(run: F, timeout: Option<Duration>) -> RunResult<SingleRunResult>
where
    F: std::future::Future<Output = RunResult<SingleRunResult>>,
{
    match timeout {
        Some(limit) => tokio::time::timeout(limit, run)
            .await
            .unwrap_or(Err(RunError::Timeout)),
        None => run.await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::event_bus::{create_event_channel, EditorEvent};
    use serde_json::json;
    use tokio::sync::Notify;

    struct EchoService;

    #[async_trait]
    impl SingleRunService for EchoService {
        async fn run(
            &self,
            _node_id: &str,
            inputs: Map<String, Value>,
        ) -> RunResult<SingleRunResult> {
            Ok(SingleRunResult {
                outputs: Value::Object(inputs),
                ..Default::default()
            })
        }

        async fn stop(&self, _node_id: &str) -> RunResult<()> {
            Ok(())
        }
    }

    struct FailingService;

    #[async_trait]
    impl SingleRunService for FailingService {
        async fn run(
            &self,
            _node_id: &str,
            _inputs: Map<String, Value>,
        ) -> RunResult<SingleRunResult> {
            Err(RunError::ServiceError("boom".into()))
        }

        async fn stop(&self, _node_id: &str) -> RunResult<()> {
            Ok(())
        }
    }

    /// Blocks until released.
    struct GatedService {
        gate: Arc<Notify>,
    }

    #[async_trait]
    impl SingleRunService for GatedService {
        async fn run(
            &self,
            _node_id: &str,
            _inputs: Map<String, Value>,
        ) -> RunResult<SingleRunResult> {
            self.gate.notified().await;
            Ok(SingleRunResult::default())
        }

        async fn stop(&self, _node_id: &str) -> RunResult<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_run_succeeds() {
        let (tx, mut rx) = create_event_channel();
        let session = SingleRunSession::new("iter", EditorContext::default().with_event_tx(tx));
        let mut inputs = Map::new();
        inputs.insert("iter.input_selector".into(), json!(["a"]));

        let result = session.handle_run(&EchoService, inputs).await.unwrap();
        assert_eq!(result.outputs["iter.input_selector"], json!(["a"]));
        assert_eq!(session.status(), RunningStatus::Succeeded);
        assert!(session.result().is_some());

        let first = rx.recv().await.unwrap();
        assert!(matches!(
            first,
            EditorEvent::RunStatusChanged { status: RunningStatus::Running, .. }
        ));
        let second = rx.recv().await.unwrap();
        assert!(matches!(
            second,
            EditorEvent::RunStatusChanged { status: RunningStatus::Succeeded, .. }
        ));
    }

    #[tokio::test]
    async fn test_run_failure_records_message() {
        let session = SingleRunSession::new("iter", EditorContext::default());
        let err = session.handle_run(&FailingService, Map::new()).await.unwrap_err();
        assert_eq!(err, RunError::ServiceError("boom".into()));
        assert_eq!(session.status(), RunningStatus::Failed);
        assert_eq!(session.error().as_deref(), Some("Run service error: boom"));
    }

    #[tokio::test]
    async fn test_stop_discards_late_result() {
        let gate = Arc::new(Notify::new());
        let service = Arc::new(GatedService { gate: gate.clone() });
        let session = SingleRunSession::new("iter", EditorContext::default());

        let runner = session.clone();
        let run_service = service.clone();
        let handle =
            tokio::spawn(async move { runner.handle_run(run_service.as_ref(), Map::new()).await });

        while session.status() != RunningStatus::Running {
            tokio::task::yield_now().await;
        }
        session.handle_stop(service.as_ref()).await.unwrap();
        gate.notify_one();

        let outcome = handle.await.unwrap();
        assert_eq!(outcome.unwrap_err(), RunError::Stopped);
        assert_eq!(session.status(), RunningStatus::Stopped);
        assert!(session.result().is_none());
    }

    #[tokio::test]
    async fn test_timeout_fails_run() {
        let service = GatedService {
            gate: Arc::new(Notify::new()),
        };
        let session = SingleRunSession::new("iter", EditorContext::default())
            .with_timeout(Duration::from_millis(10));
        let err = session.handle_run(&service, Map::new()).await.unwrap_err();
        assert_eq!(err, RunError::Timeout);
        assert_eq!(session.status(), RunningStatus::Failed);
    }

    #[test]
    fn test_panel_flags() {
        let mut panel = PanelState::default();
        panel.show_single_run();
        panel.show_iteration_detail();
        panel.back_to_single_run();
        assert!(panel.show_single_run);
        assert!(!panel.show_iteration_detail);
        panel.show_iteration_detail();
        panel.hide_single_run();
        assert_eq!(panel, PanelState::default());
    }
}
