use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{json, Map, Value};

use xworkflow_editor::domain::model::WorkflowNode;
use xworkflow_editor::{
    create_event_channel, EditorContext, EditorEvent, IterationConfigController, RunError,
    RunResult, RunningStatus, SingleRunResult, SingleRunService, VariableScope,
};

/// Records every call and answers after an optional delay.
#[derive(Default)]
struct RecordingService {
    calls: Mutex<Vec<(String, Map<String, Value>)>>,
    stops: Mutex<Vec<String>>,
    delay: Option<Duration>,
    fail_with: Option<String>,
}

#[async_trait]
impl SingleRunService for RecordingService {
    async fn run(&self, node_id: &str, inputs: Map<String, Value>) -> RunResult<SingleRunResult> {
        self.calls.lock().push((node_id.to_string(), inputs.clone()));
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        match &self.fail_with {
            Some(message) => Err(RunError::ServiceError(message.clone())),
            None => Ok(SingleRunResult {
                outputs: json!({"output": ["done"]}),
                iterations: vec![json!({"index": 0})],
                elapsed_ms: Some(1),
            }),
        }
    }

    async fn stop(&self, node_id: &str) -> RunResult<()> {
        self.stops.lock().push(node_id.to_string());
        Ok(())
    }
}

fn scope() -> VariableScope {
    VariableScope::new("iter")
        .with_before_nodes(vec![
            WorkflowNode::new("start", "start", json!({"title": "Start"})),
            WorkflowNode::new("nodeA", "template-transform", json!({"title": "Node A"})),
        ])
        .with_iteration_children(vec![WorkflowNode::new(
            "inner",
            "code",
            json!({"title": "Inner", "variables": [
                {"variable": "input_text", "value_selector": ["nodeA", "output"]},
                {"variable": "item", "value_selector": ["iter", "item"]}
            ]}),
        )
        .inside("iter")])
}

fn controller(ctx: EditorContext) -> IterationConfigController {
    IterationConfigController::create("iter", scope(), ctx)
}

#[test]
fn test_expansion_uses_consuming_node_key() {
    let mut c = controller(EditorContext::default());
    let vars: Vec<&str> = c.used_out_vars().iter().map(|v| v.variable.as_str()).collect();
    assert_eq!(vars, vec!["nodeA.output"]);
    assert_eq!(c.used_out_vars()[0].label.node_name.as_deref(), Some("Node A"));

    let mut values = Map::new();
    values.insert("nodeA.output".into(), json!("v"));
    c.set_input_var_values(values);
    c.set_iterator(vec![json!("a"), json!("b")]);

    let inputs = c.run_inputs();
    let mut expected = Map::new();
    expected.insert("inner.input_text".into(), json!("v"));
    expected.insert("iter.input_selector".into(), json!(["a", "b"]));
    assert_eq!(inputs, expected);
}

#[test]
fn test_form_keeps_iterator_when_values_change() {
    let mut c = controller(EditorContext::default());
    c.set_iterator(vec![json!("x")]);
    c.set_input_var_values(Map::new());
    assert_eq!(c.iterator(), &[json!("x")]);
    assert!(c.input_var_values().is_empty());
}

#[tokio::test]
async fn test_run_succeeds_and_reports_events() {
    let (tx, mut rx) = create_event_channel();
    let mut c = controller(EditorContext::default().with_event_tx(tx));
    c.set_iterator(vec![json!("a")]);
    let service = RecordingService::default();

    let result = c.handle_run(&service).await.unwrap();
    assert_eq!(result.iterations.len(), 1);
    assert_eq!(c.running_status(), RunningStatus::Succeeded);
    assert_eq!(c.run_result(), Some(result));

    let calls = service.calls.lock();
    assert_eq!(calls[0].0, "iter");
    assert_eq!(calls[0].1["iter.input_selector"], json!(["a"]));
    assert_eq!(calls[0].1["inner.input_text"], Value::Null);

    let mut statuses = Vec::new();
    while let Ok(event) = rx.try_recv() {
        if let EditorEvent::RunStatusChanged { status, .. } = event {
            statuses.push(status);
        }
    }
    assert_eq!(statuses, vec![RunningStatus::Running, RunningStatus::Succeeded]);
}

#[tokio::test]
async fn test_run_failure_is_not_retried() {
    let c = controller(EditorContext::default());
    let service = RecordingService {
        fail_with: Some("sandbox unavailable".into()),
        ..Default::default()
    };
    let err = c.handle_run(&service).await.unwrap_err();
    assert_eq!(err, RunError::ServiceError("sandbox unavailable".into()));
    assert_eq!(c.running_status(), RunningStatus::Failed);
    assert_eq!(service.calls.lock().len(), 1);
}

#[tokio::test]
async fn test_stop_while_running() {
    let c = controller(EditorContext::default());
    let service = Arc::new(RecordingService {
        delay: Some(Duration::from_millis(200)),
        ..Default::default()
    });
    let session = c.session();

    let run_session = session.clone();
    let run_service = service.clone();
    let run = tokio::spawn(async move {
        run_session
            .handle_run(run_service.as_ref(), Map::new())
            .await
    });

    while session.status() != RunningStatus::Running {
        tokio::task::yield_now().await;
    }
    c.handle_stop(service.as_ref()).await.unwrap();

    assert_eq!(run.await.unwrap().unwrap_err(), RunError::Stopped);
    assert_eq!(c.running_status(), RunningStatus::Stopped);
    assert!(c.run_result().is_none());
    assert_eq!(service.stops.lock().as_slice(), ["iter".to_string()]);
}
