use async_trait::async_trait;
use serde_json::{json, Map, Value};

use xworkflow_editor::domain::model::{ConditionPatch, ValueSelector, VarType};
use xworkflow_editor::{
    create_event_channel, parse_graph, DslFormat, EditorContext, EditorEvent, EditorResult,
    IterationConfigController, RunResult, SingleRunResult, SingleRunService,
};

/// Echoes the expanded inputs back, one iteration per iterator item.
struct EchoRunService;

#[async_trait]
impl SingleRunService for EchoRunService {
    async fn run(&self, _node_id: &str, inputs: Map<String, Value>) -> RunResult<SingleRunResult> {
        let iterations = inputs
            .get("iteration_1.input_selector")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();
        Ok(SingleRunResult {
            outputs: Value::Object(inputs),
            iterations,
            elapsed_ms: Some(0),
        })
    }

    async fn stop(&self, _node_id: &str) -> RunResult<()> {
        Ok(())
    }
}

#[tokio::main]
async fn main() -> EditorResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    println!("=== XWorkflow Editor: iteration node ===\n");

    let yaml = r#"
nodes:
  - id: start
    data:
      type: start
      title: Start
      variables:
        - variable: topics
          type: paragraph
        - variable: docs
          type: file-list
  - id: splitter
    data:
      type: code
      title: Split Topics
      outputs:
        parts:
          type: "array[string]"
  - id: iteration_1
    data:
      type: iteration
      title: For Each Topic
      start_node_id: iteration_1start
      iterator_selector: [splitter, parts]
  - id: iteration_1start
    parentId: iteration_1
    data:
      type: iteration-start
      isInIteration: true
  - id: writer
    parentId: iteration_1
    data:
      type: llm
      title: Writer
      isInIteration: true
      iteration_id: iteration_1
      prompt_template:
        - role: user
          text: "Write about {{#iteration_1.item#}} for {{#sys.user_id#}} using {{#start.topics#}}"
edges:
  - source: start
    target: splitter
  - source: splitter
    target: iteration_1
  - source: iteration_1start
    target: writer
"#;

    let graph = parse_graph(yaml, DslFormat::Yaml)?;
    println!(
        "[OK] Graph parsed ({} nodes, {} edges)",
        graph.nodes.len(),
        graph.edges.len()
    );

    let (tx, mut rx) = create_event_channel();
    let ctx = EditorContext::default().with_event_tx(tx);
    let mut iteration = IterationConfigController::from_graph(&graph, "iteration_1", ctx)?;

    iteration.select_output(ValueSelector::from(["writer", "text"]));
    iteration.change_parallel(true);
    iteration.change_parallel_nums(4);
    let topics = ValueSelector::from(["start", "topics"]);
    if let Some(id) = iteration.add_condition(topics, VarType::String) {
        iteration.update_condition(
            &id,
            ConditionPatch {
                value: Some("stop".into()),
                ..Default::default()
            },
        );
    }
    iteration.set_enable_end_condition(true);

    let report = iteration.validate();
    println!(
        "[OK] Validation: {} error(s), {} warning(s)",
        report.errors().len(),
        report.warnings().len()
    );

    println!("\n--- Single-run form ---");
    for input in iteration.used_out_vars() {
        println!(
            "  {} ({} / {})",
            input.variable,
            input.label.node_name.as_deref().unwrap_or("-"),
            input.label.variable
        );
    }

    let mut values = Map::new();
    values.insert("sys.user_id".to_string(), json!("user-42"));
    values.insert("start.topics".to_string(), json!("rust, tokio"));
    iteration.set_input_var_values(values);
    iteration.set_iterator(vec![json!("rust"), json!("tokio")]);

    let result = iteration.handle_run(&EchoRunService).await?;
    println!("\n--- Run ({:?}) ---", iteration.running_status());
    println!("{}", serde_json::to_string_pretty(&result.outputs)?);

    println!("\n--- Draft ---");
    println!("{}", serde_json::to_string_pretty(&iteration.snapshot()?)?);

    let mut changes = 0;
    while let Ok(event) = rx.try_recv() {
        if matches!(event, EditorEvent::ConfigChanged { .. }) {
            changes += 1;
        }
    }
    println!("\n[OK] {} config change event(s) emitted", changes);
    Ok(())
}
