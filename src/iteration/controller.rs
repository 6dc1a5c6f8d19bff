//! Editing controller of one iteration node.
//!
//! The controller owns the node's configuration behind an `Arc`. Every
//! mutation builds a new [`IterationConfig`], swaps the pointer and emits
//! [`EditorEvent::ConfigChanged`](crate::core::event_bus::EditorEvent) so a
//! draft syncer can persist it. Readers holding an older `Arc` keep seeing
//! the old value.

use std::sync::Arc;

use serde_json::{Map, Value};

use crate::condition::edit;
use crate::core::runtime_context::EditorContext;
use crate::domain::execution::{RunningStatus, SingleRunResult};
use crate::domain::model::{
    ConditionPatch, IterationConfig, IterationErrorMode, SubConditionPatch, ValueSelector,
    VarType,
};
use crate::dsl::{sanitize_draft, WorkflowGraph};
use crate::error::{EditorResult, RunResult};
use crate::graph::scope_for_iteration;
use crate::scope::{to_node_output_vars, NodeOutputVars, ResolvedVariable, VariableScope};
use crate::single_run::{
    InputVar, PanelState, RunInputForm, RunInputMapper, SingleRunService, SingleRunSession,
};

use super::output_type::{filter_input_var, promote};
use super::validation::{validate, ValidationReport};

pub struct IterationConfigController {
    node_id: String,
    config: Arc<IterationConfig>,
    scope: VariableScope,
    ctx: EditorContext,
    read_only: bool,
    mapper: RunInputMapper,
    form: RunInputForm,
    session: SingleRunSession,
    panel: PanelState,
}

impl IterationConfigController {
    pub fn new(
        node_id: impl Into<String>,
        config: IterationConfig,
        mut scope: VariableScope,
        ctx: EditorContext,
    ) -> Self {
        let node_id = node_id.into();
        scope.iteration_node_id = node_id.clone();
        scope.refresh_item_type(&config.iterator_selector);
        let mapper = RunInputMapper::build(&scope, &ctx.config.iterator_input_key_suffix);
        let form = RunInputForm::new(mapper.iterator_key());
        let session = SingleRunSession::new(node_id.clone(), ctx.clone());
        Self {
            node_id,
            config: Arc::new(config),
            scope,
            ctx,
            read_only: false,
            mapper,
            form,
            session,
            panel: PanelState::default(),
        }
    }

    /// Controller for a freshly dropped iteration node.
    pub fn create(node_id: impl Into<String>, scope: VariableScope, ctx: EditorContext) -> Self {
        let node_id = node_id.into();
        let config = IterationConfig {
            start_node_id: format!("{}start", node_id),
            parallel_nums: ctx.config.clamp_parallel_nums(ctx.config.default_parallel_nums),
            ..Default::default()
        };
        Self::new(node_id, config, scope, ctx)
    }

    /// Controller for the iteration node `node_id` of a loaded graph.
    pub fn from_graph(
        graph: &WorkflowGraph,
        node_id: &str,
        ctx: EditorContext,
    ) -> EditorResult<Self> {
        let config = graph.iteration_config(node_id)?;
        let scope = scope_for_iteration(graph, node_id)?;
        Ok(Self::new(node_id, config, scope, ctx))
    }

    pub fn with_read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    pub fn set_read_only(&mut self, read_only: bool) {
        self.read_only = read_only;
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    pub fn node_id(&self) -> &str {
        &self.node_id
    }

    /// Current configuration. Cheap to clone and never mutated in place.
    pub fn config(&self) -> Arc<IterationConfig> {
        self.config.clone()
    }

    pub fn scope(&self) -> &VariableScope {
        &self.scope
    }

    /// Replace the scope after the surrounding graph changed. Form values
    /// are kept.
    pub fn set_scope(&mut self, mut scope: VariableScope) {
        scope.iteration_node_id = self.node_id.clone();
        scope.refresh_item_type(&self.config.iterator_selector);
        self.mapper = RunInputMapper::build(&scope, &self.ctx.config.iterator_input_key_suffix);
        self.scope = scope;
    }

    pub fn resolve(&self, selector: &ValueSelector) -> Option<ResolvedVariable> {
        self.scope.resolve(selector)
    }

    pub fn validate(&self) -> ValidationReport {
        validate(&self.config, &self.scope, &self.ctx.config)
    }

    /// Serialisable draft of the configuration, without UI-only fields.
    pub fn snapshot(&self) -> EditorResult<Value> {
        let value = serde_json::to_value(self.config.as_ref())?;
        Ok(sanitize_draft(value))
    }

    // ================================
    // Iterator / output / settings
    // ================================

    pub fn set_iterator_selector(&mut self, selector: ValueSelector) {
        if self.is_locked("set_iterator_selector") {
            return;
        }
        self.scope.refresh_item_type(&selector);
        let mut next = self.config.as_ref().clone();
        next.iterator_selector = selector;
        self.commit(next, "set_iterator_selector");
    }

    /// Whether a variable may be picked as the iterator input.
    pub fn filter_input_var(&self, var_type: VarType) -> bool {
        filter_input_var(var_type)
    }

    /// Set the output selector; `output_type` follows `resolved_type`.
    pub fn set_output_selector(&mut self, selector: ValueSelector, resolved_type: Option<VarType>) {
        if self.is_locked("set_output_selector") {
            return;
        }
        let mut next = self.config.as_ref().clone();
        next.output_type = promote(resolved_type);
        next.output_selector = selector;
        self.commit(next, "set_output_selector");
    }

    /// Set the output selector, typing it through the scope.
    pub fn select_output(&mut self, selector: ValueSelector) {
        let resolved = self.scope.resolve(&selector).map(|v| v.var_type);
        self.set_output_selector(selector, resolved);
    }

    /// Outputs of the nodes inside the iteration, for the output picker.
    pub fn children_node_vars(&self) -> Vec<NodeOutputVars> {
        to_node_output_vars(&self.scope.iteration_children)
    }

    pub fn change_parallel(&mut self, is_parallel: bool) {
        if self.is_locked("change_parallel") {
            return;
        }
        let mut next = self.config.as_ref().clone();
        next.is_parallel = is_parallel;
        self.commit(next, "change_parallel");
    }

    pub fn change_parallel_nums(&mut self, parallel_nums: u32) {
        if self.is_locked("change_parallel_nums") {
            return;
        }
        let clamped = self.ctx.config.clamp_parallel_nums(parallel_nums);
        if clamped != parallel_nums {
            tracing::debug!(
                node_id = %self.node_id,
                requested = parallel_nums,
                clamped,
                "parallel_nums clamped"
            );
        }
        let mut next = self.config.as_ref().clone();
        next.parallel_nums = clamped;
        self.commit(next, "change_parallel_nums");
    }

    pub fn change_error_handle_mode(&mut self, mode: IterationErrorMode) {
        if self.is_locked("change_error_handle_mode") {
            return;
        }
        let mut next = self.config.as_ref().clone();
        next.error_handle_mode = mode;
        self.commit(next, "change_error_handle_mode");
    }

    pub fn set_enable_end_condition(&mut self, enabled: bool) {
        if self.is_locked("set_enable_end_condition") {
            return;
        }
        let mut next = self.config.as_ref().clone();
        next.enable_end_condition = Some(enabled);
        self.commit(next, "set_enable_end_condition");
    }

    // ================================
    // End conditions
    // ================================

    /// Add a condition on `selector`; returns the new condition's id.
    pub fn add_condition(&mut self, selector: ValueSelector, var_type: VarType) -> Option<String> {
        if self.is_locked("add_condition") {
            return None;
        }
        let id = self.ctx.next_id();
        let key = self.scope.file_attribute_key(&selector);
        let next =
            edit::add_condition(&self.config, id.clone(), selector, var_type, key.as_deref());
        self.commit(next, "add_condition");
        Some(id)
    }

    pub fn update_condition(&mut self, condition_id: &str, patch: ConditionPatch) {
        if self.is_locked("update_condition") {
            return;
        }
        let scope = &self.scope;
        let next = edit::update_condition(&self.config, condition_id, &patch, |sel| {
            scope.file_attribute_key(sel)
        });
        self.commit_or_skip(next, "update_condition", condition_id);
    }

    pub fn remove_condition(&mut self, condition_id: &str) {
        if self.is_locked("remove_condition") {
            return;
        }
        let next = edit::remove_condition(&self.config, condition_id);
        self.commit_or_skip(next, "remove_condition", condition_id);
    }

    pub fn toggle_conditions_logical_operator(&mut self) {
        if self.is_locked("toggle_conditions_logical_operator") {
            return;
        }
        let next = edit::toggle_conditions_logical_operator(&self.config);
        self.commit(next, "toggle_conditions_logical_operator");
    }

    /// Add a sub-condition on attribute `key`; returns the new sub-condition's id.
    pub fn add_sub_variable_condition(
        &mut self,
        condition_id: &str,
        key: Option<&str>,
    ) -> Option<String> {
        if self.is_locked("add_sub_variable_condition") {
            return None;
        }
        let id = self.ctx.next_id();
        let next = edit::add_sub_variable_condition(&self.config, condition_id, id.clone(), key);
        let added = next.is_some();
        self.commit_or_skip(next, "add_sub_variable_condition", condition_id);
        added.then_some(id)
    }

    pub fn remove_sub_variable_condition(&mut self, condition_id: &str, sub_condition_id: &str) {
        if self.is_locked("remove_sub_variable_condition") {
            return;
        }
        let next =
            edit::remove_sub_variable_condition(&self.config, condition_id, sub_condition_id);
        self.commit_or_skip(next, "remove_sub_variable_condition", sub_condition_id);
    }

    pub fn update_sub_variable_condition(
        &mut self,
        condition_id: &str,
        sub_condition_id: &str,
        patch: SubConditionPatch,
    ) {
        if self.is_locked("update_sub_variable_condition") {
            return;
        }
        let next = edit::update_sub_variable_condition(
            &self.config,
            condition_id,
            sub_condition_id,
            &patch,
        );
        self.commit_or_skip(next, "update_sub_variable_condition", sub_condition_id);
    }

    pub fn toggle_sub_variable_condition_logical_operator(&mut self, condition_id: &str) {
        if self.is_locked("toggle_sub_variable_condition_logical_operator") {
            return;
        }
        let next = edit::toggle_sub_variable_condition_logical_operator(&self.config, condition_id);
        self.commit_or_skip(next, "toggle_sub_variable_condition_logical_operator", condition_id);
    }

    // ================================
    // Single run
    // ================================

    pub fn iterator_input_key(&self) -> &str {
        self.mapper.iterator_key()
    }

    pub fn used_out_vars(&self) -> &[InputVar] {
        self.mapper.used_out_vars()
    }

    pub fn input_var_values(&self) -> Map<String, Value> {
        self.form.input_var_values()
    }

    pub fn set_input_var_values(&mut self, values: Map<String, Value>) {
        self.form.set_input_var_values(values);
    }

    pub fn iterator(&self) -> &[Value] {
        self.form.iterator()
    }

    pub fn set_iterator(&mut self, items: Vec<Value>) {
        self.form.set_iterator(items);
    }

    /// Inputs the run service receives for the current form.
    pub fn run_inputs(&self) -> Map<String, Value> {
        self.mapper.expand(self.form.values())
    }

    pub async fn handle_run(&self, service: &dyn SingleRunService) -> RunResult<SingleRunResult> {
        self.session.handle_run(service, self.run_inputs()).await
    }

    pub async fn handle_stop(&self, service: &dyn SingleRunService) -> RunResult<()> {
        self.session.handle_stop(service).await
    }

    /// Shared handle on the run session, e.g. to stop from another task.
    pub fn session(&self) -> SingleRunSession {
        self.session.clone()
    }

    pub fn running_status(&self) -> RunningStatus {
        self.session.status()
    }

    pub fn run_result(&self) -> Option<SingleRunResult> {
        self.session.result()
    }

    pub fn panel(&self) -> PanelState {
        self.panel
    }

    pub fn show_single_run(&mut self) {
        self.panel.show_single_run();
    }

    pub fn hide_single_run(&mut self) {
        self.panel.hide_single_run();
    }

    pub fn show_iteration_detail(&mut self) {
        self.panel.show_iteration_detail();
    }

    pub fn hide_iteration_detail(&mut self) {
        self.panel.hide_iteration_detail();
    }

    pub fn back_to_single_run(&mut self) {
        self.panel.back_to_single_run();
    }

    fn is_locked(&self, action: &str) -> bool {
        if self.read_only {
            tracing::debug!(node_id = %self.node_id, action, "ignored edit on read-only node");
        }
        self.read_only
    }

    fn commit(&mut self, next: IterationConfig, action: &str) {
        self.config = Arc::new(next);
        tracing::debug!(node_id = %self.node_id, action, "iteration config updated");
        self.ctx.emit_config_changed(&self.node_id, &self.config);
    }

    fn commit_or_skip(&mut self, next: Option<IterationConfig>, action: &str, target_id: &str) {
        match next {
            Some(next) => self.commit(next, action),
            None => tracing::debug!(
                node_id = %self.node_id,
                action,
                target_id,
                "no matching condition, edit skipped"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::event_bus::{create_event_channel, EditorEvent};
    use crate::core::runtime_context::FakeIdGenerator;
    use crate::domain::model::{ComparisonOperator, WorkflowNode};
    use serde_json::json;

    fn scope() -> VariableScope {
        VariableScope::new("iter")
            .with_before_nodes(vec![WorkflowNode::new(
                "start",
                "start",
                json!({"title": "Start", "variables": [
                    {"variable": "docs", "type": "file-list"},
                    {"variable": "doc", "type": "file"}
                ]}),
            )])
            .with_iteration_children(vec![WorkflowNode::new(
                "inner",
                "code",
                json!({"title": "Inner", "outputs": {"result": {"type": "number"}}}),
            )
            .inside("iter")])
    }

    fn ctx() -> EditorContext {
        EditorContext::default().with_id_generator(Arc::new(FakeIdGenerator::new("id")))
    }

    fn controller() -> IterationConfigController {
        IterationConfigController::create("iter", scope(), ctx())
    }

    #[test]
    fn test_create_uses_configured_defaults() {
        let c = controller();
        assert_eq!(c.config().parallel_nums, 10);
        assert_eq!(c.config().start_node_id, "iterstart");
        assert_eq!(c.iterator_input_key(), "iter.input_selector");
        assert_eq!(c.iterator(), &[json!("")]);
    }

    #[test]
    fn test_mutations_are_copy_on_write() {
        let mut c = controller();
        let before = c.config();
        c.set_iterator_selector(ValueSelector::from(["start", "docs"]));
        assert!(before.iterator_selector.is_empty());
        assert_eq!(c.config().iterator_selector, ValueSelector::from(["start", "docs"]));
        assert_eq!(c.scope().item_type, VarType::File);
    }

    #[test]
    fn test_select_output_promotes_type() {
        let mut c = controller();
        c.select_output(ValueSelector::from(["inner", "result"]));
        assert_eq!(c.config().output_type, VarType::ArrayNumber);
        c.set_output_selector(ValueSelector::from(["inner", "x"]), None);
        assert_eq!(c.config().output_type, VarType::ArrayString);
        assert_eq!(c.children_node_vars()[0].node_id, "inner");
    }

    #[test]
    fn test_parallel_nums_clamped() {
        let mut c = controller();
        c.change_parallel(true);
        c.change_parallel_nums(0);
        assert_eq!(c.config().parallel_nums, 1);
        c.change_parallel_nums(99);
        assert_eq!(c.config().parallel_nums, 10);
        c.change_error_handle_mode(IterationErrorMode::ContinueOnError);
        assert_eq!(c.config().error_handle_mode, IterationErrorMode::ContinueOnError);
    }

    #[test]
    fn test_condition_ids_and_file_attribute_default() {
        let mut c = controller();
        let first = c.add_condition(ValueSelector::from(["start", "doc", "size"]), VarType::Number);
        assert_eq!(first.as_deref(), Some("id-0"));
        let cond = c.config().find_condition("id-0").cloned().unwrap();
        assert_eq!(cond.comparison_operator, Some(ComparisonOperator::GreaterThan));

        let sub = c.add_sub_variable_condition("id-0", Some("name"));
        assert_eq!(sub.as_deref(), Some("id-1"));
        assert!(c.add_sub_variable_condition("ghost", None).is_none());
    }

    #[test]
    fn test_read_only_ignores_edits() {
        let mut c = controller().with_read_only(true);
        let before = c.config();
        c.set_iterator_selector(ValueSelector::from(["start", "docs"]));
        assert!(c
            .add_condition(ValueSelector::from(["start", "docs"]), VarType::ArrayFile)
            .is_none());
        c.toggle_conditions_logical_operator();
        assert!(Arc::ptr_eq(&before, &c.config()));
    }

    #[test]
    fn test_stale_id_emits_nothing() {
        let (tx, mut rx) = create_event_channel();
        let mut c = IterationConfigController::create("iter", scope(), ctx().with_event_tx(tx));
        let before = c.config();
        c.remove_condition("ghost");
        c.update_condition("ghost", ConditionPatch::default());
        assert!(Arc::ptr_eq(&before, &c.config()));
        assert!(rx.try_recv().is_err());

        c.change_parallel(true);
        match rx.try_recv().unwrap() {
            EditorEvent::ConfigChanged { node_id, config, .. } => {
                assert_eq!(node_id, "iter");
                assert!(config.is_parallel);
            }
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[test]
    fn test_snapshot_strips_ui_fields() {
        let mut config = IterationConfig::default();
        config.extra.insert("_isShowTips".into(), json!(true));
        config.extra.insert("title".into(), json!("Loop"));
        config.iterator_selector = ValueSelector::from(["start_query", "query"]);
        let c = IterationConfigController::new("iter", config, scope(), ctx());
        let snapshot = c.snapshot().unwrap();
        assert!(snapshot.get("_isShowTips").is_none());
        assert_eq!(snapshot["title"], json!("Loop"));
        assert_eq!(snapshot["iterator_selector"], json!(["sys", "query"]));
    }

    #[test]
    fn test_panel_via_controller() {
        let mut c = controller();
        c.show_single_run();
        c.show_iteration_detail();
        c.hide_single_run();
        assert_eq!(c.panel(), PanelState::default());
    }
}
