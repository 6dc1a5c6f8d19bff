//! Copy-on-write edits of an iteration's end conditions.
//!
//! Every function leaves its input untouched. Functions returning `Option`
//! yield `None` when the referenced condition (or sub-condition) does not
//! exist; callers treat that as a no-op.

use crate::domain::model::{
    CaseItem, Condition, ConditionPatch, ConditionValue, IterationConfig, SubCondition,
    SubConditionPatch, ValueSelector, VarType,
};

use super::catalog::default_operator;

/// Append a condition on `selector`, with the default operator for its type.
pub fn add_condition(
    config: &IterationConfig,
    condition_id: String,
    selector: ValueSelector,
    var_type: VarType,
    file_attribute_key: Option<&str>,
) -> IterationConfig {
    let mut next = config.clone();
    next.end_conditions.get_or_insert_with(Vec::new).push(Condition {
        id: condition_id,
        var_type,
        variable_selector: Some(selector),
        comparison_operator: Some(default_operator(var_type, file_attribute_key)),
        value: ConditionValue::default(),
        number_var_type: None,
        sub_variable_condition: None,
    });
    next
}

/// Merge `patch` into the condition. The operator is re-derived when the
/// type or the file attribute addressed by the selector changes and the
/// patch does not name one.
pub fn update_condition<F>(
    config: &IterationConfig,
    condition_id: &str,
    patch: &ConditionPatch,
    file_attribute_key: F,
) -> Option<IterationConfig>
where
    F: Fn(&ValueSelector) -> Option<String>,
{
    edit_condition(config, condition_id, |cond| {
        let old_key = cond.variable_selector.as_ref().and_then(&file_attribute_key);
        let old_type = cond.var_type;

        if let Some(var_type) = patch.var_type {
            cond.var_type = var_type;
        }
        if let Some(selector) = &patch.variable_selector {
            cond.variable_selector = Some(selector.clone());
        }
        if let Some(value) = &patch.value {
            cond.value = value.clone();
        }
        if let Some(number_var_type) = patch.number_var_type {
            cond.number_var_type = Some(number_var_type);
        }
        if let Some(group) = &patch.sub_variable_condition {
            cond.sub_variable_condition = Some(group.clone());
        }

        let new_key = cond.variable_selector.as_ref().and_then(&file_attribute_key);
        match patch.comparison_operator {
            Some(op) => cond.comparison_operator = Some(op),
            None if old_type != cond.var_type || old_key != new_key => {
                cond.comparison_operator =
                    Some(default_operator(cond.var_type, new_key.as_deref()));
            }
            None => {}
        }
        true
    })
}

pub fn remove_condition(config: &IterationConfig, condition_id: &str) -> Option<IterationConfig> {
    config.find_condition(condition_id)?;
    let mut next = config.clone();
    if let Some(conditions) = next.end_conditions.as_mut() {
        conditions.retain(|c| c.id != condition_id);
    }
    Some(next)
}

pub fn toggle_conditions_logical_operator(config: &IterationConfig) -> IterationConfig {
    let mut next = config.clone();
    next.end_condition_logical_operator = Some(config.logical_operator().toggled());
    next
}

/// Append a sub-condition on `key`. An existing group is kept as is.
pub fn add_sub_variable_condition(
    config: &IterationConfig,
    condition_id: &str,
    sub_condition_id: String,
    key: Option<&str>,
) -> Option<IterationConfig> {
    let key = key.unwrap_or_default();
    edit_condition(config, condition_id, |cond| {
        cond.sub_variable_condition
            .get_or_insert_with(CaseItem::default)
            .conditions
            .push(SubCondition {
                id: sub_condition_id,
                key: key.to_string(),
                var_type: VarType::String,
                comparison_operator: Some(default_operator(VarType::String, Some(key))),
                value: ConditionValue::default(),
                number_var_type: None,
            });
        true
    })
}

pub fn remove_sub_variable_condition(
    config: &IterationConfig,
    condition_id: &str,
    sub_condition_id: &str,
) -> Option<IterationConfig> {
    edit_condition(config, condition_id, |cond| {
        let Some(group) = cond.sub_variable_condition.as_mut() else {
            return false;
        };
        let before = group.conditions.len();
        group.conditions.retain(|s| s.id != sub_condition_id);
        group.conditions.len() != before
    })
}

pub fn update_sub_variable_condition(
    config: &IterationConfig,
    condition_id: &str,
    sub_condition_id: &str,
    patch: &SubConditionPatch,
) -> Option<IterationConfig> {
    edit_condition(config, condition_id, |cond| {
        let Some(sub) = cond
            .sub_variable_condition
            .as_mut()
            .and_then(|g| g.conditions.iter_mut().find(|s| s.id == sub_condition_id))
        else {
            return false;
        };
        let old_key = sub.key.clone();
        let old_type = sub.var_type;

        if let Some(key) = &patch.key {
            sub.key = key.clone();
        }
        if let Some(var_type) = patch.var_type {
            sub.var_type = var_type;
        }
        if let Some(value) = &patch.value {
            sub.value = value.clone();
        }
        if let Some(number_var_type) = patch.number_var_type {
            sub.number_var_type = Some(number_var_type);
        }

        match patch.comparison_operator {
            Some(op) => sub.comparison_operator = Some(op),
            None if old_key != sub.key || old_type != sub.var_type => {
                sub.comparison_operator =
                    Some(default_operator(sub.var_type, Some(sub.key.as_str())));
            }
            None => {}
        }
        true
    })
}

pub fn toggle_sub_variable_condition_logical_operator(
    config: &IterationConfig,
    condition_id: &str,
) -> Option<IterationConfig> {
    edit_condition(config, condition_id, |cond| {
        let Some(group) = cond.sub_variable_condition.as_mut() else {
            return false;
        };
        group.logical_operator = group.logical_operator.toggled();
        true
    })
}

/// Clone the config and apply `f` to the condition with `condition_id`.
/// `f` returns `false` when it found nothing to change.
fn edit_condition<F>(config: &IterationConfig, condition_id: &str, f: F) -> Option<IterationConfig>
where
    F: FnOnce(&mut Condition) -> bool,
{
    config.find_condition(condition_id)?;
    let mut next = config.clone();
    let cond = next
        .end_conditions
        .as_mut()?
        .iter_mut()
        .find(|c| c.id == condition_id)?;
    if f(cond) {
        Some(next)
    } else {
        None
    }
}
