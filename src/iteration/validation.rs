//! Diagnostics for an iteration configuration.
//!
//! Validation only reports; it never changes the configuration or blocks an
//! edit.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::config::EditorConfig;
use crate::domain::model::{IterationConfig, VarType};
use crate::scope::{ReferenceKind, VariableScope};

use super::output_type::filter_input_var;

/// Severity level of a validation diagnostic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiagnosticLevel {
    Error,
    Warning,
}

/// A single validation finding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Diagnostic {
    pub level: DiagnosticLevel,
    pub code: String,
    pub message: String,
    pub field_path: Option<String>,
}

/// Aggregated result of validating one iteration node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationReport {
    pub is_valid: bool,
    pub diagnostics: Vec<Diagnostic>,
}

impl ValidationReport {
    pub fn errors(&self) -> Vec<&Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.level == DiagnosticLevel::Error)
            .collect()
    }

    pub fn warnings(&self) -> Vec<&Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.level == DiagnosticLevel::Warning)
            .collect()
    }

    pub fn has_code(&self, code: &str) -> bool {
        self.diagnostics.iter().any(|d| d.code == code)
    }
}

pub fn validate(
    config: &IterationConfig,
    scope: &VariableScope,
    editor_config: &EditorConfig,
) -> ValidationReport {
    let mut diags = Vec::new();

    if config.iterator_selector.is_empty() {
        diags.push(error("E101", "Iterator input is not set", "iterator_selector"));
    } else {
        match scope.resolve(&config.iterator_selector) {
            None => diags.push(error(
                "E102",
                format!("Iterator input {} does not resolve", config.iterator_selector),
                "iterator_selector",
            )),
            Some(var) if var.var_type != VarType::Any && !filter_input_var(var.var_type) => {
                diags.push(warn(
                    "W103",
                    format!("Iterator input has type {}, expected an array", var.var_type),
                    "iterator_selector",
                ))
            }
            Some(_) => {}
        }
    }

    if config.output_selector.is_empty() {
        diags.push(warn("W104", "Output variable is not set", "output_selector"));
    } else if scope.resolve(&config.output_selector).is_none() {
        diags.push(error(
            "E105",
            format!("Output variable {} does not resolve", config.output_selector),
            "output_selector",
        ));
    }

    if config.is_parallel
        && (config.parallel_nums < 1 || config.parallel_nums > editor_config.max_parallel_limit)
    {
        diags.push(error(
            "E106",
            format!(
                "parallel_nums {} outside 1..={}",
                config.parallel_nums, editor_config.max_parallel_limit
            ),
            "parallel_nums",
        ));
    }

    let mut seen_ids = HashSet::new();
    for (idx, cond) in config.end_conditions().iter().enumerate() {
        let path = format!("end_conditions[{}]", idx);
        let broken = cond
            .variable_selector
            .as_ref()
            .map(|sel| scope.classify(sel) == ReferenceKind::Broken)
            .unwrap_or(true);
        if broken {
            diags.push(error(
                "E107",
                format!("Condition {} references an unknown variable", cond.id),
                format!("{}.variable_selector", path),
            ));
        }
        if cond.comparison_operator.is_none() {
            diags.push(warn(
                "W108",
                format!("Condition {} has no operator", cond.id),
                format!("{}.comparison_operator", path),
            ));
        }
        if !seen_ids.insert(cond.id.as_str()) {
            diags.push(error(
                "E109",
                format!("Duplicate condition id {}", cond.id),
                format!("{}.id", path),
            ));
        }

        let subs = cond
            .sub_variable_condition
            .as_ref()
            .map(|g| g.conditions.as_slice())
            .unwrap_or(&[]);
        for (sub_idx, sub) in subs.iter().enumerate() {
            let sub_path = format!("{}.sub_variable_condition.conditions[{}]", path, sub_idx);
            if sub.comparison_operator.is_none() {
                diags.push(warn(
                    "W108",
                    format!("Sub-condition {} has no operator", sub.id),
                    format!("{}.comparison_operator", sub_path),
                ));
            }
            if !seen_ids.insert(sub.id.as_str()) {
                diags.push(error(
                    "E109",
                    format!("Duplicate condition id {}", sub.id),
                    format!("{}.id", sub_path),
                ));
            }
        }
    }

    if config.end_condition_enabled() && config.end_conditions().is_empty() {
        diags.push(warn(
            "W110",
            "End conditions are enabled but none are defined",
            "end_conditions",
        ));
    }

    let is_valid = !diags.iter().any(|d| d.level == DiagnosticLevel::Error);
    ValidationReport {
        is_valid,
        diagnostics: diags,
    }
}

fn error(code: &str, message: impl Into<String>, field_path: impl Into<String>) -> Diagnostic {
    Diagnostic {
        level: DiagnosticLevel::Error,
        code: code.to_string(),
        message: message.into(),
        field_path: Some(field_path.into()),
    }
}

fn warn(code: &str, message: impl Into<String>, field_path: impl Into<String>) -> Diagnostic {
    Diagnostic {
        level: DiagnosticLevel::Warning,
        code: code.to_string(),
        message: message.into(),
        field_path: Some(field_path.into()),
    }
}
