//! Output formatting helpers for CLI commands

use crate::logging::{action_summary, condition_summary};
use crate::reconcile::{Plan, RuleState};
use crate::remote::RemoteRule;
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Cell, ContentArrangement, Table};
use serde_json::json;

const REDACTED: &str = "<redacted>";

/// View model for rule display
#[derive(Debug, Clone, serde::Serialize)]
pub struct RuleView {
    pub rule_arn: String,
    pub priority: String,
    pub is_default: bool,
    pub actions: String,
    pub conditions: String,
}

impl From<&RemoteRule> for RuleView {
    fn from(rule: &RemoteRule) -> Self {
        Self {
            rule_arn: rule.rule_arn.clone(),
            priority: rule.priority.to_string(),
            is_default: rule.is_default,
            actions: action_summary(&rule.actions),
            conditions: condition_summary(&rule.conditions),
        }
    }
}

/// Format rules as a table
pub fn format_rules_table(rules: &[RuleView]) -> String {
    if rules.is_empty() {
        return "No rules found".to_string();
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Priority", "Rule ARN", "Actions", "Conditions"]);

    for r in rules {
        let priority = if r.is_default {
            r.priority.dimmed().to_string()
        } else {
            r.priority.clone()
        };

        table.add_row(vec![
            Cell::new(priority),
            Cell::new(&r.rule_arn),
            Cell::new(&r.actions),
            Cell::new(if r.conditions.is_empty() { "-" } else { r.conditions.as_str() }),
        ]);
    }

    table.to_string()
}

/// Format rules as JSON
pub fn format_rules_json(rules: &[RuleView]) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(&json!({ "rules": rules }))?)
}

/// Human summary of an applied rule.
pub fn format_state(state: &RuleState, verb: &str) -> String {
    let actions: Vec<&str> = state
        .spec
        .actions
        .iter()
        .map(|a| a.action_type.as_str())
        .collect();
    let conditions: Vec<String> = state
        .spec
        .conditions
        .iter()
        .flat_map(|c| c.populated_slots())
        .map(|f| f.to_string())
        .collect();

    let mut output = format!("{} Rule {}: {}\n", "✓".green(), verb, state.rule_arn);
    output.push_str(&format!("  Listener:   {}\n", state.listener_arn));
    output.push_str(&format!("  Priority:   {}\n", state.priority));
    output.push_str(&format!("  Actions:    {}\n", actions.join(", ")));
    output.push_str(&format!(
        "  Conditions: {}",
        if conditions.is_empty() {
            "-".to_string()
        } else {
            conditions.join(", ")
        }
    ));
    output
}

/// Rule state as JSON with OIDC client secrets masked.
pub fn format_state_json(state: &RuleState) -> anyhow::Result<String> {
    let mut state = state.clone();
    for action in &mut state.spec.actions {
        if let Some(oidc) = action.authenticate_oidc.as_mut() {
            if !oidc.client_secret.is_empty() {
                oidc.client_secret = REDACTED.to_string();
            }
        }
    }
    Ok(serde_json::to_string_pretty(&state)?)
}

/// Describe what an update would change.
pub fn format_plan(plan: &Plan) -> String {
    let changes = &plan.changes;
    let mut output = format!("Rule {}\n", plan.current.rule_arn);

    if changes.listener_changed {
        output.push_str(&format!(
            "  {} listener_arn changed (requires replacement)\n",
            "!".red()
        ));
    }
    if changes.is_empty() {
        output.push_str(&format!("  {}", "No changes".green()));
        return output;
    }

    if let Some(priority) = changes.priority {
        output.push_str(&format!(
            "  {} priority: {} -> {}\n",
            "~".yellow(),
            plan.current.priority,
            priority
        ));
    }
    for path in &changes.paths {
        output.push_str(&format!("  {} {}\n", "~".yellow(), path));
    }

    let mut parts = Vec::new();
    if changes.priority.is_some() {
        parts.push("priority");
    }
    if changes.actions {
        parts.push("actions");
    }
    if changes.conditions {
        parts.push("conditions");
    }
    if !parts.is_empty() {
        output.push_str(&format!("Would update: {}", parts.join(", ")));
    }
    output.trim_end().to_string()
}
