//! Drift between a desired rule and the observed one
//!
//! Both rules are rendered to a canonical JSON tree (effective action
//! orders, actions sorted by order, condition and value sets sorted) and
//! walked side by side. Every differing leaf becomes a [`FieldPath`]; paths
//! the [`RelevanceGate`] rejects are dropped.

use super::RelevanceGate;
use crate::model::{DeclaredAction, DeclaredCondition, FieldPath, RuleSpec, Segment};
use crate::translate::effective_order;
use serde_json::{json, Value};
use std::collections::BTreeSet;

/// What a reconcile-update has to change on the remote rule.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleChanges {
    /// The listener differs; rules cannot move between listeners
    pub listener_changed: bool,
    /// New priority when an explicitly declared priority differs
    pub priority: Option<u32>,
    /// Some relevant action field differs
    pub actions: bool,
    /// Some condition differs
    pub conditions: bool,
    /// Relevant changed paths, for reporting
    pub paths: Vec<FieldPath>,
}

impl RuleChanges {
    pub fn is_empty(&self) -> bool {
        !self.listener_changed && self.priority.is_none() && !self.actions && !self.conditions
    }
}

/// Compute the relevant changes that turn `observed` into `desired`.
///
/// Discriminants are read from the desired rule: the declared `type` decides
/// which sibling block is live.
pub fn plan_changes(desired: &RuleSpec, observed: &RuleSpec, gate: &RelevanceGate) -> RuleChanges {
    let desired_tree = canonical_tree(desired);
    let observed_tree = canonical_tree(observed);

    let mut changed = Vec::new();
    diff_values(FieldPath::root(), &desired_tree, &observed_tree, &mut changed);

    let paths: Vec<FieldPath> = changed
        .into_iter()
        .filter(|path| {
            let discriminant = gate
                .discriminant_path(path)
                .and_then(|dp| lookup(&desired_tree, &dp))
                .and_then(Value::as_str);
            gate.is_relevant(path, discriminant)
        })
        .collect();

    let touches = |root: &str| paths.iter().any(|p| p.field_at(0) == Some(root));

    let priority = match desired.priority {
        Some(p) if observed.priority != Some(p) => Some(p),
        _ => None,
    };

    RuleChanges {
        listener_changed: desired.listener_arn != observed.listener_arn,
        priority,
        actions: touches("action"),
        conditions: touches("condition"),
        paths,
    }
}

fn canonical_tree(spec: &RuleSpec) -> Value {
    json!({
        "action": canonical_actions(&spec.actions),
        "condition": canonical_conditions(&spec.conditions),
    })
}

fn canonical_actions(actions: &[DeclaredAction]) -> Value {
    let mut ordered: Vec<DeclaredAction> = actions
        .iter()
        .enumerate()
        .map(|(position, action)| {
            let mut action = action.clone();
            action.order = effective_order(position, action.order);
            action
        })
        .collect();
    ordered.sort_by_key(|action| action.order);
    serde_json::to_value(ordered).unwrap_or(Value::Null)
}

fn canonical_conditions(conditions: &[DeclaredCondition]) -> Value {
    let mut rendered: Vec<Value> = conditions
        .iter()
        .map(|condition| {
            let mut condition = condition.clone();
            for block in [
                condition.host_header.as_mut(),
                condition.http_request_method.as_mut(),
                condition.path_pattern.as_mut(),
                condition.source_ip.as_mut(),
            ]
            .into_iter()
            .flatten()
            {
                block.values.sort();
            }
            if let Some(header) = condition.http_header.as_mut() {
                header.values.sort();
            }
            for pair in condition.query_string.iter_mut() {
                if pair.key.as_deref() == Some("") {
                    pair.key = None;
                }
            }
            condition.query_string.sort();
            serde_json::to_value(condition).unwrap_or(Value::Null)
        })
        .collect();
    rendered.sort_by_key(|value| value.to_string());
    Value::Array(rendered)
}

fn diff_values(path: FieldPath, desired: &Value, observed: &Value, out: &mut Vec<FieldPath>) {
    match (desired, observed) {
        (Value::Object(a), Value::Object(b)) => {
            let keys: BTreeSet<&String> = a.keys().chain(b.keys()).collect();
            for key in keys {
                diff_values(
                    path.clone().field(key.as_str()),
                    a.get(key).unwrap_or(&Value::Null),
                    b.get(key).unwrap_or(&Value::Null),
                    out,
                );
            }
        }
        (Value::Array(a), Value::Array(b)) => {
            for i in 0..a.len().max(b.len()) {
                diff_values(
                    path.clone().index(i),
                    a.get(i).unwrap_or(&Value::Null),
                    b.get(i).unwrap_or(&Value::Null),
                    out,
                );
            }
        }
        (a, b) if a != b => out.push(path),
        _ => {}
    }
}

fn lookup<'a>(tree: &'a Value, path: &FieldPath) -> Option<&'a Value> {
    path.segments()
        .iter()
        .try_fold(tree, |node, segment| match segment {
            Segment::Field(name) => node.get(name.as_str()),
            Segment::Index(i) => node.get(*i),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        ActionType, ForwardConfig, RedirectConfig, RedirectStatus, TargetGroupTuple,
    };

    const LISTENER: &str = "arn:aws:elasticloadbalancing:us-east-1:1:listener/app/web/1/2";

    fn rule(actions: Vec<DeclaredAction>, conditions: Vec<DeclaredCondition>) -> RuleSpec {
        RuleSpec {
            actions,
            conditions,
            ..RuleSpec::new(LISTENER)
        }
    }

    fn redirect_with_forward(arn: &str) -> DeclaredAction {
        let mut action = DeclaredAction::redirect(RedirectConfig::new(RedirectStatus::Permanent));
        action.forward = Some(ForwardConfig::single(arn));
        action
    }

    #[test]
    fn test_identical_rules_have_no_changes() {
        let spec = rule(
            vec![DeclaredAction::forward_to("arn:tg/a")],
            vec![DeclaredCondition::path_pattern(["/a"])],
        );
        let changes = plan_changes(&spec, &spec.clone(), &RelevanceGate::for_rules());
        assert!(changes.is_empty());
        assert!(changes.paths.is_empty());
    }

    #[test]
    fn test_inactive_forward_block_never_triggers_update() {
        let desired = rule(vec![redirect_with_forward("arn:tg/new")], vec![]);
        let observed = rule(
            vec![DeclaredAction::redirect(RedirectConfig::new(RedirectStatus::Permanent)).with_order(1)],
            vec![],
        );
        let changes = plan_changes(&desired, &observed, &RelevanceGate::for_rules());
        assert!(changes.is_empty(), "unexpected changes: {:?}", changes.paths);

        let observed_with_old_forward = rule(vec![redirect_with_forward("arn:tg/old")], vec![]);
        let changes = plan_changes(&desired, &observed_with_old_forward, &RelevanceGate::for_rules());
        assert!(changes.is_empty());
    }

    #[test]
    fn test_active_redirect_change_is_observed() {
        let mut redirect = RedirectConfig::new(RedirectStatus::Permanent);
        redirect.host = "example.org".into();
        let desired = rule(vec![DeclaredAction::redirect(redirect)], vec![]);
        let observed = rule(
            vec![DeclaredAction::redirect(RedirectConfig::new(RedirectStatus::Permanent))],
            vec![],
        );
        let changes = plan_changes(&desired, &observed, &RelevanceGate::for_rules());
        assert!(changes.actions);
        assert!(!changes.conditions);
        assert_eq!(changes.paths.len(), 1);
        assert_eq!(changes.paths[0].to_string(), "action[0].redirect.host");
    }

    #[test]
    fn test_type_switch_is_observed() {
        let desired = rule(vec![DeclaredAction::forward_to("arn:tg/a")], vec![]);
        let observed = rule(
            vec![DeclaredAction::redirect(RedirectConfig::new(RedirectStatus::Temporary))],
            vec![],
        );
        let changes = plan_changes(&desired, &observed, &RelevanceGate::for_rules());
        assert!(changes.actions);
        assert!(changes
            .paths
            .iter()
            .any(|p| p.to_string() == "action[0].type"));
        // The observed redirect block is inactive under the desired type.
        assert!(!changes
            .paths
            .iter()
            .any(|p| p.to_string().starts_with("action[0].redirect")));
    }

    #[test]
    fn test_explicit_and_positional_orders_compare_equal() {
        let desired = rule(vec![DeclaredAction::forward_to("arn:tg/a")], vec![]);
        let observed = rule(vec![DeclaredAction::forward_to("arn:tg/a").with_order(1)], vec![]);
        assert!(plan_changes(&desired, &observed, &RelevanceGate::for_rules()).is_empty());
    }

    #[test]
    fn test_condition_order_and_value_order_do_not_matter() {
        let desired = rule(
            vec![],
            vec![
                DeclaredCondition::host_header(["b.example.com", "a.example.com"]),
                DeclaredCondition::path_pattern(["/a"]),
            ],
        );
        let observed = rule(
            vec![],
            vec![
                DeclaredCondition::path_pattern(["/a"]),
                DeclaredCondition::host_header(["a.example.com", "b.example.com"]),
            ],
        );
        assert!(plan_changes(&desired, &observed, &RelevanceGate::for_rules()).is_empty());
    }

    #[test]
    fn test_condition_change_is_observed() {
        let desired = rule(vec![], vec![DeclaredCondition::path_pattern(["/b"])]);
        let observed = rule(vec![], vec![DeclaredCondition::path_pattern(["/a"])]);
        let changes = plan_changes(&desired, &observed, &RelevanceGate::for_rules());
        assert!(changes.conditions);
        assert!(!changes.actions);
    }

    #[test]
    fn test_priority_only_when_declared() {
        let mut desired = rule(vec![], vec![]);
        let mut observed = rule(vec![], vec![]);
        observed.priority = Some(7);
        assert_eq!(
            plan_changes(&desired, &observed, &RelevanceGate::for_rules()).priority,
            None
        );

        desired.priority = Some(9);
        assert_eq!(
            plan_changes(&desired, &observed, &RelevanceGate::for_rules()).priority,
            Some(9)
        );
    }

    #[test]
    fn test_listener_change_is_flagged() {
        let desired = rule(vec![], vec![]);
        let mut observed = rule(vec![], vec![]);
        observed.listener_arn = "arn:other".into();
        assert!(plan_changes(&desired, &observed, &RelevanceGate::for_rules()).listener_changed);
    }

    #[test]
    fn test_weight_change_inside_active_forward() {
        let forward = |weight| ForwardConfig {
            target_groups: vec![
                TargetGroupTuple {
                    arn: "arn:tg/a".into(),
                    weight: Some(weight),
                },
                TargetGroupTuple {
                    arn: "arn:tg/b".into(),
                    weight: Some(1),
                },
            ],
            stickiness: None,
        };
        let desired = rule(vec![DeclaredAction::forward(forward(5))], vec![]);
        let observed = rule(vec![DeclaredAction::forward(forward(1))], vec![]);
        let changes = plan_changes(&desired, &observed, &RelevanceGate::for_rules());
        assert_eq!(
            changes.paths[0].to_string(),
            "action[0].forward.target_groups[0].weight"
        );
        assert_eq!(desired.actions[0].action_type, ActionType::Forward);
    }
}
