//! Compact renderings of rule contents for log fields
//!
//! Only discriminants and paths are rendered. Block contents (and with them
//! OIDC client secrets) never reach the logs.

use crate::model::{Action, Condition, FieldPath};

/// Action types in evaluation order, e.g. `authenticate-oidc,forward`.
pub fn action_summary(actions: &[Action]) -> String {
    let mut ordered: Vec<&Action> = actions.iter().collect();
    ordered.sort_by_key(|action| action.order);
    ordered
        .iter()
        .map(|action| action.action_type().as_str())
        .collect::<Vec<_>>()
        .join(",")
}

/// Condition fields, e.g. `host-header,path-pattern`.
pub fn condition_summary(conditions: &[Condition]) -> String {
    conditions
        .iter()
        .map(|condition| condition.field().as_str())
        .collect::<Vec<_>>()
        .join(",")
}

/// Changed paths, truncated after `limit` entries.
pub fn changed_paths(paths: &[FieldPath], limit: usize) -> String {
    let mut rendered: Vec<String> = paths.iter().take(limit).map(ToString::to_string).collect();
    if paths.len() > limit {
        rendered.push(format!("(+{} more)", paths.len() - limit));
    }
    rendered.join(" ")
}
