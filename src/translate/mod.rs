//! Translation between declared rules and the control plane's tagged form
//!
//! # Data Flow
//! ```text
//! create / update:  RuleSpec.action[]    → expand_actions    → Vec<Action>
//!                   RuleSpec.condition[] → expand_conditions → Vec<Condition>
//! read:             Vec<Action>    → flatten_actions (+ Passthrough) → Vec<DeclaredAction>
//!                   Vec<Condition> → flatten_conditions              → Vec<DeclaredCondition>
//! ```
//!
//! Both expansions validate every entry and return all errors together.

pub mod action;
pub mod condition;
pub mod error;
mod validate;

pub use action::{effective_order, expand_actions, flatten_actions, Passthrough};
pub use condition::{expand_conditions, flatten_conditions};
pub use error::{ValidationError, ValidationErrors};

use crate::model::{Action, Condition, FieldPath, RuleSpec, MAX_PRIORITY, MIN_PRIORITY};

/// Expand both halves of a rule, reporting priority, action and condition
/// errors together.
pub fn expand_rule(spec: &RuleSpec) -> Result<(Vec<Action>, Vec<Condition>), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    if let Some(priority) = spec.priority {
        validate::check_range(
            FieldPath::root().field("priority"),
            priority as u64,
            MIN_PRIORITY as u64,
            MAX_PRIORITY as u64,
            &mut errors,
        );
    }

    let actions = expand_actions(&spec.actions).unwrap_or_else(|more| {
        errors.merge(more);
        Vec::new()
    });
    let conditions = expand_conditions(&spec.conditions).unwrap_or_else(|more| {
        errors.merge(more);
        Vec::new()
    });
    errors.into_result((actions, conditions))
}
