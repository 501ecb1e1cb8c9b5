//! Declared action list <-> remote tagged actions

use super::error::{ValidationError, ValidationErrors};
use super::validate::{
    check_range, validate_cognito, validate_forward, validate_fixed_response, validate_oidc,
    validate_redirect,
};
use crate::model::{
    Action, ActionPayload, ActionType, DeclaredAction, FieldPath, ForwardConfig, MAX_ACTION_ORDER,
};
use std::collections::{HashMap, HashSet};

/// Evaluation order of a declared action: its explicit `order`, or its
/// 1-based position when `order` is unset (`0`).
pub fn effective_order(position: usize, declared: u32) -> u32 {
    if declared != 0 {
        declared
    } else {
        position as u32 + 1
    }
}

/// Expand a declared action list into remote tagged actions.
///
/// Every entry is checked; on failure all errors are returned together and
/// no partial list is produced.
///
/// # Example
///
/// ```
/// use lbrule::model::DeclaredAction;
/// use lbrule::translate::expand_actions;
///
/// let declared = vec![
///     DeclaredAction::forward_to("arn:tg/a"),
///     DeclaredAction::forward_to("arn:tg/b"),
/// ];
/// let actions = expand_actions(&declared).unwrap();
/// assert_eq!(actions.iter().map(|a| a.order).collect::<Vec<_>>(), vec![1, 2]);
/// ```
pub fn expand_actions(declared: &[DeclaredAction]) -> Result<Vec<Action>, ValidationErrors> {
    let mut errors = ValidationErrors::new();
    let mut actions = Vec::with_capacity(declared.len());

    for (position, entry) in declared.iter().enumerate() {
        let path = FieldPath::root().field("action").index(position);
        if let Some(action) = expand_action(position, entry, &path, &mut errors) {
            actions.push(action);
        }
    }

    errors.into_result(actions)
}

fn expand_action(
    position: usize,
    entry: &DeclaredAction,
    path: &FieldPath,
    errors: &mut ValidationErrors,
) -> Option<Action> {
    let order = effective_order(position, entry.order);
    check_range(
        path.clone().field("order"),
        order as u64,
        1,
        MAX_ACTION_ORDER as u64,
        errors,
    );

    let payload = match entry.action_type {
        ActionType::Forward => ActionPayload::Forward(forward_config(entry, path, errors)?),
        ActionType::Redirect => {
            let redirect = required_block(entry.redirect.as_ref(), entry, path, errors)?;
            validate_redirect(&block_path(path, entry), redirect, errors);
            ActionPayload::Redirect(redirect.clone())
        }
        ActionType::FixedResponse => {
            let response = required_block(entry.fixed_response.as_ref(), entry, path, errors)?;
            validate_fixed_response(&block_path(path, entry), response, errors);
            ActionPayload::FixedResponse(response.clone())
        }
        ActionType::AuthenticateCognito => {
            let cognito = required_block(entry.authenticate_cognito.as_ref(), entry, path, errors)?;
            validate_cognito(&block_path(path, entry), cognito, errors);
            ActionPayload::AuthenticateCognito(cognito.clone())
        }
        ActionType::AuthenticateOidc => {
            let oidc = required_block(entry.authenticate_oidc.as_ref(), entry, path, errors)?;
            validate_oidc(&block_path(path, entry), oidc, errors);
            ActionPayload::AuthenticateOidc(oidc.clone())
        }
    };

    Some(Action::new(order, payload))
}

fn block_path(path: &FieldPath, entry: &DeclaredAction) -> FieldPath {
    path.clone().field(entry.action_type.block_name())
}

fn required_block<'a, T>(
    block: Option<&'a T>,
    entry: &DeclaredAction,
    path: &FieldPath,
    errors: &mut ValidationErrors,
) -> Option<&'a T> {
    if block.is_none() {
        errors.push(ValidationError::MissingActionBlock {
            path: path.clone(),
            action_type: entry.action_type,
            expected: expected_block(entry.action_type),
        });
    }
    block
}

fn expected_block(action_type: ActionType) -> &'static str {
    match action_type {
        ActionType::Forward => "a forward block or target_group_arn",
        ActionType::Redirect => "a redirect block",
        ActionType::FixedResponse => "a fixed_response block",
        ActionType::AuthenticateCognito => "an authenticate_cognito block",
        ActionType::AuthenticateOidc => "an authenticate_oidc block",
    }
}

/// Forward accepts either the flat shortcut or the structured block.
fn forward_config(
    entry: &DeclaredAction,
    path: &FieldPath,
    errors: &mut ValidationErrors,
) -> Option<ForwardConfig> {
    let shortcut = !entry.target_group_arn.is_empty();
    match (shortcut, entry.forward.as_ref()) {
        (true, None) => Some(ForwardConfig::single(entry.target_group_arn.clone())),
        (false, Some(forward)) => {
            validate_forward(&block_path(path, entry), forward, errors);
            Some(forward.clone())
        }
        (true, Some(_)) => {
            errors.push(ValidationError::ConflictingForwardShapes { path: path.clone() });
            None
        }
        (false, None) => {
            required_block::<ForwardConfig>(None, entry, path, errors);
            None
        }
    }
}

/// Prior declared values the control plane never returns, keyed by the
/// action's position once the list is sorted by effective order. This is
/// the same position [`flatten_actions`] assigns to the remote action.
#[derive(Debug, Clone, Default)]
pub struct Passthrough {
    client_secrets: HashMap<usize, String>,
    forward_shortcuts: HashSet<usize>,
}

impl Passthrough {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect passthrough values from a previously declared action list.
    pub fn from_declared(prior: &[DeclaredAction]) -> Self {
        let mut ordered: Vec<(u32, &DeclaredAction)> = prior
            .iter()
            .enumerate()
            .map(|(position, action)| (effective_order(position, action.order), action))
            .collect();
        ordered.sort_by_key(|(order, _)| *order);

        let mut passthrough = Self::new();
        for (position, (_, action)) in ordered.into_iter().enumerate() {
            if let Some(oidc) = &action.authenticate_oidc {
                if !oidc.client_secret.is_empty() {
                    passthrough
                        .client_secrets
                        .insert(position, oidc.client_secret.clone());
                }
            }
            if action.action_type == ActionType::Forward && !action.target_group_arn.is_empty() {
                passthrough.forward_shortcuts.insert(position);
            }
        }
        passthrough
    }

    pub fn with_client_secret(mut self, position: usize, secret: impl Into<String>) -> Self {
        self.client_secrets.insert(position, secret.into());
        self
    }

    /// Client secret previously declared at `position`, or `""`.
    pub fn client_secret(&self, position: usize) -> &str {
        self.client_secrets
            .get(&position)
            .map(String::as_str)
            .unwrap_or("")
    }

    pub fn uses_forward_shortcut(&self, position: usize) -> bool {
        self.forward_shortcuts.contains(&position)
    }
}

/// Flatten remote actions back into the declared shape.
///
/// Actions are sorted by `order` first; positions in the result (and the
/// passthrough keys) refer to that sorted order.
pub fn flatten_actions(mut remote: Vec<Action>, passthrough: &Passthrough) -> Vec<DeclaredAction> {
    remote.sort_by_key(|action| action.order);
    remote
        .into_iter()
        .enumerate()
        .map(|(position, action)| flatten_action(position, action, passthrough))
        .collect()
}

fn flatten_action(position: usize, action: Action, passthrough: &Passthrough) -> DeclaredAction {
    let declared = match action.payload {
        ActionPayload::Forward(forward) => {
            let shortcut = passthrough
                .uses_forward_shortcut(position)
                .then(|| forward.as_single_target().map(str::to_string))
                .flatten();
            match shortcut {
                Some(arn) => DeclaredAction::forward_to(arn),
                None => DeclaredAction::forward(forward),
            }
        }
        ActionPayload::Redirect(redirect) => DeclaredAction::redirect(redirect),
        ActionPayload::FixedResponse(response) => DeclaredAction::fixed_response(response),
        ActionPayload::AuthenticateCognito(cognito) => DeclaredAction::authenticate_cognito(cognito),
        ActionPayload::AuthenticateOidc(mut oidc) => {
            oidc.client_secret = passthrough.client_secret(position).to_string();
            DeclaredAction::authenticate_oidc(oidc)
        }
    };
    declared.with_order(action.order)
}
