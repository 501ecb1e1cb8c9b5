//! Remote (tagged) representation of rule actions

use super::blocks::{CognitoConfig, FixedResponseConfig, ForwardConfig, OidcConfig, RedirectConfig};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Highest evaluation order an action may carry.
pub const MAX_ACTION_ORDER: u32 = 50_000;

/// Discriminant of an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ActionType {
    Forward,
    Redirect,
    FixedResponse,
    AuthenticateCognito,
    AuthenticateOidc,
}

impl ActionType {
    pub const ALL: [ActionType; 5] = [
        ActionType::Forward,
        ActionType::Redirect,
        ActionType::FixedResponse,
        ActionType::AuthenticateCognito,
        ActionType::AuthenticateOidc,
    ];

    /// Wire tag, e.g. `fixed-response`.
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionType::Forward => "forward",
            ActionType::Redirect => "redirect",
            ActionType::FixedResponse => "fixed-response",
            ActionType::AuthenticateCognito => "authenticate-cognito",
            ActionType::AuthenticateOidc => "authenticate-oidc",
        }
    }

    /// Name of the declared block this type activates, e.g. `fixed_response`.
    pub fn block_name(&self) -> &'static str {
        match self {
            ActionType::Forward => "forward",
            ActionType::Redirect => "redirect",
            ActionType::FixedResponse => "fixed_response",
            ActionType::AuthenticateCognito => "authenticate_cognito",
            ActionType::AuthenticateOidc => "authenticate_oidc",
        }
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ActionType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("Unknown action type: {}", s))
    }
}

/// Variant-specific configuration of an action.
///
/// The variant is the action type, so a payload can never disagree with
/// its discriminant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ActionPayload {
    Forward(ForwardConfig),
    Redirect(RedirectConfig),
    FixedResponse(FixedResponseConfig),
    AuthenticateCognito(CognitoConfig),
    AuthenticateOidc(OidcConfig),
}

impl ActionPayload {
    pub fn action_type(&self) -> ActionType {
        match self {
            ActionPayload::Forward(_) => ActionType::Forward,
            ActionPayload::Redirect(_) => ActionType::Redirect,
            ActionPayload::FixedResponse(_) => ActionType::FixedResponse,
            ActionPayload::AuthenticateCognito(_) => ActionType::AuthenticateCognito,
            ActionPayload::AuthenticateOidc(_) => ActionType::AuthenticateOidc,
        }
    }
}

/// One action of a rule as the control plane stores it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    /// Evaluation order among the rule's actions, lowest first
    pub order: u32,
    pub payload: ActionPayload,
}

impl Action {
    pub fn new(order: u32, payload: ActionPayload) -> Self {
        Self { order, payload }
    }

    pub fn action_type(&self) -> ActionType {
        self.payload.action_type()
    }
}
