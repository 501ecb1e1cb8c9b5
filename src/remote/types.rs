//! Wire types exchanged with the control plane.

use crate::model::{Action, Condition, Priority};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A rule as the control plane reports it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteRule {
    pub rule_arn: String,
    /// Some control planes omit the listener on describe; derive it from
    /// the rule ARN when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub listener_arn: Option<String>,
    pub priority: Priority,
    #[serde(default)]
    pub is_default: bool,
    #[serde(default)]
    pub actions: Vec<Action>,
    #[serde(default)]
    pub conditions: Vec<Condition>,
}

/// One page of a listener's rules.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RulePage {
    #[serde(default)]
    pub rules: Vec<RemoteRule>,
    /// Present when more rules follow
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_page_token: Option<String>,
}

/// Body of a create call. The listener travels in the URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateRuleRequest {
    #[serde(skip)]
    pub listener_arn: String,
    pub priority: u32,
    pub actions: Vec<Action>,
    pub conditions: Vec<Condition>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: BTreeMap<String, String>,
}

/// Partial replacement of a rule; `None` parts are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModifyRuleRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actions: Option<Vec<Action>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conditions: Option<Vec<Condition>>,
}

impl ModifyRuleRequest {
    pub fn is_empty(&self) -> bool {
        self.actions.is_none() && self.conditions.is_none()
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct SetPriorityBody {
    pub priority: u32,
}

/// Error body the control plane sends with non-2xx responses.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}
