//! Declared (user-facing) representation of a rule
//!
//! Rule files are TOML:
//!
//! ```toml
//! listener_arn = "arn:aws:elasticloadbalancing:us-east-1:123456789012:listener/app/web/1/2"
//! priority = 100          # optional, allocated when omitted
//!
//! [[action]]
//! type = "forward"
//! target_group_arn = "arn:aws:elasticloadbalancing:us-east-1:123456789012:targetgroup/api/3"
//!
//! [[condition]]
//! path_pattern = { values = ["/api/*"] }
//! ```

use super::action::ActionType;
use super::blocks::{
    CognitoConfig, FixedResponseConfig, ForwardConfig, HttpHeaderBlock, OidcConfig,
    RedirectConfig, ValuesBlock,
};
use super::condition::{ConditionField, QueryStringPair};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A listener rule as declared by the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleSpec {
    /// Listener the rule belongs to; cannot change after creation
    pub listener_arn: String,
    /// Explicit priority; allocated on create when `None`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<u32>,
    #[serde(default, rename = "action")]
    pub actions: Vec<DeclaredAction>,
    #[serde(default, rename = "condition")]
    pub conditions: Vec<DeclaredCondition>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: BTreeMap<String, String>,
}

impl RuleSpec {
    pub fn new(listener_arn: impl Into<String>) -> Self {
        Self {
            listener_arn: listener_arn.into(),
            priority: None,
            actions: Vec::new(),
            conditions: Vec::new(),
            tags: BTreeMap::new(),
        }
    }

    /// Parse a rule file.
    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}

/// One declared action: a `type` discriminant plus sibling blocks, of which
/// only the one selected by `type` is meaningful.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeclaredAction {
    #[serde(rename = "type")]
    pub action_type: ActionType,
    /// Evaluation order; `0` means "use the position in the list"
    #[serde(default)]
    pub order: u32,
    /// Shortcut for a forward to a single target group
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub target_group_arn: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub forward: Option<ForwardConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect: Option<RedirectConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fixed_response: Option<FixedResponseConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authenticate_cognito: Option<CognitoConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authenticate_oidc: Option<OidcConfig>,
}

impl DeclaredAction {
    /// Action of the given type with no blocks populated.
    pub fn new(action_type: ActionType) -> Self {
        Self {
            action_type,
            order: 0,
            target_group_arn: String::new(),
            forward: None,
            redirect: None,
            fixed_response: None,
            authenticate_cognito: None,
            authenticate_oidc: None,
        }
    }

    pub fn forward_to(target_group_arn: impl Into<String>) -> Self {
        Self {
            target_group_arn: target_group_arn.into(),
            ..Self::new(ActionType::Forward)
        }
    }

    pub fn forward(config: ForwardConfig) -> Self {
        Self {
            forward: Some(config),
            ..Self::new(ActionType::Forward)
        }
    }

    pub fn redirect(config: RedirectConfig) -> Self {
        Self {
            redirect: Some(config),
            ..Self::new(ActionType::Redirect)
        }
    }

    pub fn fixed_response(config: FixedResponseConfig) -> Self {
        Self {
            fixed_response: Some(config),
            ..Self::new(ActionType::FixedResponse)
        }
    }

    pub fn authenticate_cognito(config: CognitoConfig) -> Self {
        Self {
            authenticate_cognito: Some(config),
            ..Self::new(ActionType::AuthenticateCognito)
        }
    }

    pub fn authenticate_oidc(config: OidcConfig) -> Self {
        Self {
            authenticate_oidc: Some(config),
            ..Self::new(ActionType::AuthenticateOidc)
        }
    }

    pub fn with_order(mut self, order: u32) -> Self {
        self.order = order;
        self
    }
}

/// One declared condition. Exactly one slot must be populated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeclaredCondition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host_header: Option<ValuesBlock>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http_header: Option<HttpHeaderBlock>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http_request_method: Option<ValuesBlock>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path_pattern: Option<ValuesBlock>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub query_string: Vec<QueryStringPair>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_ip: Option<ValuesBlock>,
}

impl DeclaredCondition {
    pub fn host_header<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            host_header: Some(ValuesBlock::new(values)),
            ..Default::default()
        }
    }

    pub fn path_pattern<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            path_pattern: Some(ValuesBlock::new(values)),
            ..Default::default()
        }
    }

    pub fn http_header<I, S>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            http_header: Some(HttpHeaderBlock {
                http_header_name: name.into(),
                values: values.into_iter().map(Into::into).collect(),
            }),
            ..Default::default()
        }
    }

    /// Slots that carry a value, in declaration order.
    pub fn populated_slots(&self) -> Vec<ConditionField> {
        let mut slots = Vec::new();
        if self.host_header.is_some() {
            slots.push(ConditionField::HostHeader);
        }
        if self.http_header.is_some() {
            slots.push(ConditionField::HttpHeader);
        }
        if self.http_request_method.is_some() {
            slots.push(ConditionField::HttpRequestMethod);
        }
        if self.path_pattern.is_some() {
            slots.push(ConditionField::PathPattern);
        }
        if !self.query_string.is_empty() {
            slots.push(ConditionField::QueryString);
        }
        if self.source_ip.is_some() {
            slots.push(ConditionField::SourceIp);
        }
        slots
    }
}
