//! Configuration blocks shared by the declared and remote rule shapes.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Longest stickiness window the control plane accepts (7 days).
pub const MAX_STICKINESS_SECONDS: u32 = 604_800;

/// Largest weight of a target group inside a forward action.
pub const MAX_TARGET_GROUP_WEIGHT: u32 = 999;

/// Most target groups a single forward action may reference.
pub const MAX_TARGET_GROUPS: usize = 5;

// ============================================================================
// Forward
// ============================================================================

/// Weighted forward to one or more target groups.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForwardConfig {
    #[serde(default)]
    pub target_groups: Vec<TargetGroupTuple>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stickiness: Option<Stickiness>,
}

impl ForwardConfig {
    /// Forward everything to a single target group.
    pub fn single(arn: impl Into<String>) -> Self {
        Self {
            target_groups: vec![TargetGroupTuple {
                arn: arn.into(),
                weight: None,
            }],
            stickiness: None,
        }
    }

    /// ARN of the only target group when this forward is expressible as the
    /// flat `target_group_arn` shortcut.
    pub fn as_single_target(&self) -> Option<&str> {
        match (self.target_groups.as_slice(), &self.stickiness) {
            ([only], None) => Some(only.arn.as_str()),
            ([only], Some(stickiness)) if !stickiness.enabled => Some(only.arn.as_str()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetGroupTuple {
    pub arn: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<u32>,
}

/// Target group stickiness for a forward action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stickiness {
    #[serde(default)]
    pub enabled: bool,
    pub duration_seconds: u32,
}

// ============================================================================
// Redirect
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RedirectStatus {
    #[serde(rename = "HTTP_301")]
    Permanent,
    #[serde(rename = "HTTP_302")]
    Temporary,
}

/// Redirect action. Every URI component defaults to the `#{...}` keyword
/// that keeps the incoming value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedirectConfig {
    #[serde(default = "default_redirect_host")]
    pub host: String,
    #[serde(default = "default_redirect_path")]
    pub path: String,
    #[serde(default = "default_redirect_port")]
    pub port: String,
    #[serde(default = "default_redirect_protocol")]
    pub protocol: String,
    #[serde(default = "default_redirect_query")]
    pub query: String,
    pub status_code: RedirectStatus,
}

impl RedirectConfig {
    pub fn new(status_code: RedirectStatus) -> Self {
        Self {
            host: default_redirect_host(),
            path: default_redirect_path(),
            port: default_redirect_port(),
            protocol: default_redirect_protocol(),
            query: default_redirect_query(),
            status_code,
        }
    }
}

fn default_redirect_host() -> String {
    "#{host}".to_string()
}

fn default_redirect_path() -> String {
    "/#{path}".to_string()
}

fn default_redirect_port() -> String {
    "#{port}".to_string()
}

fn default_redirect_protocol() -> String {
    "#{protocol}".to_string()
}

fn default_redirect_query() -> String {
    "#{query}".to_string()
}

// ============================================================================
// Fixed response
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixedResponseConfig {
    pub content_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_body: Option<String>,
    pub status_code: String,
}

// ============================================================================
// Authentication
// ============================================================================

/// Behavior when a request arrives without an authenticated session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnauthenticatedAction {
    Deny,
    Allow,
    #[default]
    Authenticate,
}

fn default_scope() -> String {
    "openid".to_string()
}

fn default_session_cookie_name() -> String {
    "AWSELBAuthSessionCookie".to_string()
}

fn default_session_timeout() -> u64 {
    604_800
}

/// Authenticate through a Cognito user pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CognitoConfig {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub authentication_request_extra_params: BTreeMap<String, String>,
    #[serde(default)]
    pub on_unauthenticated_request: UnauthenticatedAction,
    #[serde(default = "default_scope")]
    pub scope: String,
    #[serde(default = "default_session_cookie_name")]
    pub session_cookie_name: String,
    #[serde(default = "default_session_timeout")]
    pub session_timeout: u64,
    pub user_pool_arn: String,
    pub user_pool_client_id: String,
    pub user_pool_domain: String,
}

/// Authenticate through an OpenID Connect identity provider.
///
/// `client_secret` is write-only on the control plane: it is sent on create
/// and modify, and always comes back empty.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OidcConfig {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub authentication_request_extra_params: BTreeMap<String, String>,
    pub authorization_endpoint: String,
    pub client_id: String,
    #[serde(default)]
    pub client_secret: String,
    pub issuer: String,
    #[serde(default)]
    pub on_unauthenticated_request: UnauthenticatedAction,
    #[serde(default = "default_scope")]
    pub scope: String,
    #[serde(default = "default_session_cookie_name")]
    pub session_cookie_name: String,
    #[serde(default = "default_session_timeout")]
    pub session_timeout: u64,
    pub token_endpoint: String,
    pub user_info_endpoint: String,
}

impl fmt::Debug for OidcConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let secret = if self.client_secret.is_empty() {
            ""
        } else {
            "<redacted>"
        };
        f.debug_struct("OidcConfig")
            .field(
                "authentication_request_extra_params",
                &self.authentication_request_extra_params,
            )
            .field("authorization_endpoint", &self.authorization_endpoint)
            .field("client_id", &self.client_id)
            .field("client_secret", &secret)
            .field("issuer", &self.issuer)
            .field("on_unauthenticated_request", &self.on_unauthenticated_request)
            .field("scope", &self.scope)
            .field("session_cookie_name", &self.session_cookie_name)
            .field("session_timeout", &self.session_timeout)
            .field("token_endpoint", &self.token_endpoint)
            .field("user_info_endpoint", &self.user_info_endpoint)
            .finish()
    }
}

// ============================================================================
// Condition blocks
// ============================================================================

/// Condition block holding a plain list of match values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValuesBlock {
    #[serde(default)]
    pub values: Vec<String>,
}

impl ValuesBlock {
    pub fn new<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            values: values.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpHeaderBlock {
    pub http_header_name: String,
    #[serde(default)]
    pub values: Vec<String>,
}
