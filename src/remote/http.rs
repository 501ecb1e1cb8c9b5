//! HTTP/JSON control plane client.

use super::types::{ErrorBody, SetPriorityBody};
use super::{ControlPlane, CreateRuleRequest, ModifyRuleRequest, RemoteError, RemoteRule, RulePage};
use crate::config::RemoteConfig;
use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

/// Error code the control plane attaches to 409 responses for a taken priority.
const PRIORITY_IN_USE: &str = "PriorityInUse";

/// Control plane reached over HTTP:
/// - `GET  /listeners/{listener}/rules` list (paginated)
/// - `POST /listeners/{listener}/rules` create
/// - `GET | PATCH | DELETE /rules/{rule}`
/// - `PUT  /rules/{rule}/priority`
///
/// ARNs are sent as single percent-encoded path segments.
pub struct HttpControlPlane {
    /// Base URL (e.g., "https://lb.internal:8443/v1")
    base_url: Url,
    /// Bearer token, when the control plane requires one
    api_key: Option<String>,
    page_size: Option<u32>,
    timeout: Duration,
    client: Client,
}

impl HttpControlPlane {
    pub fn new(
        endpoint: &str,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, RemoteError> {
        let base_url = Url::parse(endpoint).map_err(|e| {
            RemoteError::Configuration(format!("Invalid endpoint '{}': {}", endpoint, e))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(RemoteError::Configuration(format!(
                "Endpoint '{}' cannot carry a path",
                endpoint
            )));
        }
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RemoteError::Configuration(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            base_url,
            api_key,
            page_size: None,
            timeout,
            client,
        })
    }

    /// Build a client from the `[remote]` configuration section.
    pub fn from_config(config: &RemoteConfig) -> Result<Self, RemoteError> {
        let api_key = config
            .resolve_api_key()
            .map_err(|e| RemoteError::Configuration(e.to_string()))?;
        let mut client = Self::new(
            &config.endpoint,
            api_key,
            Duration::from_secs(config.request_timeout_seconds),
        )?;
        client.page_size = config.page_size;
        Ok(client)
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = Some(page_size);
        self
    }

    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let builder = self.client.request(method, url);
        match &self.api_key {
            Some(key) => builder.bearer_auth(key),
            None => builder,
        }
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Response, RemoteError> {
        let timeout_ms = self.timeout.as_millis() as u64;
        builder.send().await.map_err(|e| {
            if e.is_timeout() {
                RemoteError::Timeout(timeout_ms)
            } else {
                RemoteError::Network(e.to_string())
            }
        })
    }

    async fn parse<T: DeserializeOwned>(response: Response) -> Result<T, RemoteError> {
        let body = response.text().await.map_err(|e| {
            RemoteError::InvalidResponse(format!("Failed to read response body: {}", e))
        })?;
        serde_json::from_str(&body).map_err(|e| {
            RemoteError::InvalidResponse(format!("Failed to parse control plane response: {}", e))
        })
    }
}

/// Map a non-2xx response onto a [`RemoteError`].
///
/// `priority` is the priority the request tried to claim, if any.
async fn error_from(response: Response, resource: &str, priority: Option<u32>) -> RemoteError {
    let status = response.status();
    let text = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());
    let body: ErrorBody = serde_json::from_str(&text).unwrap_or_default();
    let message = body.message.unwrap_or(text);

    match (status, body.code.as_deref(), priority) {
        (StatusCode::CONFLICT, Some(PRIORITY_IN_USE), Some(priority)) => {
            RemoteError::PriorityInUse { priority }
        }
        (StatusCode::NOT_FOUND, _, _) => RemoteError::not_found(resource),
        (StatusCode::BAD_REQUEST, _, _) => RemoteError::Validation(message),
        _ => RemoteError::Upstream {
            status: status.as_u16(),
            message,
        },
    }
}

#[async_trait]
impl ControlPlane for HttpControlPlane {
    async fn list_rules(
        &self,
        listener_arn: &str,
        page_token: Option<&str>,
    ) -> Result<RulePage, RemoteError> {
        let mut url = self.url(&["listeners", listener_arn, "rules"]);
        {
            let mut query = url.query_pairs_mut();
            if let Some(token) = page_token {
                query.append_pair("page_token", token);
            }
            if let Some(size) = self.page_size {
                query.append_pair("page_size", &size.to_string());
            }
        }
        if url.query() == Some("") {
            url.set_query(None);
        }

        debug!(listener = %listener_arn, page_token = ?page_token, "Listing rules");
        let response = self.send(self.request(Method::GET, url)).await?;
        if !response.status().is_success() {
            return Err(error_from(response, &format!("listener {}", listener_arn), None).await);
        }
        Self::parse(response).await
    }

    async fn describe_rule(&self, rule_arn: &str) -> Result<RemoteRule, RemoteError> {
        let url = self.url(&["rules", rule_arn]);
        let response = self.send(self.request(Method::GET, url)).await?;
        if !response.status().is_success() {
            return Err(error_from(response, &format!("rule {}", rule_arn), None).await);
        }
        Self::parse(response).await
    }

    async fn create_rule(&self, request: CreateRuleRequest) -> Result<RemoteRule, RemoteError> {
        let url = self.url(&["listeners", &request.listener_arn, "rules"]);
        debug!(
            listener = %request.listener_arn,
            priority = request.priority,
            "Creating rule"
        );
        let response = self
            .send(self.request(Method::POST, url).json(&request))
            .await?;
        if !response.status().is_success() {
            let resource = format!("listener {}", request.listener_arn);
            return Err(error_from(response, &resource, Some(request.priority)).await);
        }
        Self::parse(response).await
    }

    async fn modify_rule(
        &self,
        rule_arn: &str,
        request: ModifyRuleRequest,
    ) -> Result<RemoteRule, RemoteError> {
        let url = self.url(&["rules", rule_arn]);
        let response = self
            .send(self.request(Method::PATCH, url).json(&request))
            .await?;
        if !response.status().is_success() {
            return Err(error_from(response, &format!("rule {}", rule_arn), None).await);
        }
        Self::parse(response).await
    }

    async fn set_rule_priority(&self, rule_arn: &str, priority: u32) -> Result<(), RemoteError> {
        let url = self.url(&["rules", rule_arn, "priority"]);
        let response = self
            .send(self.request(Method::PUT, url).json(&SetPriorityBody { priority }))
            .await?;
        if !response.status().is_success() {
            return Err(error_from(response, &format!("rule {}", rule_arn), Some(priority)).await);
        }
        Ok(())
    }

    async fn delete_rule(&self, rule_arn: &str) -> Result<(), RemoteError> {
        let url = self.url(&["rules", rule_arn]);
        let response = self.send(self.request(Method::DELETE, url)).await?;
        if !response.status().is_success() {
            return Err(error_from(response, &format!("rule {}", rule_arn), None).await);
        }
        Ok(())
    }
}
