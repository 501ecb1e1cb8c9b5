//! Shared test utilities for lbrule integration tests.
//!
//! Provides an in-memory control plane plus rule builders so allocator and
//! reconciler tests run without a network.

#![allow(dead_code)]

use async_trait::async_trait;
use lbrule::model::{
    Action, ActionPayload, DeclaredAction, DeclaredCondition, OidcConfig, Priority, RuleSpec,
};
use lbrule::remote::{
    ControlPlane, CreateRuleRequest, ModifyRuleRequest, RemoteError, RemoteRule, RulePage,
};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

// =============================================================================
// Well-Known Test Constants
// =============================================================================

pub const LISTENER: &str =
    "arn:aws:elasticloadbalancing:us-east-1:123456789012:listener/app/web/50dc6c495c0c9188/f2f7dc8efc522ab2";

pub const OTHER_LISTENER: &str =
    "arn:aws:elasticloadbalancing:us-east-1:123456789012:listener/app/api/70dc6c495c0c9188/a2f7dc8efc522ab2";

pub const TARGET_GROUP: &str =
    "arn:aws:elasticloadbalancing:us-east-1:123456789012:targetgroup/api/73e2d6bc24d8a067";

pub const CLIENT_SECRET: &str = "oidc-client-s3cr3t";

// =============================================================================
// In-memory control plane
// =============================================================================

#[derive(Default)]
struct State {
    listeners: HashSet<String>,
    rules: BTreeMap<String, RemoteRule>,
    next_id: u64,
    /// Creates whose priority a competing writer grabs first
    steal_creates: u32,
    /// Remaining NotFound answers per freshly created rule
    hidden: HashMap<String, u32>,
    attempted_priorities: Vec<u32>,
    creates: Vec<CreateRuleRequest>,
    modifies: Vec<(String, ModifyRuleRequest)>,
    priority_moves: Vec<(String, u32)>,
}

/// Control plane backed by a mutex-guarded map.
///
/// Priority uniqueness is checked under the lock, so concurrent creates
/// race exactly like they would against the real service. OIDC client
/// secrets are accepted and never returned.
pub struct InMemoryControlPlane {
    state: Mutex<State>,
    page_size: usize,
    hidden_reads: u32,
    list_calls: AtomicU32,
}

impl Default for InMemoryControlPlane {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryControlPlane {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State::default()),
            page_size: 100,
            hidden_reads: 0,
            list_calls: AtomicU32::new(0),
        }
    }

    /// Register a listener holding only its default rule.
    pub fn with_listener(self, listener_arn: &str) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            state.listeners.insert(listener_arn.to_string());
            let rule_arn = rule_arn_for(listener_arn, "default");
            state.rules.insert(
                rule_arn.clone(),
                RemoteRule {
                    rule_arn,
                    listener_arn: Some(listener_arn.to_string()),
                    priority: Priority::Default,
                    is_default: true,
                    actions: vec![Action::new(
                        1,
                        ActionPayload::Forward(lbrule::model::ForwardConfig::single(TARGET_GROUP)),
                    )],
                    conditions: vec![],
                },
            );
        }
        self
    }

    /// Seed a numbered rule owned by someone else.
    pub fn with_rule(self, listener_arn: &str, priority: u32) -> Self {
        self.insert_foreign(listener_arn, priority);
        self
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    /// New rules answer `NotFound` to the first `reads` describes.
    pub fn with_hidden_reads(mut self, reads: u32) -> Self {
        self.hidden_reads = reads;
        self
    }

    /// The next `count` creates lose their priority to a competing writer.
    pub fn steal_next_creates(&self, count: u32) {
        self.state.lock().unwrap().steal_creates = count;
    }

    /// Numbered priorities on a listener, ascending.
    pub fn priorities(&self, listener_arn: &str) -> Vec<u32> {
        let state = self.state.lock().unwrap();
        let mut priorities: Vec<u32> = state
            .rules
            .values()
            .filter(|r| r.listener_arn.as_deref() == Some(listener_arn))
            .filter_map(|r| r.priority.value())
            .collect();
        priorities.sort_unstable();
        priorities
    }

    /// Priorities passed to `create_rule`, in call order.
    pub fn attempted_priorities(&self) -> Vec<u32> {
        self.state.lock().unwrap().attempted_priorities.clone()
    }

    /// Create requests as received, secrets included.
    pub fn creates(&self) -> Vec<CreateRuleRequest> {
        self.state.lock().unwrap().creates.clone()
    }

    pub fn modifies(&self) -> Vec<(String, ModifyRuleRequest)> {
        self.state.lock().unwrap().modifies.clone()
    }

    pub fn priority_moves(&self) -> Vec<(String, u32)> {
        self.state.lock().unwrap().priority_moves.clone()
    }

    /// Number of `list_rules` pages served.
    pub fn list_calls(&self) -> u32 {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn rule_count(&self) -> usize {
        self.state.lock().unwrap().rules.len()
    }

    fn insert_foreign(&self, listener_arn: &str, priority: u32) -> String {
        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        let rule_arn = rule_arn_for(listener_arn, &format!("foreign{}", state.next_id));
        state.rules.insert(
            rule_arn.clone(),
            RemoteRule {
                rule_arn: rule_arn.clone(),
                listener_arn: Some(listener_arn.to_string()),
                priority: Priority::Numbered(priority),
                is_default: false,
                actions: vec![],
                conditions: vec![],
            },
        );
        rule_arn
    }
}

fn rule_arn_for(listener_arn: &str, id: &str) -> String {
    format!(
        "{}/{}",
        listener_arn.replacen(":listener/", ":listener-rule/", 1),
        id
    )
}

fn priority_taken(state: &State, listener_arn: &str, priority: u32, except: Option<&str>) -> bool {
    state.rules.values().any(|r| {
        r.listener_arn.as_deref() == Some(listener_arn)
            && r.priority == Priority::Numbered(priority)
            && Some(r.rule_arn.as_str()) != except
    })
}

/// What the service hands back: the listener is implied by the ARN and
/// client secrets are blanked.
fn as_returned(rule: &RemoteRule) -> RemoteRule {
    let mut rule = rule.clone();
    rule.listener_arn = None;
    for action in &mut rule.actions {
        if let ActionPayload::AuthenticateOidc(oidc) = &mut action.payload {
            oidc.client_secret.clear();
        }
    }
    rule
}

#[async_trait]
impl ControlPlane for InMemoryControlPlane {
    async fn list_rules(
        &self,
        listener_arn: &str,
        page_token: Option<&str>,
    ) -> Result<RulePage, RemoteError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        // Let concurrent writers interleave between scan and create.
        tokio::task::yield_now().await;

        let state = self.state.lock().unwrap();
        if !state.listeners.contains(listener_arn) {
            return Err(RemoteError::not_found(listener_arn));
        }
        let mut rules: Vec<&RemoteRule> = state
            .rules
            .values()
            .filter(|r| r.listener_arn.as_deref() == Some(listener_arn))
            .collect();
        rules.sort_by_key(|r| r.priority);

        let start: usize = match page_token {
            Some(token) => token
                .parse()
                .map_err(|_| RemoteError::Validation(format!("bad page token '{}'", token)))?,
            None => 0,
        };
        let end = (start + self.page_size).min(rules.len());
        Ok(RulePage {
            rules: rules[start.min(end)..end].iter().map(|r| as_returned(r)).collect(),
            next_page_token: (end < rules.len()).then(|| end.to_string()),
        })
    }

    async fn describe_rule(&self, rule_arn: &str) -> Result<RemoteRule, RemoteError> {
        let mut state = self.state.lock().unwrap();
        if let Some(remaining) = state.hidden.get_mut(rule_arn) {
            if *remaining > 0 {
                *remaining -= 1;
                return Err(RemoteError::not_found(rule_arn));
            }
        }
        state
            .rules
            .get(rule_arn)
            .map(as_returned)
            .ok_or_else(|| RemoteError::not_found(rule_arn))
    }

    async fn create_rule(&self, request: CreateRuleRequest) -> Result<RemoteRule, RemoteError> {
        let mut state = self.state.lock().unwrap();
        state.attempted_priorities.push(request.priority);
        if !state.listeners.contains(&request.listener_arn) {
            return Err(RemoteError::not_found(&request.listener_arn));
        }

        if state.steal_creates > 0 {
            state.steal_creates -= 1;
            state.next_id += 1;
            let rival = rule_arn_for(&request.listener_arn, &format!("rival{}", state.next_id));
            state.rules.insert(
                rival.clone(),
                RemoteRule {
                    rule_arn: rival,
                    listener_arn: Some(request.listener_arn.clone()),
                    priority: Priority::Numbered(request.priority),
                    is_default: false,
                    actions: vec![],
                    conditions: vec![],
                },
            );
            return Err(RemoteError::PriorityInUse {
                priority: request.priority,
            });
        }

        if priority_taken(&state, &request.listener_arn, request.priority, None) {
            return Err(RemoteError::PriorityInUse {
                priority: request.priority,
            });
        }

        state.next_id += 1;
        let rule_arn = rule_arn_for(&request.listener_arn, &format!("rule{}", state.next_id));
        let rule = RemoteRule {
            rule_arn: rule_arn.clone(),
            listener_arn: Some(request.listener_arn.clone()),
            priority: Priority::Numbered(request.priority),
            is_default: false,
            actions: request.actions.clone(),
            conditions: request.conditions.clone(),
        };
        state.rules.insert(rule_arn.clone(), rule.clone());
        if self.hidden_reads > 0 {
            state.hidden.insert(rule_arn, self.hidden_reads);
        }
        state.creates.push(request);
        Ok(as_returned(&rule))
    }

    async fn modify_rule(
        &self,
        rule_arn: &str,
        request: ModifyRuleRequest,
    ) -> Result<RemoteRule, RemoteError> {
        let mut state = self.state.lock().unwrap();
        state.modifies.push((rule_arn.to_string(), request.clone()));
        let rule = state
            .rules
            .get_mut(rule_arn)
            .ok_or_else(|| RemoteError::not_found(rule_arn))?;
        if let Some(actions) = request.actions {
            rule.actions = actions;
        }
        if let Some(conditions) = request.conditions {
            rule.conditions = conditions;
        }
        Ok(as_returned(rule))
    }

    async fn set_rule_priority(&self, rule_arn: &str, priority: u32) -> Result<(), RemoteError> {
        let mut state = self.state.lock().unwrap();
        state.priority_moves.push((rule_arn.to_string(), priority));
        let listener_arn = state
            .rules
            .get(rule_arn)
            .and_then(|r| r.listener_arn.clone())
            .ok_or_else(|| RemoteError::not_found(rule_arn))?;
        if priority_taken(&state, &listener_arn, priority, Some(rule_arn)) {
            return Err(RemoteError::PriorityInUse { priority });
        }
        if let Some(rule) = state.rules.get_mut(rule_arn) {
            rule.priority = Priority::Numbered(priority);
        }
        Ok(())
    }

    async fn delete_rule(&self, rule_arn: &str) -> Result<(), RemoteError> {
        let mut state = self.state.lock().unwrap();
        state
            .rules
            .remove(rule_arn)
            .map(|_| ())
            .ok_or_else(|| RemoteError::not_found(rule_arn))
    }
}

// =============================================================================
// Rule Builders
// =============================================================================

/// Forward everything under `/api/*` to [`TARGET_GROUP`].
pub fn forward_rule(listener_arn: &str) -> RuleSpec {
    let mut spec = RuleSpec::new(listener_arn);
    spec.actions.push(DeclaredAction::forward_to(TARGET_GROUP));
    spec.conditions
        .push(DeclaredCondition::path_pattern(["/api/*"]));
    spec
}

pub fn oidc_config(secret: &str) -> OidcConfig {
    serde_json::from_value(serde_json::json!({
        "authorization_endpoint": "https://idp.example.com/authorize",
        "client_id": "web",
        "client_secret": secret,
        "issuer": "https://idp.example.com",
        "token_endpoint": "https://idp.example.com/token",
        "user_info_endpoint": "https://idp.example.com/userinfo"
    }))
    .unwrap()
}

/// Authenticate through OIDC, then forward.
pub fn oidc_rule(listener_arn: &str) -> RuleSpec {
    let mut spec = forward_rule(listener_arn);
    spec.actions.insert(
        0,
        DeclaredAction::authenticate_oidc(oidc_config(CLIENT_SECRET)),
    );
    spec
}
