//! Range and format checks for configuration blocks.
//!
//! Every check appends to a [`ValidationErrors`] instead of returning early,
//! so one pass reports everything wrong with a rule.

use super::error::{ValidationError, ValidationErrors};
use crate::model::blocks::{
    MAX_STICKINESS_SECONDS, MAX_TARGET_GROUPS, MAX_TARGET_GROUP_WEIGHT,
};
use crate::model::{
    CognitoConfig, FieldPath, FixedResponseConfig, ForwardConfig, OidcConfig, RedirectConfig,
};
use regex::Regex;
use std::sync::LazyLock;

const FIXED_RESPONSE_CONTENT_TYPES: [&str; 5] = [
    "text/plain",
    "text/css",
    "text/html",
    "application/javascript",
    "application/json",
];

const MAX_MESSAGE_BODY_LEN: usize = 1024;

static HTTP_HEADER_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9!#$%&'*+\-.^_`|~]{1,40}$").expect("header name pattern is valid")
});

static HTTP_REQUEST_METHOD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z\-_]{1,40}$").expect("method pattern is valid"));

static FIXED_RESPONSE_STATUS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[245]\d\d$").expect("status pattern is valid"));

pub(crate) fn check_range(
    path: FieldPath,
    value: u64,
    min: u64,
    max: u64,
    errors: &mut ValidationErrors,
) {
    if value < min || value > max {
        errors.push(ValidationError::OutOfRange {
            path,
            value,
            min,
            max,
        });
    }
}

pub(crate) fn check_non_empty(path: FieldPath, value: &str, errors: &mut ValidationErrors) {
    if value.trim().is_empty() {
        errors.push(ValidationError::Empty { path });
    }
}

/// Condition value lists must carry at least one entry.
pub(crate) fn check_values(path: FieldPath, values: &[String], errors: &mut ValidationErrors) {
    if values.is_empty() {
        errors.push(ValidationError::Empty { path });
        return;
    }
    for (i, value) in values.iter().enumerate() {
        check_non_empty(path.clone().index(i), value, errors);
    }
}

pub(crate) fn check_header_name(path: FieldPath, name: &str, errors: &mut ValidationErrors) {
    if !HTTP_HEADER_NAME.is_match(name) {
        errors.push(ValidationError::InvalidValue {
            path,
            value: name.to_string(),
            reason: "header names are 1-40 token characters".to_string(),
        });
    }
}

pub(crate) fn check_request_methods(
    path: FieldPath,
    methods: &[String],
    errors: &mut ValidationErrors,
) {
    if methods.is_empty() {
        errors.push(ValidationError::Empty { path });
        return;
    }
    for (i, method) in methods.iter().enumerate() {
        if !HTTP_REQUEST_METHOD.is_match(method) {
            errors.push(ValidationError::InvalidValue {
                path: path.clone().index(i),
                value: method.clone(),
                reason: "request methods are 1-40 letters, '-' or '_'".to_string(),
            });
        }
    }
}

pub(crate) fn validate_forward(path: &FieldPath, forward: &ForwardConfig, errors: &mut ValidationErrors) {
    let groups_path = path.clone().field("target_groups");
    if forward.target_groups.is_empty() {
        errors.push(ValidationError::Empty { path: groups_path });
    } else if forward.target_groups.len() > MAX_TARGET_GROUPS {
        errors.push(ValidationError::OutOfRange {
            path: groups_path,
            value: forward.target_groups.len() as u64,
            min: 1,
            max: MAX_TARGET_GROUPS as u64,
        });
    } else {
        for (i, group) in forward.target_groups.iter().enumerate() {
            let group_path = groups_path.clone().index(i);
            check_non_empty(group_path.clone().field("arn"), &group.arn, errors);
            if let Some(weight) = group.weight {
                check_range(
                    group_path.field("weight"),
                    weight as u64,
                    0,
                    MAX_TARGET_GROUP_WEIGHT as u64,
                    errors,
                );
            }
        }
    }

    if let Some(stickiness) = &forward.stickiness {
        check_range(
            path.clone().field("stickiness").field("duration_seconds"),
            stickiness.duration_seconds as u64,
            1,
            MAX_STICKINESS_SECONDS as u64,
            errors,
        );
    }
}

pub(crate) fn validate_redirect(path: &FieldPath, redirect: &RedirectConfig, errors: &mut ValidationErrors) {
    if !matches!(redirect.protocol.as_str(), "#{protocol}" | "HTTP" | "HTTPS") {
        errors.push(ValidationError::InvalidValue {
            path: path.clone().field("protocol"),
            value: redirect.protocol.clone(),
            reason: "expected HTTP, HTTPS or #{protocol}".to_string(),
        });
    }

    if redirect.port != "#{port}" {
        match redirect.port.parse::<u32>() {
            Ok(port) => check_range(path.clone().field("port"), port as u64, 1, 65_535, errors),
            Err(_) => errors.push(ValidationError::InvalidValue {
                path: path.clone().field("port"),
                value: redirect.port.clone(),
                reason: "expected a port number or #{port}".to_string(),
            }),
        }
    }

    check_non_empty(path.clone().field("host"), &redirect.host, errors);
    if !redirect.path.starts_with('/') {
        errors.push(ValidationError::InvalidValue {
            path: path.clone().field("path"),
            value: redirect.path.clone(),
            reason: "paths start with '/'".to_string(),
        });
    }
}

pub(crate) fn validate_fixed_response(
    path: &FieldPath,
    response: &FixedResponseConfig,
    errors: &mut ValidationErrors,
) {
    if !FIXED_RESPONSE_CONTENT_TYPES.contains(&response.content_type.as_str()) {
        errors.push(ValidationError::InvalidValue {
            path: path.clone().field("content_type"),
            value: response.content_type.clone(),
            reason: format!("expected one of {}", FIXED_RESPONSE_CONTENT_TYPES.join(", ")),
        });
    }

    if !FIXED_RESPONSE_STATUS.is_match(&response.status_code) {
        errors.push(ValidationError::InvalidValue {
            path: path.clone().field("status_code"),
            value: response.status_code.clone(),
            reason: "expected a 2XX, 4XX or 5XX status".to_string(),
        });
    }

    if let Some(body) = &response.message_body {
        let len = body.chars().count();
        if len > MAX_MESSAGE_BODY_LEN {
            errors.push(ValidationError::OutOfRange {
                path: path.clone().field("message_body"),
                value: len as u64,
                min: 0,
                max: MAX_MESSAGE_BODY_LEN as u64,
            });
        }
    }
}

pub(crate) fn validate_cognito(path: &FieldPath, cognito: &CognitoConfig, errors: &mut ValidationErrors) {
    check_non_empty(path.clone().field("user_pool_arn"), &cognito.user_pool_arn, errors);
    check_non_empty(
        path.clone().field("user_pool_client_id"),
        &cognito.user_pool_client_id,
        errors,
    );
    check_non_empty(
        path.clone().field("user_pool_domain"),
        &cognito.user_pool_domain,
        errors,
    );
}

pub(crate) fn validate_oidc(path: &FieldPath, oidc: &OidcConfig, errors: &mut ValidationErrors) {
    for (field, value) in [
        ("authorization_endpoint", &oidc.authorization_endpoint),
        ("client_id", &oidc.client_id),
        ("issuer", &oidc.issuer),
        ("token_endpoint", &oidc.token_endpoint),
        ("user_info_endpoint", &oidc.user_info_endpoint),
    ] {
        check_non_empty(path.clone().field(field), value, errors);
    }
}
