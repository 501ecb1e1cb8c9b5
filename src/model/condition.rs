//! Remote (tagged) representation of rule conditions

use serde::{Deserialize, Serialize};
use std::fmt;

/// Discriminant of a condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConditionField {
    HostHeader,
    HttpHeader,
    HttpRequestMethod,
    PathPattern,
    QueryString,
    SourceIp,
}

impl ConditionField {
    pub const ALL: [ConditionField; 6] = [
        ConditionField::HostHeader,
        ConditionField::HttpHeader,
        ConditionField::HttpRequestMethod,
        ConditionField::PathPattern,
        ConditionField::QueryString,
        ConditionField::SourceIp,
    ];

    /// Wire tag, e.g. `path-pattern`.
    pub fn as_str(&self) -> &'static str {
        match self {
            ConditionField::HostHeader => "host-header",
            ConditionField::HttpHeader => "http-header",
            ConditionField::HttpRequestMethod => "http-request-method",
            ConditionField::PathPattern => "path-pattern",
            ConditionField::QueryString => "query-string",
            ConditionField::SourceIp => "source-ip",
        }
    }

    /// Name of the declared slot, e.g. `path_pattern`.
    pub fn slot_name(&self) -> &'static str {
        match self {
            ConditionField::HostHeader => "host_header",
            ConditionField::HttpHeader => "http_header",
            ConditionField::HttpRequestMethod => "http_request_method",
            ConditionField::PathPattern => "path_pattern",
            ConditionField::QueryString => "query_string",
            ConditionField::SourceIp => "source_ip",
        }
    }
}

impl fmt::Display for ConditionField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Key/value pair matched against the query string. A missing key matches
/// the value anywhere in the query.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct QueryStringPair {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    pub value: String,
}

/// One match predicate of a rule as the control plane stores it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "field", rename_all = "kebab-case")]
pub enum Condition {
    HostHeader {
        values: Vec<String>,
    },
    HttpHeader {
        http_header_name: String,
        values: Vec<String>,
    },
    HttpRequestMethod {
        values: Vec<String>,
    },
    PathPattern {
        values: Vec<String>,
    },
    QueryString {
        values: Vec<QueryStringPair>,
    },
    SourceIp {
        values: Vec<String>,
    },
}

impl Condition {
    pub fn field(&self) -> ConditionField {
        match self {
            Condition::HostHeader { .. } => ConditionField::HostHeader,
            Condition::HttpHeader { .. } => ConditionField::HttpHeader,
            Condition::HttpRequestMethod { .. } => ConditionField::HttpRequestMethod,
            Condition::PathPattern { .. } => ConditionField::PathPattern,
            Condition::QueryString { .. } => ConditionField::QueryString,
            Condition::SourceIp { .. } => ConditionField::SourceIp,
        }
    }
}
