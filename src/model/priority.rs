//! Listener rule priority

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Lowest assignable priority (evaluated first).
pub const MIN_PRIORITY: u32 = 1;

/// Highest assignable priority.
pub const MAX_PRIORITY: u32 = 50_000;

const DEFAULT_LITERAL: &str = "default";

/// Errors produced when parsing or constructing a [`Priority`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PriorityError {
    #[error("priority {0} is outside [1, 50000]")]
    OutOfRange(u32),

    #[error("invalid priority '{0}': expected an integer or \"default\"")]
    Invalid(String),
}

/// Evaluation priority of a rule on its listener.
///
/// The control plane reports priorities as strings: a decimal integer, or
/// `"default"` for the listener's catch-all rule. Plain integers are
/// accepted on input as well; output is always the string form. The default rule is only
/// ever observed, never created by this crate.
///
/// Ordering follows evaluation order: numbered rules ascending, the default
/// rule last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(into = "String")]
pub enum Priority {
    Numbered(u32),
    Default,
}

impl Priority {
    /// Construct a numbered priority, checking the allowed range.
    pub fn numbered(value: u32) -> Result<Self, PriorityError> {
        if (MIN_PRIORITY..=MAX_PRIORITY).contains(&value) {
            Ok(Priority::Numbered(value))
        } else {
            Err(PriorityError::OutOfRange(value))
        }
    }

    /// Integer value, `None` for the default rule.
    pub fn value(&self) -> Option<u32> {
        match self {
            Priority::Numbered(v) => Some(*v),
            Priority::Default => None,
        }
    }

    pub fn is_default(&self) -> bool {
        matches!(self, Priority::Default)
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Priority::Numbered(v) => write!(f, "{}", v),
            Priority::Default => f.write_str(DEFAULT_LITERAL),
        }
    }
}

impl FromStr for Priority {
    type Err = PriorityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case(DEFAULT_LITERAL) {
            return Ok(Priority::Default);
        }
        let value: u32 = trimmed
            .parse()
            .map_err(|_| PriorityError::Invalid(s.to_string()))?;
        Priority::numbered(value)
    }
}

impl TryFrom<i64> for Priority {
    type Error = PriorityError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        let value = u32::try_from(value).map_err(|_| PriorityError::Invalid(value.to_string()))?;
        Priority::numbered(value)
    }
}

/// Either wire form of a priority.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawPriority {
    Number(i64),
    Text(String),
}

impl<'de> Deserialize<'de> for Priority {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let parsed = match RawPriority::deserialize(deserializer)? {
            RawPriority::Number(n) => Priority::try_from(n),
            RawPriority::Text(s) => s.parse(),
        };
        parsed.map_err(serde::de::Error::custom)
    }
}

impl From<Priority> for String {
    fn from(priority: Priority) -> Self {
        priority.to_string()
    }
}
