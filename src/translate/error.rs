//! Validation error types

use crate::model::{ActionType, FieldPath};
use std::fmt;
use thiserror::Error;

/// A single problem with a declared rule, located by its field path.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The block selected by the action's `type` is absent
    #[error("{path}: action type '{action_type}' requires {expected}")]
    MissingActionBlock {
        path: FieldPath,
        action_type: ActionType,
        expected: &'static str,
    },

    /// A forward action set both the `target_group_arn` shortcut and a `forward` block
    #[error("{path}: forward action takes exactly one of target_group_arn or a forward block, not both")]
    ConflictingForwardShapes { path: FieldPath },

    /// A condition entry with no populated slot
    #[error("{path}: exactly one of host_header, http_header, http_request_method, path_pattern, query_string or source_ip must be set")]
    MissingConditionField { path: FieldPath },

    /// A condition entry with more than one populated slot
    #[error("{path}: only one condition field may be set per condition, found {}", .populated.join(", "))]
    AmbiguousConditionField {
        path: FieldPath,
        populated: Vec<&'static str>,
    },

    #[error("{path}: {value} is outside [{min}, {max}]")]
    OutOfRange {
        path: FieldPath,
        value: u64,
        min: u64,
        max: u64,
    },

    #[error("{path}: invalid value '{value}': {reason}")]
    InvalidValue {
        path: FieldPath,
        value: String,
        reason: String,
    },

    #[error("{path}: must not be empty")]
    Empty { path: FieldPath },
}

impl ValidationError {
    /// Field path the error points at.
    pub fn path(&self) -> &FieldPath {
        match self {
            ValidationError::MissingActionBlock { path, .. }
            | ValidationError::ConflictingForwardShapes { path }
            | ValidationError::MissingConditionField { path }
            | ValidationError::AmbiguousConditionField { path, .. }
            | ValidationError::OutOfRange { path, .. }
            | ValidationError::InvalidValue { path, .. }
            | ValidationError::Empty { path } => path,
        }
    }
}

/// Every validation error found in one translation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(Vec<ValidationError>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn push(&mut self, error: ValidationError) {
        self.0.push(error);
    }

    /// Absorb errors from another pass.
    pub fn merge(&mut self, other: ValidationErrors) {
        self.0.extend(other.0);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ValidationError> {
        self.0.iter()
    }

    /// `Ok(value)` when no error was recorded.
    pub fn into_result<T>(self, value: T) -> Result<T, ValidationErrors> {
        if self.0.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.as_slice() {
            [] => f.write_str("no validation errors"),
            [only] => write!(f, "{}", only),
            errors => {
                write!(f, "{} validation errors:", errors.len())?;
                for error in errors {
                    write!(f, "\n  - {}", error)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ValidationErrors {}

impl From<ValidationError> for ValidationErrors {
    fn from(error: ValidationError) -> Self {
        Self(vec![error])
    }
}

impl IntoIterator for ValidationErrors {
    type Item = ValidationError;
    type IntoIter = std::vec::IntoIter<ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
