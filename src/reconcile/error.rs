//! Reconcile error types

use crate::allocator::AllocationError;
use crate::remote::RemoteError;
use crate::translate::ValidationErrors;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SyncError {
    /// The declared rule is invalid; nothing was sent.
    #[error("Invalid rule: {0}")]
    Validation(#[from] ValidationErrors),

    #[error(transparent)]
    Allocation(#[from] AllocationError),

    #[error(transparent)]
    Remote(#[from] RemoteError),

    /// The rule to update does not exist (anymore).
    #[error("Rule not found: {0}")]
    NotFound(String),

    /// The field can only change by replacing the rule.
    #[error("{field} cannot change from '{current}' to '{desired}'; the rule must be replaced")]
    ImmutableField {
        field: &'static str,
        current: String,
        desired: String,
    },
}
