//! Rule data model
//!
//! Two shapes of the same rule live here:
//!
//! - The **remote** shape the control plane speaks: [`Action`] carries a
//!   tagged [`ActionPayload`] and each [`Condition`] is one tagged variant.
//! - The **declared** shape a user writes: [`RuleSpec`] with
//!   [`DeclaredAction`] / [`DeclaredCondition`] entries where every variant
//!   is an optional sibling block and a `type` discriminant picks the live one.
//!
//! The block structs in [`blocks`] are shared by both shapes. Translation
//! between the two lives in [`crate::translate`].

pub mod action;
pub mod arn;
pub mod blocks;
pub mod condition;
pub mod declared;
pub mod path;
pub mod priority;

pub use action::{Action, ActionPayload, ActionType, MAX_ACTION_ORDER};
pub use arn::listener_arn_from_rule_arn;
pub use blocks::{
    CognitoConfig, FixedResponseConfig, ForwardConfig, HttpHeaderBlock, OidcConfig,
    RedirectConfig, RedirectStatus, Stickiness, TargetGroupTuple, UnauthenticatedAction,
    ValuesBlock,
};
pub use condition::{Condition, ConditionField, QueryStringPair};
pub use declared::{DeclaredAction, DeclaredCondition, RuleSpec};
pub use path::{FieldPath, Segment};
pub use priority::{Priority, PriorityError, MAX_PRIORITY, MIN_PRIORITY};
