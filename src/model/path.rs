//! Structured field paths
//!
//! A [`FieldPath`] names a location inside a rule, such as
//! `action[1].forward.stickiness.duration_seconds`. Validation errors carry
//! one, and the relevance gate walks them segment by segment instead of
//! counting separators in a string.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One step of a [`FieldPath`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Segment {
    /// Named field of a block
    Field(String),
    /// Position in a list
    Index(usize),
}

/// Location of a field inside a rule.
///
/// # Example
///
/// ```
/// use lbrule::model::FieldPath;
///
/// let path = FieldPath::root().field("action").index(0).field("redirect").field("host");
/// assert_eq!(path.to_string(), "action[0].redirect.host");
/// assert_eq!(path.ancestor(2).unwrap().to_string(), "action[0]");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldPath(Vec<Segment>);

impl FieldPath {
    /// Empty path (the rule itself).
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Append a named field.
    pub fn field(mut self, name: impl Into<String>) -> Self {
        self.0.push(Segment::Field(name.into()));
        self
    }

    /// Append a list index.
    pub fn index(mut self, index: usize) -> Self {
        self.0.push(Segment::Index(index));
        self
    }

    /// Append an arbitrary segment.
    pub fn push(mut self, segment: Segment) -> Self {
        self.0.push(segment);
        self
    }

    pub fn segments(&self) -> &[Segment] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Path with the last `levels` segments removed.
    ///
    /// Returns `None` when the path is shorter than `levels`.
    pub fn ancestor(&self, levels: usize) -> Option<FieldPath> {
        let keep = self.0.len().checked_sub(levels)?;
        Some(Self(self.0[..keep].to_vec()))
    }

    /// First `len` segments of this path.
    pub fn prefix(&self, len: usize) -> FieldPath {
        Self(self.0[..len.min(self.0.len())].to_vec())
    }

    /// Name of the field at `position`, if that segment is a field.
    pub fn field_at(&self, position: usize) -> Option<&str> {
        match self.0.get(position) {
            Some(Segment::Field(name)) => Some(name.as_str()),
            _ => None,
        }
    }

    /// Whether `other` is a prefix of this path.
    pub fn starts_with(&self, other: &FieldPath) -> bool {
        self.0.starts_with(&other.0)
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.0.iter().enumerate() {
            match segment {
                Segment::Field(name) if i == 0 => write!(f, "{}", name)?,
                Segment::Field(name) => write!(f, ".{}", name)?,
                Segment::Index(index) => write!(f, "[{}]", index)?,
            }
        }
        Ok(())
    }
}
