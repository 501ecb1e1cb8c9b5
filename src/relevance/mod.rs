//! Discriminant-gated relevance
//!
//! Many declared blocks only mean something when a sibling discriminant
//! selects them: `action[i].redirect` is live only while `action[i].type`
//! is `"redirect"`. Changes inside an inactive block must never register
//! as drift. [`RelevanceGate`] answers that question for a [`FieldPath`].
//!
//! The relationship between a block and its discriminant is declared in a
//! [`GatedBlock`] table rather than inferred from string offsets: a block
//! sits at `<collection>[i].<block>` and its discriminant is the field
//! `levels_up` segments above the block.

pub mod diff;

pub use diff::{plan_changes, RuleChanges};

use crate::model::{ActionType, FieldPath, Segment};

/// Where a block's discriminant lives, relative to the block itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiscriminantRef {
    /// Segments to climb from the block before naming the discriminant
    pub levels_up: usize,
    /// Discriminant field name at that level
    pub field: &'static str,
}

/// A block that is only observable when its discriminant selects it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GatedBlock {
    /// List the block's owner belongs to (e.g. `action`)
    pub collection: &'static str,
    /// Block (or field) name under each list entry (e.g. `forward`)
    pub block: &'static str,
    pub discriminant: DiscriminantRef,
    /// Discriminant value that activates the block
    pub selects: &'static str,
}

impl GatedBlock {
    /// Position of this block's segment inside `path`, if the path runs
    /// through `<collection>[i].<block>`.
    fn position_in(&self, path: &FieldPath) -> Option<usize> {
        let segments = path.segments();
        (2..segments.len()).find(|&p| {
            matches!(&segments[p], Segment::Field(name) if name == self.block)
                && matches!(segments[p - 1], Segment::Index(_))
                && matches!(&segments[p - 2], Segment::Field(name) if name == self.collection)
        })
    }
}

/// Decides whether a change at a field path is observable.
#[derive(Debug, Clone)]
pub struct RelevanceGate {
    blocks: Vec<GatedBlock>,
}

impl RelevanceGate {
    pub fn new(blocks: Vec<GatedBlock>) -> Self {
        Self { blocks }
    }

    /// Gate for listener rules: every action block is selected by the
    /// action's `type`, and the `target_group_arn` shortcut belongs to
    /// `forward`.
    pub fn for_rules() -> Self {
        let type_field = DiscriminantRef {
            levels_up: 1,
            field: "type",
        };
        let mut blocks: Vec<GatedBlock> = ActionType::ALL
            .iter()
            .map(|action_type| GatedBlock {
                collection: "action",
                block: action_type.block_name(),
                discriminant: type_field,
                selects: action_type.as_str(),
            })
            .collect();
        blocks.push(GatedBlock {
            collection: "action",
            block: "target_group_arn",
            discriminant: type_field,
            selects: ActionType::Forward.as_str(),
        });
        Self::new(blocks)
    }

    /// Gate governing `path`, with the position of the gated segment. The
    /// outermost gated block wins.
    fn gate_for(&self, path: &FieldPath) -> Option<(&GatedBlock, usize)> {
        self.blocks
            .iter()
            .filter_map(|block| block.position_in(path).map(|p| (block, p)))
            .min_by_key(|(_, p)| *p)
    }

    /// Path of the discriminant that governs `path`, or `None` when the path
    /// is not inside a gated block.
    ///
    /// # Example
    ///
    /// ```
    /// use lbrule::model::FieldPath;
    /// use lbrule::relevance::RelevanceGate;
    ///
    /// let gate = RelevanceGate::for_rules();
    /// let path = FieldPath::root().field("action").index(1).field("forward").field("stickiness");
    /// assert_eq!(gate.discriminant_path(&path).unwrap().to_string(), "action[1].type");
    /// ```
    pub fn discriminant_path(&self, path: &FieldPath) -> Option<FieldPath> {
        let (block, position) = self.gate_for(path)?;
        let block_path = path.prefix(position + 1);
        Some(
            block_path
                .ancestor(block.discriminant.levels_up)?
                .field(block.discriminant.field),
        )
    }

    /// Whether a difference at `path` is a real change, given the current
    /// value of its discriminant. Paths outside any gated block are always
    /// relevant; gated paths are relevant only when the discriminant selects
    /// their block.
    pub fn is_relevant(&self, path: &FieldPath, discriminant: Option<&str>) -> bool {
        match self.gate_for(path) {
            None => true,
            Some((block, _)) => discriminant == Some(block.selects),
        }
    }
}

impl Default for RelevanceGate {
    fn default() -> Self {
        Self::for_rules()
    }
}
