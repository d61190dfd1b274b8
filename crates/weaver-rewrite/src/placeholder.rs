//! Copy, move and group placeholders.
//!
//! Placeholders are resolved only when the session is materialized, so a
//! copy or move reflects every edit recorded inside its source subtree, no
//! matter whether the edit was made before or after the placeholder.

use weaver_syntax::{NodeId, SyntaxCategory};

use crate::node::RewriteNode;

/// A synthetic node standing for other nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Placeholder {
    /// Re-emits an original subtree; the source stays where it is.
    Copy(NodeId),
    /// Re-emits an original subtree and removes it from its original
    /// location.
    Move(NodeId),
    /// Several sibling nodes that fill a single target position.
    Group {
        /// Members in order.
        members: Vec<RewriteNode>,
        /// Category shared by all members.
        category: SyntaxCategory,
    },
}

impl Placeholder {
    /// The original node a copy or move re-emits.
    #[must_use]
    pub const fn source(&self) -> Option<NodeId> {
        match self {
            Self::Copy(source) | Self::Move(source) => Some(*source),
            Self::Group { .. } => None,
        }
    }

    /// Members of a group; empty for copies and moves.
    #[must_use]
    pub fn members(&self) -> &[RewriteNode] {
        match self {
            Self::Group { members, .. } => members,
            Self::Copy(_) | Self::Move(_) => &[],
        }
    }

    /// Short name of the placeholder kind for diagnostics.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Copy(_) => "copy",
            Self::Move(_) => "move",
            Self::Group { .. } => "group",
        }
    }
}
