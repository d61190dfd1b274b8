//! The edit descriptor store.
//!
//! The store is an overlay on the immutable tree: it maps a node and one of
//! its properties to the intended change and is the only state a session
//! mutates. Slots and lists are recorded lazily, on first mutation, from the
//! original tree.

use std::collections::HashMap;
use std::fmt;

use weaver_syntax::{NodeId, PropertyKey};

use crate::list::ListState;
use crate::node::RewriteNode;

/// A node together with one of its properties.
pub(crate) type SlotKey = (NodeId, PropertyKey);

/// The recorded change of one property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditEvent {
    /// The property keeps its original content.
    Unchanged,
    /// A node fills a formerly empty slot.
    Inserted(RewriteNode),
    /// The original child is removed.
    Removed(NodeId),
    /// The original child is replaced.
    Replaced {
        /// The child being replaced.
        original: NodeId,
        /// The node taking its place.
        replacement: RewriteNode,
    },
    /// A token value changes.
    Set {
        /// Original token text, `None` when the token was absent.
        original: Option<String>,
        /// New token text.
        value: String,
    },
}

impl EditEvent {
    /// Whether the event changes anything.
    #[must_use]
    pub const fn is_change(&self) -> bool {
        !matches!(self, Self::Unchanged)
    }
}

impl fmt::Display for EditEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unchanged => f.write_str("unchanged"),
            Self::Inserted(node) => write!(f, "inserted {node}"),
            Self::Removed(node) => write!(f, "removed {node}"),
            Self::Replaced {
                original,
                replacement,
            } => write!(f, "replaced {original} with {replacement}"),
            Self::Set { original, value } => match original {
                Some(text) => write!(f, "set {text:?} to {value:?}"),
                None => write!(f, "set {value:?}"),
            },
        }
    }
}

/// Original and current occupant of a single-child slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct SlotState {
    pub(crate) original: Option<NodeId>,
    pub(crate) current: Option<RewriteNode>,
}

impl SlotState {
    pub(crate) const fn new(original: Option<NodeId>) -> Self {
        Self {
            original,
            current: match original {
                Some(node) => Some(RewriteNode::Original(node)),
                None => None,
            },
        }
    }

    /// Whether the slot still holds its original child.
    pub(crate) fn holds_original(&self) -> bool {
        self.current == self.original.map(RewriteNode::Original)
    }

    pub(crate) fn event(&self) -> EditEvent {
        if self.holds_original() {
            return EditEvent::Unchanged;
        }
        match (self.original, self.current) {
            (None, Some(node)) => EditEvent::Inserted(node),
            (Some(original), None) => EditEvent::Removed(original),
            (Some(original), Some(replacement)) => EditEvent::Replaced {
                original,
                replacement,
            },
            (None, None) => EditEvent::Unchanged,
        }
    }
}

/// Per-session overlay of recorded edits.
#[derive(Debug, Default)]
pub(crate) struct EditStore {
    slots: HashMap<SlotKey, SlotState>,
    lists: HashMap<SlotKey, ListState>,
    values: HashMap<SlotKey, String>,
}

impl EditStore {
    pub(crate) fn slot(&self, key: SlotKey) -> Option<&SlotState> {
        self.slots.get(&key)
    }

    pub(crate) fn slot_mut(&mut self, key: SlotKey, original: Option<NodeId>) -> &mut SlotState {
        self.slots
            .entry(key)
            .or_insert_with(|| SlotState::new(original))
    }

    pub(crate) fn list(&self, key: SlotKey) -> Option<&ListState> {
        self.lists.get(&key)
    }

    pub(crate) fn list_mut(&mut self, key: SlotKey, original: &[NodeId]) -> &mut ListState {
        self.lists
            .entry(key)
            .or_insert_with(|| ListState::new(original))
    }

    pub(crate) fn value(&self, key: SlotKey) -> Option<&str> {
        self.values.get(&key).map(String::as_str)
    }

    pub(crate) fn set_value(&mut self, key: SlotKey, value: String) {
        self.values.insert(key, value);
    }

    pub(crate) fn reset_value(&mut self, key: SlotKey) {
        self.values.remove(&key);
    }

    /// Number of recorded properties, changed or not.
    pub(crate) fn len(&self) -> usize {
        self.slots
            .len()
            .saturating_add(self.lists.len())
            .saturating_add(self.values.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{NewNodeId, SessionId};
    use weaver_syntax::{SyntaxCategory, TreeBuilder};

    fn original_node() -> NodeId {
        let mut builder = TreeBuilder::new("x");
        let leaf = builder
            .leaf("x", SyntaxCategory::Name, 0..1)
            .expect("leaf");
        builder.finish(leaf).expect("tree");
        leaf
    }

    #[test]
    fn slot_events_follow_original_and_current() {
        let original = original_node();
        let fresh = RewriteNode::New(NewNodeId::new(SessionId::fresh(), 0));

        let mut slot = SlotState::new(Some(original));
        assert_eq!(slot.event(), EditEvent::Unchanged);
        slot.current = Some(fresh);
        assert_eq!(
            slot.event(),
            EditEvent::Replaced {
                original,
                replacement: fresh
            }
        );
        slot.current = None;
        assert_eq!(slot.event(), EditEvent::Removed(original));

        let mut empty = SlotState::new(None);
        empty.current = Some(fresh);
        assert_eq!(empty.event(), EditEvent::Inserted(fresh));
        empty.current = None;
        assert_eq!(empty.event(), EditEvent::Unchanged);
    }
}
