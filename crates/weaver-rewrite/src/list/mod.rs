//! List rewriting: the per-list edit state and the client-facing handle.

mod align;

pub use align::{ListEditScript, ListEntry, ListTag};
pub(crate) use align::{ListItem, align};

use weaver_syntax::{NodeId, PropertyKey};

use crate::error::RewriteError;
use crate::events::SlotKey;
use crate::node::RewriteNode;
use crate::session::RewriteSession;

/// Current order of one list property.
#[derive(Debug, Clone)]
pub(crate) struct ListState {
    original: Vec<NodeId>,
    items: Vec<ListItem>,
}

impl ListState {
    pub(crate) fn new(original: &[NodeId]) -> Self {
        Self {
            original: original.to_vec(),
            items: original
                .iter()
                .enumerate()
                .map(|(index, node)| ListItem::original(index, *node))
                .collect(),
        }
    }

    pub(crate) fn items(&self) -> &[ListItem] {
        &self.items
    }

    pub(crate) fn position(&self, node: RewriteNode) -> Option<usize> {
        self.items.iter().position(|item| item.node == node)
    }

    pub(crate) const fn len(&self) -> usize {
        self.items.len()
    }

    /// Checks that `node` may be inserted at `index` without changing the
    /// state.
    pub(crate) fn check_insert(&self, node: RewriteNode, index: usize) -> Result<(), RewriteError> {
        if self.position(node).is_some() {
            return Err(RewriteError::invalid_member(
                node,
                "element is already in the list",
            ));
        }
        if index > self.items.len() {
            return Err(RewriteError::invalid_member(
                node,
                format!("index {index} is past the end of a list of {}", self.items.len()),
            ));
        }
        if let RewriteNode::Original(id) = node
            && !self.original.contains(&id)
        {
            return Err(RewriteError::invalid_member(
                node,
                "original nodes from elsewhere must be placed with a copy or move placeholder",
            ));
        }
        Ok(())
    }

    pub(crate) fn insert(&mut self, node: RewriteNode, index: usize) -> Result<(), RewriteError> {
        self.check_insert(node, index)?;
        let origin = node
            .original()
            .and_then(|id| self.original.iter().position(|candidate| *candidate == id));
        self.items.insert(index, ListItem { node, origin });
        Ok(())
    }

    pub(crate) fn require(&self, node: RewriteNode) -> Result<usize, RewriteError> {
        self.position(node)
            .ok_or_else(|| RewriteError::invalid_member(node, "element is not in the list"))
    }

    pub(crate) fn remove(&mut self, node: RewriteNode) -> Result<ListItem, RewriteError> {
        let index = self.require(node)?;
        Ok(self.items.remove(index))
    }

    pub(crate) fn replace(
        &mut self,
        node: RewriteNode,
        replacement: RewriteNode,
    ) -> Result<(), RewriteError> {
        let index = self.require(node)?;
        if self.position(replacement).is_some() {
            return Err(RewriteError::invalid_member(
                replacement,
                "replacement is already in the list",
            ));
        }
        let own_origin = replacement
            .original()
            .and_then(|id| self.original.iter().position(|candidate| *candidate == id));
        if let Some(item) = self.items.get_mut(index) {
            // An original of this list keeps its own index; anything else
            // takes over the slot of the element it replaces.
            item.origin = own_origin.or(item.origin);
            item.node = replacement;
        }
        Ok(())
    }

    pub(crate) fn move_to(&mut self, node: RewriteNode, index: usize) -> Result<(), RewriteError> {
        let current = self.require(node)?;
        let last = self.items.len().saturating_sub(1);
        if index > last {
            return Err(RewriteError::invalid_member(
                node,
                format!("index {index} is past the end of a list of {}", self.items.len()),
            ));
        }
        let item = self.items.remove(current);
        self.items.insert(index, item);
        Ok(())
    }

    /// Resolves the edit script, treating originals for which `moved_away`
    /// holds as removed from the list.
    pub(crate) fn script(&self, moved_away: impl Fn(NodeId) -> bool) -> ListEditScript {
        let items: Vec<ListItem> = self
            .items
            .iter()
            .filter(|item| !item.node.original().is_some_and(&moved_away))
            .copied()
            .collect();
        align(&self.original, &items)
    }
}

/// Where a list insertion goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum InsertAt {
    Index(usize),
    Last,
    Before(RewriteNode),
    After(RewriteNode),
}

impl InsertAt {
    pub(crate) fn resolve(self, state: &ListState) -> Result<usize, RewriteError> {
        match self {
            Self::Index(index) => Ok(index),
            Self::Last => Ok(state.len()),
            Self::Before(anchor) => state.require(anchor),
            Self::After(anchor) => state.require(anchor).map(|index| index.saturating_add(1)),
        }
    }
}

/// Handle for rewriting one list property of an original node.
///
/// Obtained from [`RewriteSession::list`]. Every operation is checked
/// against the list's current state and leaves it untouched on error.
pub struct ListRewrite<'s, 't> {
    session: &'s mut RewriteSession<'t>,
    key: SlotKey,
}

impl<'s, 't> ListRewrite<'s, 't> {
    pub(crate) const fn new(session: &'s mut RewriteSession<'t>, key: SlotKey) -> Self {
        Self { session, key }
    }

    /// The node owning the list.
    #[must_use]
    pub const fn parent(&self) -> NodeId {
        self.key.0
    }

    /// The list property.
    #[must_use]
    pub const fn key(&self) -> PropertyKey {
        self.key.1
    }

    /// Inserts `node` before every other element.
    ///
    /// # Errors
    ///
    /// Returns an error if `node` is foreign, already placed, or already in
    /// the list.
    pub fn insert_first(&mut self, node: impl Into<RewriteNode>) -> Result<(), RewriteError> {
        self.session
            .list_insert(self.key, node.into(), InsertAt::Index(0))
    }

    /// Inserts `node` after every other element.
    ///
    /// # Errors
    ///
    /// Returns an error if `node` is foreign, already placed, or already in
    /// the list.
    pub fn insert_last(&mut self, node: impl Into<RewriteNode>) -> Result<(), RewriteError> {
        self.session.list_insert(self.key, node.into(), InsertAt::Last)
    }

    /// Inserts `node` at `index` of the current list.
    ///
    /// # Errors
    ///
    /// Returns an error if `index` is past the end of the list, or `node`
    /// is foreign, already placed, or already in the list.
    pub fn insert_at(
        &mut self,
        node: impl Into<RewriteNode>,
        index: usize,
    ) -> Result<(), RewriteError> {
        self.session
            .list_insert(self.key, node.into(), InsertAt::Index(index))
    }

    /// Inserts `node` directly before `anchor`.
    ///
    /// # Errors
    ///
    /// Returns [`RewriteError::InvalidListMember`] if `anchor` is not in the
    /// list, and the errors of [`ListRewrite::insert_at`].
    pub fn insert_before(
        &mut self,
        node: impl Into<RewriteNode>,
        anchor: impl Into<RewriteNode>,
    ) -> Result<(), RewriteError> {
        self.session
            .list_insert(self.key, node.into(), InsertAt::Before(anchor.into()))
    }

    /// Inserts `node` directly after `anchor`.
    ///
    /// # Errors
    ///
    /// Returns [`RewriteError::InvalidListMember`] if `anchor` is not in the
    /// list, and the errors of [`ListRewrite::insert_at`].
    pub fn insert_after(
        &mut self,
        node: impl Into<RewriteNode>,
        anchor: impl Into<RewriteNode>,
    ) -> Result<(), RewriteError> {
        self.session
            .list_insert(self.key, node.into(), InsertAt::After(anchor.into()))
    }

    /// Removes `node` from the list.
    ///
    /// # Errors
    ///
    /// Returns [`RewriteError::InvalidListMember`] if `node` is not
    /// currently in the list.
    pub fn remove(&mut self, node: impl Into<RewriteNode>) -> Result<(), RewriteError> {
        self.session.list_remove(self.key, node.into())
    }

    /// Replaces `node` with `replacement` at the same position.
    ///
    /// # Errors
    ///
    /// Returns [`RewriteError::InvalidListMember`] if `node` is not
    /// currently in the list, and the errors of [`ListRewrite::insert_at`]
    /// for `replacement`.
    pub fn replace(
        &mut self,
        node: impl Into<RewriteNode>,
        replacement: impl Into<RewriteNode>,
    ) -> Result<(), RewriteError> {
        self.session
            .list_replace(self.key, node.into(), replacement.into())
    }

    /// Moves `node` to `index` of the list it is already in.
    ///
    /// # Errors
    ///
    /// Returns [`RewriteError::InvalidListMember`] if `node` is not
    /// currently in the list or `index` is out of range.
    pub fn move_to(&mut self, node: impl Into<RewriteNode>, index: usize) -> Result<(), RewriteError> {
        self.session.list_move(self.key, node.into(), index)
    }

    /// The original elements in source order.
    #[must_use]
    pub fn original_list(&self) -> Vec<NodeId> {
        self.session.list_original(self.key)
    }

    /// The elements of the rewritten list in order.
    #[must_use]
    pub fn rewritten_list(&self) -> Vec<RewriteNode> {
        self.session.list_rewritten(self.key)
    }
}
