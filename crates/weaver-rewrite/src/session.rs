//! Rewrite sessions over one immutable syntax tree.
//!
//! A session is opened against a [`SyntaxTree`] and records every requested
//! change in an [`EditStore`] overlay; the tree itself is never touched.
//! Nothing is rendered until [`RewriteSession::materialize`] walks the tree
//! and turns the overlay into a [`TextEditSet`].

use std::collections::HashMap;

use tracing::{debug, warn};
use weaver_syntax::{NodeId, Property, PropertyKey, SyntaxCategory, SyntaxNode, SyntaxTree};

use crate::error::RewriteError;
use crate::events::{EditEvent, EditStore, SlotKey, SlotState};
use crate::list::{InsertAt, ListEditScript, ListRewrite, ListState};
use crate::node::{NewNode, NewNodeId, PlaceholderId, RewriteNode, SessionId};
use crate::options::RewriteOptions;
use crate::placeholder::Placeholder;
use crate::printer::{Printer, TemplatePrinter};
use crate::synthesis;
use crate::text_edit::TextEditSet;

/// New content for a child slot or token value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyValue {
    /// A node for a child slot.
    Node(RewriteNode),
    /// Clears a child slot or deletes a token value.
    Absent,
    /// New text for a token value.
    Text(String),
}

impl From<RewriteNode> for PropertyValue {
    fn from(node: RewriteNode) -> Self {
        Self::Node(node)
    }
}

impl From<NewNodeId> for PropertyValue {
    fn from(node: NewNodeId) -> Self {
        Self::Node(node.into())
    }
}

impl From<PlaceholderId> for PropertyValue {
    fn from(node: PlaceholderId) -> Self {
        Self::Node(node.into())
    }
}

impl From<NodeId> for PropertyValue {
    fn from(node: NodeId) -> Self {
        Self::Node(node.into())
    }
}

impl From<&str> for PropertyValue {
    fn from(text: &str) -> Self {
        Self::Text(text.to_owned())
    }
}

impl From<String> for PropertyValue {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

/// Where a synthetic node currently sits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Placement {
    Slot(SlotKey),
    List(SlotKey),
    Group(PlaceholderId),
    Template(NewNodeId),
}

/// An editing session over one syntax tree.
///
/// # Example
///
/// ```ignore
/// let mut session = RewriteSession::new(&tree);
/// let call = session.create_node(NewNode::from_text(SyntaxCategory::Statement, "log();"))?;
/// session.list(block, CHILDREN)?.insert_first(call)?;
/// let edits = session.materialize()?;
/// let rewritten = edits.apply(tree.source())?;
/// ```
#[derive(Debug)]
pub struct RewriteSession<'t> {
    id: SessionId,
    tree: &'t SyntaxTree,
    options: RewriteOptions,
    store: EditStore,
    new_nodes: Vec<NewNode>,
    placeholders: Vec<Placeholder>,
    placements: HashMap<RewriteNode, Placement>,
    moves: HashMap<NodeId, PlaceholderId>,
}

impl<'t> RewriteSession<'t> {
    /// Opens a session with default options.
    #[must_use]
    pub fn new(tree: &'t SyntaxTree) -> Self {
        Self::with_options(tree, RewriteOptions::default())
    }

    /// Opens a session with the given options.
    #[must_use]
    pub fn with_options(tree: &'t SyntaxTree, options: RewriteOptions) -> Self {
        let id = SessionId::fresh();
        debug!(
            session = ?id,
            tree = tree.id().get(),
            nodes = tree.len(),
            malformed = tree.is_malformed(),
            "opened rewrite session"
        );
        Self {
            id,
            tree,
            options,
            store: EditStore::default(),
            new_nodes: Vec::new(),
            placeholders: Vec::new(),
            placements: HashMap::new(),
            moves: HashMap::new(),
        }
    }

    /// The tree the session edits.
    #[must_use]
    pub const fn tree(&self) -> &'t SyntaxTree {
        self.tree
    }

    /// Options in effect.
    #[must_use]
    pub const fn options(&self) -> &RewriteOptions {
        &self.options
    }

    /// Number of properties with recorded state.
    #[must_use]
    pub fn recorded_properties(&self) -> usize {
        self.store.len()
    }

    /// Returns a new node authored in this session.
    #[must_use]
    pub fn new_node(&self, id: NewNodeId) -> Option<&NewNode> {
        if id.session() != self.id {
            return None;
        }
        id.slot().and_then(|index| self.new_nodes.get(index))
    }

    /// Returns a placeholder created in this session.
    #[must_use]
    pub fn placeholder(&self, id: PlaceholderId) -> Option<&Placeholder> {
        if id.session() != self.id {
            return None;
        }
        id.slot().and_then(|index| self.placeholders.get(index))
    }

    /// Whether a synthetic node is currently placed in a slot, list,
    /// group or template.
    #[must_use]
    pub fn is_placed(&self, node: impl Into<RewriteNode>) -> bool {
        self.placements.contains_key(&node.into())
    }

    /// Registers a client-authored node.
    ///
    /// # Errors
    ///
    /// Returns [`RewriteError::InvalidTemplate`] if the template embeds an
    /// original node or the same node twice, [`RewriteError::ForeignNode`]
    /// for nodes of another session and [`RewriteError::ConflictingEdit`]
    /// for nodes that are already placed.
    pub fn create_node(&mut self, node: NewNode) -> Result<NewNodeId, RewriteError> {
        let children: Vec<RewriteNode> = node.children().collect();
        for (position, child) in children.iter().enumerate() {
            self.check_node(*child)?;
            if !child.is_synthetic() {
                return Err(RewriteError::invalid_template(format!(
                    "{child} must be embedded through a copy or move placeholder"
                )));
            }
            if children.iter().take(position).any(|earlier| earlier == child) {
                return Err(RewriteError::invalid_template(format!(
                    "{child} is embedded more than once"
                )));
            }
            self.check_unplaced(*child)?;
        }

        let index = u32::try_from(self.new_nodes.len())
            .map_err(|_| RewriteError::invalid_template("session holds too many new nodes"))?;
        let id = NewNodeId::new(self.id, index);
        for child in children {
            self.placements.insert(child, Placement::Template(id));
        }
        self.new_nodes.push(node);
        Ok(id)
    }

    /// Creates a placeholder re-emitting `node` without removing it.
    ///
    /// # Errors
    ///
    /// Returns [`RewriteError::ForeignNode`] if `node` is not part of the
    /// session's tree.
    pub fn create_copy_placeholder(&mut self, node: NodeId) -> Result<PlaceholderId, RewriteError> {
        self.syntax(node)?;
        self.push_placeholder(Placeholder::Copy(node))
    }

    /// Creates a placeholder re-emitting `node` and removing it from its
    /// original location, unless that location is explicitly replaced.
    ///
    /// # Errors
    ///
    /// Returns [`RewriteError::ForeignNode`] for nodes of another tree,
    /// [`RewriteError::RootEdit`] for the root and
    /// [`RewriteError::ConflictingEdit`] if `node` is already moved.
    pub fn create_move_placeholder(&mut self, node: NodeId) -> Result<PlaceholderId, RewriteError> {
        let syntax = self.syntax(node)?;
        if syntax.parent().is_none() {
            return Err(RewriteError::RootEdit { node });
        }
        if self.moves.contains_key(&node) {
            return Err(RewriteError::conflict(node, "node is already moved"));
        }
        let id = self.push_placeholder(Placeholder::Move(node))?;
        self.moves.insert(node, id);
        Ok(id)
    }

    /// Bundles several synthetic nodes of one category into a group that
    /// fills a single position.
    ///
    /// # Errors
    ///
    /// Returns [`RewriteError::InvalidGroup`] if `members` is empty, mixes
    /// categories, repeats a member or contains an original node, and
    /// [`RewriteError::ConflictingEdit`] if a member is already placed.
    pub fn create_group_placeholder<I>(&mut self, members: I) -> Result<PlaceholderId, RewriteError>
    where
        I: IntoIterator,
        I::Item: Into<RewriteNode>,
    {
        let nodes: Vec<RewriteNode> = members.into_iter().map(Into::into).collect();
        let mut category: Option<SyntaxCategory> = None;
        for (position, member) in nodes.iter().enumerate() {
            self.check_node(*member)?;
            if !member.is_synthetic() {
                return Err(RewriteError::invalid_group(format!(
                    "{member} must be wrapped in a copy or move placeholder"
                )));
            }
            if nodes.iter().take(position).any(|earlier| earlier == member) {
                return Err(RewriteError::invalid_group(format!(
                    "{member} appears more than once"
                )));
            }
            self.check_unplaced(*member)?;
            let member_category = self.category_of(*member)?;
            match category {
                Some(shared) if shared != member_category => {
                    return Err(RewriteError::invalid_group(format!(
                        "members mix {shared} and {member_category} nodes"
                    )));
                }
                _ => category = Some(member_category),
            }
        }
        let Some(shared) = category else {
            return Err(RewriteError::invalid_group("a group needs at least one member"));
        };

        let id = self.push_placeholder(Placeholder::Group {
            members: nodes.clone(),
            category: shared,
        })?;
        for member in nodes {
            self.placements.insert(member, Placement::Group(id));
        }
        Ok(id)
    }

    /// Sets a child slot or token value of an original node.
    ///
    /// Setting a slot back to its original child, or a value back to its
    /// original text, reverts the property.
    ///
    /// # Errors
    ///
    /// Returns [`RewriteError::UnknownProperty`] if `key` is missing or the
    /// value does not fit the slot shape, and the placement errors of
    /// [`RewriteSession::replace`].
    pub fn set_property(
        &mut self,
        node: NodeId,
        key: PropertyKey,
        value: impl Into<PropertyValue>,
    ) -> Result<(), RewriteError> {
        let syntax = self.syntax(node)?;
        let slot = (node, key);
        match (syntax.property(key), value.into()) {
            (Some(Property::Child { node: original, .. }), PropertyValue::Node(child)) => {
                self.assign_slot(slot, *original, Some(child))
            }
            (Some(Property::Child { node: original, .. }), PropertyValue::Absent) => {
                self.assign_slot(slot, *original, None)
            }
            (Some(Property::Value { text, .. }), PropertyValue::Text(value)) => {
                self.assign_value(slot, text, value);
                Ok(())
            }
            (Some(Property::Value { text, .. }), PropertyValue::Absent) => {
                self.assign_value(slot, text, String::new());
                Ok(())
            }
            (Some(Property::Child { .. }), PropertyValue::Text(_)) => {
                Err(RewriteError::unknown_property(node, key, "value"))
            }
            (Some(Property::Value { .. }), PropertyValue::Node(_)) => {
                Err(RewriteError::unknown_property(node, key, "child"))
            }
            (Some(Property::List { .. }) | None, _) => {
                Err(RewriteError::unknown_property(node, key, "child or value"))
            }
        }
    }

    /// Removes a node from wherever it currently sits.
    ///
    /// Removing a synthetic node that was placed in this session reverts
    /// its placement, so no edit is produced for it.
    ///
    /// # Errors
    ///
    /// Returns [`RewriteError::RootEdit`] for the root,
    /// [`RewriteError::ConflictingEdit`] if the node's slot already holds
    /// something else and [`RewriteError::InvalidListMember`] if the node is
    /// no longer in its list.
    pub fn remove(&mut self, node: impl Into<RewriteNode>) -> Result<(), RewriteError> {
        let target = node.into();
        match self.locate(target)? {
            Location::Slot(slot, original) => {
                self.expect_in_slot(slot, original, target)?;
                self.assign_slot(slot, original, None)
            }
            Location::List(slot) => self.list_remove(slot, target),
        }
    }

    /// Replaces a node with another at the same position.
    ///
    /// # Errors
    ///
    /// Returns [`RewriteError::RootEdit`] for the root,
    /// [`RewriteError::ConflictingEdit`] if `old` was already replaced or
    /// removed, or `new` is already placed, and
    /// [`RewriteError::InvalidListMember`] for list elements that are no
    /// longer present.
    pub fn replace(
        &mut self,
        old: impl Into<RewriteNode>,
        new: impl Into<RewriteNode>,
    ) -> Result<(), RewriteError> {
        let target = old.into();
        let replacement = new.into();
        match self.locate(target)? {
            Location::Slot(slot, original) => {
                self.expect_in_slot(slot, original, target)?;
                self.assign_slot(slot, original, Some(replacement))
            }
            Location::List(slot) => self.list_replace(slot, target, replacement),
        }
    }

    /// Opens a handle on the list property `key` of `node`.
    ///
    /// # Errors
    ///
    /// Returns [`RewriteError::UnknownProperty`] if `node` has no list
    /// property named `key`.
    pub fn list(
        &mut self,
        node: NodeId,
        key: PropertyKey,
    ) -> Result<ListRewrite<'_, 't>, RewriteError> {
        self.list_items(node, key)?;
        Ok(ListRewrite::new(self, (node, key)))
    }

    /// Returns the recorded change of a child slot or token value.
    ///
    /// # Errors
    ///
    /// Returns [`RewriteError::UnknownProperty`] if `key` is missing or
    /// names a list.
    pub fn event(&self, node: NodeId, key: PropertyKey) -> Result<EditEvent, RewriteError> {
        let syntax = self.syntax(node)?;
        let slot = (node, key);
        match syntax.property(key) {
            Some(Property::Child { node: original, .. }) => Ok(SlotState {
                original: *original,
                current: self.slot_current(slot, *original),
            }
            .event()),
            Some(Property::Value { text, range }) => Ok(self.store.value(slot).map_or(
                EditEvent::Unchanged,
                |value| EditEvent::Set {
                    original: (!range.is_empty()).then(|| text.clone()),
                    value: value.to_owned(),
                },
            )),
            Some(Property::List { .. }) | None => {
                Err(RewriteError::unknown_property(node, key, "child or value"))
            }
        }
    }

    /// Resolves the edit script of a list property.
    ///
    /// # Errors
    ///
    /// Returns [`RewriteError::UnknownProperty`] if `node` has no list
    /// property named `key`.
    pub fn list_script(
        &self,
        node: NodeId,
        key: PropertyKey,
    ) -> Result<ListEditScript, RewriteError> {
        let original = self.list_items(node, key)?;
        Ok(self.resolved_script((node, key), original))
    }

    /// Produces the text edits for every recorded change, rendering new
    /// nodes with the [`TemplatePrinter`].
    ///
    /// # Errors
    ///
    /// Returns [`RewriteError::ConflictingEdit`] if placeholders form a
    /// cycle or the rendered edits overlap.
    pub fn materialize(&self) -> Result<TextEditSet, RewriteError> {
        self.materialize_with(&TemplatePrinter)
    }

    /// Produces the text edits, rendering new nodes with `printer`.
    ///
    /// # Errors
    ///
    /// See [`RewriteSession::materialize`].
    pub fn materialize_with(&self, printer: &dyn Printer) -> Result<TextEditSet, RewriteError> {
        if self.tree.is_malformed() {
            warn!(
                session = ?self.id,
                "materializing over a malformed tree; unedited regions are kept verbatim"
            );
        }
        let edits = synthesis::synthesize(self, printer)?;
        let set = TextEditSet::new(self.tree.source(), edits)?;
        debug!(
            session = ?self.id,
            edits = set.len(),
            replaced = set.replaced_span(),
            "materialized rewrite session"
        );
        Ok(set)
    }

    // ====================================================================
    // Queries used by synthesis
    // ====================================================================

    /// Occupant of a child slot, treating moved-away originals as removed.
    pub(crate) fn slot_current(&self, slot: SlotKey, original: Option<NodeId>) -> Option<RewriteNode> {
        let current = self
            .store
            .slot(slot)
            .map_or(original.map(RewriteNode::Original), |state| state.current);
        match current {
            Some(RewriteNode::Original(node)) if self.moves.contains_key(&node) => None,
            other => other,
        }
    }

    pub(crate) fn value_override(&self, slot: SlotKey) -> Option<&str> {
        self.store.value(slot)
    }

    pub(crate) fn resolved_script(&self, slot: SlotKey, original: &[NodeId]) -> ListEditScript {
        let moved_away = |node: NodeId| self.moves.contains_key(&node);
        let script = self.store.list(slot).map_or_else(
            || ListState::new(original).script(moved_away),
            |state| state.script(moved_away),
        );
        if !script.is_unchanged() {
            debug!(
                session = ?self.id,
                node = %slot.0,
                key = %slot.1,
                entries = script.entries().len(),
                "resolved list edit script"
            );
        }
        script
    }

    pub(crate) fn category_of(&self, node: RewriteNode) -> Result<SyntaxCategory, RewriteError> {
        match node {
            RewriteNode::Original(id) => Ok(self.syntax(id)?.category()),
            RewriteNode::New(id) => self
                .new_node(id)
                .map(NewNode::category)
                .ok_or_else(|| RewriteError::foreign(node)),
            RewriteNode::Placeholder(id) => match self.placeholder(id) {
                Some(Placeholder::Copy(source) | Placeholder::Move(source)) => {
                    Ok(self.syntax(*source)?.category())
                }
                Some(Placeholder::Group { category, .. }) => Ok(*category),
                None => Err(RewriteError::foreign(node)),
            },
        }
    }

    pub(crate) fn syntax(&self, node: NodeId) -> Result<&'t SyntaxNode, RewriteError> {
        self.tree.node(node).ok_or_else(|| RewriteError::foreign(node))
    }

    // ====================================================================
    // List operations behind `ListRewrite`
    // ====================================================================

    pub(crate) fn list_insert(
        &mut self,
        slot: SlotKey,
        node: RewriteNode,
        at: InsertAt,
    ) -> Result<(), RewriteError> {
        self.check_node(node)?;
        if node.is_synthetic() {
            if self.placements.contains_key(&node) {
                return Err(RewriteError::invalid_member(node, "node is already placed"));
            }
            self.check_cycle(node, slot.0)?;
        }
        let original = self.list_items(slot.0, slot.1)?;
        let state = self.store.list_mut(slot, original);
        let index = at.resolve(state)?;
        state.insert(node, index)?;
        if node.is_synthetic() {
            self.placements.insert(node, Placement::List(slot));
        }
        Ok(())
    }

    pub(crate) fn list_remove(&mut self, slot: SlotKey, node: RewriteNode) -> Result<(), RewriteError> {
        let original = self.list_items(slot.0, slot.1)?;
        self.store.list_mut(slot, original).remove(node)?;
        self.placements.remove(&node);
        Ok(())
    }

    pub(crate) fn list_replace(
        &mut self,
        slot: SlotKey,
        node: RewriteNode,
        replacement: RewriteNode,
    ) -> Result<(), RewriteError> {
        self.check_node(replacement)?;
        let original = self.list_items(slot.0, slot.1)?;
        match replacement {
            RewriteNode::Original(id) if !original.contains(&id) => {
                return Err(RewriteError::invalid_member(
                    replacement,
                    "original nodes from elsewhere must be placed with a copy or move placeholder",
                ));
            }
            RewriteNode::Original(_) => {}
            RewriteNode::New(_) | RewriteNode::Placeholder(_) => {
                if self.placements.contains_key(&replacement) {
                    return Err(RewriteError::invalid_member(
                        replacement,
                        "node is already placed",
                    ));
                }
                self.check_cycle(replacement, slot.0)?;
            }
        }
        self.store
            .list_mut(slot, original)
            .replace(node, replacement)?;
        self.placements.remove(&node);
        if replacement.is_synthetic() {
            self.placements.insert(replacement, Placement::List(slot));
        }
        Ok(())
    }

    pub(crate) fn list_move(
        &mut self,
        slot: SlotKey,
        node: RewriteNode,
        index: usize,
    ) -> Result<(), RewriteError> {
        let original = self.list_items(slot.0, slot.1)?;
        self.store.list_mut(slot, original).move_to(node, index)
    }

    pub(crate) fn list_original(&self, slot: SlotKey) -> Vec<NodeId> {
        self.list_items(slot.0, slot.1)
            .map(<[NodeId]>::to_vec)
            .unwrap_or_default()
    }

    pub(crate) fn list_rewritten(&self, slot: SlotKey) -> Vec<RewriteNode> {
        self.store.list(slot).map_or_else(
            || {
                self.list_original(slot)
                    .into_iter()
                    .map(RewriteNode::Original)
                    .collect()
            },
            |state| state.items().iter().map(|item| item.node).collect(),
        )
    }

    // ====================================================================
    // Internals
    // ====================================================================

    fn list_items(&self, node: NodeId, key: PropertyKey) -> Result<&'t [NodeId], RewriteError> {
        self.syntax(node)?
            .list(key)
            .ok_or_else(|| RewriteError::unknown_property(node, key, "list"))
    }

    fn push_placeholder(&mut self, placeholder: Placeholder) -> Result<PlaceholderId, RewriteError> {
        let index = u32::try_from(self.placeholders.len())
            .map_err(|_| RewriteError::invalid_template("session holds too many placeholders"))?;
        self.placeholders.push(placeholder);
        Ok(PlaceholderId::new(self.id, index))
    }

    fn check_node(&self, node: RewriteNode) -> Result<(), RewriteError> {
        let known = match node {
            RewriteNode::Original(id) => self.tree.contains(id),
            RewriteNode::New(id) => self.new_node(id).is_some(),
            RewriteNode::Placeholder(id) => self.placeholder(id).is_some(),
        };
        if known {
            Ok(())
        } else {
            Err(RewriteError::foreign(node))
        }
    }

    fn check_unplaced(&self, node: RewriteNode) -> Result<(), RewriteError> {
        if self.placements.contains_key(&node) {
            Err(RewriteError::conflict(node, "node is already placed"))
        } else {
            Ok(())
        }
    }

    /// Rejects `node` if it re-emits an ancestor of `parent`.
    fn check_cycle(&self, node: RewriteNode, parent: NodeId) -> Result<(), RewriteError> {
        match node {
            RewriteNode::Original(_) => Ok(()),
            RewriteNode::New(id) => match self.new_node(id) {
                Some(template) => template
                    .children()
                    .try_for_each(|child| self.check_cycle(child, parent)),
                None => Err(RewriteError::foreign(node)),
            },
            RewriteNode::Placeholder(id) => match self.placeholder(id) {
                Some(Placeholder::Copy(source) | Placeholder::Move(source))
                    if self.tree.is_ancestor_or_self(*source, parent) =>
                {
                    Err(RewriteError::conflict(
                        *source,
                        "node cannot be placed inside its own subtree",
                    ))
                }
                Some(Placeholder::Copy(_) | Placeholder::Move(_)) => Ok(()),
                Some(Placeholder::Group { members, .. }) => members
                    .iter()
                    .try_for_each(|member| self.check_cycle(*member, parent)),
                None => Err(RewriteError::foreign(node)),
            },
        }
    }

    fn locate(&self, node: RewriteNode) -> Result<Location, RewriteError> {
        self.check_node(node)?;
        match node {
            RewriteNode::Original(id) => {
                let (parent, key) = self
                    .syntax(id)?
                    .location()
                    .ok_or(RewriteError::RootEdit { node: id })?;
                match self.syntax(parent)?.property(key) {
                    Some(Property::Child { node: original, .. }) => {
                        Ok(Location::Slot((parent, key), *original))
                    }
                    Some(Property::List { .. }) => Ok(Location::List((parent, key))),
                    Some(Property::Value { .. }) | None => {
                        Err(RewriteError::unknown_property(parent, key, "child or list"))
                    }
                }
            }
            RewriteNode::New(_) | RewriteNode::Placeholder(_) => {
                match self.placements.get(&node) {
                    Some(Placement::Slot(slot)) => {
                        let original = self.syntax(slot.0)?.child(slot.1);
                        Ok(Location::Slot(*slot, original))
                    }
                    Some(Placement::List(slot)) => Ok(Location::List(*slot)),
                    Some(Placement::Group(group)) => Err(RewriteError::conflict(
                        node,
                        format!("node is a member of {}", RewriteNode::from(*group)),
                    )),
                    Some(Placement::Template(template)) => Err(RewriteError::conflict(
                        node,
                        format!("node is embedded in {}", RewriteNode::from(*template)),
                    )),
                    None => Err(RewriteError::conflict(node, "node is not placed")),
                }
            }
        }
    }

    fn expect_in_slot(
        &self,
        slot: SlotKey,
        original: Option<NodeId>,
        node: RewriteNode,
    ) -> Result<(), RewriteError> {
        let current = self
            .store
            .slot(slot)
            .map_or(original.map(RewriteNode::Original), |state| state.current);
        if current == Some(node) {
            Ok(())
        } else {
            Err(RewriteError::conflict(
                node,
                "node was already removed or replaced",
            ))
        }
    }

    fn assign_slot(
        &mut self,
        slot: SlotKey,
        original: Option<NodeId>,
        node: Option<RewriteNode>,
    ) -> Result<(), RewriteError> {
        let current = self
            .store
            .slot(slot)
            .map_or(original.map(RewriteNode::Original), |state| state.current);
        if current == node {
            return Ok(());
        }
        if let Some(incoming) = node {
            self.check_node(incoming)?;
            match incoming {
                RewriteNode::Original(id) if Some(id) != original => {
                    return Err(RewriteError::conflict(
                        incoming,
                        "original nodes can only be placed elsewhere through a copy or move placeholder",
                    ));
                }
                RewriteNode::Original(_) => {}
                RewriteNode::New(_) | RewriteNode::Placeholder(_) => {
                    self.check_unplaced(incoming)?;
                    self.check_cycle(incoming, slot.0)?;
                }
            }
        }

        if let Some(previous) = current.filter(|occupant| occupant.is_synthetic()) {
            self.placements.remove(&previous);
        }
        if let Some(incoming) = node.filter(|occupant| occupant.is_synthetic()) {
            self.placements.insert(incoming, Placement::Slot(slot));
        }
        self.store.slot_mut(slot, original).current = node;
        Ok(())
    }

    fn assign_value(&mut self, slot: SlotKey, original: &str, value: String) {
        if value == original {
            self.store.reset_value(slot);
        } else {
            self.store.set_value(slot, value);
        }
    }
}

/// Where an existing node sits.
enum Location {
    Slot(SlotKey, Option<NodeId>),
    List(SlotKey),
}
