//! Bottom-up construction of original trees.
//!
//! [`TreeBuilder`] is the seam through which a parser hands a tree to the
//! rewriting engine. Children are built before their parents; attaching a
//! child to a parent records the back-link so the finished [`SyntaxTree`]
//! can answer "where does this node live" without any mutable pointers.

use std::collections::HashSet;

use crate::error::SyntaxError;
use crate::text::TextRange;
use crate::tree::{
    ListLayout, NodeId, Property, PropertyKey, SlotLayout, SyntaxCategory, SyntaxNode,
    SyntaxTree, TreeId,
};

/// Assembles an immutable [`SyntaxTree`] over a source buffer.
///
/// # Example
///
/// ```
/// use weaver_syntax::{ListLayout, Separator, SyntaxCategory, TreeBuilder, CHILDREN};
///
/// let mut builder = TreeBuilder::new("a; b;");
/// let a = builder.leaf("statement", SyntaxCategory::Statement, 0..2)?;
/// let b = builder.leaf("statement", SyntaxCategory::Statement, 3..5)?;
/// let root = builder
///     .node("unit", SyntaxCategory::Other, 0..5)
///     .list(CHILDREN, [a, b], ListLayout::new(0, Separator::Space))
///     .build()?;
/// let tree = builder.finish(root)?;
/// assert_eq!(tree.text(a), Some("a;"));
/// # Ok::<(), weaver_syntax::SyntaxError>(())
/// ```
#[derive(Debug)]
pub struct TreeBuilder {
    id: TreeId,
    source: String,
    nodes: Vec<SyntaxNode>,
    malformed: bool,
}

impl TreeBuilder {
    /// Starts a tree over `source`.
    #[must_use]
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            id: TreeId::fresh(),
            source: source.into(),
            nodes: Vec::new(),
            malformed: false,
        }
    }

    /// The buffer the tree is being built over.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Flags the tree as containing regions the parser could not recognise.
    pub const fn mark_malformed(&mut self) {
        self.malformed = true;
    }

    /// Starts a node of the given kind covering `range`.
    pub fn node(
        &mut self,
        kind: &'static str,
        category: SyntaxCategory,
        range: impl Into<TextRange>,
    ) -> NodeBuilder<'_> {
        NodeBuilder {
            builder: self,
            kind,
            category,
            range: range.into(),
            properties: Vec::new(),
        }
    }

    /// Builds a node without properties.
    ///
    /// # Errors
    ///
    /// Returns an error if `range` does not fit the buffer.
    pub fn leaf(
        &mut self,
        kind: &'static str,
        category: SyntaxCategory,
        range: impl Into<TextRange>,
    ) -> Result<NodeId, SyntaxError> {
        self.node(kind, category, range).build()
    }

    /// Finishes the tree with `root` as its root node.
    ///
    /// # Errors
    ///
    /// Returns an error if `root` was not built by this builder or has
    /// already been attached to a parent.
    pub fn finish(self, root: NodeId) -> Result<SyntaxTree, SyntaxError> {
        self.attachable(root)?;
        Ok(SyntaxTree {
            id: self.id,
            source: self.source,
            nodes: self.nodes,
            root,
            malformed: self.malformed,
        })
    }

    fn check_range(&self, range: TextRange) -> Result<(), SyntaxError> {
        if range.end() > self.source.len() {
            return Err(SyntaxError::invalid_range(
                range,
                format!("extends past the end of the buffer ({})", self.source.len()),
            ));
        }
        if !self.source.is_char_boundary(range.start()) || !self.source.is_char_boundary(range.end())
        {
            return Err(SyntaxError::invalid_range(
                range,
                "not on a UTF-8 character boundary",
            ));
        }
        Ok(())
    }

    fn attachable(&self, node: NodeId) -> Result<&SyntaxNode, SyntaxError> {
        if node.tree() != self.id {
            return Err(SyntaxError::invalid_child(
                node,
                "node belongs to another tree",
            ));
        }
        let existing = usize::try_from(node.index())
            .ok()
            .and_then(|index| self.nodes.get(index))
            .ok_or_else(|| SyntaxError::invalid_child(node, "node was never built"))?;
        if existing.location.is_some() {
            return Err(SyntaxError::invalid_child(node, "node already has a parent"));
        }
        Ok(existing)
    }

    fn set_location(&mut self, child: NodeId, parent: NodeId, key: PropertyKey) {
        let slot = usize::try_from(child.index())
            .ok()
            .and_then(|index| self.nodes.get_mut(index));
        if let Some(node) = slot {
            node.location = Some((parent, key));
        }
    }
}

enum Pending {
    Child(Option<NodeId>, Option<SlotLayout>),
    List(Vec<NodeId>, ListLayout),
    Value(TextRange),
}

/// Builder for a single node, obtained from [`TreeBuilder::node`].
pub struct NodeBuilder<'b> {
    builder: &'b mut TreeBuilder,
    kind: &'static str,
    category: SyntaxCategory,
    range: TextRange,
    properties: Vec<(PropertyKey, Pending)>,
}

impl NodeBuilder<'_> {
    /// Attaches a present child. An absent child would be inserted where
    /// this one starts.
    #[must_use]
    pub fn child(mut self, key: impl Into<PropertyKey>, node: NodeId) -> Self {
        self.properties
            .push((key.into(), Pending::Child(Some(node), None)));
        self
    }

    /// Declares a child slot with explicit layout; the child may be absent.
    #[must_use]
    pub fn slot(
        mut self,
        key: impl Into<PropertyKey>,
        node: Option<NodeId>,
        layout: SlotLayout,
    ) -> Self {
        self.properties
            .push((key.into(), Pending::Child(node, Some(layout))));
        self
    }

    /// Declares an ordered list of children.
    #[must_use]
    pub fn list(
        mut self,
        key: impl Into<PropertyKey>,
        items: impl IntoIterator<Item = NodeId>,
        layout: ListLayout,
    ) -> Self {
        self.properties.push((
            key.into(),
            Pending::List(items.into_iter().collect(), layout),
        ));
        self
    }

    /// Declares a token value whose text is read from `range`.
    #[must_use]
    pub fn value(mut self, key: impl Into<PropertyKey>, range: impl Into<TextRange>) -> Self {
        self.properties
            .push((key.into(), Pending::Value(range.into())));
        self
    }

    /// Validates the node and adds it to the arena.
    ///
    /// # Errors
    ///
    /// Returns an error if a range falls outside the buffer or the node, a
    /// child is foreign or already attached, list items overlap, or a
    /// property key is declared twice.
    pub fn build(self) -> Result<NodeId, SyntaxError> {
        let Self {
            builder,
            kind,
            category,
            range,
            properties,
        } = self;
        builder.check_range(range)?;
        let index = u32::try_from(builder.nodes.len())
            .map_err(|_| SyntaxError::internal_error("tree exceeds u32::MAX nodes"))?;
        let id = NodeId::new(builder.id, index);

        let mut seen_keys = HashSet::new();
        let mut attached = HashSet::new();
        let mut resolved = Vec::with_capacity(properties.len());
        for (key, pending) in properties {
            if !seen_keys.insert(key) {
                return Err(SyntaxError::internal_error(format!(
                    "property '{key}' declared twice on {kind}"
                )));
            }
            let property = match pending {
                Pending::Child(node, explicit_layout) => {
                    let anchor_default = match node {
                        Some(child) => {
                            let child_range = attach_check(builder, range, child, &mut attached)?;
                            child_range.start()
                        }
                        None => range.start(),
                    };
                    let layout =
                        explicit_layout.unwrap_or_else(|| SlotLayout::new(anchor_default));
                    check_anchor(range, layout.anchor())?;
                    Property::Child { node, layout }
                }
                Pending::List(items, layout) => {
                    let mut previous_end = range.start();
                    for item in &items {
                        let item_range = attach_check(builder, range, *item, &mut attached)?;
                        if item_range.start() < previous_end {
                            return Err(SyntaxError::invalid_range(
                                item_range,
                                format!("list '{key}' items overlap or are out of order"),
                            ));
                        }
                        previous_end = item_range.end();
                    }
                    check_anchor(range, layout.anchor())?;
                    Property::List { items, layout }
                }
                Pending::Value(value_range) => {
                    builder.check_range(value_range)?;
                    if !range.contains_range(value_range) {
                        return Err(SyntaxError::invalid_range(
                            value_range,
                            format!("value '{key}' lies outside its node {range}"),
                        ));
                    }
                    let text = builder
                        .source
                        .get(value_range.as_range())
                        .unwrap_or_default()
                        .to_owned();
                    Property::Value {
                        text,
                        range: value_range,
                    }
                }
            };
            resolved.push((key, property));
        }

        for (key, property) in &resolved {
            let children: Vec<NodeId> = match property {
                Property::Child { node, .. } => node.iter().copied().collect(),
                Property::List { items, .. } => items.clone(),
                Property::Value { .. } => Vec::new(),
            };
            for child in children {
                builder.set_location(child, id, *key);
            }
        }

        builder.nodes.push(SyntaxNode {
            id,
            kind,
            category,
            range,
            location: None,
            properties: resolved,
        });
        Ok(id)
    }
}

fn attach_check(
    builder: &TreeBuilder,
    parent_range: TextRange,
    child: NodeId,
    attached: &mut HashSet<NodeId>,
) -> Result<TextRange, SyntaxError> {
    let node = builder.attachable(child)?;
    if !attached.insert(child) {
        return Err(SyntaxError::invalid_child(
            child,
            "node attached twice to the same parent",
        ));
    }
    if !parent_range.contains_range(node.range) {
        return Err(SyntaxError::invalid_range(
            node.range,
            format!("child lies outside its parent {parent_range}"),
        ));
    }
    Ok(node.range)
}

fn check_anchor(range: TextRange, anchor: usize) -> Result<(), SyntaxError> {
    if range.touches(anchor) {
        Ok(())
    } else {
        Err(SyntaxError::invalid_range(
            TextRange::empty(anchor),
            format!("insertion anchor lies outside its node {range}"),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::{CHILDREN, Separator};

    #[test]
    fn builder_links_children_to_parents() {
        let mut builder = TreeBuilder::new("x = 1");
        let name = builder
            .leaf("identifier", SyntaxCategory::Name, 0..1)
            .expect("leaf");
        let value = builder
            .leaf("integer", SyntaxCategory::Expression, 4..5)
            .expect("leaf");
        let root = builder
            .node("assignment", SyntaxCategory::Statement, 0..5)
            .child("left", name)
            .child("right", value)
            .value("operator", 2..3)
            .build()
            .expect("root");
        let tree = builder.finish(root).expect("tree");

        let node = tree.node(value).expect("value node");
        assert_eq!(node.location(), Some((root, PropertyKey::new("right"))));
        let root_node = tree.node(root).expect("root node");
        assert_eq!(root_node.value(PropertyKey::new("operator")), Some("="));
        assert_eq!(root_node.children().collect::<Vec<_>>(), vec![name, value]);
    }

    #[test]
    fn builder_rejects_out_of_order_list_items() {
        let mut builder = TreeBuilder::new("a b");
        let a = builder.leaf("word", SyntaxCategory::Other, 0..1).expect("a");
        let b = builder.leaf("word", SyntaxCategory::Other, 2..3).expect("b");
        let result = builder
            .node("words", SyntaxCategory::Other, 0..3)
            .list(CHILDREN, [b, a], ListLayout::new(0, Separator::Space))
            .build();
        assert!(matches!(result, Err(SyntaxError::InvalidRange { .. })));
    }

    #[test]
    fn builder_rejects_double_attachment() {
        let mut builder = TreeBuilder::new("ab");
        let a = builder.leaf("word", SyntaxCategory::Other, 0..1).expect("a");
        builder
            .node("first", SyntaxCategory::Other, 0..2)
            .child("inner", a)
            .build()
            .expect("first parent");
        let second = builder
            .node("second", SyntaxCategory::Other, 0..2)
            .child("inner", a)
            .build();
        assert!(matches!(second, Err(SyntaxError::InvalidChild { .. })));
    }

    #[test]
    fn builder_rejects_ranges_past_the_buffer() {
        let mut builder = TreeBuilder::new("ab");
        let result = builder.leaf("word", SyntaxCategory::Other, 0..5);
        assert!(matches!(result, Err(SyntaxError::InvalidRange { .. })));
    }

    #[test]
    fn nodes_from_other_builders_are_rejected() {
        let mut other = TreeBuilder::new("z");
        let foreign = other.leaf("word", SyntaxCategory::Other, 0..1).expect("z");
        let mut builder = TreeBuilder::new("z");
        let result = builder
            .node("holder", SyntaxCategory::Other, 0..1)
            .child("inner", foreign)
            .build();
        assert!(matches!(result, Err(SyntaxError::InvalidChild { .. })));
    }
}
