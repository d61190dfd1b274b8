//! Immutable arena representation of an original syntax tree.
//!
//! A [`SyntaxTree`] owns the source buffer it was parsed from and a flat
//! arena of [`SyntaxNode`]s. Nodes are addressed by [`NodeId`], which pairs
//! the tree's identity with a small integer index so that a node from one
//! tree can never be mistaken for a node of another.
//!
//! Node kinds form an open vocabulary (whatever the parser reports), but
//! every node belongs to one of a closed set of [`SyntaxCategory`] values and
//! exposes its structure through a property table: each [`PropertyKey`]
//! maps to a single child slot, an ordered child list, or a token value.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::text::TextRange;

static NEXT_TREE_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of one [`SyntaxTree`] instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TreeId(u64);

impl TreeId {
    pub(crate) fn fresh() -> Self {
        Self(NEXT_TREE_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Returns the raw identifier.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

/// Stable identity of an original node.
///
/// Identity, not structure, is the basis of all diffing: two nodes with the
/// same kind and text are still distinct if their ids differ.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    tree: TreeId,
    index: u32,
}

impl NodeId {
    pub(crate) const fn new(tree: TreeId, index: u32) -> Self {
        Self { tree, index }
    }

    /// The tree this node belongs to.
    #[must_use]
    pub const fn tree(self) -> TreeId {
        self.tree
    }

    /// Arena index of the node within its tree.
    #[must_use]
    pub const fn index(self) -> u32 {
        self.index
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node#{}.{}", self.tree.0, self.index)
    }
}

/// Name of a structural property on a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PropertyKey(&'static str);

impl PropertyKey {
    /// Creates a property key.
    #[must_use]
    pub const fn new(name: &'static str) -> Self {
        Self(name)
    }

    /// Returns the property name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        self.0
    }
}

impl fmt::Display for PropertyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

impl From<&'static str> for PropertyKey {
    fn from(name: &'static str) -> Self {
        Self(name)
    }
}

/// Key of the list holding children that the grammar does not name.
pub const CHILDREN: PropertyKey = PropertyKey::new("children");

/// Syntactic category of a node.
///
/// Categories decide which nodes may be bundled together in a group and how
/// siblings are joined when a group fills a single slot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SyntaxCategory {
    /// Statements inside a body.
    Statement,
    /// Expressions and literals.
    Expression,
    /// Type, function, field and other member declarations.
    Declaration,
    /// Type references.
    Type,
    /// Annotations, attributes and decorators.
    Annotation,
    /// Import or use declarations.
    Import,
    /// Identifiers and qualified names.
    Name,
    /// Anything else, including the root and error recovery nodes.
    #[default]
    Other,
}

impl SyntaxCategory {
    /// Returns the lower-case identifier for this category.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Statement => "statement",
            Self::Expression => "expression",
            Self::Declaration => "declaration",
            Self::Type => "type",
            Self::Annotation => "annotation",
            Self::Import => "import",
            Self::Name => "name",
            Self::Other => "other",
        }
    }

    /// Whether nodes of this category conventionally sit on their own line.
    #[must_use]
    pub const fn is_line_oriented(self) -> bool {
        matches!(
            self,
            Self::Statement | Self::Declaration | Self::Annotation | Self::Import
        )
    }
}

impl fmt::Display for SyntaxCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How siblings in a list are separated in the source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Separator {
    /// Comma separated, rendered as `, ` by default.
    Comma,
    /// One element per line, aligned on the first element's indentation.
    Line,
    /// Separated by a single space.
    Space,
    /// Separated by an arbitrary literal, such as ` | `.
    Text(String),
}

impl Separator {
    /// The non-whitespace token that must appear between two siblings.
    #[must_use]
    pub fn token(&self) -> &str {
        match self {
            Self::Comma => ",",
            Self::Line | Self::Space => "",
            Self::Text(text) => text.trim(),
        }
    }

    /// Renders the separator for elements indented by `indent`.
    #[must_use]
    pub fn render(&self, indent: &str) -> String {
        match self {
            Self::Comma => String::from(", "),
            Self::Line => format!("\n{indent}"),
            Self::Space => String::from(" "),
            Self::Text(text) => text.clone(),
        }
    }
}

/// What surrounds the first element inserted into an empty list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmptyList {
    /// Elements are joined by the separator and wrapped in literal affixes.
    Inline {
        /// Text inserted before the first element.
        prefix: String,
        /// Text inserted after the last element.
        suffix: String,
    },
    /// The list sits between braces: elements go on their own lines, one
    /// indentation unit deeper than the line holding the anchor.
    Block,
    /// Each element is followed by the separator, as modifiers or
    /// annotations preceding a keyword are.
    Leading,
}

impl Default for EmptyList {
    fn default() -> Self {
        Self::Inline {
            prefix: String::new(),
            suffix: String::new(),
        }
    }
}

/// Layout information for a list property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListLayout {
    anchor: usize,
    separator: Separator,
    empty: EmptyList,
}

impl ListLayout {
    /// Creates a layout inserting into the empty list at `anchor`.
    #[must_use]
    pub fn new(anchor: usize, separator: Separator) -> Self {
        Self {
            anchor,
            separator,
            empty: EmptyList::default(),
        }
    }

    /// Replaces the empty-list insertion style.
    #[must_use]
    pub fn with_empty(mut self, empty: EmptyList) -> Self {
        self.empty = empty;
        self
    }

    /// Offset at which elements are inserted when the list is empty.
    #[must_use]
    pub const fn anchor(&self) -> usize {
        self.anchor
    }

    /// Separator placed between siblings.
    #[must_use]
    pub const fn separator(&self) -> &Separator {
        &self.separator
    }

    /// Affix style used when the list is empty.
    #[must_use]
    pub const fn empty(&self) -> &EmptyList {
        &self.empty
    }
}

/// Layout information for a single child slot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SlotLayout {
    anchor: usize,
    prefix: String,
    suffix: String,
}

impl SlotLayout {
    /// Creates a slot layout with no affixes.
    #[must_use]
    pub const fn new(anchor: usize) -> Self {
        Self {
            anchor,
            prefix: String::new(),
            suffix: String::new(),
        }
    }

    /// Sets the text that accompanies the child before it, such as `: `
    /// before a type annotation.
    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Sets the text that accompanies the child after it.
    #[must_use]
    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = suffix.into();
        self
    }

    /// Offset at which a child is inserted when the slot is empty.
    #[must_use]
    pub const fn anchor(&self) -> usize {
        self.anchor
    }

    /// Text preceding the child.
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Text following the child.
    #[must_use]
    pub fn suffix(&self) -> &str {
        &self.suffix
    }
}

/// The value stored under a property key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Property {
    /// A single, possibly absent, child node.
    Child {
        /// The child, if present.
        node: Option<NodeId>,
        /// Where and how an absent child would be written.
        layout: SlotLayout,
    },
    /// An ordered sequence of children.
    List {
        /// Children in source order.
        items: Vec<NodeId>,
        /// How the children are separated.
        layout: ListLayout,
    },
    /// A token value such as an operator or modifier keyword.
    Value {
        /// Original token text.
        text: String,
        /// Range of the token, empty when the token is absent.
        range: TextRange,
    },
}

impl Property {
    /// Short name of the slot shape for diagnostics.
    #[must_use]
    pub const fn shape(&self) -> &'static str {
        match self {
            Self::Child { .. } => "child",
            Self::List { .. } => "list",
            Self::Value { .. } => "value",
        }
    }
}

/// One node of an original tree.
#[derive(Debug, Clone)]
pub struct SyntaxNode {
    pub(crate) id: NodeId,
    pub(crate) kind: &'static str,
    pub(crate) category: SyntaxCategory,
    pub(crate) range: TextRange,
    pub(crate) location: Option<(NodeId, PropertyKey)>,
    pub(crate) properties: Vec<(PropertyKey, Property)>,
}

impl SyntaxNode {
    /// Identity of the node.
    #[must_use]
    pub const fn id(&self) -> NodeId {
        self.id
    }

    /// Grammar kind, for example `return_statement`.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        self.kind
    }

    /// Syntactic category.
    #[must_use]
    pub const fn category(&self) -> SyntaxCategory {
        self.category
    }

    /// Byte range of the node in the original buffer.
    #[must_use]
    pub const fn range(&self) -> TextRange {
        self.range
    }

    /// Parent node, if any.
    #[must_use]
    pub fn parent(&self) -> Option<NodeId> {
        self.location.map(|(parent, _)| parent)
    }

    /// Parent node and the property of the parent holding this node.
    #[must_use]
    pub const fn location(&self) -> Option<(NodeId, PropertyKey)> {
        self.location
    }

    /// Iterates over the property table in declaration order.
    pub fn properties(&self) -> impl Iterator<Item = (PropertyKey, &Property)> {
        self.properties.iter().map(|(key, property)| (*key, property))
    }

    /// Looks up a property by key.
    #[must_use]
    pub fn property(&self, key: PropertyKey) -> Option<&Property> {
        self.properties
            .iter()
            .find(|(candidate, _)| *candidate == key)
            .map(|(_, property)| property)
    }

    /// Returns the child stored in a single-child slot.
    #[must_use]
    pub fn child(&self, key: PropertyKey) -> Option<NodeId> {
        match self.property(key) {
            Some(Property::Child { node, .. }) => *node,
            _ => None,
        }
    }

    /// Returns the items of a list property.
    #[must_use]
    pub fn list(&self, key: PropertyKey) -> Option<&[NodeId]> {
        match self.property(key) {
            Some(Property::List { items, .. }) => Some(items),
            _ => None,
        }
    }

    /// Returns the text of a value property.
    #[must_use]
    pub fn value(&self, key: PropertyKey) -> Option<&str> {
        match self.property(key) {
            Some(Property::Value { text, .. }) => Some(text),
            _ => None,
        }
    }

    /// Iterates over all direct children in property order.
    pub fn children(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.properties
            .iter()
            .flat_map(|(_, property)| match property {
                Property::Child { node, .. } => node.iter().copied().collect::<Vec<_>>(),
                Property::List { items, .. } => items.clone(),
                Property::Value { .. } => Vec::new(),
            })
    }
}

/// An immutable original tree together with its source buffer.
#[derive(Debug, Clone)]
pub struct SyntaxTree {
    pub(crate) id: TreeId,
    pub(crate) source: String,
    pub(crate) nodes: Vec<SyntaxNode>,
    pub(crate) root: NodeId,
    pub(crate) malformed: bool,
}

impl SyntaxTree {
    /// Identity of this tree instance.
    #[must_use]
    pub const fn id(&self) -> TreeId {
        self.id
    }

    /// The original source buffer.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// The root node.
    #[must_use]
    pub const fn root(&self) -> NodeId {
        self.root
    }

    /// Whether the parser reported malformed regions.
    #[must_use]
    pub const fn is_malformed(&self) -> bool {
        self.malformed
    }

    /// Number of nodes in the arena.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the arena holds no nodes. A finished tree always holds its
    /// root, so this only reports `true` for degenerate trees.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Whether `id` names a node of this tree.
    #[must_use]
    pub fn contains(&self, id: NodeId) -> bool {
        self.node(id).is_some()
    }

    /// Looks up a node. Returns `None` for nodes of other trees.
    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&SyntaxNode> {
        if id.tree != self.id {
            return None;
        }
        usize::try_from(id.index)
            .ok()
            .and_then(|index| self.nodes.get(index))
    }

    /// Returns the original text of a node.
    #[must_use]
    pub fn text(&self, id: NodeId) -> Option<&str> {
        self.node(id)
            .and_then(|node| self.source.get(node.range.as_range()))
    }

    /// Iterates over the ancestors of `id`, nearest first, excluding `id`.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.node(id).and_then(SyntaxNode::parent), |current| {
            self.node(*current).and_then(SyntaxNode::parent)
        })
    }

    /// Whether `ancestor` is `node` or one of its ancestors.
    #[must_use]
    pub fn is_ancestor_or_self(&self, ancestor: NodeId, node: NodeId) -> bool {
        ancestor == node || self.ancestors(node).any(|candidate| candidate == ancestor)
    }

    /// Collects `id` and all of its descendants in pre-order.
    #[must_use]
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let Some(node) = self.node(current) else {
                continue;
            };
            out.push(current);
            let children: Vec<NodeId> = node.children().collect();
            stack.extend(children.into_iter().rev());
        }
        out
    }

    /// Finds the first node of the given kind in pre-order.
    #[must_use]
    pub fn find_kind(&self, kind: &str) -> Option<NodeId> {
        self.descendants(self.root)
            .into_iter()
            .find(|id| self.node(*id).is_some_and(|node| node.kind == kind))
    }

    /// Collects all nodes of the given kind in pre-order.
    #[must_use]
    pub fn find_all_kind(&self, kind: &str) -> Vec<NodeId> {
        self.descendants(self.root)
            .into_iter()
            .filter(|id| self.node(*id).is_some_and(|node| node.kind == kind))
            .collect()
    }
}
