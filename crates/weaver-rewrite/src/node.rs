//! Nodes a rewrite session can place into the tree.
//!
//! Original nodes come from the [`SyntaxTree`](weaver_syntax::SyntaxTree)
//! the session was opened against. New nodes and placeholders live only in
//! the session that created them and are tagged with its [`SessionId`], so a
//! handle leaking from one session into another is reported instead of
//! silently aliasing a different node.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use weaver_syntax::{NodeId, SyntaxCategory};

static NEXT_SESSION_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of one rewrite session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(u64);

impl SessionId {
    pub(crate) fn fresh() -> Self {
        Self(NEXT_SESSION_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Handle to a node authored within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NewNodeId {
    session: SessionId,
    index: u32,
}

impl NewNodeId {
    pub(crate) const fn new(session: SessionId, index: u32) -> Self {
        Self { session, index }
    }

    pub(crate) const fn session(self) -> SessionId {
        self.session
    }

    pub(crate) fn slot(self) -> Option<usize> {
        usize::try_from(self.index).ok()
    }
}

/// Handle to a copy, move or group placeholder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PlaceholderId {
    session: SessionId,
    index: u32,
}

impl PlaceholderId {
    pub(crate) const fn new(session: SessionId, index: u32) -> Self {
        Self { session, index }
    }

    pub(crate) const fn session(self) -> SessionId {
        self.session
    }

    pub(crate) fn slot(self) -> Option<usize> {
        usize::try_from(self.index).ok()
    }
}

/// Any node that can occupy a child slot or list position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RewriteNode {
    /// A node of the original tree.
    Original(NodeId),
    /// A node authored in the session.
    New(NewNodeId),
    /// A copy, move or group placeholder.
    Placeholder(PlaceholderId),
}

impl RewriteNode {
    /// Returns the original node, if this is one.
    #[must_use]
    pub const fn original(self) -> Option<NodeId> {
        match self {
            Self::Original(id) => Some(id),
            Self::New(_) | Self::Placeholder(_) => None,
        }
    }

    /// Whether this node was authored in the session rather than parsed.
    #[must_use]
    pub const fn is_synthetic(self) -> bool {
        !matches!(self, Self::Original(_))
    }
}

impl From<NodeId> for RewriteNode {
    fn from(id: NodeId) -> Self {
        Self::Original(id)
    }
}

impl From<NewNodeId> for RewriteNode {
    fn from(id: NewNodeId) -> Self {
        Self::New(id)
    }
}

impl From<PlaceholderId> for RewriteNode {
    fn from(id: PlaceholderId) -> Self {
        Self::Placeholder(id)
    }
}

impl fmt::Display for RewriteNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Original(id) => write!(f, "{id}"),
            Self::New(id) => write!(f, "new#{}.{}", id.session.0, id.index),
            Self::Placeholder(id) => write!(f, "placeholder#{}.{}", id.session.0, id.index),
        }
    }
}

/// One piece of a [`NewNode`] template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fragment {
    /// Literal text.
    Text(String),
    /// An embedded node rendered in place.
    Node(RewriteNode),
}

/// A node authored by the client.
///
/// New nodes are text templates. Literal fragments are emitted verbatim and
/// embedded nodes (placeholders or other new nodes) are rendered where they
/// appear, so `return <copy of expr>;` can be expressed without a full
/// pretty-printer for the language.
///
/// # Example
///
/// ```
/// use weaver_rewrite::NewNode;
/// use weaver_syntax::SyntaxCategory;
///
/// let call = NewNode::from_text(SyntaxCategory::Statement, "log();");
/// assert_eq!(call.fragments().len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNode {
    category: SyntaxCategory,
    fragments: Vec<Fragment>,
}

impl NewNode {
    /// Starts an empty template of the given category.
    #[must_use]
    pub const fn new(category: SyntaxCategory) -> Self {
        Self {
            category,
            fragments: Vec::new(),
        }
    }

    /// Creates a node consisting of literal text only.
    #[must_use]
    pub fn from_text(category: SyntaxCategory, text: impl Into<String>) -> Self {
        Self::new(category).with_text(text)
    }

    /// Appends literal text.
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        let literal: String = text.into();
        if let Some(Fragment::Text(last)) = self.fragments.last_mut() {
            last.push_str(&literal);
        } else if !literal.is_empty() {
            self.fragments.push(Fragment::Text(literal));
        }
        self
    }

    /// Appends an embedded node.
    #[must_use]
    pub fn with_node(mut self, node: impl Into<RewriteNode>) -> Self {
        self.fragments.push(Fragment::Node(node.into()));
        self
    }

    /// Syntactic category of the node.
    #[must_use]
    pub const fn category(&self) -> SyntaxCategory {
        self.category
    }

    /// Template fragments in order.
    #[must_use]
    pub fn fragments(&self) -> &[Fragment] {
        &self.fragments
    }

    /// Embedded nodes in order.
    pub fn children(&self) -> impl Iterator<Item = RewriteNode> + '_ {
        self.fragments.iter().filter_map(|fragment| match fragment {
            Fragment::Node(node) => Some(*node),
            Fragment::Text(_) => None,
        })
    }
}
