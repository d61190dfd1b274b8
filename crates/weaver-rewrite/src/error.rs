//! Error types for rewrite sessions and import rewriting.
//!
//! Every failure is local and synchronous: an operation that returns an
//! error leaves the session exactly as it was, and materialization either
//! produces the full edit set or nothing.

use std::fmt;

use thiserror::Error;
use weaver_syntax::{NodeId, PropertyKey, SyntaxError, TextRange};

use crate::node::RewriteNode;

/// Errors from recording or materializing rewrites.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RewriteError {
    /// A node does not belong to the tree or session being edited.
    #[error("{node} does not belong to this rewrite session")]
    ForeignNode {
        /// The rejected node.
        node: RewriteNode,
    },

    /// Two edits target the same original node or range incompatibly.
    #[error("conflicting edit on {target}: {message}")]
    ConflictingEdit {
        /// The node or range whose edits conflict.
        target: String,
        /// Description of the conflict.
        message: String,
    },

    /// A list operation names an element that is absent, or inserts one
    /// that is already scheduled.
    #[error("invalid list member {node}: {message}")]
    InvalidListMember {
        /// The offending element.
        node: RewriteNode,
        /// Why the element was rejected.
        message: String,
    },

    /// A group placeholder is empty or mixes syntactic categories.
    #[error("invalid group: {message}")]
    InvalidGroup {
        /// Why the group was rejected.
        message: String,
    },

    /// An added import would clash with an existing import of the same
    /// simple name.
    #[error("import '{name}' is ambiguous with existing import '{existing}'")]
    AmbiguousImport {
        /// The qualified name being added.
        name: String,
        /// The existing import sharing its simple name.
        existing: String,
    },

    /// A property key is missing from a node or has another slot shape.
    #[error("{node} has no {expected} property '{key}'")]
    UnknownProperty {
        /// The node that was addressed.
        node: NodeId,
        /// The requested key.
        key: PropertyKey,
        /// The slot shape the operation needs.
        expected: &'static str,
    },

    /// The root node cannot be removed or replaced.
    #[error("{node} is the root and cannot be removed or replaced")]
    RootEdit {
        /// The root node.
        node: NodeId,
    },

    /// A text edit does not fit the buffer it is applied to.
    #[error("invalid edit at {range}: {message}")]
    InvalidEdit {
        /// The offending range.
        range: TextRange,
        /// Why the edit was rejected.
        message: String,
    },

    /// A new node template embeds a node it cannot render.
    #[error("invalid template: {message}")]
    InvalidTemplate {
        /// Why the template was rejected.
        message: String,
    },

    /// Tree construction or parsing failed.
    #[error(transparent)]
    Syntax(#[from] SyntaxError),
}

impl RewriteError {
    /// Creates a [`RewriteError::ForeignNode`] error.
    #[must_use]
    pub fn foreign(node: impl Into<RewriteNode>) -> Self {
        Self::ForeignNode { node: node.into() }
    }

    /// Creates a [`RewriteError::ConflictingEdit`] error.
    #[must_use]
    pub fn conflict(target: impl fmt::Display, message: impl Into<String>) -> Self {
        Self::ConflictingEdit {
            target: target.to_string(),
            message: message.into(),
        }
    }

    /// Creates a [`RewriteError::InvalidListMember`] error.
    #[must_use]
    pub fn invalid_member(node: impl Into<RewriteNode>, message: impl Into<String>) -> Self {
        Self::InvalidListMember {
            node: node.into(),
            message: message.into(),
        }
    }

    /// Creates a [`RewriteError::InvalidGroup`] error.
    #[must_use]
    pub fn invalid_group(message: impl Into<String>) -> Self {
        Self::InvalidGroup {
            message: message.into(),
        }
    }

    /// Creates a [`RewriteError::AmbiguousImport`] error.
    #[must_use]
    pub fn ambiguous_import(name: impl Into<String>, existing: impl Into<String>) -> Self {
        Self::AmbiguousImport {
            name: name.into(),
            existing: existing.into(),
        }
    }

    /// Creates a [`RewriteError::UnknownProperty`] error.
    #[must_use]
    pub const fn unknown_property(node: NodeId, key: PropertyKey, expected: &'static str) -> Self {
        Self::UnknownProperty {
            node,
            key,
            expected,
        }
    }

    /// Creates a [`RewriteError::InvalidEdit`] error.
    #[must_use]
    pub fn invalid_edit(range: TextRange, message: impl Into<String>) -> Self {
        Self::InvalidEdit {
            range,
            message: message.into(),
        }
    }

    /// Creates a [`RewriteError::InvalidTemplate`] error.
    #[must_use]
    pub fn invalid_template(message: impl Into<String>) -> Self {
        Self::InvalidTemplate {
            message: message.into(),
        }
    }
}
