//! Error types for parsing and tree construction.
//!
//! This module provides structured error types for all operations in the
//! `weaver-syntax` crate: initialising Tree-sitter, parsing, and assembling
//! an original [`crate::SyntaxTree`] through the [`crate::TreeBuilder`].

use thiserror::Error;

use crate::language::SupportedLanguage;
use crate::text::TextRange;
use crate::tree::NodeId;

/// Errors from parsing and tree construction.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SyntaxError {
    /// Failed to initialise the Tree-sitter parser for a language.
    #[error("failed to initialise parser for {language}: {message}")]
    ParserInitError {
        /// The language that failed to initialise.
        language: SupportedLanguage,
        /// Description of the failure.
        message: String,
    },

    /// Failed to parse source code.
    #[error("failed to parse {language}: {message}")]
    ParseError {
        /// The language that failed to parse.
        language: SupportedLanguage,
        /// Description of the failure.
        message: String,
    },

    /// A range does not fit the source buffer or its parent node.
    #[error("invalid range {range}: {message}")]
    InvalidRange {
        /// The offending range.
        range: TextRange,
        /// Why the range was rejected.
        message: String,
    },

    /// A node handed to the builder was not created by it, or already has
    /// a parent.
    #[error("node {node} cannot be attached: {message}")]
    InvalidChild {
        /// The rejected node.
        node: NodeId,
        /// Why the node was rejected.
        message: String,
    },

    /// Internal error indicating a bug or system failure.
    #[error("internal error: {message}")]
    InternalError {
        /// Description of the internal error.
        message: String,
    },
}

impl SyntaxError {
    /// Creates a parser initialisation error.
    #[must_use]
    pub fn parser_init(language: SupportedLanguage, message: impl Into<String>) -> Self {
        Self::ParserInitError {
            language,
            message: message.into(),
        }
    }

    /// Creates a parse error.
    #[must_use]
    pub fn parse(language: SupportedLanguage, message: impl Into<String>) -> Self {
        Self::ParseError {
            language,
            message: message.into(),
        }
    }

    /// Creates an invalid range error.
    #[must_use]
    pub fn invalid_range(range: TextRange, message: impl Into<String>) -> Self {
        Self::InvalidRange {
            range,
            message: message.into(),
        }
    }

    /// Creates an invalid child error.
    #[must_use]
    pub fn invalid_child(node: NodeId, message: impl Into<String>) -> Self {
        Self::InvalidChild {
            node,
            message: message.into(),
        }
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::InternalError {
            message: message.into(),
        }
    }
}
