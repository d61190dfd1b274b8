//! Original syntax trees for the Weaver rewriting engine.
//!
//! This crate provides the read-only side of structural rewriting:
//!
//! - **Source range model** via [`SyntaxTree`]: an immutable arena in which
//!   every node carries a stable [`NodeId`] and a `[start, end)`
//!   [`TextRange`] into the original buffer
//! - **Tree construction** via [`TreeBuilder`], the interface any external
//!   parser uses to hand a tree to the engine
//! - **Tree-sitter parsing** via [`Parser`], which lowers Rust, Python and
//!   TypeScript sources into a [`SyntaxTree`] without grammar-specific code
//!
//! Nodes expose their structure as a property table. A [`PropertyKey`]
//! names a single child slot, an ordered child list, or a token value; list
//! and slot layouts record how new content would be spliced in.
//!
//! # Example
//!
//! ```
//! use weaver_syntax::{Parser, SupportedLanguage, CHILDREN};
//!
//! let mut parser = Parser::new(SupportedLanguage::Rust)?;
//! let tree = parser.parse_tree("fn main() {\n    run();\n}\n")?;
//!
//! let block = tree.find_kind("block").expect("block");
//! let statements = tree.node(block).and_then(|n| n.list(CHILDREN));
//! assert_eq!(statements.map(<[_]>::len), Some(1));
//! # Ok::<(), weaver_syntax::SyntaxError>(())
//! ```

mod builder;
mod error;
mod language;
mod lower;
mod parser;
mod text;
mod tree;

pub use builder::{NodeBuilder, TreeBuilder};
pub use error::SyntaxError;
pub use language::{LanguageParseError, SupportedLanguage};
pub use parser::{ParseResult, Parser, SyntaxErrorInfo};
pub use text::{
    TextRange, leading_comment_start, leading_whitespace, line_end, line_indentation, line_start,
    trailing_comment_end,
};
pub use tree::{
    CHILDREN, EmptyList, ListLayout, NodeId, Property, PropertyKey, Separator, SlotLayout,
    SyntaxCategory, SyntaxNode, SyntaxTree, TreeId,
};

#[cfg(test)]
mod tests;
