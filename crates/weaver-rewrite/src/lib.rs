//! Minimal-edit structural rewriting for Weaver.
//!
//! A [`RewriteSession`] is opened over an immutable
//! [`SyntaxTree`](weaver_syntax::SyntaxTree) and records structural edits:
//!
//! - **Property edits**: set or clear child slots and token values, remove
//!   or replace nodes wherever they sit
//! - **List edits** via [`ListRewrite`]: insert, remove, replace and move
//!   elements of ordered child lists
//! - **Synthetic nodes**: client-authored [`NewNode`] templates plus copy,
//!   move and group [`Placeholder`]s
//!
//! [`RewriteSession::materialize`] turns the recorded state into a
//! [`TextEditSet`] that touches only the changed regions of the source.
//! Untouched text, including comments and formatting, is preserved byte
//! for byte; relocated code is re-indented for its new position.
//!
//! The [`ImportRewrite`] engine manages Java-style import sections with the
//! same minimal-edit guarantee.
//!
//! # Example
//!
//! ```
//! use weaver_rewrite::{NewNode, RewriteSession};
//! use weaver_syntax::{CHILDREN, Parser, SupportedLanguage, SyntaxCategory};
//!
//! let mut parser = Parser::new(SupportedLanguage::Rust)?;
//! let tree = parser.parse_tree("fn main() {\n    run();\n}\n")?;
//! let block = tree.find_kind("block").expect("block");
//!
//! let mut session = RewriteSession::new(&tree);
//! let log = session.create_node(NewNode::from_text(SyntaxCategory::Statement, "log();"))?;
//! session.list(block, CHILDREN)?.insert_first(log)?;
//!
//! let edits = session.materialize()?;
//! assert_eq!(
//!     edits.apply(tree.source())?,
//!     "fn main() {\n    log();\n    run();\n}\n"
//! );
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod error;
mod events;
mod imports;
mod indent;
mod list;
mod node;
mod options;
mod placeholder;
mod printer;
mod session;
mod synthesis;
mod text_edit;

pub use error::RewriteError;
pub use events::EditEvent;
pub use imports::{
    IMPORTS, ImportEntry, ImportGroup, ImportOrder, ImportOrderError, ImportRewrite,
    ImportRewriteOptions, ImportSection, NAME, ON_DEMAND, PACKAGE, STATIC, rewrite_imports,
};
pub use indent::{IndentModifier, indentation_of_line, measure_width, reindent};
pub use list::{ListEditScript, ListEntry, ListRewrite, ListTag};
pub use node::{Fragment, NewNode, NewNodeId, PlaceholderId, RewriteNode, SessionId};
pub use options::{IndentOptions, IndentStyle, IndentStyleParseError, RewriteOptions};
pub use placeholder::Placeholder;
pub use printer::{Printer, TemplatePrinter};
pub use session::{PropertyValue, RewriteSession};
pub use text_edit::{TextEdit, TextEditSet};

#[cfg(test)]
mod tests;
