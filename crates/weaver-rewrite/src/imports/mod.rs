//! Java-style import management.
//!
//! An [`ImportSection`] is read from a tree or scanned from source text, and
//! an [`ImportRewrite`] turns requested additions and removals into the
//! smallest set of line edits that keeps the section grouped according to
//! an [`ImportOrder`].

mod engine;
mod entry;
mod order;
mod section;

pub use engine::{ImportRewrite, ImportRewriteOptions, rewrite_imports};
pub use entry::ImportEntry;
pub use order::{ImportGroup, ImportOrder, ImportOrderError};
pub use section::{IMPORTS, ImportSection, NAME, ON_DEMAND, PACKAGE, STATIC};
