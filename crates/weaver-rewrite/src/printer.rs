//! Pretty-printer seam for client-authored nodes.

use crate::node::{Fragment, NewNode};

/// Stringifies new nodes.
///
/// `children` holds the rendered text of the node's embedded nodes, in the
/// order [`NewNode::children`] yields them. The returned text is placed at
/// the insertion point; lines after the first are indented to match it by
/// the caller.
pub trait Printer {
    /// Renders `node` with its embedded children already rendered.
    fn print(&self, node: &NewNode, children: &[String]) -> String;
}

/// Printer that splices rendered children into the node's template.
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplatePrinter;

impl Printer for TemplatePrinter {
    fn print(&self, node: &NewNode, children: &[String]) -> String {
        let mut rendered = children.iter();
        let mut out = String::new();
        for fragment in node.fragments() {
            match fragment {
                Fragment::Text(text) => out.push_str(text),
                Fragment::Node(_) => {
                    if let Some(child) = rendered.next() {
                        out.push_str(child);
                    }
                }
            }
        }
        out
    }
}
