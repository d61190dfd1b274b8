//! Text synthesis.
//!
//! The synthesizer walks the original tree in source order and turns the
//! session's overlay into text edits. Regions no edit targets produce
//! nothing; new nodes go through the [`Printer`] and relocated originals are
//! cut from the source with their own nested edits applied, then
//! re-indented for their new position.

mod list;

use weaver_syntax::{
    NodeId, Property, SlotLayout, SyntaxNode, SyntaxTree, TextRange, leading_whitespace,
    line_indentation,
};

use crate::error::RewriteError;
use crate::events::SlotKey;
use crate::indent::IndentModifier;
use crate::node::{Fragment, NewNodeId, RewriteNode};
use crate::placeholder::Placeholder;
use crate::printer::Printer;
use crate::session::RewriteSession;
use crate::text_edit::{TextEdit, TextEditSet};

/// Collects the edits for every change recorded in `session`.
pub(crate) fn synthesize(
    session: &RewriteSession<'_>,
    printer: &dyn Printer,
) -> Result<Vec<TextEdit>, RewriteError> {
    let mut synthesizer = Synthesizer::new(session, printer);
    let mut edits = Vec::new();
    synthesizer.edits_within(session.tree().root(), &mut edits)?;
    Ok(edits)
}

struct Synthesizer<'a, 't> {
    session: &'a RewriteSession<'t>,
    tree: &'t SyntaxTree,
    source: &'t str,
    printer: &'a dyn Printer,
    modifier: IndentModifier,
    /// Originals currently being re-emitted, innermost last.
    active: Vec<NodeId>,
}

impl<'a, 't> Synthesizer<'a, 't> {
    fn new(session: &'a RewriteSession<'t>, printer: &'a dyn Printer) -> Self {
        let tree = session.tree();
        Self {
            session,
            tree,
            source: tree.source(),
            printer,
            modifier: IndentModifier::new(session.options().indent),
            active: Vec::new(),
        }
    }

    fn syntax(&self, node: NodeId) -> Result<&'t SyntaxNode, RewriteError> {
        self.tree.node(node).ok_or_else(|| RewriteError::foreign(node))
    }

    /// Appends the edits for `node`'s properties and everything below them.
    fn edits_within(&mut self, node: NodeId, out: &mut Vec<TextEdit>) -> Result<(), RewriteError> {
        let syntax = self.syntax(node)?;
        for (key, property) in syntax.properties() {
            let slot = (node, key);
            match property {
                Property::Child {
                    node: original,
                    layout,
                } => self.child_edits(slot, *original, layout, syntax.range(), out)?,
                Property::List { items, layout } => {
                    self.list_edits(slot, items, layout, syntax.range(), out)?;
                }
                Property::Value { text, range } => {
                    if let Some(value) = self
                        .session
                        .value_override(slot)
                        .filter(|value| *value != text.as_str())
                    {
                        out.push(TextEdit::new(*range, value));
                    }
                }
            }
        }
        Ok(())
    }

    fn child_edits(
        &mut self,
        slot: SlotKey,
        original: Option<NodeId>,
        layout: &SlotLayout,
        parent: TextRange,
        out: &mut Vec<TextEdit>,
    ) -> Result<(), RewriteError> {
        match (original, self.session.slot_current(slot, original)) {
            (Some(child), Some(RewriteNode::Original(current))) if child == current => {
                self.edits_within(child, out)
            }
            (Some(child), None) => {
                let range = self.syntax(child)?.range();
                let start = affix_before(self.source, range.start(), layout.prefix())
                    .filter(|start| *start >= parent.start())
                    .unwrap_or(range.start());
                let end = affix_after(self.source, range.end(), layout.suffix())
                    .filter(|end| *end <= parent.end())
                    .unwrap_or(range.end());
                out.push(TextEdit::delete(start..end));
                Ok(())
            }
            (None, Some(node)) => {
                let indent = line_indentation(self.source, layout.anchor());
                let text = self.render(node, indent, None)?;
                out.push(TextEdit::insert(
                    layout.anchor(),
                    format!("{}{text}{}", layout.prefix(), layout.suffix()),
                ));
                Ok(())
            }
            (Some(child), Some(node)) => {
                let range = self.syntax(child)?.range();
                let indent = line_indentation(self.source, range.start());
                let text = self.render(node, indent, None)?;
                out.push(TextEdit::new(range, text));
                Ok(())
            }
            (None, None) => Ok(()),
        }
    }

    /// Renders `node` for a position whose line is indented by `indent`.
    ///
    /// `separator` joins group members when the node fills a list position;
    /// in a single slot, line-oriented members go on their own lines and
    /// others are comma separated.
    fn render(
        &mut self,
        node: RewriteNode,
        indent: &str,
        separator: Option<&str>,
    ) -> Result<String, RewriteError> {
        let session = self.session;
        match node {
            RewriteNode::Original(id) => self.render_moved(id, indent),
            RewriteNode::New(id) => self.render_new(id, indent),
            RewriteNode::Placeholder(id) => match session.placeholder(id) {
                Some(Placeholder::Copy(source)) => self.render_relocated(*source, indent),
                Some(Placeholder::Move(source)) => self.render_moved(*source, indent),
                Some(Placeholder::Group { members, category }) => {
                    let joiner = separator.map_or_else(
                        || {
                            if category.is_line_oriented() {
                                format!("\n{indent}")
                            } else {
                                String::from(", ")
                            }
                        },
                        str::to_owned,
                    );
                    let rendered = members
                        .iter()
                        .map(|member| self.render(*member, indent, separator))
                        .collect::<Result<Vec<_>, _>>()?;
                    Ok(rendered.join(&joiner))
                }
                None => Err(RewriteError::foreign(node)),
            },
        }
    }

    fn render_new(&mut self, id: NewNodeId, indent: &str) -> Result<String, RewriteError> {
        let session = self.session;
        let template = session
            .new_node(id)
            .ok_or_else(|| RewriteError::foreign(id))?;
        let mut children = Vec::new();
        // Embedded nodes are rendered relative to the template's own lines;
        // the printed result is indented as a whole afterwards.
        let mut line = String::new();
        for fragment in template.fragments() {
            match fragment {
                Fragment::Text(text) => track_line(&mut line, text),
                Fragment::Node(child) => {
                    let relative = String::from(leading_whitespace(&line));
                    let rendered = self.render(*child, &relative, None)?;
                    track_line(&mut line, &rendered);
                    children.push(rendered);
                }
            }
        }
        let printed = self.printer.print(template, &children);
        Ok(IndentModifier::indent_following_lines(&printed, indent))
    }

    /// Renders a moved original together with the comments attached to it
    /// in its list, which leave the old position with it.
    fn render_moved(&mut self, id: NodeId, indent: &str) -> Result<String, RewriteError> {
        let text = self.render_relocated(id, indent)?;
        let Some(extent) = self.list_extent(id)? else {
            return Ok(text);
        };
        let range = self.syntax(id)?.range();
        let leading = self
            .source
            .get(extent.start()..range.start())
            .unwrap_or_default();
        let trailing = self.source.get(range.end()..extent.end()).unwrap_or_default();
        Ok(format!("{}{text}{trailing}", reflow_comments(leading, indent)))
    }

    /// Renders an original subtree for a new position, shifting its
    /// continuation lines from the original indentation to `indent`.
    fn render_relocated(&mut self, id: NodeId, indent: &str) -> Result<String, RewriteError> {
        let text = self.render_original(id)?;
        let start = self.syntax(id)?.range().start();
        let original_indent = line_indentation(self.source, start);
        let delta = column_delta(self.modifier.width(original_indent), self.modifier.width(indent));
        Ok(self.modifier.shift_following_lines(&text, delta))
    }

    /// The source text of `id` with every edit recorded inside it applied.
    fn render_original(&mut self, id: NodeId) -> Result<String, RewriteError> {
        if self.active.contains(&id) {
            return Err(RewriteError::conflict(id, "node is re-emitted inside itself"));
        }
        let range = self.syntax(id)?.range();
        let text = self
            .source
            .get(range.as_range())
            .ok_or_else(|| RewriteError::invalid_edit(range, "node range does not fit the source"))?;

        self.active.push(id);
        let mut nested = Vec::new();
        let walked = self.edits_within(id, &mut nested);
        self.active.pop();
        walked?;

        let edits = TextEditSet::new(self.source, nested)?;
        let local = TextEditSet::new(text, edits.iter().map(|edit| edit.rebase(range.start())))?;
        local.apply(text)
    }
}

/// Keeps `line` equal to the text after the last line break seen so far.
fn track_line(line: &mut String, text: &str) {
    if let Some((_, tail)) = text.rsplit_once('\n') {
        line.clear();
        line.push_str(tail);
        return;
    }
    line.push_str(text);
}

/// Re-indents the comment lines above a moved node for `indent`.
fn reflow_comments(leading: &str, indent: &str) -> String {
    let mut out = String::with_capacity(leading.len());
    for line in leading.split_inclusive('\n') {
        out.push_str(line.trim_start_matches([' ', '\t']));
        if line.ends_with('\n') {
            out.push_str(indent);
        }
    }
    out
}

fn column_delta(from: usize, to: usize) -> isize {
    let signed = |width: usize| isize::try_from(width).unwrap_or(isize::MAX);
    signed(to).saturating_sub(signed(from))
}

/// Start of `affix` when it ends at `offset`. The affix's token may be
/// surrounded by any whitespace, which is taken along with it.
fn affix_before(source: &str, offset: usize, affix: &str) -> Option<usize> {
    let before = source.get(..offset)?;
    let token = affix.trim();
    if token.is_empty() {
        return (!affix.is_empty())
            .then(|| before.strip_suffix(affix).map(str::len))
            .flatten();
    }
    let stripped = before.trim_end().strip_suffix(token)?;
    Some(stripped.trim_end().len())
}

/// End of `affix` when it starts at `offset`, skipping whitespace before
/// its token.
fn affix_after(source: &str, offset: usize, affix: &str) -> Option<usize> {
    let after = source.get(offset..)?;
    let token = affix.trim();
    if token.is_empty() {
        return (!affix.is_empty() && after.starts_with(affix))
            .then(|| offset.saturating_add(affix.len()));
    }
    let rest = after.trim_start();
    let skipped = after.len().saturating_sub(rest.len());
    rest.starts_with(token)
        .then(|| offset.saturating_add(skipped).saturating_add(token.len()))
}
