//! Rendering of list edit scripts.
//!
//! Elements that stay anchored keep their text and the separators around
//! them. Between two anchors, dropped originals are deleted together with
//! the separator that follows the earlier anchor, and new or moved elements
//! are spliced in front of the later anchor, each followed by a separator.
//! Before the first and after the last anchor the same happens with the
//! separator on the outer side.
//!
//! Every cut and splice uses an element's extent: its range widened over
//! the comment lines directly above it and, in line-separated lists, a
//! comment closing its last line. Comments thus stay with their element and
//! never migrate to a neighbour.

use weaver_syntax::{
    EmptyList, ListLayout, NodeId, Property, Separator, SyntaxNode, TextRange,
    leading_comment_start, line_indentation, line_start, trailing_comment_end,
};

use super::{Synthesizer, affix_after, affix_before};
use crate::error::RewriteError;
use crate::events::SlotKey;
use crate::list::{ListEditScript, ListTag};
use crate::text_edit::TextEdit;

impl Synthesizer<'_, '_> {
    pub(super) fn list_edits(
        &mut self,
        slot: SlotKey,
        items: &[NodeId],
        layout: &ListLayout,
        parent: TextRange,
        out: &mut Vec<TextEdit>,
    ) -> Result<(), RewriteError> {
        let script = self.session.resolved_script(slot, items);
        if script.is_unchanged() {
            for item in items {
                self.edits_within(*item, out)?;
            }
            return Ok(());
        }

        let ranges = items
            .iter()
            .map(|item| self.syntax(*item).map(SyntaxNode::range))
            .collect::<Result<Vec<_>, _>>()?;
        let extents = self.extents(&ranges, layout, parent);
        let (Some(first), Some(last)) = (extents.first().copied(), extents.last().copied()) else {
            return self.fill_empty(&script, layout, out);
        };
        let indent = line_indentation(self.source, first.start());
        let separator = self.separator(&extents, layout.separator(), indent);
        let frame = Frame {
            ranges: &extents,
            first,
            last,
            separator: &separator,
        };

        let mut previous: Option<usize> = None;
        let mut pending: Vec<String> = Vec::new();
        for entry in script.entries() {
            match (entry.tag(), entry.original_index()) {
                (ListTag::Removed, _) => {}
                (ListTag::Unchanged | ListTag::Replaced, Some(index)) => {
                    let (Some(item), Some(range)) =
                        (items.get(index).copied(), ranges.get(index).copied())
                    else {
                        return Err(RewriteError::invalid_member(
                            entry.node(),
                            "list index is out of range",
                        ));
                    };
                    frame.segment(previous, Some(index), &pending, out);
                    if entry.tag() == ListTag::Unchanged {
                        self.edits_within(item, out)?;
                    } else {
                        let own_indent = line_indentation(self.source, range.start());
                        let text = self.render(entry.node(), own_indent, Some(separator.as_str()))?;
                        out.push(TextEdit::new(range, text));
                    }
                    previous = Some(index);
                    pending.clear();
                }
                _ => pending.push(self.render(entry.node(), indent, Some(separator.as_str()))?),
            }
        }

        if previous.is_none() && pending.is_empty() {
            out.push(TextEdit::delete(self.clear_range(first, last, layout, parent)));
        } else {
            frame.segment(previous, None, &pending, out);
        }
        Ok(())
    }

    /// Ranges of a list's elements widened over their attached comments.
    pub(super) fn extents(
        &self,
        ranges: &[TextRange],
        layout: &ListLayout,
        parent: TextRange,
    ) -> Vec<TextRange> {
        let trailing = *layout.separator() == Separator::Line;
        ranges
            .iter()
            .enumerate()
            .map(|(index, range)| {
                let floor = index
                    .checked_sub(1)
                    .and_then(|previous| ranges.get(previous))
                    .map_or(parent.start(), |previous| previous.end());
                let ceiling = ranges
                    .get(index.saturating_add(1))
                    .map_or(parent.end(), |next| next.start());
                let start = leading_comment_start(self.source, range.start(), floor);
                let end = if trailing {
                    trailing_comment_end(self.source, range.end(), ceiling)
                } else {
                    range.end()
                };
                TextRange::new(start, end)
            })
            .collect()
    }

    /// Extent of `id` when it is an element of a list, so that a move can
    /// take its comments along.
    pub(super) fn list_extent(&self, id: NodeId) -> Result<Option<TextRange>, RewriteError> {
        let Some(parent) = self.syntax(id)?.parent() else {
            return Ok(None);
        };
        let owner = self.syntax(parent)?;
        for (_, property) in owner.properties() {
            let Property::List { items, layout } = property else {
                continue;
            };
            let Some(position) = items.iter().position(|item| *item == id) else {
                continue;
            };
            let ranges = items
                .iter()
                .map(|item| self.syntax(*item).map(SyntaxNode::range))
                .collect::<Result<Vec<_>, _>>()?;
            let extents = self.extents(&ranges, layout, owner.range());
            return Ok(extents.get(position).copied());
        }
        Ok(None)
    }

    /// Separator text for new boundaries: the first original gap made of
    /// the separator token and whitespace, or the layout's default.
    fn separator(&self, ranges: &[TextRange], kind: &Separator, indent: &str) -> String {
        ranges
            .windows(2)
            .filter_map(|pair| match pair {
                [left, right] => self.source.get(left.end()..right.start()),
                _ => None,
            })
            .find(|gap| gap.trim() == kind.token())
            .map_or_else(|| kind.render(indent), str::to_owned)
    }

    /// Range removed when every original element goes away.
    fn clear_range(
        &self,
        first: TextRange,
        last: TextRange,
        layout: &ListLayout,
        parent: TextRange,
    ) -> TextRange {
        let mut start = first.start();
        let mut end = last.end();
        match layout.empty() {
            EmptyList::Inline { prefix, suffix } => {
                start = affix_before(self.source, start, prefix).unwrap_or(start);
                end = affix_after(self.source, end, suffix).unwrap_or(end);
            }
            EmptyList::Leading => {
                let rest = self.source.get(end..).unwrap_or_default();
                let trailing = rest.len().saturating_sub(rest.trim_start().len());
                end = end.saturating_add(trailing);
            }
            EmptyList::Block => {}
        }
        if *layout.separator() == Separator::Line && !matches!(layout.empty(), EmptyList::Leading) {
            let line = line_start(self.source, start);
            let blank_before = self
                .source
                .get(line..start)
                .is_some_and(|text| text.trim().is_empty());
            if blank_before && line > 0 {
                start = line.saturating_sub(1);
            }
        }
        TextRange::new(start.max(parent.start()), end.min(parent.end()))
    }

    /// Inserts the elements of a list that was empty in the source.
    fn fill_empty(
        &mut self,
        script: &ListEditScript,
        layout: &ListLayout,
        out: &mut Vec<TextEdit>,
    ) -> Result<(), RewriteError> {
        let nodes: Vec<_> = script.rewritten().collect();
        if nodes.is_empty() {
            return Ok(());
        }
        let anchor = layout.anchor();
        let indent = line_indentation(self.source, anchor);
        let text = match layout.empty() {
            EmptyList::Inline { prefix, suffix } => {
                let separator = layout.separator().render(indent);
                let rendered = nodes
                    .iter()
                    .map(|node| self.render(*node, indent, Some(separator.as_str())))
                    .collect::<Result<Vec<_>, _>>()?;
                format!("{prefix}{}{suffix}", rendered.join(&separator))
            }
            EmptyList::Block => {
                let inner = format!("{indent}{}", self.modifier.options().unit());
                let separator = layout.separator().render(&inner);
                let rendered = nodes
                    .iter()
                    .map(|node| self.render(*node, &inner, Some(separator.as_str())))
                    .collect::<Result<Vec<_>, _>>()?;
                format!("\n{inner}{}\n{indent}", rendered.join(&separator))
            }
            EmptyList::Leading => {
                let separator = layout.separator().render(indent);
                nodes
                    .iter()
                    .map(|node| {
                        self.render(*node, indent, Some(separator.as_str()))
                            .map(|item| format!("{item}{separator}"))
                    })
                    .collect::<Result<String, _>>()?
            }
        };
        out.push(TextEdit::insert(anchor, text));
        Ok(())
    }
}

/// Geometry of a non-empty original list.
struct Frame<'r> {
    ranges: &'r [TextRange],
    first: TextRange,
    last: TextRange,
    separator: &'r str,
}

impl Frame<'_> {
    fn start_of(&self, index: usize) -> usize {
        self.ranges
            .get(index)
            .map_or(self.first.start(), |range| range.start())
    }

    fn end_of(&self, index: usize) -> usize {
        self.ranges
            .get(index)
            .map_or(self.last.end(), |range| range.end())
    }

    /// Emits the edits between the anchor at `before` and the anchor at
    /// `after`; `None` stands for the list's outer edge.
    fn segment(
        &self,
        before: Option<usize>,
        after: Option<usize>,
        pending: &[String],
        out: &mut Vec<TextEdit>,
    ) {
        let separator = self.separator;
        let followed = || -> String {
            pending
                .iter()
                .map(|item| format!("{item}{separator}"))
                .collect()
        };
        match (before, after) {
            (None, None) => out.push(TextEdit::new(
                self.first.start()..self.last.end(),
                pending.join(separator),
            )),
            (None, Some(anchor)) => {
                out.push(TextEdit::new(self.first.start()..self.start_of(anchor), followed()));
            }
            (Some(anchor), None) => {
                let preceded: String = pending
                    .iter()
                    .map(|item| format!("{separator}{item}"))
                    .collect();
                out.push(TextEdit::new(self.end_of(anchor)..self.last.end(), preceded));
            }
            (Some(left), Some(right)) => {
                if right > left.saturating_add(1) {
                    out.push(TextEdit::delete(
                        self.end_of(left)..self.end_of(right.saturating_sub(1)),
                    ));
                }
                if !pending.is_empty() {
                    out.push(TextEdit::insert(self.start_of(right), followed()));
                }
            }
        }
    }
}
