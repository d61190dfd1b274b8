//! Byte ranges and line helpers over UTF-8 source buffers.
//!
//! Every node of a [`crate::SyntaxTree`] owns an immutable [`TextRange`]
//! into the buffer it was parsed from. The helpers here answer the layout
//! questions the rewriting engine asks about that buffer: where a line
//! starts, and which whitespace indents it.

use std::fmt;
use std::ops::Range;

/// A half-open `[start, end)` byte range into a source buffer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextRange {
    start: usize,
    end: usize,
}

impl TextRange {
    /// Creates a range, ordering the endpoints if they arrive reversed.
    #[must_use]
    pub const fn new(start: usize, end: usize) -> Self {
        if start <= end {
            Self { start, end }
        } else {
            Self {
                start: end,
                end: start,
            }
        }
    }

    /// Creates an empty range positioned at `offset`.
    #[must_use]
    pub const fn empty(offset: usize) -> Self {
        Self {
            start: offset,
            end: offset,
        }
    }

    /// Inclusive start offset.
    #[must_use]
    pub const fn start(self) -> usize {
        self.start
    }

    /// Exclusive end offset.
    #[must_use]
    pub const fn end(self) -> usize {
        self.end
    }

    /// Length of the range in bytes.
    #[must_use]
    pub const fn len(self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Whether the range covers no bytes.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.start == self.end
    }

    /// Whether `other` lies entirely inside this range.
    #[must_use]
    pub const fn contains_range(self, other: Self) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// Whether `offset` lies inside the range, treating the end as inclusive.
    #[must_use]
    pub const fn touches(self, offset: usize) -> bool {
        self.start <= offset && offset <= self.end
    }

    /// Returns the range as a standard library range for slicing.
    #[must_use]
    pub const fn as_range(self) -> Range<usize> {
        self.start..self.end
    }
}

impl From<Range<usize>> for TextRange {
    fn from(range: Range<usize>) -> Self {
        Self::new(range.start, range.end)
    }
}

impl fmt::Display for TextRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

/// Returns the offset of the first byte of the line containing `offset`.
#[must_use]
pub fn line_start(source: &str, offset: usize) -> usize {
    source
        .get(..offset)
        .and_then(|prefix| prefix.rfind('\n'))
        .map_or(0, |index| index + '\n'.len_utf8())
}

/// Returns the offset of the line break ending the line containing `offset`,
/// or the buffer length for the final line.
#[must_use]
pub fn line_end(source: &str, offset: usize) -> usize {
    source
        .get(offset..)
        .and_then(|rest| rest.find('\n'))
        .map_or(source.len(), |index| offset + index)
}

/// Returns the leading whitespace of the line containing `offset`.
#[must_use]
pub fn line_indentation(source: &str, offset: usize) -> &str {
    let start = line_start(source, offset);
    let rest = source.get(start..).unwrap_or_default();
    leading_whitespace(rest)
}

/// Returns the run of spaces and tabs at the start of `line`.
#[must_use]
pub fn leading_whitespace(line: &str) -> &str {
    let trimmed = line.trim_start_matches([' ', '\t']);
    line.get(..line.len() - trimmed.len()).unwrap_or_default()
}

/// Returns the start of the comment lines directly above `start`.
///
/// Comments attach to the node below them when they sit on their own
/// lines with no blank line in between and the node begins its line. Lines
/// starting before `floor` are never taken. Returns `start` when nothing is
/// attached.
#[must_use]
pub fn leading_comment_start(source: &str, start: usize, floor: usize) -> usize {
    let line = line_start(source, start);
    let begins_line = source
        .get(line..start)
        .is_some_and(|prefix| prefix.trim().is_empty());
    if line < floor || !begins_line {
        return start;
    }
    let mut attached = start;
    let mut cursor = line;
    while cursor > floor {
        let previous_end = cursor.saturating_sub(1);
        let previous_start = line_start(source, previous_end);
        if previous_start < floor {
            break;
        }
        let Some(text) = source.get(previous_start..previous_end) else {
            break;
        };
        if !is_comment_line(text.trim()) {
            break;
        }
        attached = previous_start.saturating_add(leading_whitespace(text).len());
        cursor = previous_start;
    }
    attached
}

/// Returns the end of a comment following `end` on the same line.
///
/// Only whitespace may separate the comment from `end`, and the comment
/// must close before the line does. Text at or after `ceiling` is never
/// taken. Returns `end` when nothing is attached.
#[must_use]
pub fn trailing_comment_end(source: &str, end: usize, ceiling: usize) -> usize {
    let limit = line_end(source, end).min(ceiling);
    let Some(rest) = source.get(end..limit) else {
        return end;
    };
    let comment = rest.trim();
    let closed = comment.starts_with("//")
        || comment.starts_with('#')
        || (comment.starts_with("/*") && comment.ends_with("*/"));
    if !closed {
        return end;
    }
    end.saturating_add(rest.trim_end().len())
}

fn is_comment_line(trimmed: &str) -> bool {
    ["//", "#", "/*", "*"]
        .iter()
        .any(|marker| trimmed.starts_with(marker))
}

/// Converts a Tree-sitter position (zero-based) to one-based display
/// coordinates.
#[must_use]
pub(crate) fn point_to_one_based(pos: tree_sitter::Point) -> (u32, u32) {
    let line = u32::try_from(pos.row.saturating_add(1)).unwrap_or(u32::MAX);
    let column = u32::try_from(pos.column.saturating_add(1)).unwrap_or(u32::MAX);
    (line, column)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn reversed_endpoints_are_ordered() {
        let range = TextRange::new(9, 3);
        assert_eq!(range.start(), 3);
        assert_eq!(range.end(), 9);
        assert_eq!(range.len(), 6);
    }

    #[rstest]
    #[case(0, 0)]
    #[case(5, 0)]
    #[case(12, 12)]
    #[case(20, 12)]
    fn line_start_finds_preceding_break(#[case] offset: usize, #[case] expected: usize) {
        let source = "fn main() {\n    call();\n}";
        assert_eq!(line_start(source, offset), expected);
    }

    #[test]
    fn line_indentation_reports_leading_whitespace() {
        let source = "fn main() {\n\t  call();\n}";
        let offset = source.find("call").expect("call present");
        assert_eq!(line_indentation(source, offset), "\t  ");
        assert_eq!(line_indentation(source, 0), "");
    }

    #[test]
    fn line_end_stops_at_break_or_buffer_end() {
        let source = "a\nbc";
        assert_eq!(line_end(source, 0), 1);
        assert_eq!(line_end(source, 2), 4);
    }

    const STATEMENTS: &str =
        "fn main() {\n    a(); // about a\n\n    // explains b\n    // twice\n    b();\n}\n";

    #[test]
    fn leading_comments_stop_at_blank_lines() {
        let b = STATEMENTS.find("b();").expect("b present");
        let floor = STATEMENTS.find("a();").expect("a present") + 4;
        let comment = STATEMENTS.find("// explains").expect("comment present");
        assert_eq!(leading_comment_start(STATEMENTS, b, floor), comment);
    }

    #[rstest]
    #[case("{\n    a();\n    b();\n}", "b();")]
    #[case("{\n    // about a\n    a(); b();\n}", "b();")]
    #[case("call(a, b)", "b")]
    fn unattached_nodes_keep_their_start(#[case] source: &str, #[case] needle: &str) {
        let start = source.find(needle).expect("needle present");
        assert_eq!(leading_comment_start(source, start, 1), start);
    }

    #[test]
    fn trailing_comments_stay_on_their_line() {
        let a_end = STATEMENTS.find("a();").expect("a present") + 4;
        let comment_end = STATEMENTS.find("about a").expect("comment present") + 7;
        assert_eq!(
            trailing_comment_end(STATEMENTS, a_end, STATEMENTS.len()),
            comment_end
        );
        let b_end = STATEMENTS.find("b();").expect("b present") + 4;
        assert_eq!(trailing_comment_end(STATEMENTS, b_end, STATEMENTS.len()), b_end);
        assert_eq!(trailing_comment_end(STATEMENTS, a_end, a_end + 2), a_end);
    }
}
