//! Re-indentation of relocated source fragments.
//!
//! The modifier is a pure text transform: it knows nothing about syntax and
//! only rewrites the leading whitespace of non-blank lines. Everything after
//! the leading whitespace, and every blank line, is copied unchanged.

use weaver_syntax::leading_whitespace;

use crate::options::IndentOptions;

/// Measures the column width of `whitespace`, expanding tabs to the next
/// multiple of `tab_width`.
#[must_use]
pub fn measure_width(whitespace: &str, tab_width: usize) -> usize {
    whitespace.chars().fold(0, |column, ch| match ch {
        '\t' => {
            let into_stop = column.checked_rem(tab_width).unwrap_or(0);
            column.saturating_add(tab_width.saturating_sub(into_stop).max(1))
        }
        _ => column.saturating_add(1),
    })
}

/// Returns the leading whitespace of `line`.
#[must_use]
pub fn indentation_of_line(line: &str) -> &str {
    leading_whitespace(line)
}

/// Shifts every non-blank line of `text` by `level_delta` indentation
/// levels of `indent_unit`.
///
/// # Example
///
/// ```
/// use weaver_rewrite::reindent;
///
/// let shifted = reindent("a();\n    b();", 1, "    ", 4);
/// assert_eq!(shifted, "    a();\n        b();");
/// ```
#[must_use]
pub fn reindent(text: &str, level_delta: isize, indent_unit: &str, tab_width: usize) -> String {
    IndentModifier::new(IndentOptions::from_unit(indent_unit, tab_width)).shift_levels(text, level_delta)
}

/// Rewrites leading whitespace according to [`IndentOptions`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IndentModifier {
    options: IndentOptions,
}

impl IndentModifier {
    /// Creates a modifier producing whitespace in the given style.
    #[must_use]
    pub const fn new(options: IndentOptions) -> Self {
        Self { options }
    }

    /// The options whitespace is measured and produced with.
    #[must_use]
    pub const fn options(&self) -> &IndentOptions {
        &self.options
    }

    /// Column width of `whitespace`.
    #[must_use]
    pub fn width(&self, whitespace: &str) -> usize {
        measure_width(whitespace, self.options.tab_width)
    }

    /// Shifts every non-blank line by `level_delta` indentation levels.
    #[must_use]
    pub fn shift_levels(&self, text: &str, level_delta: isize) -> String {
        let unit = isize::try_from(self.options.indent_width).unwrap_or(isize::MAX);
        self.shift_columns(text, level_delta.saturating_mul(unit))
    }

    /// Shifts every non-blank line by `delta` columns. Lines cannot be
    /// shifted left of column zero.
    #[must_use]
    pub fn shift_columns(&self, text: &str, delta: isize) -> String {
        self.shift_lines(text, delta, 0)
    }

    /// Shifts every non-blank line after the first by `delta` columns.
    ///
    /// Fragments cut from a node's range start at the node's first token,
    /// so their first line carries no leading whitespace of its own.
    #[must_use]
    pub fn shift_following_lines(&self, text: &str, delta: isize) -> String {
        self.shift_lines(text, delta, 1)
    }

    /// Prefixes every non-blank line after the first with `indent`.
    #[must_use]
    pub fn indent_following_lines(text: &str, indent: &str) -> String {
        if indent.is_empty() || !text.contains('\n') {
            return String::from(text);
        }
        text.split('\n')
            .enumerate()
            .map(|(index, line)| {
                if index == 0 || line.trim().is_empty() {
                    String::from(line)
                } else {
                    format!("{indent}{line}")
                }
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn shift_lines(&self, text: &str, delta: isize, skip: usize) -> String {
        if delta == 0 {
            return String::from(text);
        }
        text.split('\n')
            .enumerate()
            .map(|(index, line)| {
                if index < skip || line.trim().is_empty() {
                    return String::from(line);
                }
                let current = leading_whitespace(line);
                let body = line.get(current.len()..).unwrap_or_default();
                let width = self.width(current).saturating_add_signed(delta);
                format!("{}{body}", self.options.whitespace(width))
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::IndentStyle;
    use rstest::rstest;

    #[rstest]
    #[case("", 0)]
    #[case("    ", 4)]
    #[case("\t", 4)]
    #[case("  \t", 4)]
    #[case("\t  ", 6)]
    fn width_expands_tabs_to_stops(#[case] whitespace: &str, #[case] expected: usize) {
        assert_eq!(measure_width(whitespace, 4), expected);
    }

    #[test]
    fn blank_lines_are_left_alone() {
        let text = "a();\n\n   \n    b();";
        assert_eq!(reindent(text, 1, "  ", 4), "  a();\n\n   \n      b();");
    }

    #[test]
    fn negative_shifts_stop_at_column_zero() {
        assert_eq!(reindent("  a();\n        b();", -1, "    ", 4), "a();\n    b();");
    }

    #[test]
    fn tab_units_produce_tabs() {
        assert_eq!(reindent("a();\n\tb();", 1, "\t", 4), "\ta();\n\t\tb();");
    }

    #[test]
    fn zero_delta_keeps_mixed_whitespace() {
        assert_eq!(reindent(" \t a();", 0, "    ", 4), " \t a();");
    }

    #[test]
    fn following_lines_shift_relative_to_the_first() {
        let modifier = IndentModifier::new(IndentOptions {
            style: IndentStyle::Spaces,
            indent_width: 4,
            tab_width: 4,
        });
        let moved = modifier.shift_following_lines("if x {\n        y();\n    }", -4);
        assert_eq!(moved, "if x {\n    y();\n}");
    }
}
