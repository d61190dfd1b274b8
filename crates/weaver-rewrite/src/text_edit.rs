//! Text edits produced by materialization.
//!
//! A [`TextEditSet`] is the only output of the rewriting core. Its edits are
//! sorted by start offset and never overlap; regions that no edit covers are
//! preserved by omission.

use std::fmt;

use weaver_syntax::TextRange;

use crate::error::RewriteError;

/// Replacement of one byte range of the original buffer.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TextEdit {
    range: TextRange,
    replacement: String,
}

impl TextEdit {
    /// Creates an edit replacing `range` with `replacement`.
    #[must_use]
    pub fn new(range: impl Into<TextRange>, replacement: impl Into<String>) -> Self {
        Self {
            range: range.into(),
            replacement: replacement.into(),
        }
    }

    /// Creates an insertion at `offset`.
    #[must_use]
    pub fn insert(offset: usize, text: impl Into<String>) -> Self {
        Self::new(TextRange::empty(offset), text)
    }

    /// Creates a deletion of `range`.
    #[must_use]
    pub fn delete(range: impl Into<TextRange>) -> Self {
        Self::new(range, String::new())
    }

    /// The replaced range of the original buffer.
    #[must_use]
    pub const fn range(&self) -> TextRange {
        self.range
    }

    /// The replacement text.
    #[must_use]
    pub fn replacement(&self) -> &str {
        &self.replacement
    }

    /// Whether the edit only inserts text.
    #[must_use]
    pub const fn is_insertion(&self) -> bool {
        self.range.is_empty()
    }

    /// Shifts the edit left by `offset` bytes.
    pub(crate) fn rebase(&self, offset: usize) -> Self {
        let start = self.range.start().saturating_sub(offset);
        let end = self.range.end().saturating_sub(offset);
        Self::new(start..end, self.replacement.clone())
    }
}

impl fmt::Display for TextEdit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {:?}", self.range, self.replacement)
    }
}

/// Ordered, non-overlapping set of edits over one buffer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextEditSet {
    edits: Vec<TextEdit>,
}

impl TextEditSet {
    /// Normalises `edits` against `source`.
    ///
    /// Edits are stably sorted by start offset, so insertions at the same
    /// offset keep the order in which they were produced. Touching edits are
    /// merged and edits that would reproduce the original text are dropped.
    ///
    /// # Errors
    ///
    /// Returns [`RewriteError::InvalidEdit`] if an edit does not fit
    /// `source` and [`RewriteError::ConflictingEdit`] if two edits overlap.
    pub fn new(
        source: &str,
        edits: impl IntoIterator<Item = TextEdit>,
    ) -> Result<Self, RewriteError> {
        let mut sorted: Vec<TextEdit> = edits.into_iter().collect();
        for edit in &sorted {
            check_fits(source, edit.range)?;
        }
        sorted.sort_by_key(|edit| (edit.range.start(), edit.range.end()));

        let mut merged: Vec<TextEdit> = Vec::with_capacity(sorted.len());
        for edit in sorted {
            match merged.last_mut() {
                Some(previous) if edit.range.start() < previous.range.end() => {
                    return Err(overlap(previous.range, edit.range));
                }
                Some(previous) if edit.range.start() == previous.range.end() => {
                    previous.range = TextRange::new(previous.range.start(), edit.range.end());
                    previous.replacement.push_str(&edit.replacement);
                }
                _ => merged.push(edit),
            }
        }
        merged.retain(|edit| source.get(edit.range.as_range()) != Some(edit.replacement.as_str()));
        Ok(Self { edits: merged })
    }

    /// Returns the edits in ascending order.
    #[must_use]
    pub fn edits(&self) -> &[TextEdit] {
        &self.edits
    }

    /// Number of edits.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.edits.len()
    }

    /// Whether the set changes nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    /// Iterates over the edits in ascending order.
    pub fn iter(&self) -> std::slice::Iter<'_, TextEdit> {
        self.edits.iter()
    }

    /// Total number of original bytes replaced or deleted.
    #[must_use]
    pub fn replaced_span(&self) -> usize {
        self.edits.iter().map(|edit| edit.range.len()).sum()
    }

    /// Applies the edits to `source`, last edit first.
    ///
    /// # Errors
    ///
    /// Returns [`RewriteError::InvalidEdit`] if an edit falls outside
    /// `source` or splits a UTF-8 character.
    pub fn apply(&self, source: &str) -> Result<String, RewriteError> {
        let mut updated = String::from(source);
        for edit in self.edits.iter().rev() {
            check_fits(&updated, edit.range)?;
            updated.replace_range(edit.range.as_range(), &edit.replacement);
        }
        Ok(updated)
    }
}

impl<'a> IntoIterator for &'a TextEditSet {
    type Item = &'a TextEdit;
    type IntoIter = std::slice::Iter<'a, TextEdit>;

    fn into_iter(self) -> Self::IntoIter {
        self.edits.iter()
    }
}

impl IntoIterator for TextEditSet {
    type Item = TextEdit;
    type IntoIter = std::vec::IntoIter<TextEdit>;

    fn into_iter(self) -> Self::IntoIter {
        self.edits.into_iter()
    }
}

fn check_fits(source: &str, range: TextRange) -> Result<(), RewriteError> {
    if range.end() > source.len() {
        return Err(RewriteError::invalid_edit(
            range,
            format!("range is out of bounds for a buffer of {} bytes", source.len()),
        ));
    }
    if !source.is_char_boundary(range.start()) || !source.is_char_boundary(range.end()) {
        return Err(RewriteError::invalid_edit(range, "range is not UTF-8 aligned"));
    }
    Ok(())
}

fn overlap(left: TextRange, right: TextRange) -> RewriteError {
    RewriteError::conflict(right, format!("edit overlaps the edit at {left}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edits_are_sorted_and_applied_from_the_end() {
        let source = "let a = 1;";
        let set = TextEditSet::new(
            source,
            [TextEdit::new(8..9, "2"), TextEdit::new(4..5, "b")],
        )
        .expect("edit set");
        assert_eq!(set.edits().first().map(TextEdit::range), Some((4..5).into()));
        assert_eq!(set.apply(source).expect("apply"), "let b = 2;");
    }

    #[test]
    fn touching_edits_are_merged_in_order() {
        let source = "ab";
        let set = TextEditSet::new(
            source,
            [
                TextEdit::insert(1, "x"),
                TextEdit::new(1..2, "y"),
                TextEdit::new(0..1, "z"),
            ],
        )
        .expect("edit set");
        assert_eq!(set.len(), 1);
        assert_eq!(set.apply(source).expect("apply"), "zxy");
    }

    #[test]
    fn identity_edits_are_dropped() {
        let set = TextEditSet::new("abc", [TextEdit::new(1..2, "b")]).expect("edit set");
        assert!(set.is_empty());
    }

    #[test]
    fn overlapping_edits_are_rejected() {
        let result = TextEditSet::new("abcdef", [TextEdit::delete(0..3), TextEdit::delete(2..4)]);
        assert!(matches!(result, Err(RewriteError::ConflictingEdit { .. })));
    }

    #[test]
    fn edits_must_respect_char_boundaries() {
        let result = TextEditSet::new("é", [TextEdit::delete(0..1)]);
        assert!(matches!(result, Err(RewriteError::InvalidEdit { .. })));
    }
}
