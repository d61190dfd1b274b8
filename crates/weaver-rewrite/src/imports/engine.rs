//! Minimal rewriting of an import section.
//!
//! Existing declarations keep their text, their position relative to each
//! other and the comments above them. Additions are slotted into their
//! group, removals drop the declaration with its comments, and the new
//! section is diffed line by line against the old one so that only the
//! touched lines are edited.

use serde::{Deserialize, Serialize};
use similar::{ChangeTag, TextDiff};
use tracing::debug;
use weaver_syntax::{TextRange, line_end, line_start};

use super::{ImportEntry, ImportOrder, ImportSection};
use crate::error::RewriteError;
use crate::text_edit::{TextEdit, TextEditSet};

/// Package whose types are visible without an import.
const IMPLICIT_PACKAGE: &str = "java.lang";

/// Policy for [`ImportRewrite`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ImportRewriteOptions {
    /// Group order of the section.
    pub order: ImportOrder,
    /// Number of single-type imports from one container at which they are
    /// replaced by an on-demand import. Zero disables the conversion.
    pub on_demand_threshold: usize,
    /// Threshold for static member imports from one type.
    pub static_on_demand_threshold: usize,
    /// Blank lines placed between groups at new boundaries.
    pub blank_lines_between_groups: usize,
}

impl Default for ImportRewriteOptions {
    fn default() -> Self {
        Self {
            order: ImportOrder::default(),
            on_demand_threshold: 99,
            static_on_demand_threshold: 99,
            blank_lines_between_groups: 1,
        }
    }
}

impl ImportRewriteOptions {
    const fn threshold(&self, is_static: bool) -> usize {
        if is_static {
            self.static_on_demand_threshold
        } else {
            self.on_demand_threshold
        }
    }
}

/// Accumulates import additions and removals for one file.
///
/// # Example
///
/// ```
/// use weaver_rewrite::{ImportRewrite, ImportRewriteOptions};
///
/// let source = "package app;\n\nimport java.util.List;\n\nclass A {}\n";
/// let mut imports = ImportRewrite::new(ImportRewriteOptions::default());
/// imports.add_import("java.util.Map").remove_import("java.util.List");
/// let edits = imports.rewrite_source(source)?;
/// assert_eq!(
///     edits.apply(source)?,
///     "package app;\n\nimport java.util.Map;\n\nclass A {}\n"
/// );
/// # Ok::<(), weaver_rewrite::RewriteError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct ImportRewrite {
    options: ImportRewriteOptions,
    additions: Vec<ImportEntry>,
    removals: Vec<ImportEntry>,
}

impl ImportRewrite {
    /// Starts an empty rewrite with the given policy.
    #[must_use]
    pub const fn new(options: ImportRewriteOptions) -> Self {
        Self {
            options,
            additions: Vec::new(),
            removals: Vec::new(),
        }
    }

    /// The policy in effect.
    #[must_use]
    pub const fn options(&self) -> &ImportRewriteOptions {
        &self.options
    }

    /// Requests an import of `entry`.
    pub fn add(&mut self, entry: ImportEntry) -> &mut Self {
        self.additions.push(entry);
        self
    }

    /// Requests removal of `entry`.
    pub fn remove(&mut self, entry: ImportEntry) -> &mut Self {
        self.removals.push(entry);
        self
    }

    /// Requests a single-type import of a qualified type name.
    pub fn add_import(&mut self, name: impl Into<String>) -> &mut Self {
        self.add(ImportEntry::single(name))
    }

    /// Requests a static import of `member` of `container`.
    pub fn add_static_import(&mut self, container: &str, member: &str) -> &mut Self {
        self.add(ImportEntry::single_static(format!("{container}.{member}")))
    }

    /// Requests removal of a single-type import.
    pub fn remove_import(&mut self, name: impl Into<String>) -> &mut Self {
        self.remove(ImportEntry::single(name))
    }

    /// Requests removal of a static import of `member` of `container`.
    pub fn remove_static_import(&mut self, container: &str, member: &str) -> &mut Self {
        self.remove(ImportEntry::single_static(format!("{container}.{member}")))
    }

    /// Computes the edits for a file whose section was scanned from
    /// `source` with [`ImportSection::scan`].
    ///
    /// # Errors
    ///
    /// See [`ImportRewrite::rewrite`].
    pub fn rewrite_source(&self, source: &str) -> Result<TextEditSet, RewriteError> {
        self.rewrite(source, &ImportSection::scan(source))
    }

    /// Computes the edits that bring `section` of `source` up to date.
    ///
    /// # Errors
    ///
    /// Returns [`RewriteError::AmbiguousImport`] if an addition shares its
    /// simple name with another import that stays, and
    /// [`RewriteError::InvalidEdit`] if two declarations share a line or a
    /// range does not fit `source`.
    pub fn rewrite(
        &self,
        source: &str,
        section: &ImportSection,
    ) -> Result<TextEditSet, RewriteError> {
        rewrite_imports(
            source,
            section,
            &self.additions,
            &self.removals,
            &self.options,
        )
    }
}

/// Computes minimal edits to the import section of `source`.
///
/// # Errors
///
/// See [`ImportRewrite::rewrite`].
pub fn rewrite_imports(
    source: &str,
    section: &ImportSection,
    additions: &[ImportEntry],
    removals: &[ImportEntry],
    options: &ImportRewriteOptions,
) -> Result<TextEditSet, RewriteError> {
    let (region, mut items) = original_items(source, section)?;
    let before = items.len();

    items.retain(|item| !removals.contains(&item.entry));
    let mut added = 0_usize;
    for entry in additions {
        if admit(entry, &items, section.package_name())? {
            let index = insertion_index(&items, entry, &options.order);
            items.insert(index, Item::new(entry.clone()));
            added = added.saturating_add(1);
        }
    }
    collapse(&mut items, options);

    let lines = render(&items, options);
    let edits = match region {
        Some(region) if lines.is_empty() => vec![clear_region(source, region)],
        Some(region) => {
            let old = source.get(region.as_range()).ok_or_else(|| {
                RewriteError::invalid_edit(region, "import section does not fit the source")
            })?;
            let mut new = lines.join("\n");
            if old.ends_with('\n') {
                new.push('\n');
            }
            diff_edits(region.start(), old, &new)
        }
        None if lines.is_empty() => Vec::new(),
        None => vec![insert_section(section, &lines)],
    };

    let set = TextEditSet::new(source, edits)?;
    debug!(
        existing = before,
        added,
        kept = items.len(),
        edits = set.len(),
        "rewrote import section"
    );
    Ok(set)
}

/// A declaration of the rewritten section.
#[derive(Debug, Clone)]
struct Item {
    entry: ImportEntry,
    /// Lines between the previous declaration and this one, as written.
    gap: Vec<String>,
    /// The declaration's line as written.
    line: Option<String>,
    /// Index among the original declarations.
    origin: Option<usize>,
}

impl Item {
    const fn new(entry: ImportEntry) -> Self {
        Self {
            entry,
            gap: Vec::new(),
            line: None,
            origin: None,
        }
    }

    fn text(&self) -> String {
        self.line.clone().unwrap_or_else(|| self.entry.render())
    }

    fn comments(&self) -> impl Iterator<Item = &String> {
        self.gap.iter().filter(|line| !line.trim().is_empty())
    }
}

/// Splits the source section into items. The region runs from the start
/// of the first declaration's line to the end of the last one's, including
/// its line break.
fn original_items(
    source: &str,
    section: &ImportSection,
) -> Result<(Option<TextRange>, Vec<Item>), RewriteError> {
    let mut items = Vec::with_capacity(section.imports().len());
    let mut previous_end: Option<usize> = None;
    for (origin, (entry, range)) in section.imports().iter().enumerate() {
        let start = line_start(source, range.start());
        let end = line_end(source, range.end());
        let gap = match previous_end {
            Some(previous) if start <= previous => {
                return Err(RewriteError::invalid_edit(
                    *range,
                    "import declarations must be on separate lines",
                ));
            }
            Some(previous) => source
                .get(previous.saturating_add(1)..start)
                .unwrap_or_default()
                .lines()
                .map(String::from)
                .collect(),
            None => Vec::new(),
        };
        let line = source
            .get(start..end)
            .ok_or_else(|| RewriteError::invalid_edit(*range, "import does not fit the source"))?;
        items.push(Item {
            entry: entry.clone(),
            gap,
            line: Some(String::from(line)),
            origin: Some(origin),
        });
        previous_end = Some(end);
    }

    let region = section.imports().first().zip(previous_end).map(|((_, first), end)| {
        let with_break = if source.get(end..).is_some_and(|rest| rest.starts_with('\n')) {
            end.saturating_add(1)
        } else {
            end
        };
        TextRange::new(line_start(source, first.start()), with_break)
    });
    Ok((region, items))
}

/// Whether `entry` should be added, rejecting ambiguous additions.
fn admit(
    entry: &ImportEntry,
    items: &[Item],
    package: Option<&str>,
) -> Result<bool, RewriteError> {
    let container = entry.container();
    if container.is_empty() {
        return Ok(false);
    }
    if !entry.is_static() && (Some(container) == package || container == IMPLICIT_PACKAGE) {
        return Ok(false);
    }
    if items
        .iter()
        .any(|item| item.entry == *entry || item.entry.covers(entry))
    {
        return Ok(false);
    }
    if let Some(simple) = entry.simple_name()
        && let Some(clash) = items.iter().find(|item| {
            item.entry.is_static() == entry.is_static()
                && item.entry.simple_name() == Some(simple)
        })
    {
        return Err(RewriteError::ambiguous_import(
            entry.name(),
            clash.entry.name(),
        ));
    }
    Ok(true)
}

/// Position for `entry`: after the last member of its group that sorts
/// before it, otherwise at the start of its group, otherwise after the
/// last earlier group.
fn insertion_index(items: &[Item], entry: &ImportEntry, order: &ImportOrder) -> usize {
    let group = order.group_of(entry);
    let groups: Vec<usize> = items.iter().map(|item| order.group_of(&item.entry)).collect();
    if let Some(last) = items
        .iter()
        .zip(&groups)
        .rposition(|(item, member)| *member == group && item.entry <= *entry)
    {
        return last.saturating_add(1);
    }
    if let Some(first) = groups.iter().position(|member| *member == group) {
        return first;
    }
    groups
        .iter()
        .rposition(|member| *member < group)
        .map_or(0, |last| last.saturating_add(1))
}

/// Replaces single imports from one container by an on-demand import once
/// their number reaches the threshold.
fn collapse(items: &mut Vec<Item>, options: &ImportRewriteOptions) {
    let mut containers: Vec<(String, bool)> = Vec::new();
    for item in items.iter().filter(|item| !item.entry.is_on_demand()) {
        let key = (String::from(item.entry.container()), item.entry.is_static());
        if !key.0.is_empty() && !containers.contains(&key) {
            containers.push(key);
        }
    }

    for (container, is_static) in containers {
        let threshold = options.threshold(is_static);
        let on_demand = ImportEntry::on_demand(container, is_static);
        let members: Vec<usize> = items
            .iter()
            .enumerate()
            .filter(|(_, item)| on_demand.covers(&item.entry))
            .map(|(index, _)| index)
            .collect();
        if threshold == 0 || members.len() < threshold {
            continue;
        }
        let already_present = items.iter().any(|item| item.entry == on_demand);
        let comments: Vec<String> = members
            .iter()
            .filter_map(|index| items.get(*index))
            .flat_map(Item::comments)
            .cloned()
            .collect();
        for index in members.iter().rev() {
            items.remove(*index);
        }
        if !already_present && let Some(first) = members.first() {
            let mut replacement = Item::new(on_demand);
            replacement.gap = comments;
            items.insert((*first).min(items.len()), replacement);
        }
    }
}

/// Lines of the rewritten section. Declarations that were adjacent in the
/// source keep the lines between them; elsewhere, comments are kept and
/// blank lines separate groups.
fn render(items: &[Item], options: &ImportRewriteOptions) -> Vec<String> {
    let mut lines = Vec::new();
    let mut previous: Option<&Item> = None;
    for item in items {
        let adjacent = match (previous, item.origin) {
            (Some(before), Some(origin)) => {
                before.origin.map(|index| index.saturating_add(1)) == Some(origin)
            }
            _ => false,
        };
        if adjacent {
            lines.extend(item.gap.iter().cloned());
        } else {
            if let Some(before) = previous
                && options.order.group_of(&before.entry) != options.order.group_of(&item.entry)
            {
                lines.extend(std::iter::repeat_n(
                    String::new(),
                    options.blank_lines_between_groups,
                ));
            }
            lines.extend(item.comments().cloned());
        }
        lines.push(item.text());
        previous = Some(item);
    }
    lines
}

/// Edits turning `old` into `new`, line by line.
fn diff_edits(offset: usize, old: &str, new: &str) -> Vec<TextEdit> {
    let diff = TextDiff::from_lines(old, new);
    let mut edits = Vec::new();
    let mut pending: Option<(usize, usize, String)> = None;
    let mut old_byte = offset;
    for change in diff.iter_all_changes() {
        let value = change.value();
        match change.tag() {
            ChangeTag::Equal => {
                if let Some((start, end, text)) = pending.take() {
                    edits.push(TextEdit::new(start..end, text));
                }
                old_byte = old_byte.saturating_add(value.len());
            }
            ChangeTag::Delete => {
                let edit = pending.get_or_insert_with(|| (old_byte, old_byte, String::new()));
                old_byte = old_byte.saturating_add(value.len());
                edit.1 = old_byte;
            }
            ChangeTag::Insert => {
                let edit = pending.get_or_insert_with(|| (old_byte, old_byte, String::new()));
                edit.2.push_str(value);
            }
        }
    }
    if let Some((start, end, text)) = pending {
        edits.push(TextEdit::new(start..end, text));
    }
    edits
}

/// Deletes the whole region and the blank lines after it.
fn clear_region(source: &str, region: TextRange) -> TextEdit {
    let rest = source.get(region.end()..).unwrap_or_default();
    let blank = rest.len().saturating_sub(rest.trim_start().len());
    let whole_lines = rest
        .get(..blank)
        .and_then(|whitespace| whitespace.rfind('\n'))
        .map_or(0, |last| last.saturating_add(1));
    TextEdit::delete(region.start()..region.end().saturating_add(whole_lines))
}

/// Inserts a section into a file that had none: after the package
/// declaration, or at the top of the file.
fn insert_section(section: &ImportSection, lines: &[String]) -> TextEdit {
    let body = lines.join("\n");
    section.package_range().map_or_else(
        || TextEdit::insert(0, format!("{body}\n\n")),
        |package| TextEdit::insert(package.end(), format!("\n\n{body}")),
    )
}
