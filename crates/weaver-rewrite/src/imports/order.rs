//! Import group ordering.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::ImportEntry;

/// Errors encountered while parsing an [`ImportOrder`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ImportOrderError {
    /// The same group is listed twice.
    #[error("import group '{group}' is listed more than once")]
    DuplicateGroup {
        /// The repeated group as written.
        group: String,
    },
}

/// One group of imports sharing a name prefix.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImportGroup {
    prefix: String,
    is_static: bool,
}

impl ImportGroup {
    /// Creates a group; an empty prefix matches every import.
    #[must_use]
    pub fn new(prefix: impl Into<String>, is_static: bool) -> Self {
        Self {
            prefix: prefix.into(),
            is_static,
        }
    }

    /// Package prefix of the group.
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Whether the group holds static imports.
    #[must_use]
    pub const fn is_static(&self) -> bool {
        self.is_static
    }

    /// Length of the matched prefix, if `entry` belongs to this group.
    fn matches(&self, entry: &ImportEntry) -> Option<usize> {
        if entry.is_static() != self.is_static {
            return None;
        }
        if self.prefix.is_empty() {
            return Some(0);
        }
        let name = entry.name();
        let inside = name == self.prefix
            || name
                .strip_prefix(self.prefix.as_str())
                .is_some_and(|rest| rest.starts_with('.'));
        inside.then_some(self.prefix.len())
    }
}

impl fmt::Display for ImportGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_static {
            f.write_str("#")?;
        }
        f.write_str(&self.prefix)
    }
}

/// Ordered import groups.
///
/// The string form lists group prefixes separated by `;`. A leading `#`
/// marks a static group and an empty prefix is a catch-all. Catch-alls for
/// non-static and static imports are appended when the order lacks them.
///
/// # Example
///
/// ```
/// use weaver_rewrite::{ImportEntry, ImportOrder};
///
/// let order: ImportOrder = "java;javax;org;com;#".parse()?;
/// let util = ImportEntry::single("java.util.List");
/// let junit = ImportEntry::single("org.junit.Test");
/// assert!(order.group_of(&util) < order.group_of(&junit));
/// # Ok::<(), weaver_rewrite::ImportOrderError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(try_from = "String", into = "String")]
pub struct ImportOrder {
    groups: Vec<ImportGroup>,
}

impl ImportOrder {
    /// Groups in order.
    #[must_use]
    pub fn groups(&self) -> &[ImportGroup] {
        &self.groups
    }

    /// Index of the group `entry` belongs to: the group with the longest
    /// matching prefix, the earliest on a tie.
    #[must_use]
    pub fn group_of(&self, entry: &ImportEntry) -> usize {
        let mut best: Option<(usize, usize)> = None;
        for (index, group) in self.groups.iter().enumerate() {
            if let Some(length) = group.matches(entry)
                && best.is_none_or(|(_, longest)| length > longest)
            {
                best = Some((index, length));
            }
        }
        best.map_or(self.groups.len(), |(index, _)| index)
    }

    fn from_groups(mut groups: Vec<ImportGroup>) -> Self {
        for is_static in [false, true] {
            if !groups
                .iter()
                .any(|group| group.is_static == is_static && group.prefix.is_empty())
            {
                groups.push(ImportGroup::new("", is_static));
            }
        }
        Self { groups }
    }
}

impl Default for ImportOrder {
    fn default() -> Self {
        Self::from_groups(
            ["java", "javax", "org", "com"]
                .into_iter()
                .map(|prefix| ImportGroup::new(prefix, false))
                .collect(),
        )
    }
}

impl FromStr for ImportOrder {
    type Err = ImportOrderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut groups: Vec<ImportGroup> = Vec::new();
        if s.trim().is_empty() {
            return Ok(Self::from_groups(groups));
        }
        for part in s.split(';') {
            let trimmed = part.trim();
            let group = trimmed.strip_prefix('#').map_or_else(
                || ImportGroup::new(trimmed, false),
                |prefix| ImportGroup::new(prefix.trim(), true),
            );
            if groups.contains(&group) {
                return Err(ImportOrderError::DuplicateGroup {
                    group: group.to_string(),
                });
            }
            groups.push(group);
        }
        Ok(Self::from_groups(groups))
    }
}

impl fmt::Display for ImportOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, group) in self.groups.iter().enumerate() {
            if index > 0 {
                f.write_str(";")?;
            }
            write!(f, "{group}")?;
        }
        Ok(())
    }
}

impl TryFrom<String> for ImportOrder {
    type Error = ImportOrderError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ImportOrder> for String {
    fn from(order: ImportOrder) -> Self {
        order.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("java.util.List", false, 0)]
    #[case("javax.inject.Inject", false, 1)]
    #[case("org.junit.Test", false, 2)]
    #[case("net.example.Thing", false, 5)]
    #[case("org.junit.Assert.assertEquals", true, 3)]
    fn entries_fall_into_their_group(
        #[case] name: &str,
        #[case] is_static: bool,
        #[case] expected: usize,
    ) {
        let order: ImportOrder = "java;javax;org;#;com".parse().expect("order");
        let entry = ImportEntry::new(name, is_static, false);
        assert_eq!(order.group_of(&entry), expected);
    }

    #[test]
    fn longest_prefix_wins() {
        let order: ImportOrder = "org;org.example".parse().expect("order");
        assert_eq!(order.group_of(&ImportEntry::single("org.example.A")), 1);
        assert_eq!(order.group_of(&ImportEntry::single("org.other.A")), 0);
        assert_eq!(order.group_of(&ImportEntry::single("organic.A")), 2);
    }

    #[test]
    fn catch_all_groups_are_appended() {
        let order: ImportOrder = "java".parse().expect("order");
        assert_eq!(order.to_string(), "java;;#");
        assert_eq!(order.groups().len(), 3);
    }

    #[test]
    fn duplicate_groups_are_rejected() {
        let result = "java;#org;#org".parse::<ImportOrder>();
        assert_eq!(
            result,
            Err(ImportOrderError::DuplicateGroup {
                group: String::from("#org")
            })
        );
    }

    #[test]
    fn order_round_trips_through_serde() {
        let order: ImportOrder = serde_json::from_str(r#""java;#""#).expect("order");
        assert_eq!(order.groups().len(), 3);
        let json = serde_json::to_string(&order).expect("json");
        assert_eq!(json, r#""java;#;""#);
    }
}
