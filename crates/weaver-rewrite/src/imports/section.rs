//! The package declaration and import declarations of one file.

use weaver_syntax::{NodeId, Property, PropertyKey, SyntaxNode, SyntaxTree, TextRange};

use super::ImportEntry;
use crate::error::RewriteError;

/// Child slot of the root holding the package declaration.
pub const PACKAGE: PropertyKey = PropertyKey::new("package");
/// List property of the root holding the import declarations.
pub const IMPORTS: PropertyKey = PropertyKey::new("imports");
/// Value holding a package or import name.
pub const NAME: PropertyKey = PropertyKey::new("name");
/// Value holding the `static` keyword of an import, empty when absent.
pub const STATIC: PropertyKey = PropertyKey::new("static");
/// Value holding the `.*` of an on-demand import, empty when absent.
pub const ON_DEMAND: PropertyKey = PropertyKey::new("on_demand");

/// Package name and import declarations with their source ranges.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportSection {
    package: Option<(String, TextRange)>,
    imports: Vec<(ImportEntry, TextRange)>,
}

impl ImportSection {
    /// Creates a section from already located declarations.
    #[must_use]
    pub const fn new(
        package: Option<(String, TextRange)>,
        imports: Vec<(ImportEntry, TextRange)>,
    ) -> Self {
        Self { package, imports }
    }

    /// Reads the section from a tree whose root has a [`PACKAGE`] child and
    /// an [`IMPORTS`] list.
    ///
    /// # Errors
    ///
    /// Returns [`RewriteError::UnknownProperty`] if the root has no
    /// [`IMPORTS`] list or an import has no [`NAME`] value.
    pub fn from_tree(tree: &SyntaxTree) -> Result<Self, RewriteError> {
        let root = tree.root();
        let root_node = tree
            .node(root)
            .ok_or_else(|| RewriteError::foreign(root))?;

        let package = match root_node.property(PACKAGE) {
            Some(Property::Child {
                node: Some(package),
                ..
            }) => {
                let name = named(tree, *package)?;
                let range = tree
                    .node(*package)
                    .map(SyntaxNode::range)
                    .ok_or_else(|| RewriteError::foreign(*package))?;
                Some((name, range))
            }
            _ => None,
        };

        let items = root_node
            .list(IMPORTS)
            .ok_or_else(|| RewriteError::unknown_property(root, IMPORTS, "list"))?;
        let mut imports = Vec::with_capacity(items.len());
        for item in items {
            let node = tree.node(*item).ok_or_else(|| RewriteError::foreign(*item))?;
            let has = |key: PropertyKey| node.value(key).is_some_and(|text| !text.is_empty());
            let entry = ImportEntry::new(named(tree, *item)?, has(STATIC), has(ON_DEMAND));
            imports.push((entry, node.range()));
        }
        Ok(Self { package, imports })
    }

    /// Finds the package and import declarations in Java-like source text
    /// line by line, stopping at the first line that is neither blank, a
    /// comment, nor one of those declarations.
    #[must_use]
    pub fn scan(source: &str) -> Self {
        let mut section = Self::default();
        let mut offset = 0_usize;
        let mut in_block_comment = false;
        for line in source.split_inclusive('\n') {
            let start = offset;
            offset = offset.saturating_add(line.len());
            let trimmed = line.trim();
            if in_block_comment {
                in_block_comment = !trimmed.contains("*/");
                continue;
            }
            if trimmed.is_empty() || trimmed.starts_with("//") {
                continue;
            }
            if trimmed.starts_with("/*") {
                in_block_comment = !trimmed.contains("*/");
                continue;
            }
            let indent = line.len().saturating_sub(line.trim_start().len());
            let statement_start = start.saturating_add(indent);
            let statement_end = trimmed
                .find(';')
                .map_or(start.saturating_add(indent).saturating_add(trimmed.len()), |semi| {
                    statement_start.saturating_add(semi).saturating_add(1)
                });
            let range = TextRange::new(statement_start, statement_end);
            if let Some(rest) = keyword(trimmed, "package") {
                let name: String = rest
                    .split(';')
                    .next()
                    .unwrap_or(rest)
                    .chars()
                    .filter(|ch| !ch.is_whitespace())
                    .collect();
                section.package = Some((name, range));
            } else if keyword(trimmed, "import").is_some() {
                if let Some(entry) = ImportEntry::parse(trimmed) {
                    section.imports.push((entry, range));
                }
            } else {
                break;
            }
        }
        section
    }

    /// Name of the file's package, if it declares one.
    #[must_use]
    pub fn package_name(&self) -> Option<&str> {
        self.package.as_ref().map(|(name, _)| name.as_str())
    }

    /// Range of the package declaration.
    #[must_use]
    pub fn package_range(&self) -> Option<TextRange> {
        self.package.as_ref().map(|(_, range)| *range)
    }

    /// Import declarations in source order.
    #[must_use]
    pub fn imports(&self) -> &[(ImportEntry, TextRange)] {
        &self.imports
    }

    /// Whether the file has no import declarations.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.imports.is_empty()
    }
}

fn named(tree: &SyntaxTree, node: NodeId) -> Result<String, RewriteError> {
    tree.node(node)
        .and_then(|syntax| syntax.value(NAME))
        .map(|name| name.chars().filter(|ch| !ch.is_whitespace()).collect())
        .ok_or_else(|| RewriteError::unknown_property(node, NAME, "value"))
}

/// Text after `word` when `line` starts with it as a whole word.
fn keyword<'l>(line: &'l str, word: &str) -> Option<&'l str> {
    line.strip_prefix(word)
        .filter(|rest| rest.starts_with(char::is_whitespace))
}

#[cfg(test)]
mod tests {
    use super::*;
    use weaver_syntax::{ListLayout, Separator, SlotLayout, SyntaxCategory, TreeBuilder};

    const SOURCE: &str = "\
/* header
 * notice */
package com.example;

import java.util.List;
// collections
import static java.util.Collections.*;

public class Example {}
";

    #[test]
    fn scan_finds_package_and_imports() {
        let section = ImportSection::scan(SOURCE);
        assert_eq!(section.package_name(), Some("com.example"));
        let names: Vec<String> = section
            .imports()
            .iter()
            .map(|(entry, _)| entry.to_string())
            .collect();
        assert_eq!(
            names,
            ["import java.util.List;", "import static java.util.Collections.*;"]
        );
        let (_, first) = section.imports().first().expect("first import");
        assert_eq!(SOURCE.get(first.as_range()), Some("import java.util.List;"));
    }

    #[test]
    fn scan_stops_at_the_first_declaration() {
        let section = ImportSection::scan("class A {}\nimport a.B;\n");
        assert!(section.is_empty());
        assert_eq!(section.package_name(), None);
    }

    #[test]
    fn from_tree_reads_named_values() {
        let source = "package p;\nimport static a.B.*;\n";
        let mut builder = TreeBuilder::new(source);
        let package = builder
            .node("package_declaration", SyntaxCategory::Declaration, 0..10)
            .value(NAME, 8..9)
            .build()
            .expect("package");
        let import = builder
            .node("import_declaration", SyntaxCategory::Import, 11..31)
            .value(STATIC, 18..24)
            .value(NAME, 25..28)
            .value(ON_DEMAND, 28..30)
            .build()
            .expect("import");
        let root = builder
            .node("program", SyntaxCategory::Other, 0..source.len())
            .slot(PACKAGE, Some(package), SlotLayout::new(0))
            .list(IMPORTS, vec![import], ListLayout::new(11, Separator::Line))
            .build()
            .expect("root");
        let tree = builder.finish(root).expect("tree");

        let section = ImportSection::from_tree(&tree).expect("section");
        assert_eq!(section.package_name(), Some("p"));
        assert_eq!(
            section.imports().first().map(|(entry, _)| entry.clone()),
            Some(ImportEntry::on_demand("a.B", true))
        );
    }
}
