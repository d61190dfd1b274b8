//! Import declarations.

use std::fmt;

/// One import declaration.
///
/// On-demand imports store the container they open, without the trailing
/// `.*`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ImportEntry {
    name: String,
    is_static: bool,
    is_on_demand: bool,
}

impl ImportEntry {
    /// Creates an import entry.
    #[must_use]
    pub fn new(name: impl Into<String>, is_static: bool, is_on_demand: bool) -> Self {
        Self {
            name: name.into(),
            is_static,
            is_on_demand,
        }
    }

    /// A single-type import such as `java.util.List`.
    #[must_use]
    pub fn single(name: impl Into<String>) -> Self {
        Self::new(name, false, false)
    }

    /// A single static member import such as
    /// `java.util.Collections.emptyList`.
    #[must_use]
    pub fn single_static(name: impl Into<String>) -> Self {
        Self::new(name, true, false)
    }

    /// An on-demand import of every member of `container`.
    #[must_use]
    pub fn on_demand(container: impl Into<String>, is_static: bool) -> Self {
        Self::new(container, is_static, true)
    }

    /// Parses the text of one import declaration, with or without the
    /// leading `import` keyword and trailing semicolon.
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        let trimmed = text.trim();
        let body = trimmed
            .strip_prefix("import")
            .filter(|rest| rest.starts_with(char::is_whitespace))
            .unwrap_or(trimmed)
            .trim_start();
        let declaration = body.split(';').next().unwrap_or(body).trim();
        let (is_static, path) = match declaration.strip_prefix("static") {
            Some(rest) if rest.starts_with(char::is_whitespace) => (true, rest.trim_start()),
            _ => (false, declaration),
        };
        let compact: String = path.chars().filter(|ch| !ch.is_whitespace()).collect();
        if compact.is_empty() {
            return None;
        }
        if let Some(container) = compact.strip_suffix(".*") {
            return Some(Self::on_demand(container, is_static));
        }
        Some(Self::new(compact, is_static, false))
    }

    /// Qualified name, or the container of an on-demand import.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the import brings in static members.
    #[must_use]
    pub const fn is_static(&self) -> bool {
        self.is_static
    }

    /// Whether the import opens a whole container.
    #[must_use]
    pub const fn is_on_demand(&self) -> bool {
        self.is_on_demand
    }

    /// The package or type the import draws from; empty for names in the
    /// default package.
    #[must_use]
    pub fn container(&self) -> &str {
        if self.is_on_demand {
            return &self.name;
        }
        self.name
            .rsplit_once('.')
            .map_or("", |(container, _)| container)
    }

    /// The name the import makes visible, if it is a single import.
    #[must_use]
    pub fn simple_name(&self) -> Option<&str> {
        if self.is_on_demand {
            return None;
        }
        Some(
            self.name
                .rsplit_once('.')
                .map_or(self.name.as_str(), |(_, simple)| simple),
        )
    }

    /// Whether this on-demand import already makes `other` visible.
    #[must_use]
    pub fn covers(&self, other: &Self) -> bool {
        self.is_on_demand
            && !other.is_on_demand
            && self.is_static == other.is_static
            && other.container() == self.name
    }

    /// Renders the declaration.
    #[must_use]
    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ImportEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("import ")?;
        if self.is_static {
            f.write_str("static ")?;
        }
        f.write_str(&self.name)?;
        if self.is_on_demand {
            f.write_str(".*")?;
        }
        f.write_str(";")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("import java.util.List;", "java.util.List", false, false)]
    #[case("import static org.junit.Assert.assertEquals;", "org.junit.Assert.assertEquals", true, false)]
    #[case("import java.util.*;", "java.util", false, true)]
    #[case("  import static java.lang.Math.* ; // all", "java.lang.Math", true, true)]
    #[case("java.io . File", "java.io.File", false, false)]
    fn parses_declarations(
        #[case] text: &str,
        #[case] name: &str,
        #[case] is_static: bool,
        #[case] is_on_demand: bool,
    ) {
        let entry = ImportEntry::parse(text).expect("import");
        assert_eq!(entry, ImportEntry::new(name, is_static, is_on_demand));
    }

    #[test]
    fn static_prefixed_package_names_are_not_static() {
        let entry = ImportEntry::parse("import staticutils.Helper;").expect("import");
        assert!(!entry.is_static());
        assert_eq!(entry.name(), "staticutils.Helper");
    }

    #[test]
    fn single_imports_split_into_container_and_simple_name() {
        let entry = ImportEntry::single("java.util.Map.Entry");
        assert_eq!(entry.container(), "java.util.Map");
        assert_eq!(entry.simple_name(), Some("Entry"));
        assert_eq!(ImportEntry::single("Local").container(), "");
    }

    #[test]
    fn on_demand_covers_only_its_own_members() {
        let util = ImportEntry::on_demand("java.util", false);
        assert!(util.covers(&ImportEntry::single("java.util.List")));
        assert!(!util.covers(&ImportEntry::single("java.util.concurrent.Future")));
        assert!(!util.covers(&ImportEntry::single_static("java.util.Collections")));
    }

    #[test]
    fn renders_declarations() {
        assert_eq!(
            ImportEntry::on_demand("java.lang.Math", true).render(),
            "import static java.lang.Math.*;"
        );
        assert_eq!(ImportEntry::single("a.B").to_string(), "import a.B;");
    }
}
