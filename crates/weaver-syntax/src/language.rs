//! Language detection, Tree-sitter grammar selection, and node
//! categorisation.
//!
//! This module provides the [`SupportedLanguage`] enum for identifying
//! programming languages, mapping them to their Tree-sitter grammars, and
//! sorting each grammar's node kinds into [`SyntaxCategory`] values.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use thiserror::Error;

use crate::tree::SyntaxCategory;

/// Languages whose sources can be lowered into a [`crate::SyntaxTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SupportedLanguage {
    /// Rust source files (`.rs`).
    #[default]
    Rust,
    /// Python source files (`.py`).
    Python,
    /// TypeScript source files (`.ts`, `.tsx`).
    TypeScript,
}

impl SupportedLanguage {
    /// Detects the language from a file extension.
    #[must_use]
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "rs" => Some(Self::Rust),
            "py" | "pyi" => Some(Self::Python),
            "ts" | "tsx" | "mts" | "cts" => Some(Self::TypeScript),
            _ => None,
        }
    }

    /// Detects the language from a file path by examining its extension.
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }

    /// Returns the Tree-sitter language grammar for this language.
    #[must_use]
    pub fn tree_sitter_language(self) -> tree_sitter::Language {
        match self {
            Self::Rust => tree_sitter_rust::LANGUAGE.into(),
            Self::Python => tree_sitter_python::LANGUAGE.into(),
            // TSX is a superset, so `.tsx` files parse too.
            Self::TypeScript => tree_sitter_typescript::LANGUAGE_TSX.into(),
        }
    }

    /// Returns the lower-case identifier for this language.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Rust => "rust",
            Self::Python => "python",
            Self::TypeScript => "typescript",
        }
    }

    /// Sorts a grammar node kind into a syntactic category.
    ///
    /// Grammar-specific kinds are checked first; the remaining kinds fall
    /// back to the naming conventions the grammars share (`*_statement`,
    /// `*_expression`, `*_type` and so on).
    #[must_use]
    pub fn categorize(self, kind: &str) -> SyntaxCategory {
        if let Some(category) = self.categorize_specific(kind) {
            return category;
        }
        categorize_by_suffix(kind)
    }

    fn categorize_specific(self, kind: &str) -> Option<SyntaxCategory> {
        let category = match (self, kind) {
            (Self::Rust, "use_declaration" | "extern_crate_declaration")
            | (Self::Python, "import_statement" | "import_from_statement" | "future_import_statement")
            | (Self::TypeScript, "import_statement") => SyntaxCategory::Import,
            (Self::Rust, "attribute_item" | "inner_attribute_item")
            | (Self::Python | Self::TypeScript, "decorator") => SyntaxCategory::Annotation,
            (Self::Rust, "let_declaration" | "expression_statement" | "empty_statement")
            | (Self::TypeScript, "lexical_declaration" | "variable_declaration") => {
                SyntaxCategory::Statement
            }
            (Self::Rust, "function_signature_item" | "field_declaration" | "enum_variant")
            | (Self::Python, "function_definition" | "class_definition" | "decorated_definition") => {
                SyntaxCategory::Declaration
            }
            (Self::Rust, "primitive_type" | "type_identifier")
            | (Self::TypeScript, "predefined_type" | "type_identifier" | "type_annotation") => {
                SyntaxCategory::Type
            }
            (Self::Python, "call" | "binary_operator" | "boolean_operator" | "attribute") => {
                SyntaxCategory::Expression
            }
            _ => return None,
        };
        Some(category)
    }
}

fn categorize_by_suffix(kind: &str) -> SyntaxCategory {
    if kind.ends_with("_statement") {
        SyntaxCategory::Statement
    } else if kind.ends_with("_item")
        || kind.ends_with("_declaration")
        || kind.ends_with("_definition")
    {
        SyntaxCategory::Declaration
    } else if kind.ends_with("_type") {
        SyntaxCategory::Type
    } else if kind.ends_with("identifier") {
        SyntaxCategory::Name
    } else if kind.ends_with("_expression")
        || kind.ends_with("_literal")
        || matches!(kind, "string" | "integer" | "float" | "number" | "true" | "false")
    {
        SyntaxCategory::Expression
    } else {
        SyntaxCategory::Other
    }
}

impl fmt::Display for SupportedLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error raised when parsing a language identifier fails.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unsupported language: '{0}'")]
pub struct LanguageParseError(String);

impl LanguageParseError {
    /// Returns the input that failed to parse.
    #[must_use]
    pub fn input(&self) -> &str {
        &self.0
    }
}

impl FromStr for SupportedLanguage {
    type Err = LanguageParseError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        match input.trim().to_ascii_lowercase().as_str() {
            "rust" | "rs" => Ok(Self::Rust),
            "python" | "py" => Ok(Self::Python),
            "typescript" | "ts" => Ok(Self::TypeScript),
            other => Err(LanguageParseError(other.to_owned())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("rs", SupportedLanguage::Rust)]
    #[case("pyi", SupportedLanguage::Python)]
    #[case("tsx", SupportedLanguage::TypeScript)]
    fn from_extension_recognises_supported_languages(
        #[case] ext: &str,
        #[case] expected: SupportedLanguage,
    ) {
        assert_eq!(SupportedLanguage::from_extension(ext), Some(expected));
    }

    #[test]
    fn from_path_returns_none_for_unknown_extension() {
        assert_eq!(SupportedLanguage::from_path(Path::new("Main.java")), None);
    }

    #[test]
    fn from_str_rejects_unknown_names() {
        let result: Result<SupportedLanguage, _> = "cobol".parse();
        assert_eq!(result.map_err(|err| err.input().to_owned()), Err("cobol".to_owned()));
    }

    #[rstest]
    #[case(SupportedLanguage::Rust, "expression_statement", SyntaxCategory::Statement)]
    #[case(SupportedLanguage::Rust, "let_declaration", SyntaxCategory::Statement)]
    #[case(SupportedLanguage::Rust, "function_item", SyntaxCategory::Declaration)]
    #[case(SupportedLanguage::Rust, "use_declaration", SyntaxCategory::Import)]
    #[case(SupportedLanguage::Rust, "attribute_item", SyntaxCategory::Annotation)]
    #[case(SupportedLanguage::Rust, "call_expression", SyntaxCategory::Expression)]
    #[case(SupportedLanguage::Rust, "integer_literal", SyntaxCategory::Expression)]
    #[case(SupportedLanguage::Rust, "primitive_type", SyntaxCategory::Type)]
    #[case(SupportedLanguage::Rust, "identifier", SyntaxCategory::Name)]
    #[case(SupportedLanguage::Python, "import_from_statement", SyntaxCategory::Import)]
    #[case(SupportedLanguage::Python, "return_statement", SyntaxCategory::Statement)]
    #[case(SupportedLanguage::Python, "call", SyntaxCategory::Expression)]
    #[case(SupportedLanguage::TypeScript, "import_statement", SyntaxCategory::Import)]
    #[case(SupportedLanguage::TypeScript, "decorator", SyntaxCategory::Annotation)]
    #[case(SupportedLanguage::TypeScript, "source_file", SyntaxCategory::Other)]
    fn categorize_maps_grammar_kinds(
        #[case] language: SupportedLanguage,
        #[case] kind: &str,
        #[case] expected: SyntaxCategory,
    ) {
        assert_eq!(language.categorize(kind), expected);
    }
}
