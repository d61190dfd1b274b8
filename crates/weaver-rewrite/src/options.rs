//! Formatting options used when synthesising new text.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::indent::measure_width;

/// Whitespace used for one level of indentation.
#[derive(
    Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq, EnumString, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum IndentStyle {
    /// Indent with spaces only.
    #[default]
    Spaces,
    /// Indent with tabs, padding any remainder with spaces.
    Tabs,
}

/// Errors encountered while parsing an [`IndentStyle`] from text.
pub type IndentStyleParseError = strum::ParseError;

/// How leading whitespace is measured and produced.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct IndentOptions {
    /// Whitespace style for newly produced indentation.
    pub style: IndentStyle,
    /// Columns per indentation level.
    pub indent_width: usize,
    /// Columns a tab advances to.
    pub tab_width: usize,
}

impl Default for IndentOptions {
    fn default() -> Self {
        Self {
            style: IndentStyle::Spaces,
            indent_width: 4,
            tab_width: 4,
        }
    }
}

impl IndentOptions {
    /// Derives options from a literal indentation unit such as `"\t"` or
    /// `"  "`.
    #[must_use]
    pub fn from_unit(unit: &str, tab_width: usize) -> Self {
        let style = if unit.contains('\t') {
            IndentStyle::Tabs
        } else {
            IndentStyle::Spaces
        };
        Self {
            style,
            indent_width: measure_width(unit, tab_width),
            tab_width,
        }
    }

    /// Renders whitespace spanning `columns` in this style.
    #[must_use]
    pub fn whitespace(&self, columns: usize) -> String {
        match self.style {
            IndentStyle::Spaces => " ".repeat(columns),
            IndentStyle::Tabs => {
                let tabs = columns.checked_div(self.tab_width).unwrap_or(0);
                let spaces = columns.checked_rem(self.tab_width).unwrap_or(columns);
                format!("{}{}", "\t".repeat(tabs), " ".repeat(spaces))
            }
        }
    }

    /// Renders a single indentation level.
    #[must_use]
    pub fn unit(&self) -> String {
        self.whitespace(self.indent_width)
    }
}

/// Options for a rewrite session.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct RewriteOptions {
    /// Indentation used for new blocks and relocated fragments.
    pub indent: IndentOptions,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("    ", IndentStyle::Spaces, 4)]
    #[case("  ", IndentStyle::Spaces, 2)]
    #[case("\t", IndentStyle::Tabs, 8)]
    fn from_unit_measures_the_unit(
        #[case] unit: &str,
        #[case] style: IndentStyle,
        #[case] width: usize,
    ) {
        let options = IndentOptions::from_unit(unit, 8);
        assert_eq!(options.style, style);
        assert_eq!(options.indent_width, width);
        assert_eq!(options.unit(), unit);
    }

    #[test]
    fn tabs_pad_remainders_with_spaces() {
        let options = IndentOptions {
            style: IndentStyle::Tabs,
            indent_width: 4,
            tab_width: 4,
        };
        assert_eq!(options.whitespace(10), "\t\t  ");
    }

    #[test]
    fn style_parses_case_insensitively() {
        assert_eq!("TABS".parse::<IndentStyle>(), Ok(IndentStyle::Tabs));
        assert_eq!(IndentStyle::Spaces.to_string(), "spaces");
    }

    #[test]
    fn options_deserialise_with_defaults() {
        let options: RewriteOptions =
            serde_json::from_str(r#"{ "indent": { "style": "tabs" } }"#).expect("options");
        assert_eq!(options.indent.style, IndentStyle::Tabs);
        assert_eq!(options.indent.indent_width, 4);
    }
}
