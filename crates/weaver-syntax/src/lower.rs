//! Lowering of Tree-sitter parses into the immutable arena.
//!
//! The lowering is grammar-agnostic:
//!
//! - named children reached through a field become child slots keyed by
//!   the field name, or lists when the field repeats;
//! - named children without a field become the [`CHILDREN`] list;
//! - anonymous tokens reached through a field become value properties;
//! - extras (comments) are not lowered and survive as gap text.
//!
//! List layouts are inferred from the delimiters and line breaks found in
//! the original text.

use tracing::debug;

use crate::builder::TreeBuilder;
use crate::error::SyntaxError;
use crate::language::SupportedLanguage;
use crate::parser::ParseResult;
use crate::text::TextRange;
use crate::tree::{CHILDREN, EmptyList, ListLayout, NodeId, PropertyKey, Separator, SyntaxTree};

const OPENERS: [&str; 4] = ["{", "(", "[", "<"];

pub(crate) fn lower(parse: &ParseResult) -> Result<SyntaxTree, SyntaxError> {
    let mut builder = TreeBuilder::new(parse.source());
    if parse.has_errors() {
        debug!(language = %parse.language(), "lowering a parse with error nodes");
        builder.mark_malformed();
    }
    let root = lower_node(&mut builder, parse.root_node(), parse.language())?;
    builder.finish(root)
}

struct Lowered {
    id: NodeId,
    range: TextRange,
}

#[derive(Default)]
struct Collected {
    fields: Vec<(&'static str, Vec<Lowered>)>,
    unnamed: Vec<Lowered>,
    values: Vec<(&'static str, TextRange)>,
    tokens: Vec<(&'static str, TextRange)>,
}

impl Collected {
    fn push_field(&mut self, name: &'static str, lowered: Lowered) {
        if let Some((_, items)) = self.fields.iter_mut().find(|(field, _)| *field == name) {
            items.push(lowered);
        } else {
            self.fields.push((name, vec![lowered]));
        }
    }
}

fn lower_node(
    builder: &mut TreeBuilder,
    node: tree_sitter::Node<'_>,
    language: SupportedLanguage,
) -> Result<NodeId, SyntaxError> {
    let mut collected = Collected::default();
    let mut cursor = node.walk();
    if cursor.goto_first_child() {
        loop {
            let child = cursor.node();
            let field = cursor.field_name();
            let range = TextRange::from(child.byte_range());
            if child.is_extra() {
                // Comments stay in the gap text between siblings.
            } else if child.is_named() {
                let id = lower_node(builder, child, language)?;
                let lowered = Lowered { id, range };
                match field {
                    Some(name) => collected.push_field(name, lowered),
                    None => collected.unnamed.push(lowered),
                }
            } else {
                if let Some(name) = field {
                    collected.values.push((name, range));
                }
                collected.tokens.push((child.kind(), range));
            }
            if !cursor.goto_next_sibling() {
                break;
            }
        }
    }

    let range = TextRange::from(node.byte_range());
    let kind = node.kind();
    let source = builder.source().to_owned();
    let opener = find_opener(&collected);

    let mut pending = builder.node(kind, language.categorize(kind), range);
    let mut used: Vec<&'static str> = Vec::new();
    for (name, items) in &collected.fields {
        used.push(*name);
        let key = PropertyKey::new(*name);
        if let [only] = items.as_slice() {
            pending = pending.child(key, only.id);
        } else {
            let layout = infer_layout(&source, range, items, &collected.tokens, opener);
            pending = pending.list(key, items.iter().map(|item| item.id), layout);
        }
    }
    if !collected.unnamed.is_empty() || opener.is_some() {
        let layout = infer_layout(&source, range, &collected.unnamed, &collected.tokens, opener);
        pending = pending.list(
            CHILDREN,
            collected.unnamed.iter().map(|item| item.id),
            layout,
        );
        used.push(CHILDREN.as_str());
    }
    for (name, value_range) in &collected.values {
        if used.contains(name) {
            continue;
        }
        used.push(*name);
        pending = pending.value(PropertyKey::new(*name), *value_range);
    }
    pending.build()
}

fn find_opener(collected: &Collected) -> Option<(&'static str, TextRange)> {
    let first_item = collected
        .unnamed
        .first()
        .map_or(usize::MAX, |item| item.range.start());
    collected
        .tokens
        .iter()
        .find(|(kind, range)| OPENERS.contains(kind) && range.end() <= first_item)
        .copied()
}

fn infer_layout(
    source: &str,
    range: TextRange,
    items: &[Lowered],
    tokens: &[(&'static str, TextRange)],
    opener: Option<(&'static str, TextRange)>,
) -> ListLayout {
    let anchor = match (opener, items.first()) {
        (Some((_, token)), _) => token.end(),
        (None, Some(first)) => first.range.start(),
        (None, None) => range.start(),
    };
    let span = match (items.first(), items.last()) {
        (Some(first), Some(last)) => TextRange::new(first.range.start(), last.range.end()),
        _ => range,
    };
    let has_comma = tokens
        .iter()
        .any(|(kind, token)| *kind == "," && span.contains_range(*token));
    let multi_line = items.windows(2).any(|pair| match pair {
        [left, right] => source
            .get(left.range.end()..right.range.start())
            .is_some_and(|gap| gap.contains('\n')),
        _ => false,
    }) || (items.len() < 2
        && source
            .get(range.as_range())
            .is_some_and(|text| text.contains('\n')));
    let opener_kind = opener.map(|(kind, _)| kind);

    let separator = if has_comma || matches!(opener_kind, Some("(" | "[" | "<")) {
        Separator::Comma
    } else if multi_line || (items.is_empty() && opener_kind == Some("{")) {
        Separator::Line
    } else {
        Separator::Space
    };
    let empty = if opener_kind == Some("{") && separator == Separator::Line {
        EmptyList::Block
    } else {
        EmptyList::default()
    };
    ListLayout::new(anchor, separator).with_empty(empty)
}

#[cfg(test)]
mod tests {
    use crate::language::SupportedLanguage;
    use crate::parser::Parser;
    use crate::tree::{CHILDREN, EmptyList, PropertyKey, Separator, SyntaxCategory};

    fn lower_rust(source: &str) -> crate::SyntaxTree {
        let mut parser = Parser::new(SupportedLanguage::Rust).expect("parser init");
        parser.parse_tree(source).expect("lowered tree")
    }

    #[test]
    fn fields_become_child_slots() {
        let tree = lower_rust("fn answer() -> u8 { 42 }");
        let function = tree.find_kind("function_item").expect("function");
        let node = tree.node(function).expect("function node");

        let name = node.child(PropertyKey::new("name")).expect("name slot");
        assert_eq!(tree.text(name), Some("answer"));
        let body = node.child(PropertyKey::new("body")).expect("body slot");
        assert_eq!(tree.node(body).map(|n| n.kind()), Some("block"));
        assert_eq!(node.category(), SyntaxCategory::Declaration);
    }

    #[test]
    fn unnamed_children_form_a_list_with_inferred_separator() {
        let tree = lower_rust("fn f() {\n    let a = 1;\n    call(a, 2);\n}\n");
        let block = tree.find_kind("block").expect("block");
        let node = tree.node(block).expect("block node");
        let statements = node.list(CHILDREN).expect("statement list");
        assert_eq!(statements.len(), 2);

        let arguments = tree.find_kind("arguments").expect("arguments");
        let Some(crate::Property::List { items, layout }) =
            tree.node(arguments).and_then(|n| n.property(CHILDREN))
        else {
            panic!("arguments should lower to a list");
        };
        assert_eq!(items.len(), 2);
        assert_eq!(layout.separator(), &Separator::Comma);

        let Some(crate::Property::List {
            layout: block_layout,
            ..
        }) = node.property(CHILDREN)
        else {
            panic!("block should lower to a list");
        };
        assert_eq!(block_layout.separator(), &Separator::Line);
    }

    #[test]
    fn empty_blocks_insert_as_indented_blocks() {
        let tree = lower_rust("fn f() {}");
        let block = tree.find_kind("block").expect("block");
        let Some(crate::Property::List { items, layout }) =
            tree.node(block).and_then(|n| n.property(CHILDREN))
        else {
            panic!("empty block should still expose a list");
        };
        assert!(items.is_empty());
        assert_eq!(layout.anchor(), "fn f() {".len());
        assert_eq!(layout.empty(), &EmptyList::Block);
    }

    #[test]
    fn comments_are_not_lowered() {
        let tree = lower_rust("fn f() {\n    // note\n    g();\n}\n");
        let block = tree.find_kind("block").expect("block");
        let statements = tree
            .node(block)
            .and_then(|n| n.list(CHILDREN))
            .expect("statement list");
        assert_eq!(statements.len(), 1);
        assert!(tree.find_kind("line_comment").is_none());
    }
}
