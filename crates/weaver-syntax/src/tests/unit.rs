//! Unit tests for weaver-syntax.

use rstest::{fixture, rstest};

use crate::{
    CHILDREN, EmptyList, ListLayout, NodeId, Parser, Property, PropertyKey, Separator,
    SlotLayout, SupportedLanguage, SyntaxCategory, SyntaxTree, TreeBuilder,
};

// =============================================================================
// Hand-built trees
// =============================================================================

struct Assignment {
    tree: SyntaxTree,
    target: NodeId,
    value: NodeId,
    statement: NodeId,
}

/// `let x: u8 = 1;` with an operator value and an absent-able type slot.
#[fixture]
fn assignment() -> Assignment {
    let source = "let x: u8 = 1;";
    let mut builder = TreeBuilder::new(source);
    let target = builder
        .leaf("identifier", SyntaxCategory::Name, 4..5)
        .expect("target");
    let ty = builder
        .leaf("primitive_type", SyntaxCategory::Type, 7..9)
        .expect("type");
    let value = builder
        .leaf("integer_literal", SyntaxCategory::Expression, 12..13)
        .expect("value");
    let statement = builder
        .node("let_declaration", SyntaxCategory::Statement, 0..14)
        .child("pattern", target)
        .slot("type", Some(ty), SlotLayout::new(5).with_prefix(": "))
        .value("operator", 10..11)
        .child("value", value)
        .build()
        .expect("statement");
    let root = builder
        .node("source_file", SyntaxCategory::Other, 0..14)
        .list(CHILDREN, [statement], ListLayout::new(0, Separator::Line))
        .build()
        .expect("root");
    let tree = builder.finish(root).expect("tree");
    Assignment {
        tree,
        target,
        value,
        statement,
    }
}

#[rstest]
fn properties_keep_declaration_order(assignment: Assignment) {
    let node = assignment.tree.node(assignment.statement).expect("statement");
    let keys: Vec<&str> = node.properties().map(|(key, _)| key.as_str()).collect();
    assert_eq!(keys, ["pattern", "type", "operator", "value"]);
}

#[rstest]
fn value_properties_read_their_text(assignment: Assignment) {
    let node = assignment.tree.node(assignment.statement).expect("statement");
    assert_eq!(node.value(PropertyKey::new("operator")), Some("="));
    assert_eq!(node.child(PropertyKey::new("operator")), None);
}

#[rstest]
fn slot_layout_keeps_affixes(assignment: Assignment) {
    let node = assignment.tree.node(assignment.statement).expect("statement");
    let Some(Property::Child { layout, .. }) = node.property(PropertyKey::new("type")) else {
        panic!("type should be a child slot");
    };
    assert_eq!(layout.prefix(), ": ");
    assert_eq!(layout.anchor(), 5);
}

#[rstest]
fn children_know_where_they_live(assignment: Assignment) {
    let tree = &assignment.tree;
    let value = tree.node(assignment.value).expect("value");
    assert_eq!(
        value.location(),
        Some((assignment.statement, PropertyKey::new("value")))
    );
    let ancestors: Vec<NodeId> = tree.ancestors(assignment.value).collect();
    assert_eq!(ancestors, [assignment.statement, tree.root()]);
    assert!(tree.is_ancestor_or_self(assignment.statement, assignment.target));
    assert!(!tree.is_ancestor_or_self(assignment.target, assignment.statement));
}

#[rstest]
fn descendants_are_pre_order(assignment: Assignment) {
    let tree = &assignment.tree;
    let kinds: Vec<&str> = tree
        .descendants(tree.root())
        .into_iter()
        .filter_map(|id| tree.node(id).map(crate::SyntaxNode::kind))
        .collect();
    assert_eq!(
        kinds,
        [
            "source_file",
            "let_declaration",
            "identifier",
            "primitive_type",
            "integer_literal"
        ]
    );
}

#[rstest]
fn nodes_of_other_trees_are_not_found(assignment: Assignment) {
    let mut other = TreeBuilder::new("y");
    let foreign = other
        .leaf("identifier", SyntaxCategory::Name, 0..1)
        .expect("leaf");
    let other_tree = other.finish(foreign).expect("tree");

    assert!(!assignment.tree.contains(foreign));
    assert!(assignment.tree.node(foreign).is_none());
    assert_ne!(assignment.tree.id(), other_tree.id());
}

#[test]
fn empty_list_layouts_default_to_bare_insertion() {
    let layout = ListLayout::new(3, Separator::Comma);
    assert_eq!(
        layout.empty(),
        &EmptyList::Inline {
            prefix: String::new(),
            suffix: String::new()
        }
    );
    assert_eq!(Separator::Comma.render("    "), ", ");
    assert_eq!(Separator::Line.render("    "), "\n    ");
    assert_eq!(Separator::Text(String::from(" | ")).token(), "|");
}

#[test]
fn builder_rejects_duplicate_property_keys() {
    let mut builder = TreeBuilder::new("ab");
    let a = builder.leaf("a", SyntaxCategory::Other, 0..1).expect("a");
    let b = builder.leaf("b", SyntaxCategory::Other, 1..2).expect("b");
    let result = builder
        .node("pair", SyntaxCategory::Other, 0..2)
        .child("item", a)
        .child("item", b)
        .build();
    assert!(result.is_err());
}

#[test]
fn builder_rejects_anchors_outside_the_node() {
    let mut builder = TreeBuilder::new("abc");
    let result = builder
        .node("list", SyntaxCategory::Other, 0..2)
        .list(CHILDREN, [], ListLayout::new(3, Separator::Comma))
        .build();
    assert!(result.is_err());
}

// =============================================================================
// Parser lowering
// =============================================================================

#[rstest]
#[case(SupportedLanguage::Rust, "fn main() {}", false)]
#[case(SupportedLanguage::Rust, "fn broken() {", true)]
#[case(SupportedLanguage::Python, "def hello():\n    pass", false)]
#[case(SupportedLanguage::Python, "def broken(", true)]
#[case(SupportedLanguage::TypeScript, "function test(): void {}", false)]
#[case(SupportedLanguage::TypeScript, "function test( {", true)]
fn lowering_flags_malformed_trees(
    #[case] language: SupportedLanguage,
    #[case] source: &str,
    #[case] malformed: bool,
) {
    let mut parser = Parser::new(language).expect("parser init");
    let tree = parser.parse_tree(source).expect("lowered tree");
    assert_eq!(tree.is_malformed(), malformed);
}

#[test]
fn operator_tokens_lower_to_values() {
    let mut parser = Parser::new(SupportedLanguage::Rust).expect("parser init");
    let tree = parser.parse_tree("fn f() { a + b; }").expect("tree");
    let binary = tree.find_kind("binary_expression").expect("binary");
    let node = tree.node(binary).expect("node");

    assert_eq!(node.value(PropertyKey::new("operator")), Some("+"));
    let left = node.child(PropertyKey::new("left")).expect("left");
    assert_eq!(tree.text(left), Some("a"));
    assert_eq!(node.category(), SyntaxCategory::Expression);
}

#[test]
fn every_lowered_node_lies_inside_its_parent() {
    let source = "def greet(name, greeting):\n    print(greeting, name)\n    return name\n";
    let mut parser = Parser::new(SupportedLanguage::Python).expect("parser init");
    let tree = parser.parse_tree(source).expect("tree");

    for id in tree.descendants(tree.root()) {
        let node = tree.node(id).expect("node");
        if let Some(parent) = node.parent().and_then(|p| tree.node(p)) {
            assert!(parent.range().contains_range(node.range()));
        }
    }
    let parameters = tree.find_kind("parameters").expect("parameters");
    let Some(Property::List { items, layout }) =
        tree.node(parameters).and_then(|n| n.property(CHILDREN))
    else {
        panic!("parameters should lower to a list");
    };
    assert_eq!(items.len(), 2);
    assert_eq!(layout.separator(), &Separator::Comma);
    assert_eq!(layout.anchor(), "def greet(".len());
}
