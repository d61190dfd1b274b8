//! Behaviour-driven development (BDD) step definitions for weaver-syntax scenarios.

use std::cell::RefCell;
use std::str::FromStr;

use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};

use crate::{CHILDREN, Parser, Property, Separator, SupportedLanguage, SyntaxTree};

// =============================================================================
// Test World
// =============================================================================

/// State shared across BDD steps.
#[derive(Default)]
struct TestWorld {
    /// Language for current operations.
    language: Option<SupportedLanguage>,
    /// Source text to lower.
    source: Option<String>,
    /// Lowered tree.
    tree: Option<SyntaxTree>,
}

#[fixture]
fn world() -> RefCell<TestWorld> {
    RefCell::new(TestWorld::default())
}

/// Strips surrounding double quotes and expands `\n` escapes.
fn unquote(s: &str) -> String {
    s.trim_matches('"').replace("\\n", "\n")
}

fn first_list(world: &RefCell<TestWorld>, kind: &str) -> (usize, Separator) {
    let w = world.borrow();
    let tree = w.tree.as_ref().expect("tree should be lowered");
    let id = tree
        .find_kind(&unquote(kind))
        .unwrap_or_else(|| panic!("no {kind} node"));
    match tree.node(id).and_then(|node| node.property(CHILDREN)) {
        Some(Property::List { items, layout }) => (items.len(), layout.separator().clone()),
        other => panic!("{kind} has no child list: {other:?}"),
    }
}

// =============================================================================
// Given Steps
// =============================================================================

#[given("language {language}")]
fn given_language(world: &RefCell<TestWorld>, language: String) {
    let mut w = world.borrow_mut();
    w.language = Some(SupportedLanguage::from_str(&unquote(&language)).expect("language"));
}

#[given("source {source}")]
fn given_source(world: &RefCell<TestWorld>, source: String) {
    world.borrow_mut().source = Some(unquote(&source));
}

// =============================================================================
// When Steps
// =============================================================================

#[when("the source is lowered")]
fn when_lowered(world: &RefCell<TestWorld>) {
    let mut w = world.borrow_mut();
    let language = w.language.expect("language should be set");
    let source = w.source.clone().expect("source should be set");
    let mut parser = Parser::new(language).expect("parser init");
    w.tree = Some(parser.parse_tree(&source).expect("lowered tree"));
}

// =============================================================================
// Then Steps
// =============================================================================

#[then("the tree is well formed")]
fn then_well_formed(world: &RefCell<TestWorld>) {
    let w = world.borrow();
    let tree = w.tree.as_ref().expect("tree");
    assert!(!tree.is_malformed(), "expected a well-formed tree");
}

#[then("the tree is malformed")]
fn then_malformed(world: &RefCell<TestWorld>) {
    let w = world.borrow();
    let tree = w.tree.as_ref().expect("tree");
    assert!(tree.is_malformed(), "expected a malformed tree");
}

#[then("the first {kind} node lists {count} children")]
fn then_list_length(world: &RefCell<TestWorld>, kind: String, count: usize) {
    let (len, _) = first_list(world, &kind);
    assert_eq!(len, count, "unexpected child count for {kind}");
}

#[then("the first {kind} node separates children by {separator}")]
fn then_list_separator(world: &RefCell<TestWorld>, kind: String, separator: String) {
    let (_, actual) = first_list(world, &kind);
    let expected = match unquote(&separator).as_str() {
        "comma" => Separator::Comma,
        "line" => Separator::Line,
        "space" => Separator::Space,
        other => Separator::Text(other.to_owned()),
    };
    assert_eq!(actual, expected);
}

// =============================================================================
// Scenario Bindings
// =============================================================================

#[scenario(
    path = "tests/features/syntax_tree.feature",
    name = "Block statements become an ordered list"
)]
fn block_statements_list(world: RefCell<TestWorld>) {
    let _ = world;
}

#[scenario(
    path = "tests/features/syntax_tree.feature",
    name = "Call arguments are comma separated"
)]
fn call_arguments_list(world: RefCell<TestWorld>) {
    let _ = world;
}

#[scenario(
    path = "tests/features/syntax_tree.feature",
    name = "Python parameters are comma separated"
)]
fn python_parameters_list(world: RefCell<TestWorld>) {
    let _ = world;
}

#[scenario(
    path = "tests/features/syntax_tree.feature",
    name = "Unparseable regions mark the tree malformed"
)]
fn malformed_tree(world: RefCell<TestWorld>) {
    let _ = world;
}
