//! Behaviour-driven development (BDD) step definitions for weaver-rewrite scenarios.

use std::cell::RefCell;

use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use weaver_syntax::{CHILDREN, Parser, SupportedLanguage, SyntaxCategory, SyntaxTree};

use crate::{
    ImportEntry, ImportRewrite, ImportRewriteOptions, NewNode, RewriteError, RewriteSession,
    reindent,
};

// =============================================================================
// Test World
// =============================================================================

/// State shared across BDD steps.
#[derive(Default)]
struct TestWorld {
    /// Source text under rewrite.
    source: Option<String>,
    /// Tree parsed from the source.
    tree: Option<SyntaxTree>,
    /// Import policy.
    options: ImportRewriteOptions,
    /// Requested import additions.
    additions: Vec<ImportEntry>,
    /// Rewritten text, or the error the rewrite failed with.
    result: Option<Result<String, RewriteError>>,
}

#[fixture]
fn world() -> RefCell<TestWorld> {
    RefCell::new(TestWorld::default())
}

/// Strips surrounding double quotes and expands `\n` escapes.
fn unquote(s: &str) -> String {
    s.trim_matches('"').replace("\\n", "\n")
}

fn source_of(world: &TestWorld) -> String {
    world.source.clone().expect("source should be set")
}

// =============================================================================
// Given Steps
// =============================================================================

#[given("source {source}")]
fn given_source(world: &RefCell<TestWorld>, source: String) {
    world.borrow_mut().source = Some(unquote(&source));
}

#[given("rust source {source}")]
fn given_rust_source(world: &RefCell<TestWorld>, source: String) {
    let text = unquote(&source);
    let mut parser = Parser::new(SupportedLanguage::Rust).expect("parser init");
    let tree = parser.parse_tree(&text).expect("lowered tree");
    let mut w = world.borrow_mut();
    w.source = Some(text);
    w.tree = Some(tree);
}

#[given("import order {order}")]
fn given_import_order(world: &RefCell<TestWorld>, order: String) {
    world.borrow_mut().options.order = unquote(&order).parse().expect("import order");
}

#[given("an on-demand threshold of {threshold}")]
fn given_threshold(world: &RefCell<TestWorld>, threshold: usize) {
    world.borrow_mut().options.on_demand_threshold = threshold;
}

// =============================================================================
// When Steps
// =============================================================================

#[when("import {name} is added")]
fn when_import_added(world: &RefCell<TestWorld>, name: String) {
    world
        .borrow_mut()
        .additions
        .push(ImportEntry::single(unquote(&name)));
}

#[when("static import {name} is added")]
fn when_static_import_added(world: &RefCell<TestWorld>, name: String) {
    world
        .borrow_mut()
        .additions
        .push(ImportEntry::single_static(unquote(&name)));
}

#[when("the imports are rewritten")]
fn when_imports_rewritten(world: &RefCell<TestWorld>) {
    let mut w = world.borrow_mut();
    let source = source_of(&w);
    let mut imports = ImportRewrite::new(w.options.clone());
    for entry in &w.additions {
        imports.add(entry.clone());
    }
    let result = imports
        .rewrite_source(&source)
        .and_then(|edits| edits.apply(&source));
    w.result = Some(result);
}

#[when("statement {text} is inserted first in the first {kind}")]
fn when_statement_inserted(world: &RefCell<TestWorld>, text: String, kind: String) {
    let mut w = world.borrow_mut();
    let result = {
        let tree = w.tree.as_ref().expect("tree should be parsed");
        let block = tree
            .find_kind(&unquote(&kind))
            .unwrap_or_else(|| panic!("no {kind} node"));
        let mut session = RewriteSession::new(tree);
        session
            .create_node(NewNode::from_text(SyntaxCategory::Statement, unquote(&text)))
            .and_then(|node| session.list(block, CHILDREN)?.insert_first(node))
            .and_then(|()| session.materialize())
            .and_then(|edits| edits.apply(tree.source()))
    };
    w.result = Some(result);
}

#[when("the first {kind} node is removed")]
fn when_node_removed(world: &RefCell<TestWorld>, kind: String) {
    let mut w = world.borrow_mut();
    let result = {
        let tree = w.tree.as_ref().expect("tree should be parsed");
        let node = tree
            .find_kind(&unquote(&kind))
            .unwrap_or_else(|| panic!("no {kind} node"));
        let mut session = RewriteSession::new(tree);
        session
            .remove(node)
            .and_then(|()| session.materialize())
            .and_then(|edits| edits.apply(tree.source()))
    };
    w.result = Some(result);
}

#[when("the source is shifted by {levels} levels of {width} spaces")]
fn when_shifted(world: &RefCell<TestWorld>, levels: isize, width: usize) {
    let mut w = world.borrow_mut();
    let source = source_of(&w);
    w.result = Some(Ok(reindent(&source, levels, &" ".repeat(width), width)));
}

// =============================================================================
// Then Steps
// =============================================================================

#[then("the result is {expected}")]
fn then_result(world: &RefCell<TestWorld>, expected: String) {
    let w = world.borrow();
    let result = w.result.as_ref().expect("a rewrite should have run");
    match result {
        Ok(text) => assert_eq!(text, &unquote(&expected)),
        Err(err) => panic!("rewrite failed: {err}"),
    }
}

#[then("the rewrite fails with an ambiguous import")]
fn then_ambiguous(world: &RefCell<TestWorld>) {
    let w = world.borrow();
    let result = w.result.as_ref().expect("a rewrite should have run");
    assert!(
        matches!(result, Err(RewriteError::AmbiguousImport { .. })),
        "expected an ambiguous import, got {result:?}"
    );
}

// =============================================================================
// Scenario Bindings
// =============================================================================

#[scenario(
    path = "tests/features/imports.feature",
    name = "An addition joins its group"
)]
fn addition_joins_group(world: RefCell<TestWorld>) {
    let _ = world;
}

#[scenario(
    path = "tests/features/imports.feature",
    name = "Static imports form their own group"
)]
fn static_imports_group(world: RefCell<TestWorld>) {
    let _ = world;
}

#[scenario(
    path = "tests/features/imports.feature",
    name = "Reaching the threshold collapses single imports"
)]
fn threshold_collapses(world: RefCell<TestWorld>) {
    let _ = world;
}

#[scenario(
    path = "tests/features/imports.feature",
    name = "Colliding simple names are rejected"
)]
fn colliding_names_rejected(world: RefCell<TestWorld>) {
    let _ = world;
}

#[scenario(
    path = "tests/features/rewrite.feature",
    name = "A statement is inserted at the top of a block"
)]
fn statement_inserted_first(world: RefCell<TestWorld>) {
    let _ = world;
}

#[scenario(
    path = "tests/features/rewrite.feature",
    name = "Removing the only statement empties the block"
)]
fn only_statement_removed(world: RefCell<TestWorld>) {
    let _ = world;
}

#[scenario(
    path = "tests/features/rewrite.feature",
    name = "Relocated fragments are shifted by whole levels"
)]
fn fragments_shifted(world: RefCell<TestWorld>) {
    let _ = world;
}
