//! Crate-internal tests for weaver-rewrite.

mod behaviour;
