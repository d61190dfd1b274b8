//! Crate-internal tests for weaver-syntax.

mod behaviour;
mod unit;
