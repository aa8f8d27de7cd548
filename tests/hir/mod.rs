//! HIR layer tests
//!
//! Tests for scope resolution over rule-file trees:
//! - The resolution driver: ordering, determinism, short-circuit, cancellation
//! - Pattern and path binds across rule inheritance
//! - Each declaration provider against a host type system
//! - Semantic diagnostics

pub mod tests_providers;
pub mod tests_scope_resolution;
