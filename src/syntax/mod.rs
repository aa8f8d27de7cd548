//! The parsed rule-file tree consumed by the resolver.
//!
//! Parsing itself happens elsewhere; this module only defines the node
//! shapes ([`RuleFile`] and friends) plus a [`RuleFileBuilder`] for
//! assembling trees in code.

mod builder;
mod tree;

pub use builder::{LEAF_WIDTH, PatternsBuilder, RuleBuilder, RuleFileBuilder, StatementsBuilder};
pub use tree::{
    ActionSection, ConditionSection, DeclShape, Expr, ExprKind, FieldDecl, FunctionDeclaration,
    GlobalVariable, GroupOp, Import, ImportKind, Literal, Param, ParentRef, PathSegment, Pattern,
    PatternKind, Rule, RuleFile, Statement, StatementKind, TypeDeclaration, UnitRef,
};

/// Check whether `text` is a single identifier (`$`-prefixed binds included).
///
/// Dotted targets such as `a.b` or indexed ones such as `a[0]` are not.
pub fn is_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    let starts = first == '$' || first == '_' || unicode_ident::is_xid_start(first);
    starts && chars.all(|c| c == '$' || unicode_ident::is_xid_continue(c))
}
