//! Inlay hints: inferred types of names introduced without one.
//!
//! Two places introduce a name whose type the user never wrote: accumulate
//! binds (`$total : sum(...)`) and plain assignments in a `then` block
//! (`x = 1;`, `var y = ...;`).

use crate::base::{LineCol, TextRange, TextSize};
use crate::hir::{
    BindFilter, BindingWalker, FileSnapshot, ResolveConfig, TypeRef, local_variables_at,
};
use crate::syntax::{Rule, Statement, StatementKind};

/// An inlay hint to display in the editor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlayHint {
    /// Where the hint should appear
    pub offset: TextSize,
    /// Line/column of `offset`, when the file's text is known
    pub line_col: Option<LineCol>,
    /// The text to display
    pub label: String,
    /// Whether to add padding before the hint
    pub padding_left: bool,
    /// Whether to add padding after the hint
    pub padding_right: bool,
}

/// Get inlay hints for a file, optionally restricted to `range`.
pub fn inlay_hints(
    snapshot: &FileSnapshot,
    config: &ResolveConfig,
    range: Option<TextRange>,
) -> Vec<InlayHint> {
    let mut hints = Vec::new();
    let file = snapshot.tree();

    // Accumulate results: each rule's own binds, not inherited ones
    let accumulates = BindFilter {
        simple: false,
        field: false,
        path: false,
        accumulate: true,
    };
    let walker = BindingWalker::new(file, snapshot.file_id(), config);

    for (index, rule) in file.rules.iter().enumerate() {
        let own = walker
            .collect_from_rule(index, accumulates)
            .unwrap_or_default()
            .into_iter()
            .filter(|s| s.container.as_deref() == Some(rule.name.as_str()));
        for symbol in own {
            let Some((_, range)) = symbol.location.tree_range() else {
                continue;
            };
            if let Some(ty) = &symbol.declared_type {
                push_hint(&mut hints, snapshot, range.start(), &symbol.name, ty);
            }
        }

        local_hints(&mut hints, snapshot, rule, &rule.action.statements);
    }

    if let Some(range) = range {
        hints.retain(|hint| range.contains_inclusive(hint.offset));
    }
    hints.sort_by_key(|hint| hint.offset);
    hints
}

fn local_hints(
    hints: &mut Vec<InlayHint>,
    snapshot: &FileSnapshot,
    rule: &Rule,
    statements: &[Statement],
) {
    for statement in statements {
        let name = match &statement.kind {
            StatementKind::Assignment { target, .. } => target,
            StatementKind::LocalDecl {
                name, type_name: None, ..
            } => name,
            StatementKind::Block(inner) => {
                local_hints(hints, snapshot, rule, inner);
                continue;
            }
            _ => continue,
        };
        // The statement introduced `name` if the local visible right after it
        // points back at it.
        let introduced = local_variables_at(rule, snapshot.file_id(), statement.range.end())
            .into_iter()
            .find(|s| {
                s.name == *name
                    && s.location.tree_range().map(|(_, r)| r) == Some(statement.range)
            });
        if let Some(ty) = introduced.and_then(|s| s.declared_type) {
            push_hint(hints, snapshot, statement.range.start(), name, &ty);
        }
    }
}

fn push_hint(
    hints: &mut Vec<InlayHint>,
    snapshot: &FileSnapshot,
    start: TextSize,
    name: &str,
    ty: &TypeRef,
) {
    if ty.is_unknown() {
        return;
    }
    // Position hint after the name
    let offset = start + TextSize::of(name);
    hints.push(InlayHint {
        offset,
        line_col: snapshot.line_index().map(|index| index.line_col(offset)),
        label: format!(": {ty}"),
        padding_left: false,
        padding_right: true,
    });
}
