//! Locals introduced by earlier statements of a `then` block.
//!
//! Only statements that end before the position count. Inside a nested
//! block, the enclosing blocks' earlier statements count too; declarations
//! inside an earlier, already closed block do not.

use std::ops::ControlFlow;

use rustc_hash::{FxHashMap, FxHashSet};
use smol_str::SmolStr;

use super::DeclarationProvider;
use crate::base::{FileId, TextSize};
use crate::hir::error::ScopeResult;
use crate::hir::resolve::{ResolveCtx, SymbolVisitor};
use crate::hir::symbols::{Origin, SourceLocation, Symbol, SymbolKind};
use crate::hir::types::{PrimitiveType, TypeRef};
use crate::syntax::{Expr, ExprKind, Literal, Rule, Statement, StatementKind, is_identifier};

/// Locals visible at `position` inside `rule`, nearest introduction first.
///
/// Each name appears once; a later introduction shadows an earlier one.
pub fn local_variables_at(rule: &Rule, file_id: FileId, position: TextSize) -> Vec<Symbol> {
    if !rule.action.range.contains_inclusive(position) {
        return Vec::new();
    }
    let mut preceding = Vec::new();
    preceding_statements(&rule.action.statements, position, &mut preceding);

    // Forward pass: types may refer to earlier locals.
    let mut env: FxHashMap<SmolStr, TypeRef> = FxHashMap::default();
    let mut introduced: Vec<(SmolStr, TypeRef, &Statement)> = Vec::new();
    for statement in preceding {
        let (name, ty) = match &statement.kind {
            StatementKind::LocalDecl { name, type_name, init } => {
                let written = type_name
                    .as_deref()
                    .filter(|t| *t != "var")
                    .map(TypeRef::parse);
                let ty = written
                    .or_else(|| init.as_ref().map(|e| infer_type(e, &env)))
                    .unwrap_or(TypeRef::Unknown);
                (name, ty)
            }
            StatementKind::Assignment { target, value } => {
                // Re-assigning a known local does not introduce it again.
                if !is_identifier(target) || env.contains_key(target) {
                    continue;
                }
                (target, infer_type(value, &env))
            }
            StatementKind::Expr(_) | StatementKind::Block(_) => continue,
        };
        env.insert(name.clone(), ty.clone());
        introduced.push((name.clone(), ty, statement));
    }

    let mut seen: FxHashSet<SmolStr> = FxHashSet::default();
    introduced
        .into_iter()
        .rev()
        .filter(|(name, _, _)| seen.insert(name.clone()))
        .map(|(name, ty, statement)| {
            Symbol::new(
                name,
                SymbolKind::Variable,
                Origin::LocalVariable,
                SourceLocation::tree(file_id, statement.range),
            )
            .with_type(ty)
            .with_container(rule.name.clone())
        })
        .collect()
}

/// Collect, in source order, the statements whose effects are visible at
/// `position`: earlier siblings at every level down to the innermost block
/// containing it.
fn preceding_statements<'a>(
    statements: &'a [Statement],
    position: TextSize,
    out: &mut Vec<&'a Statement>,
) {
    for statement in statements {
        if statement.range.contains(position) {
            if let StatementKind::Block(inner) = &statement.kind {
                preceding_statements(inner, position, out);
            }
            return;
        }
        if statement.range.end() > position {
            return;
        }
        out.push(statement);
    }
}

/// Best-effort static type of an initializer.
fn infer_type(expr: &Expr, env: &FxHashMap<SmolStr, TypeRef>) -> TypeRef {
    match &expr.kind {
        ExprKind::Literal(literal) => match literal {
            Literal::Int(_) => TypeRef::Primitive(PrimitiveType::Int),
            Literal::Long(_) => TypeRef::Primitive(PrimitiveType::Long),
            Literal::Double(_) => TypeRef::Primitive(PrimitiveType::Double),
            Literal::Bool(_) => TypeRef::Primitive(PrimitiveType::Boolean),
            Literal::Char(_) => TypeRef::Primitive(PrimitiveType::Char),
            Literal::Str(_) => TypeRef::string(),
            Literal::Null => TypeRef::Unknown,
        },
        ExprKind::New { type_name, .. } | ExprKind::Cast { type_name, .. } => {
            TypeRef::parse(type_name)
        }
        ExprKind::Name(name) => env.get(name).cloned().unwrap_or(TypeRef::Unknown),
        ExprKind::Call { .. } | ExprKind::Field { .. } | ExprKind::Opaque(_) => TypeRef::Unknown,
    }
}

/// Locals of the enclosing `then` block.
#[derive(Clone, Copy, Debug, Default)]
pub struct LocalVariableProvider;

impl DeclarationProvider for LocalVariableProvider {
    fn origin(&self) -> Origin {
        Origin::LocalVariable
    }

    fn contribute(
        &self,
        ctx: &ResolveCtx<'_>,
        visitor: &mut dyn SymbolVisitor,
    ) -> ScopeResult<ControlFlow<()>> {
        let Some((_, rule)) = ctx.enclosing_action() else {
            return Ok(ControlFlow::Continue(()));
        };
        for symbol in local_variables_at(rule, ctx.snapshot.file_id(), ctx.position()) {
            emit!(ctx, visitor, symbol);
        }
        Ok(ControlFlow::Continue(()))
    }
}
