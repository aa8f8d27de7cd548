//! Pattern and OOPath binds of the enclosing rule and its ancestors.

use std::ops::ControlFlow;

use super::DeclarationProvider;
use crate::hir::bindings::{BindFilter, BindingWalker};
use crate::hir::error::ScopeResult;
use crate::hir::resolve::{ResolveCtx, SymbolVisitor};
use crate::hir::symbols::Origin;

fn contribute_binds(
    ctx: &ResolveCtx<'_>,
    visitor: &mut dyn SymbolVisitor,
    filter: BindFilter,
) -> ScopeResult<ControlFlow<()>> {
    let Some((rule_id, _)) = ctx.enclosing_rule() else {
        return Ok(ControlFlow::Continue(()));
    };
    let symbols = BindingWalker::new(ctx.file(), ctx.snapshot.file_id(), ctx.config)
        .with_cancellation(ctx.request.cancellation.as_ref())
        .collect_from_rule(rule_id.local.index(), filter)?;
    for symbol in symbols {
        emit!(ctx, visitor, symbol);
    }
    Ok(ControlFlow::Continue(()))
}

/// `$f : Fact()`, field binds and accumulate results.
#[derive(Clone, Copy, Debug, Default)]
pub struct PatternBindProvider;

impl DeclarationProvider for PatternBindProvider {
    fn origin(&self) -> Origin {
        Origin::PatternBind
    }

    fn contribute(
        &self,
        ctx: &ResolveCtx<'_>,
        visitor: &mut dyn SymbolVisitor,
    ) -> ScopeResult<ControlFlow<()>> {
        contribute_binds(ctx, visitor, BindFilter::PATTERNS)
    }
}

/// `$p : /persons/addresses`
#[derive(Clone, Copy, Debug, Default)]
pub struct PathBindProvider;

impl DeclarationProvider for PathBindProvider {
    fn origin(&self) -> Origin {
        Origin::PathBind
    }

    fn contribute(
        &self,
        ctx: &ResolveCtx<'_>,
        visitor: &mut dyn SymbolVisitor,
    ) -> ScopeResult<ControlFlow<()>> {
        contribute_binds(ctx, visitor, BindFilter::PATHS)
    }
}
