//! File-level declarations: `declare`, `function` and `global`.

use std::ops::ControlFlow;

use super::DeclarationProvider;
use crate::hir::error::ScopeResult;
use crate::hir::resolve::{ResolveCtx, SymbolVisitor};
use crate::hir::symbols::{Origin, SourceLocation, Symbol, SymbolKind};
use crate::hir::types::TypeRef;

/// Types introduced with `declare`.
#[derive(Clone, Copy, Debug, Default)]
pub struct DeclaredTypeProvider;

impl DeclarationProvider for DeclaredTypeProvider {
    fn origin(&self) -> Origin {
        Origin::DeclaredType
    }

    fn contribute(
        &self,
        ctx: &ResolveCtx<'_>,
        visitor: &mut dyn SymbolVisitor,
    ) -> ScopeResult<ControlFlow<()>> {
        let file = ctx.file();
        for decl in &file.declared_types {
            let qualified = match &file.package {
                Some(package) => format!("{package}.{}", decl.name),
                None => decl.name.to_string(),
            };
            let symbol = Symbol::new(
                decl.name.clone(),
                SymbolKind::Type,
                Origin::DeclaredType,
                SourceLocation::tree(ctx.snapshot.file_id(), decl.range),
            )
            .with_type(TypeRef::named(&qualified));
            emit!(ctx, visitor, symbol);
        }
        Ok(ControlFlow::Continue(()))
    }
}

/// Functions declared in the file.
#[derive(Clone, Copy, Debug, Default)]
pub struct FunctionProvider;

impl DeclarationProvider for FunctionProvider {
    fn origin(&self) -> Origin {
        Origin::Function
    }

    fn contribute(
        &self,
        ctx: &ResolveCtx<'_>,
        visitor: &mut dyn SymbolVisitor,
    ) -> ScopeResult<ControlFlow<()>> {
        for function in &ctx.file().functions {
            let mut symbol = Symbol::new(
                function.name.clone(),
                SymbolKind::Function,
                Origin::Function,
                SourceLocation::tree(ctx.snapshot.file_id(), function.range),
            );
            symbol.declared_type = function.return_type.as_deref().map(TypeRef::parse);
            emit!(ctx, visitor, symbol);
        }
        Ok(ControlFlow::Continue(()))
    }
}

/// `global` variables.
#[derive(Clone, Copy, Debug, Default)]
pub struct GlobalProvider;

impl DeclarationProvider for GlobalProvider {
    fn origin(&self) -> Origin {
        Origin::Global
    }

    fn contribute(
        &self,
        ctx: &ResolveCtx<'_>,
        visitor: &mut dyn SymbolVisitor,
    ) -> ScopeResult<ControlFlow<()>> {
        for global in &ctx.file().globals {
            let symbol = Symbol::new(
                global.name.clone(),
                SymbolKind::Variable,
                Origin::Global,
                SourceLocation::tree(ctx.snapshot.file_id(), global.range),
            )
            .with_type(TypeRef::parse(&global.type_name));
            emit!(ctx, visitor, symbol);
        }
        Ok(ControlFlow::Continue(()))
    }
}
