//! Predeclared action-section variables (`kcontext`, `drools`).

use std::ops::ControlFlow;

use super::DeclarationProvider;
use crate::hir::cache::ResolvedImplicit;
use crate::hir::config::ResolveConfig;
use crate::hir::error::ScopeResult;
use crate::hir::resolve::{ResolveCtx, SymbolVisitor};
use crate::hir::symbols::{Origin, SourceLocation, Symbol, SymbolKind};
use crate::hir::types::{SearchScope, TypeLookup};

/// Resolve each configured implicit variable to the first candidate type
/// the lookup knows. Variables with no resolvable candidate are left out.
pub fn probe_implicit_variables(
    types: &dyn TypeLookup,
    config: &ResolveConfig,
) -> Vec<ResolvedImplicit> {
    config
        .implicit_variables
        .iter()
        .filter_map(|variable| {
            let descriptor = variable.candidates.iter().find_map(|candidate| {
                // Implicit types live in the runtime libraries.
                types.find_type(candidate, SearchScope::WithLibraries)
            });
            if descriptor.is_none() {
                tracing::debug!(
                    "[SCOPE] no candidate type resolves for implicit '{}'",
                    variable.name
                );
            }
            Some(ResolvedImplicit {
                name: variable.name.clone(),
                descriptor: descriptor?,
                exposes_members: variable.exposes_members,
            })
        })
        .collect()
}

/// Implicit variables, plus the helper's members, inside `then` blocks.
#[derive(Clone, Copy, Debug, Default)]
pub struct ImplicitVariableProvider;

impl DeclarationProvider for ImplicitVariableProvider {
    fn origin(&self) -> Origin {
        Origin::ImplicitVariable
    }

    fn contribute(
        &self,
        ctx: &ResolveCtx<'_>,
        visitor: &mut dyn SymbolVisitor,
    ) -> ScopeResult<ControlFlow<()>> {
        if ctx.enclosing_action().is_none() {
            return Ok(ControlFlow::Continue(()));
        }

        let resolved = ctx.implicit_cache.get_or_probe(
            ctx.snapshot.file_id(),
            ctx.snapshot.revision(),
            ctx.types,
            || probe_implicit_variables(ctx.types, ctx.config),
        );

        for implicit in resolved.iter() {
            let descriptor = &implicit.descriptor;
            let symbol = Symbol::new(
                implicit.name.clone(),
                SymbolKind::Variable,
                Origin::ImplicitVariable,
                SourceLocation::host(&descriptor.qualified_name, None),
            )
            .with_type(descriptor.as_type_ref());
            emit!(ctx, visitor, symbol);

            if !implicit.exposes_members {
                continue;
            }
            for method in descriptor.methods.iter().filter(|m| !m.is_static) {
                let mut symbol = Symbol::new(
                    method.name.clone(),
                    SymbolKind::Function,
                    Origin::ImplicitVariable,
                    SourceLocation::host(&descriptor.qualified_name, Some(&method.name)),
                )
                .with_container(descriptor.qualified_name.clone());
                symbol.declared_type = method.return_type.clone();
                emit!(ctx, visitor, symbol);
            }
        }
        Ok(ControlFlow::Continue(()))
    }
}
