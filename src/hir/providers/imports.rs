//! Names made visible by `import` clauses.
//!
//! Imports name host types, so every provider here goes through the
//! [`TypeLookup`](crate::hir::TypeLookup). An import whose target does not
//! resolve contributes nothing.

use std::ops::ControlFlow;

use rustc_hash::FxHashSet;
use smol_str::SmolStr;

use super::DeclarationProvider;
use crate::hir::error::ScopeResult;
use crate::hir::resolve::{ResolveCtx, SymbolVisitor};
use crate::hir::symbols::{Origin, SourceLocation, Symbol, SymbolKind};
use crate::hir::types::{MethodInfo, TypeDescriptor};
use crate::syntax::ImportKind;

fn method_symbol(owner: &TypeDescriptor, method: &MethodInfo, origin: Origin) -> Symbol {
    let mut symbol = Symbol::new(
        method.name.clone(),
        SymbolKind::Function,
        origin,
        SourceLocation::host(&owner.qualified_name, Some(&method.name)),
    )
    .with_container(owner.qualified_name.clone());
    symbol.declared_type = method.return_type.clone();
    symbol
}

/// `import static a.B.member;` and `import static a.B.*;`
#[derive(Clone, Copy, Debug, Default)]
pub struct ImportedStaticProvider;

impl DeclarationProvider for ImportedStaticProvider {
    fn origin(&self) -> Origin {
        Origin::ImportedStatic
    }

    fn contribute(
        &self,
        ctx: &ResolveCtx<'_>,
        visitor: &mut dyn SymbolVisitor,
    ) -> ScopeResult<ControlFlow<()>> {
        // (container, member, kind): the first import naming a member wins
        let mut seen: FxHashSet<(SmolStr, SmolStr, SymbolKind)> = FxHashSet::default();

        for import in ctx.file().imports_of(ImportKind::Static) {
            let Some((container, member)) = import.container_and_member() else {
                continue;
            };
            let Some(owner) = ctx.find_type(container) else {
                tracing::trace!("[SCOPE] static import container '{}' does not resolve", container);
                continue;
            };

            let wildcard = member == "*";
            let fields = owner
                .fields
                .iter()
                .filter(|f| f.is_static && (wildcard || f.name == member));
            for field in fields {
                let key = (
                    owner.qualified_name.clone(),
                    field.name.clone(),
                    SymbolKind::Variable,
                );
                if !seen.insert(key) {
                    continue;
                }
                let symbol = Symbol::new(
                    field.name.clone(),
                    SymbolKind::Variable,
                    Origin::ImportedStatic,
                    SourceLocation::host(&owner.qualified_name, Some(&field.name)),
                )
                .with_type(field.ty.clone())
                .with_container(owner.qualified_name.clone());
                emit!(ctx, visitor, symbol);
            }

            let methods = owner
                .methods
                .iter()
                .filter(|m| m.is_static && (wildcard || m.name == member));
            for method in methods {
                let key = (
                    owner.qualified_name.clone(),
                    method.name.clone(),
                    SymbolKind::Function,
                );
                if !seen.insert(key) {
                    continue;
                }
                emit!(ctx, visitor, method_symbol(&owner, method, Origin::ImportedStatic));
            }
        }
        Ok(ControlFlow::Continue(()))
    }
}

/// `import function a.B.method;` brings every overload of `method`.
#[derive(Clone, Copy, Debug, Default)]
pub struct ImportedFunctionProvider;

impl DeclarationProvider for ImportedFunctionProvider {
    fn origin(&self) -> Origin {
        Origin::ImportedFunction
    }

    fn contribute(
        &self,
        ctx: &ResolveCtx<'_>,
        visitor: &mut dyn SymbolVisitor,
    ) -> ScopeResult<ControlFlow<()>> {
        for import in ctx.file().imports_of(ImportKind::Function) {
            let Some((container, member)) = import.container_and_member() else {
                continue;
            };
            if !ctx.wants(member) {
                continue;
            }
            let Some(owner) = ctx.find_type(container) else {
                tracing::trace!(
                    "[SCOPE] function import container '{}' does not resolve",
                    container
                );
                continue;
            };
            for method in owner.methods_named(member) {
                emit!(ctx, visitor, method_symbol(&owner, method, Origin::ImportedFunction));
            }
        }
        Ok(ControlFlow::Continue(()))
    }
}

/// `import a.b.Type;`
#[derive(Clone, Copy, Debug, Default)]
pub struct ImportedClassProvider;

impl DeclarationProvider for ImportedClassProvider {
    fn origin(&self) -> Origin {
        Origin::ImportedClass
    }

    fn contribute(
        &self,
        ctx: &ResolveCtx<'_>,
        visitor: &mut dyn SymbolVisitor,
    ) -> ScopeResult<ControlFlow<()>> {
        for import in ctx.file().imports_of(ImportKind::Class) {
            if !ctx.wants(import.simple_name()) {
                continue;
            }
            let Some(descriptor) = ctx.find_type(import.path()) else {
                tracing::trace!("[SCOPE] class import '{}' does not resolve", import.target);
                continue;
            };
            let symbol = Symbol::new(
                descriptor.simple_name(),
                SymbolKind::Type,
                Origin::ImportedClass,
                SourceLocation::host(&descriptor.qualified_name, None),
            )
            .with_type(descriptor.as_type_ref());
            emit!(ctx, visitor, symbol);
        }
        Ok(ControlFlow::Continue(()))
    }
}

/// `import a.b.*;`, the file's own package and the implicit packages.
///
/// Each package contributes itself and every type it contains.
#[derive(Clone, Copy, Debug, Default)]
pub struct ImportedPackageProvider;

impl DeclarationProvider for ImportedPackageProvider {
    fn origin(&self) -> Origin {
        Origin::ImportedPackage
    }

    fn contribute(
        &self,
        ctx: &ResolveCtx<'_>,
        visitor: &mut dyn SymbolVisitor,
    ) -> ScopeResult<ControlFlow<()>> {
        let file = ctx.file();
        let mut packages: Vec<&str> = Vec::new();
        let candidates = file
            .imports_of(ImportKind::Package)
            .map(|import| import.path())
            .chain(file.package.as_deref())
            .chain(ctx.config.implicit_packages.iter().map(|p| p.as_str()));
        for package in candidates {
            if !package.is_empty() && !packages.contains(&package) {
                packages.push(package);
            }
        }

        for package in packages {
            ctx.check_cancelled()?;
            let Some(types) = ctx.types.package_types(package, ctx.config.search_scope) else {
                tracing::trace!("[SCOPE] package '{}' is unknown", package);
                continue;
            };
            emit!(
                ctx,
                visitor,
                Symbol::new(
                    package,
                    SymbolKind::Package,
                    Origin::ImportedPackage,
                    SourceLocation::Package(package.into()),
                )
            );
            for descriptor in types {
                let symbol = Symbol::new(
                    descriptor.simple_name(),
                    SymbolKind::Type,
                    Origin::ImportedPackage,
                    SourceLocation::host(&descriptor.qualified_name, None),
                )
                .with_type(descriptor.as_type_ref())
                .with_container(package);
                emit!(ctx, visitor, symbol);
            }
        }
        Ok(ControlFlow::Continue(()))
    }
}
