//! Members of the rule unit and OOPath segments that walk them.

use std::ops::ControlFlow;
use std::sync::Arc;

use super::DeclarationProvider;
use crate::hir::error::ScopeResult;
use crate::hir::resolve::{ResolveCtx, SymbolVisitor};
use crate::hir::symbols::{Origin, SourceLocation, Symbol, SymbolKind};
use crate::hir::types::{BeanProperty, TypeDescriptor, TypeRef};
use crate::syntax::{PathSegment, Pattern, PatternKind};

/// Methods and bean properties of the file's `unit` class, visible in
/// every rule of the file.
#[derive(Clone, Copy, Debug, Default)]
pub struct UnitMemberProvider;

impl DeclarationProvider for UnitMemberProvider {
    fn origin(&self) -> Origin {
        Origin::UnitMember
    }

    fn contribute(
        &self,
        ctx: &ResolveCtx<'_>,
        visitor: &mut dyn SymbolVisitor,
    ) -> ScopeResult<ControlFlow<()>> {
        if ctx.enclosing_rule().is_none() {
            return Ok(ControlFlow::Continue(()));
        }
        let Some(unit) = ctx.unit_type() else {
            return Ok(ControlFlow::Continue(()));
        };

        for method in &unit.methods {
            let mut symbol = Symbol::new(
                method.name.clone(),
                SymbolKind::Function,
                Origin::UnitMember,
                SourceLocation::host(&unit.qualified_name, Some(&method.name)),
            )
            .with_container(unit.qualified_name.clone());
            symbol.declared_type = method.return_type.clone();
            emit!(ctx, visitor, symbol);
        }
        for property in unit.bean_properties().into_values() {
            let member = property.getter.as_deref().or(property.setter.as_deref());
            let symbol = Symbol::new(
                property.name.clone(),
                SymbolKind::Variable,
                Origin::UnitMember,
                SourceLocation::host(&unit.qualified_name, member),
            )
            .with_type(property.value_type.clone())
            .with_container(unit.qualified_name.clone());
            emit!(ctx, visitor, symbol);
        }
        Ok(ControlFlow::Continue(()))
    }
}

/// The property named by the OOPath segment under the position.
///
/// The first segment is a property of the unit class; each later segment
/// is a property of the element type the previous one produced.
#[derive(Clone, Copy, Debug, Default)]
pub struct PathSegmentProvider;

impl DeclarationProvider for PathSegmentProvider {
    fn origin(&self) -> Origin {
        Origin::PathSegmentProperty
    }

    fn contribute(
        &self,
        ctx: &ResolveCtx<'_>,
        visitor: &mut dyn SymbolVisitor,
    ) -> ScopeResult<ControlFlow<()>> {
        let Some((_, rule)) = ctx.enclosing_rule() else {
            return Ok(ControlFlow::Continue(()));
        };
        let Some((segments, index)) = segment_at(&rule.condition.patterns, ctx) else {
            return Ok(ControlFlow::Continue(()));
        };
        let Some(unit) = ctx.unit_type() else {
            return Ok(ControlFlow::Continue(()));
        };

        let mut owner = unit;
        for (i, segment) in segments.iter().enumerate().take(index + 1) {
            ctx.check_cancelled()?;
            let Some(property) = owner.bean_property(&segment.name) else {
                tracing::trace!(
                    "[SCOPE] path segment '{}' is not a property of {}",
                    segment.name,
                    owner.qualified_name
                );
                return Ok(ControlFlow::Continue(()));
            };
            let element = property
                .value_type
                .element_type_in(&ctx.config.container_types)
                .cloned();

            if i == index {
                emit!(ctx, visitor, segment_symbol(&owner, &property, element));
                break;
            }

            let next = element
                .as_ref()
                .unwrap_or(&property.value_type)
                .name()
                .and_then(|name| ctx.resolve_type_name(name));
            match next {
                Some(next) => owner = next,
                None => return Ok(ControlFlow::Continue(())),
            }
        }
        Ok(ControlFlow::Continue(()))
    }
}

fn segment_symbol(
    owner: &Arc<TypeDescriptor>,
    property: &BeanProperty,
    element: Option<TypeRef>,
) -> Symbol {
    let member = property.getter.as_deref().or(property.setter.as_deref());
    Symbol::new(
        property.name.clone(),
        SymbolKind::Variable,
        Origin::PathSegmentProperty,
        SourceLocation::host(&owner.qualified_name, member),
    )
    .with_type(element.unwrap_or_else(|| property.value_type.clone()))
    .with_container(owner.qualified_name.clone())
}

/// Find the OOPath whose segment contains the position, and that segment's
/// index.
fn segment_at<'a>(
    patterns: &'a [Pattern],
    ctx: &ResolveCtx<'_>,
) -> Option<(&'a [PathSegment], usize)> {
    let position = ctx.position();
    for pattern in patterns {
        if !pattern.range.contains_inclusive(position) {
            continue;
        }
        if let PatternKind::PathBind { segments, .. } = &pattern.kind {
            let index = segments
                .iter()
                .position(|s| s.range.contains_inclusive(position));
            if let Some(index) = index {
                return Some((segments, index));
            }
        }
        if let Some(found) = segment_at(pattern.children(), ctx) {
            return Some(found);
        }
    }
    None
}
