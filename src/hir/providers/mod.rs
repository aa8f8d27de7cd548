//! Declaration providers: one per category of visible symbol.
//!
//! Each provider answers "what does *my* category contribute at this
//! position?" and nothing else. Providers hold no state; everything they
//! read comes through the [`ResolveCtx`].

use std::ops::ControlFlow;

use super::error::ScopeResult;
use super::resolve::{ResolveCtx, SymbolVisitor};
use super::symbols::Origin;

/// Offer a symbol and return `Break` from the enclosing provider as soon as
/// the visitor asks to stop.
macro_rules! emit {
    ($ctx:expr, $visitor:expr, $symbol:expr) => {
        if $ctx.offer($visitor, $symbol).is_break() {
            return Ok(::std::ops::ControlFlow::Break(()));
        }
    };
}

mod binds;
mod declarations;
mod implicit;
mod imports;
mod locals;
mod unit;

pub use binds::{PathBindProvider, PatternBindProvider};
pub use declarations::{DeclaredTypeProvider, FunctionProvider, GlobalProvider};
pub use implicit::{ImplicitVariableProvider, probe_implicit_variables};
pub use imports::{
    ImportedClassProvider, ImportedFunctionProvider, ImportedPackageProvider,
    ImportedStaticProvider,
};
pub use locals::{LocalVariableProvider, local_variables_at};
pub use unit::{PathSegmentProvider, UnitMemberProvider};

/// One category of visible symbol.
///
/// `contribute` feeds its symbols to the visitor in a stable order and
/// returns `Break` as soon as the visitor does.
pub trait DeclarationProvider: Send + Sync {
    /// The tag stamped on every symbol this provider produces.
    fn origin(&self) -> Origin;

    fn contribute(
        &self,
        ctx: &ResolveCtx<'_>,
        visitor: &mut dyn SymbolVisitor,
    ) -> ScopeResult<ControlFlow<()>>;
}

/// The standard provider for an origin.
pub fn provider_for(origin: Origin) -> Box<dyn DeclarationProvider> {
    match origin {
        Origin::DeclaredType => Box::new(DeclaredTypeProvider),
        Origin::Function => Box::new(FunctionProvider),
        Origin::Global => Box::new(GlobalProvider),
        Origin::ImportedStatic => Box::new(ImportedStaticProvider),
        Origin::ImportedFunction => Box::new(ImportedFunctionProvider),
        Origin::ImportedClass => Box::new(ImportedClassProvider),
        Origin::ImportedPackage => Box::new(ImportedPackageProvider),
        Origin::ImplicitVariable => Box::new(ImplicitVariableProvider),
        Origin::UnitMember => Box::new(UnitMemberProvider),
        Origin::LocalVariable => Box::new(LocalVariableProvider),
        Origin::PatternBind => Box::new(PatternBindProvider),
        Origin::PathBind => Box::new(PathBindProvider),
        Origin::PathSegmentProperty => Box::new(PathSegmentProvider),
    }
}
