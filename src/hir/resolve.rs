//! Scope resolution: which symbols are visible at a position.
//!
//! # Architecture
//!
//! Resolution is a chain of independent [`DeclarationProvider`]s, each
//! owning one category of symbol (globals, imports, pattern binds, ...).
//! The [`ScopeResolver`] runs them in a fixed order against a caller
//! supplied [`SymbolVisitor`]:
//!
//! ```text
//! declared types → functions → globals → static imports → function imports
//!   → class imports → package imports → implicit variables → unit members
//!   → action-section locals → pattern binds → path binds → path segments
//! ```
//!
//! The visitor both receives candidates and decides whether to keep going.
//! Returning [`ControlFlow::Break`] stops the walk immediately; no later
//! provider runs.
//!
//! Every provider is stateless and only reads the immutable snapshot it is
//! handed, so one resolver can serve any number of threads at once.

use std::ops::ControlFlow;
use std::sync::Arc;

use indexmap::IndexSet;
use smol_str::SmolStr;
use tokio_util::sync::CancellationToken;

use super::cache::ImplicitVarCache;
use super::config::ResolveConfig;
use super::error::{ScopeError, ScopeResult};
use super::ids::{LocalRuleId, RuleId};
use super::providers::{DeclarationProvider, provider_for};
use super::source::FileSnapshot;
use super::symbols::{Origin, Symbol};
use super::types::{TypeDescriptor, TypeLookup};
use crate::base::TextSize;
use crate::syntax::{ImportKind, Rule, RuleFile};

// ============================================================================
// REQUEST
// ============================================================================

/// What to resolve: a position, optionally narrowed to one name.
#[derive(Clone, Debug, Default)]
pub struct ResolveRequest {
    pub position: TextSize,
    /// Only symbols with exactly this name reach the visitor.
    pub target_name: Option<SmolStr>,
    pub cancellation: Option<CancellationToken>,
}

impl ResolveRequest {
    pub fn at(position: impl Into<TextSize>) -> Self {
        Self {
            position: position.into(),
            ..Self::default()
        }
    }

    pub fn named(mut self, name: impl Into<SmolStr>) -> Self {
        self.target_name = Some(name.into());
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }
}

// ============================================================================
// VISITORS
// ============================================================================

/// Receives candidate symbols and decides whether resolution continues.
pub trait SymbolVisitor {
    fn visit(&mut self, symbol: Symbol) -> ControlFlow<()>;
}

impl<F> SymbolVisitor for F
where
    F: FnMut(Symbol) -> ControlFlow<()>,
{
    fn visit(&mut self, symbol: Symbol) -> ControlFlow<()> {
        self(symbol)
    }
}

/// Accepts everything.
#[derive(Clone, Debug, Default)]
pub struct SymbolCollector {
    pub symbols: Vec<Symbol>,
}

impl SymbolVisitor for SymbolCollector {
    fn visit(&mut self, symbol: Symbol) -> ControlFlow<()> {
        self.symbols.push(symbol);
        ControlFlow::Continue(())
    }
}

/// Stops at the first symbol it sees.
#[derive(Clone, Debug, Default)]
pub struct FirstMatch {
    pub found: Option<Symbol>,
}

impl SymbolVisitor for FirstMatch {
    fn visit(&mut self, symbol: Symbol) -> ControlFlow<()> {
        self.found = Some(symbol);
        ControlFlow::Break(())
    }
}

/// Records only which providers contributed, in first-seen order.
#[derive(Clone, Debug, Default)]
pub struct OriginRecorder {
    pub origins: IndexSet<Origin>,
}

impl SymbolVisitor for OriginRecorder {
    fn visit(&mut self, symbol: Symbol) -> ControlFlow<()> {
        self.origins.insert(symbol.origin);
        ControlFlow::Continue(())
    }
}

// ============================================================================
// CONTEXT
// ============================================================================

/// Everything a provider may read while answering one request.
pub struct ResolveCtx<'a> {
    pub snapshot: &'a FileSnapshot,
    pub types: &'a dyn TypeLookup,
    pub config: &'a ResolveConfig,
    pub implicit_cache: &'a ImplicitVarCache,
    pub request: &'a ResolveRequest,
}

impl<'a> ResolveCtx<'a> {
    pub fn file(&self) -> &'a RuleFile {
        self.snapshot.tree()
    }

    pub fn position(&self) -> TextSize {
        self.request.position
    }

    pub fn check_cancelled(&self) -> ScopeResult<()> {
        match &self.request.cancellation {
            Some(token) if token.is_cancelled() => Err(ScopeError::Cancelled),
            _ => Ok(()),
        }
    }

    /// The rule containing the request position.
    pub fn enclosing_rule(&self) -> Option<(RuleId, &'a Rule)> {
        let (index, rule) = self.file().rule_at(self.position())?;
        Some((RuleId::new(self.snapshot.file_id(), LocalRuleId::from(index)), rule))
    }

    /// The enclosing rule, but only when the position is in its `then` part.
    pub fn enclosing_action(&self) -> Option<(RuleId, &'a Rule)> {
        self.enclosing_rule()
            .filter(|(_, rule)| rule.action.range.contains_inclusive(self.position()))
    }

    /// Whether a symbol called `name` could reach the visitor at all.
    pub fn wants(&self, name: &str) -> bool {
        self.request
            .target_name
            .as_ref()
            .is_none_or(|target| target == name)
    }

    /// Hand a symbol to the visitor, enforcing the request's name filter.
    pub fn offer(&self, visitor: &mut dyn SymbolVisitor, symbol: Symbol) -> ControlFlow<()> {
        if symbol.name.is_empty() {
            tracing::trace!("[SCOPE] dropping unnamed symbol from {}", symbol.origin);
            return ControlFlow::Continue(());
        }
        if !self.wants(&symbol.name) {
            return ControlFlow::Continue(());
        }
        visitor.visit(symbol)
    }

    pub fn find_type(&self, qualified_name: &str) -> Option<Arc<TypeDescriptor>> {
        self.types.find_type(qualified_name, self.config.search_scope)
    }

    /// Resolve a type name as written in the file.
    ///
    /// Qualified names are looked up as-is. Simple names try, in order:
    /// explicit class imports, the file's own package, wildcard imports,
    /// the implicit packages, and finally the default package.
    pub fn resolve_type_name(&self, written: &str) -> Option<Arc<TypeDescriptor>> {
        if written.contains('.') {
            return self.find_type(written);
        }
        let file = self.file();
        let explicit = file
            .imports_of(ImportKind::Class)
            .filter(|import| import.simple_name() == written)
            .find_map(|import| self.find_type(import.path()));
        if explicit.is_some() {
            return explicit;
        }
        let packages = file
            .package
            .iter()
            .map(|p| p.as_str())
            .chain(file.imports_of(ImportKind::Package).map(|import| import.path()))
            .chain(self.config.implicit_packages.iter().map(|p| p.as_str()));
        for package in packages {
            if let Some(found) = self.find_type(&format!("{package}.{written}")) {
                return Some(found);
            }
        }
        self.find_type(written)
    }

    /// The unit class declared by the file, if it resolves.
    pub fn unit_type(&self) -> Option<Arc<TypeDescriptor>> {
        let unit = self.file().unit.as_ref()?;
        let resolved = self.resolve_type_name(&unit.name);
        if resolved.is_none() {
            tracing::trace!("[SCOPE] unit type '{}' does not resolve", unit.name);
        }
        resolved
    }
}

// ============================================================================
// RESOLVER
// ============================================================================

/// Runs the provider chain. Build once, share by `Arc`.
pub struct ScopeResolver {
    config: Arc<ResolveConfig>,
    providers: Vec<Box<dyn DeclarationProvider>>,
    implicit_cache: ImplicitVarCache,
}

impl Default for ScopeResolver {
    fn default() -> Self {
        Self::new(ResolveConfig::default())
    }
}

impl std::fmt::Debug for ScopeResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScopeResolver")
            .field("providers", &self.provider_order())
            .field("implicit_cache", &self.implicit_cache)
            .finish()
    }
}

impl ScopeResolver {
    /// Build the standard providers in `config.provider_order`.
    pub fn new(config: ResolveConfig) -> Self {
        let providers = config.provider_order.iter().map(|&o| provider_for(o)).collect();
        Self::with_providers(config, providers)
    }

    /// Use an explicit provider list, run in the given order.
    pub fn with_providers(
        config: ResolveConfig,
        providers: Vec<Box<dyn DeclarationProvider>>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            providers,
            implicit_cache: ImplicitVarCache::new(),
        }
    }

    pub fn config(&self) -> &ResolveConfig {
        &self.config
    }

    pub fn provider_order(&self) -> Vec<Origin> {
        self.providers.iter().map(|p| p.origin()).collect()
    }

    pub fn implicit_cache(&self) -> &ImplicitVarCache {
        &self.implicit_cache
    }

    /// Feed every visible symbol to `visitor`, provider by provider.
    ///
    /// Returns `Break` when the visitor stopped the walk. Cancellation is
    /// checked before each provider and inside long walks.
    pub fn resolve(
        &self,
        snapshot: &FileSnapshot,
        types: &dyn TypeLookup,
        request: &ResolveRequest,
        visitor: &mut dyn SymbolVisitor,
    ) -> ScopeResult<ControlFlow<()>> {
        let ctx = ResolveCtx {
            snapshot,
            types,
            config: &self.config,
            implicit_cache: &self.implicit_cache,
            request,
        };
        for provider in &self.providers {
            ctx.check_cancelled()?;
            if provider.contribute(&ctx, visitor)?.is_break() {
                tracing::debug!(
                    "[SCOPE] visitor stopped at {} provider ({:?} @ {:?})",
                    provider.origin(),
                    snapshot.file_id(),
                    request.position
                );
                return Ok(ControlFlow::Break(()));
            }
        }
        Ok(ControlFlow::Continue(()))
    }

    /// Every symbol visible for `request`, in provider order.
    pub fn collect(
        &self,
        snapshot: &FileSnapshot,
        types: &dyn TypeLookup,
        request: &ResolveRequest,
    ) -> ScopeResult<Vec<Symbol>> {
        let mut collector = SymbolCollector::default();
        self.resolve(snapshot, types, request, &mut collector)?;
        Ok(collector.symbols)
    }

    /// The highest-precedence symbol called `name`.
    pub fn find(
        &self,
        snapshot: &FileSnapshot,
        types: &dyn TypeLookup,
        request: &ResolveRequest,
        name: &str,
    ) -> ScopeResult<Option<Symbol>> {
        let request = request.clone().named(name);
        let mut first = FirstMatch::default();
        self.resolve(snapshot, types, &request, &mut first)?;
        Ok(first.found)
    }

    /// Which providers have anything to offer at this position.
    pub fn capabilities(
        &self,
        snapshot: &FileSnapshot,
        types: &dyn TypeLookup,
        request: &ResolveRequest,
    ) -> ScopeResult<Vec<Origin>> {
        let mut recorder = OriginRecorder::default();
        self.resolve(snapshot, types, request, &mut recorder)?;
        Ok(recorder.origins.into_iter().collect())
    }
}
