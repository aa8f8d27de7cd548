//! Resolution driver tests: provider order, determinism, short-circuit and
//! cancellation.

use std::ops::ControlFlow;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use drlscope::TextSize;
use drlscope::hir::{
    DeclarationProvider, FirstMatch, Origin, ResolveConfig, ResolveCtx, ResolveRequest, ScopeError,
    ScopeResolver, ScopeResult, SourceLocation, Symbol, SymbolCollector, SymbolKind, SymbolVisitor,
    TypeRegistry, all_bindings_visible_at,
};
use drlscope::syntax::{Expr, RuleFile, RuleFileBuilder};
use tokio_util::sync::CancellationToken;

use crate::helpers::symbol_assertions::{
    action_start, assert_no_duplicate_symbols, names, names_from, sorted_names, statement_start,
};
use crate::helpers::type_fixtures::{TYPES, snapshot};

fn items_and_inheritance(r2_extends: bool) -> RuleFile {
    RuleFileBuilder::new()
        .global("java.util.List", "items")
        .rule("R1", |r| {
            r.when(|c| {
                c.bind("$f", "Fact");
            });
        })
        .rule("R2", |r| {
            if r2_extends {
                r.extends("R1");
            }
            r.when(|c| {
                c.bind("$g", "Fact");
            });
            r.then(|a| {
                a.expr(Expr::call(Some(Expr::name("items")), "add", vec![Expr::name("$g")]));
            });
        })
        .build()
}

// ============================================================================
// END TO END
// ============================================================================

#[test]
fn test_inherited_binds_visible_in_child_action() {
    let file = items_and_inheritance(true);
    let position = statement_start(&file, "R2", 0);

    let binds = all_bindings_visible_at(&file, drlscope::FileId::new(0), position);

    assert_eq!(sorted_names(&binds), vec!["$f", "$g"]);
}

#[test]
fn test_removing_parent_hides_inherited_binds() {
    let file = items_and_inheritance(false);
    let position = statement_start(&file, "R2", 0);

    let binds = all_bindings_visible_at(&file, drlscope::FileId::new(0), position);

    assert_eq!(names(&binds), vec!["$g"]);
}

#[test]
fn test_full_resolution_in_child_action() {
    let file = items_and_inheritance(true);
    let position = statement_start(&file, "R2", 0);
    let snapshot = snapshot(file);

    let symbols = ScopeResolver::default()
        .collect(&snapshot, &*TYPES, &ResolveRequest::at(position))
        .unwrap();

    assert_eq!(names_from(&symbols, Origin::Global), vec!["items"]);
    assert_eq!(names_from(&symbols, Origin::PatternBind), vec!["$g", "$f"]);
    // Implicit variables resolve against the fixture's runtime types.
    assert!(names_from(&symbols, Origin::ImplicitVariable).contains(&"kcontext"));
    assert_no_duplicate_symbols(&symbols);
}

// ============================================================================
// ORDER AND DETERMINISM
// ============================================================================

#[test]
fn test_resolution_is_deterministic() {
    let file = items_and_inheritance(true);
    let position = statement_start(&file, "R2", 0);
    let snapshot = snapshot(file);
    let resolver = ScopeResolver::default();
    let request = ResolveRequest::at(position);

    let first = resolver.collect(&snapshot, &*TYPES, &request).unwrap();
    let second = resolver.collect(&snapshot, &*TYPES, &request).unwrap();

    assert_eq!(first, second);
}

#[test]
fn test_symbols_arrive_grouped_in_provider_order() {
    let file = items_and_inheritance(true);
    let position = statement_start(&file, "R2", 0);
    let snapshot = snapshot(file);
    let resolver = ScopeResolver::default();

    let symbols = resolver
        .collect(&snapshot, &*TYPES, &ResolveRequest::at(position))
        .unwrap();

    let rank = |origin: Origin| Origin::ALL.iter().position(|o| *o == origin).unwrap();
    let ranks: Vec<_> = symbols.iter().map(|s| rank(s.origin)).collect();
    let mut sorted = ranks.clone();
    sorted.sort();
    assert_eq!(ranks, sorted);
}

#[test]
fn test_provider_order_is_configurable() {
    let file = RuleFileBuilder::new()
        .global("int", "x")
        .rule("R", |r| {
            r.then(|a| {
                a.assign("x", Expr::string("shadow"));
                a.expr(Expr::name("x"));
            });
        })
        .build();
    let position = statement_start(&file, "R", 1);
    let snapshot = snapshot(file);
    let request = ResolveRequest::at(position);

    let default = ScopeResolver::default()
        .find(&snapshot, &TypeRegistry::new(), &request, "x")
        .unwrap();
    let locals_first = ScopeResolver::new(
        ResolveConfig::default().with_provider_order([Origin::LocalVariable, Origin::Global]),
    )
    .find(&snapshot, &TypeRegistry::new(), &request, "x")
    .unwrap();

    assert_eq!(default.map(|s| s.origin), Some(Origin::Global));
    assert_eq!(locals_first.map(|s| s.origin), Some(Origin::LocalVariable));
}

#[test]
fn test_omitted_providers_do_not_run() {
    let file = items_and_inheritance(true);
    let position = statement_start(&file, "R2", 0);
    let snapshot = snapshot(file);
    let config = ResolveConfig::default().with_provider_order([Origin::PatternBind]);
    let resolver = ScopeResolver::new(config);

    let symbols = resolver
        .collect(&snapshot, &*TYPES, &ResolveRequest::at(position))
        .unwrap();

    assert_eq!(resolver.provider_order(), vec![Origin::PatternBind]);
    assert!(symbols.iter().all(|s| s.origin == Origin::PatternBind));
}

// ============================================================================
// SHORT CIRCUIT
// ============================================================================

/// Counts its invocations and optionally offers one symbol.
struct CountingProvider {
    origin: Origin,
    offers: Option<&'static str>,
    calls: Arc<AtomicUsize>,
}

impl DeclarationProvider for CountingProvider {
    fn origin(&self) -> Origin {
        self.origin
    }

    fn contribute(
        &self,
        ctx: &ResolveCtx<'_>,
        visitor: &mut dyn SymbolVisitor,
    ) -> ScopeResult<ControlFlow<()>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.offers {
            Some(name) => {
                let location = SourceLocation::Package("test".into());
                let symbol = Symbol::new(name, SymbolKind::Variable, self.origin, location);
                Ok(ctx.offer(visitor, symbol))
            }
            None => Ok(ControlFlow::Continue(())),
        }
    }
}

fn instrumented(offers: &[Option<&'static str>]) -> (ScopeResolver, Vec<Arc<AtomicUsize>>) {
    let origins = [Origin::DeclaredType, Origin::Function, Origin::Global, Origin::LocalVariable];
    let counters: Vec<_> = offers.iter().map(|_| Arc::new(AtomicUsize::new(0))).collect();
    let providers = offers
        .iter()
        .zip(origins)
        .zip(&counters)
        .map(|((offers, origin), calls)| {
            Box::new(CountingProvider {
                origin,
                offers: *offers,
                calls: calls.clone(),
            }) as Box<dyn DeclarationProvider>
        })
        .collect();
    (ScopeResolver::with_providers(ResolveConfig::default(), providers), counters)
}

fn calls(counters: &[Arc<AtomicUsize>]) -> Vec<usize> {
    counters.iter().map(|c| c.load(Ordering::SeqCst)).collect()
}

#[test]
fn test_stop_prevents_later_providers() {
    let (resolver, counters) = instrumented(&[Some("a"), Some("b"), None]);
    let snapshot = snapshot(RuleFileBuilder::new().build());
    let mut first = FirstMatch::default();

    let request = ResolveRequest::at(TextSize::from(0));
    let flow = resolver
        .resolve(&snapshot, &TypeRegistry::new(), &request, &mut first)
        .unwrap();

    assert!(flow.is_break());
    assert_eq!(first.found.map(|s| s.name.to_string()), Some("a".to_string()));
    assert_eq!(calls(&counters), vec![1, 0, 0]);
}

#[test]
fn test_stop_in_middle_provider() {
    let (resolver, counters) = instrumented(&[Some("a"), Some("b"), None, Some("d")]);
    let snapshot = snapshot(RuleFileBuilder::new().build());
    let request = ResolveRequest::at(TextSize::from(0)).named("b");
    let mut first = FirstMatch::default();

    resolver
        .resolve(&snapshot, &TypeRegistry::new(), &request, &mut first)
        .unwrap();

    assert_eq!(first.found.map(|s| s.origin), Some(Origin::Function));
    assert_eq!(calls(&counters), vec![1, 1, 0, 0]);
}

#[test]
fn test_visitor_that_never_stops_sees_every_provider() {
    let (resolver, counters) = instrumented(&[Some("a"), None, Some("c"), Some("d")]);
    let snapshot = snapshot(RuleFileBuilder::new().build());
    let mut collector = SymbolCollector::default();

    let request = ResolveRequest::at(TextSize::from(0));
    let flow = resolver
        .resolve(&snapshot, &TypeRegistry::new(), &request, &mut collector)
        .unwrap();

    assert!(flow.is_continue());
    assert_eq!(names(&collector.symbols), vec!["a", "c", "d"]);
    assert_eq!(calls(&counters), vec![1, 1, 1, 1]);
}

// ============================================================================
// CANCELLATION
// ============================================================================

#[test]
fn test_cancelled_before_start() {
    let file = items_and_inheritance(true);
    let position = statement_start(&file, "R2", 0);
    let snapshot = snapshot(file);
    let token = CancellationToken::new();
    token.cancel();

    let result = ScopeResolver::default().collect(
        &snapshot,
        &*TYPES,
        &ResolveRequest::at(position).with_cancellation(token),
    );

    assert_eq!(result, Err(ScopeError::Cancelled));
}

#[test]
fn test_cancelled_mid_request_is_not_an_empty_answer() {
    let file = items_and_inheritance(true);
    let position = action_start(&file, "R2");
    let snapshot = snapshot(file);
    let token = CancellationToken::new();
    let request = ResolveRequest::at(position).with_cancellation(token.clone());

    let mut seen = 0;
    let mut visitor = |_symbol: Symbol| {
        seen += 1;
        token.cancel();
        ControlFlow::Continue(())
    };
    let result = ScopeResolver::default().resolve(&snapshot, &*TYPES, &request, &mut visitor);

    assert_eq!(result, Err(ScopeError::Cancelled));
    assert!(result.unwrap_err().is_cancelled());
    // Only the provider that was already running got to finish.
    assert_eq!(seen, 1);
}
