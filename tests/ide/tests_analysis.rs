//! AnalysisHost and Analysis: editing, snapshots and concurrent queries.

use std::thread;

use drlscope::hir::{Origin, ResolveConfig, TypeDescriptor, TypeRegistry};
use drlscope::ide::AnalysisHost;
use drlscope::syntax::{Expr, RuleFile, RuleFileBuilder};
use drlscope::{LineCol, TextSize};

use crate::helpers::symbol_assertions::{names, names_from, statement_start};
use crate::helpers::type_fixtures::{HELPER, RULE_CONTEXT, TYPES};

fn rules(second_bind: &str) -> RuleFile {
    RuleFileBuilder::new()
        .global("java.util.List", "items")
        .rule("R1", |r| {
            r.when(|c| {
                c.bind("$f", "Fact");
            });
        })
        .rule("R2", |r| {
            r.extends("R1");
            r.when(|c| {
                c.bind(second_bind, "Fact");
            });
            r.then(|a| {
                a.expr(Expr::name("items"));
            });
        })
        .build()
}

fn host_with_fixture_types() -> AnalysisHost {
    let mut host = AnalysisHost::new();
    host.set_type_lookup(TYPES.clone());
    host
}

#[test]
fn test_edit_is_visible_in_new_analysis_only() {
    let mut host = host_with_fixture_types();
    let file = host.set_file("/rules/a.drl", rules("$g"));
    let before = host.analysis();

    let same = host.set_file("/rules/a.drl", rules("$h"));
    let after = host.analysis();

    assert_eq!(same, file);
    let position = statement_start(after.snapshot(file).unwrap().tree(), "R2", 0);
    assert_eq!(names(&before.bindings_at(file, position).unwrap()), vec!["$g", "$f"]);
    assert_eq!(names(&after.bindings_at(file, position).unwrap()), vec!["$h", "$f"]);
    assert!(after.snapshot(file).unwrap().revision() > before.snapshot(file).unwrap().revision());
}

#[test]
fn test_files_are_independent() {
    let mut host = host_with_fixture_types();
    let a = host.set_file("/a.drl", rules("$g"));
    let b = host.set_file("/b.drl", RuleFileBuilder::new().global("int", "other").build());
    let analysis = host.analysis();

    assert_ne!(a, b);
    assert_eq!(host.file_id("/b.drl"), Some(b));
    assert_eq!(host.file_count(), 2);
    let in_b = analysis.visible_symbols(b, TextSize::from(0)).unwrap();
    assert_eq!(names_from(&in_b, Origin::Global), vec!["other"]);
}

#[test]
fn test_replacing_types_refreshes_implicit_variables() {
    let mut host = AnalysisHost::new();
    let file = host.set_file("/a.drl", rules("$g"));
    let position = statement_start(host.analysis().snapshot(file).unwrap().tree(), "R2", 0);

    let without = host.analysis().visible_symbols(file, position).unwrap();
    host.set_type_lookup(TypeRegistry::new().with(TypeDescriptor::new(RULE_CONTEXT).in_library()));
    let with = host.analysis().visible_symbols(file, position).unwrap();

    assert!(names_from(&without, Origin::ImplicitVariable).is_empty());
    // RuleContext is also the last candidate for the helper variable.
    assert_eq!(names_from(&with, Origin::ImplicitVariable), vec!["kcontext", "drools"]);
}

#[test]
fn test_older_analysis_keeps_its_own_implicit_types() {
    let mut host = AnalysisHost::new();
    host.set_type_lookup(TypeRegistry::new().with(TypeDescriptor::new(RULE_CONTEXT).in_library()));
    let file = host.set_file("/a.drl", rules("$g"));
    let before = host.analysis();
    let position = statement_start(before.snapshot(file).unwrap().tree(), "R2", 0);

    host.set_type_lookup(TypeRegistry::new().with(TypeDescriptor::new(HELPER).in_library()));
    let after = host.analysis();
    let new_drools = after.find_symbol(file, position, "drools").unwrap().unwrap();
    let old_drools = before.find_symbol(file, position, "drools").unwrap().unwrap();

    assert_eq!(new_drools.declared_type.map(|t| t.to_string()), Some(HELPER.to_string()));
    assert_eq!(old_drools.declared_type.map(|t| t.to_string()), Some(RULE_CONTEXT.to_string()));
}

#[test]
fn test_implicit_cache_is_filled_per_file() {
    let mut host = host_with_fixture_types();
    let a = host.set_file("/a.drl", rules("$g"));
    let b = host.set_file("/b.drl", rules("$h"));
    let analysis = host.analysis();
    let position = statement_start(analysis.snapshot(a).unwrap().tree(), "R2", 0);

    analysis.visible_symbols(a, position).unwrap();
    analysis.visible_symbols(b, position).unwrap();
    assert_eq!(host.resolver().implicit_cache().len(), 2);

    host.remove_file("/b.drl");
    assert_eq!(host.resolver().implicit_cache().len(), 1);
}

#[test]
fn test_find_symbol_uses_precedence() {
    let mut host = host_with_fixture_types();
    let file = host.set_file("/a.drl", rules("$g"));
    let analysis = host.analysis();
    let position = statement_start(analysis.snapshot(file).unwrap().tree(), "R2", 0);

    let helper = analysis.find_symbol(file, position, "drools").unwrap().unwrap();
    let missing = analysis.find_symbol(file, position, "nothing").unwrap();

    assert_eq!(helper.declared_type.map(|t| t.to_string()), Some(HELPER.to_string()));
    assert!(missing.is_none());
}

#[test]
fn test_custom_config_reaches_resolution() {
    let config = ResolveConfig::default().with_implicit_variables(Vec::new());
    let mut host = AnalysisHost::with_config(config);
    host.set_type_lookup(TYPES.clone());
    let file = host.set_file("/a.drl", rules("$g"));
    let analysis = host.analysis();
    let position = statement_start(analysis.snapshot(file).unwrap().tree(), "R2", 0);

    let capabilities = analysis.capabilities(file, position).unwrap();

    assert!(!capabilities.contains(&Origin::ImplicitVariable));
    assert!(capabilities.contains(&Origin::PatternBind));
}

#[test]
fn test_concurrent_queries_on_one_snapshot() {
    let mut host = host_with_fixture_types();
    let file = host.set_file("/a.drl", rules("$g"));
    let analysis = host.analysis();
    let position = statement_start(analysis.snapshot(file).unwrap().tree(), "R2", 0);
    let expected = analysis.visible_symbols(file, position).unwrap();

    thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let analysis = analysis.clone();
                scope.spawn(move || analysis.visible_symbols(file, position).unwrap())
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), expected);
        }
    });
}

#[test]
fn test_resolve_many_matches_single_queries() {
    let mut host = host_with_fixture_types();
    let file = host.set_file("/a.drl", rules("$g"));
    let analysis = host.analysis();
    let tree = analysis.snapshot(file).unwrap().tree();
    let queries: Vec<_> = tree
        .rules
        .iter()
        .flat_map(|rule| [rule.condition.range.start(), rule.action.range.start()])
        .map(|position| (file, position))
        .collect();

    let batched = analysis.resolve_many(&queries);

    for ((file, position), result) in queries.iter().zip(batched) {
        assert_eq!(result, analysis.visible_symbols(*file, *position));
    }
}

#[test]
fn test_line_col_conversions() {
    let mut host = AnalysisHost::new();
    let text = "rule R1\nwhen\nthen\nend\n";
    let file = host.set_file_text("/a.drl", rules("$g"), text);
    let analysis = host.analysis();

    assert_eq!(analysis.line_col(file, TextSize::from(9)).unwrap(), Some(LineCol::new(1, 1)));
    assert_eq!(analysis.offset(file, LineCol::new(2, 0)).unwrap(), Some(TextSize::from(13)));
    assert_eq!(analysis.offset(file, LineCol::new(9, 0)).unwrap(), None);
}
